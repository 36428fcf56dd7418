use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::roster::store::RosterStore;
use crate::storage::json_list_store::JsonListStore;

/// A single roster entry as persisted on disk.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wrestler {
    pub id: u64,
    pub name: String,
}

/// Creation input: `id` is assigned by the store.
#[derive(Clone, Debug, Deserialize)]
pub struct NewWrestler {
    pub name: String,
}

/// Update input: an absent field leaves the record untouched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WrestlerPatch {
    pub name: Option<String>,
}

/// File-backed roster store: an ordered wrestler list persisted as JSON,
/// with ids drawn from an explicit monotonic sequence.
pub struct WrestlerStore {
    store: Arc<JsonListStore<Wrestler>>,
    next_id: AtomicU64,
}

impl WrestlerStore {
    /// Open the store from the given file path. The file must already exist
    /// and hold a JSON array of wrestlers; the id sequence resumes at the
    /// highest persisted id plus one (1 for an empty collection).
    pub async fn open<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonListStore::<Wrestler>::open(path).await?;
        let next_id = store
            .list()
            .await
            .iter()
            .map(|w| w.id)
            .max()
            .map_or(1, |max| max + 1);
        Ok(Arc::new(Self {
            store,
            next_id: AtomicU64::new(next_id),
        }))
    }

    /// All wrestlers in insertion order.
    pub async fn list(&self) -> Vec<Wrestler> {
        self.store.list().await
    }

    /// First wrestler with the given id.
    pub async fn get(&self, id: u64) -> Option<Wrestler> {
        self.store.find(|w| w.id == id).await
    }

    /// Append a new wrestler and persist. Ids are never reused while the
    /// process lives, even after deletions at the end of the list.
    pub async fn create(&self, input: NewWrestler) -> Result<Wrestler, ServiceError> {
        let rec = Wrestler {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: input.name,
        };
        self.store
            .update_list(|list| {
                list.push(rec.clone());
                Ok(())
            })
            .await?;
        Ok(rec)
    }

    /// Merge the patch into the matching record and persist.
    pub async fn update(&self, id: u64, patch: WrestlerPatch) -> Result<Wrestler, ServiceError> {
        self.store
            .update_list(|list| {
                let rec = list
                    .iter_mut()
                    .find(|w| w.id == id)
                    .ok_or_else(|| ServiceError::not_found("wrestler"))?;
                if let Some(name) = patch.name {
                    rec.name = name;
                }
                Ok(rec.clone())
            })
            .await
    }

    /// Remove the matching record and persist; returns whether one existed.
    /// A miss leaves the file untouched.
    pub async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        let removed = self
            .store
            .update_list(|list| {
                let pos = list
                    .iter()
                    .position(|w| w.id == id)
                    .ok_or_else(|| ServiceError::not_found("wrestler"))?;
                list.remove(pos);
                Ok(())
            })
            .await;
        match removed {
            Ok(()) => Ok(true),
            Err(ServiceError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl RosterStore for WrestlerStore {
    async fn list(&self) -> Vec<Wrestler> {
        self.list().await
    }
    async fn get(&self, id: u64) -> Option<Wrestler> {
        self.get(id).await
    }
    async fn create(&self, input: NewWrestler) -> Result<Wrestler, ServiceError> {
        self.create(input).await
    }
    async fn update(&self, id: u64, patch: WrestlerPatch) -> Result<Wrestler, ServiceError> {
        self.update(id, patch).await
    }
    async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        self.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::fs;

    fn tmp_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wrestlers_{}.json", uuid::Uuid::new_v4()))
    }

    async fn seed(contents: &str) -> Result<std::path::PathBuf, anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, contents).await?;
        Ok(tmp)
    }

    #[tokio::test]
    async fn create_on_empty_collection_starts_at_one() -> Result<(), anyhow::Error> {
        let tmp = seed("[]").await?;
        let store = WrestlerStore::open(&tmp).await?;

        let created = store.create(NewWrestler { name: "A".into() }).await?;
        assert_eq!(created.id, 1);
        let next = store.create(NewWrestler { name: "B".into() }).await?;
        assert_eq!(next.id, 2);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_tail_delete() -> Result<(), anyhow::Error> {
        let tmp = seed("[]").await?;
        let store = WrestlerStore::open(&tmp).await?;

        store.create(NewWrestler { name: "A".into() }).await?;
        let b = store.create(NewWrestler { name: "B".into() }).await?;
        assert!(store.delete(b.id).await?);

        let c = store.create(NewWrestler { name: "C".into() }).await?;
        assert_eq!(c.id, 3);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn sequence_resumes_past_highest_persisted_id() -> Result<(), anyhow::Error> {
        let tmp = seed(r#"[{"id": 1, "name": "A"}, {"id": 5, "name": "B"}]"#).await?;
        let store = WrestlerStore::open(&tmp).await?;

        let created = store.create(NewWrestler { name: "C".into() }).await?;
        assert_eq!(created.id, 6);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() -> Result<(), anyhow::Error> {
        let tmp = seed(r#"[{"id": 1, "name": "A"}]"#).await?;
        let store = WrestlerStore::open(&tmp).await?;

        let unchanged = store.update(1, WrestlerPatch { name: None }).await?;
        assert_eq!(unchanged.name, "A");

        let renamed = store.update(1, WrestlerPatch { name: Some("Z".into()) }).await?;
        assert_eq!(renamed.name, "Z");
        assert_eq!(store.get(1).await.map(|w| w.name), Some("Z".to_string()));

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() -> Result<(), anyhow::Error> {
        let tmp = seed("[]").await?;
        let store = WrestlerStore::open(&tmp).await?;

        let err = store
            .update(7, WrestlerPatch { name: Some("Z".into()) })
            .await
            .err()
            .expect("must fail");
        assert!(matches!(err, ServiceError::NotFound(_)));

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_reports_misses_and_removes_hits() -> Result<(), anyhow::Error> {
        let tmp = seed(r#"[{"id": 1, "name": "A"}]"#).await?;
        let store = WrestlerStore::open(&tmp).await?;

        assert!(!store.delete(9).await?);
        assert!(store.delete(1).await?);
        assert!(store.get(1).await.is_none());
        assert!(store.list().await.is_empty());

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn mutations_survive_reopen() -> Result<(), anyhow::Error> {
        let tmp = seed("[]").await?;
        let store = WrestlerStore::open(&tmp).await?;
        store.create(NewWrestler { name: "A".into() }).await?;
        store.create(NewWrestler { name: "B".into() }).await?;
        store.delete(1).await?;

        let reopened = WrestlerStore::open(&tmp).await?;
        let list = reopened.list().await;
        assert_eq!(list, vec![Wrestler { id: 2, name: "B".into() }]);

        let created = reopened.create(NewWrestler { name: "C".into() }).await?;
        assert_eq!(created.id, 3);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }
}
