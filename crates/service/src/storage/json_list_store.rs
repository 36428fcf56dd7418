use std::{path::PathBuf, sync::Arc};

use serde::Serialize;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered list store.
///
/// Persists a `Vec<T>` to a JSON file, keeping element order stable across
/// mutations and reloads. Every mutation rewrites the whole file while the
/// write lock is held, so read-modify-write-persist is one critical section.
pub struct JsonListStore<T> {
    inner: RwLock<Vec<T>>,
    file_path: PathBuf,
}

impl<T> JsonListStore<T>
where
    T: Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Open the store from a path. The file must exist and contain a JSON
    /// array; anything else is a hard error so a misconfigured deployment
    /// fails at startup instead of serving an empty collection.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        let bytes = fs::read(&file_path).await.map_err(|e| {
            ServiceError::Storage(format!("cannot read {}: {e}", file_path.display()))
        })?;
        let list: Vec<T> = serde_json::from_slice(&bytes).map_err(|e| {
            ServiceError::Storage(format!("cannot parse {}: {e}", file_path.display()))
        })?;
        Ok(Arc::new(Self {
            inner: RwLock::new(list),
            file_path,
        }))
    }

    async fn save(&self, list: &[T]) -> Result<(), ServiceError> {
        // 4-space indent, matching the layout of hand-maintained seed files.
        let mut data = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut data, fmt);
        list.serialize(&mut ser)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data).await.map_err(|e| {
            ServiceError::Storage(format!("cannot write {}: {e}", self.file_path.display()))
        })?;
        debug!(path = %self.file_path.display(), entries = list.len(), "collection persisted");
        Ok(())
    }

    /// Snapshot of all entries in list order.
    pub async fn list(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    /// First entry matching the predicate.
    pub async fn find<F>(&self, pred: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.inner.read().await.iter().find(|t| pred(t)).cloned()
    }

    /// Apply a mutation to the list and persist it, all under the write
    /// lock. When the closure fails nothing is written.
    pub async fn update_list<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let mut list = self.inner.write().await;
        let out = f(&mut list)?;
        self.save(&list).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Entry {
        id: u64,
        name: String,
    }

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_list_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn open_fails_on_missing_file() {
        let missing = tmp_path();
        let err = JsonListStore::<Entry>::open(&missing).await.err().expect("must fail");
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[tokio::test]
    async fn open_fails_on_non_array_json() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, b"{\"not\": \"a list\"}").await?;
        let err = JsonListStore::<Entry>::open(&tmp).await.err().expect("must fail");
        assert!(matches!(err, ServiceError::Storage(_)));
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_list_persists_and_reloads() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, b"[]").await?;
        let store = JsonListStore::<Entry>::open(&tmp).await?;

        store
            .update_list(|list| {
                list.push(Entry { id: 1, name: "A".into() });
                list.push(Entry { id: 2, name: "B".into() });
                Ok(())
            })
            .await?;
        assert_eq!(store.list().await.len(), 2);
        assert_eq!(
            store.find(|e| e.id == 2).await.map(|e| e.name),
            Some("B".to_string())
        );

        let reloaded = JsonListStore::<Entry>::open(&tmp).await?;
        assert_eq!(reloaded.list().await, store.list().await);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, b"[{\"id\": 1, \"name\": \"A\"}]").await?;
        let before = fs::read(&tmp).await?;

        let store = JsonListStore::<Entry>::open(&tmp).await?;
        let res: Result<(), ServiceError> = store
            .update_list(|list| {
                list.clear();
                Err(ServiceError::not_found("entry"))
            })
            .await;
        assert!(res.is_err());
        assert_eq!(fs::read(&tmp).await?, before);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn persisted_file_uses_four_space_indent() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        fs::write(&tmp, b"[]").await?;
        let store = JsonListStore::<Entry>::open(&tmp).await?;
        store
            .update_list(|list| {
                list.push(Entry { id: 1, name: "A".into() });
                Ok(())
            })
            .await?;

        let text = fs::read_to_string(&tmp).await?;
        let expected = "[\n    {\n        \"id\": 1,\n        \"name\": \"A\"\n    }\n]";
        assert_eq!(text, expected);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }
}
