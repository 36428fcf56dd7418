use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::file::wrestler_store::{NewWrestler, Wrestler, WrestlerPatch};

/// Trait abstraction for roster storage.
/// Implementations can be file-backed or in-memory test doubles.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn list(&self) -> Vec<Wrestler>;
    async fn get(&self, id: u64) -> Option<Wrestler>;
    async fn create(&self, input: NewWrestler) -> Result<Wrestler, ServiceError>;
    async fn update(&self, id: u64, patch: WrestlerPatch) -> Result<Wrestler, ServiceError>;
    async fn delete(&self, id: u64) -> Result<bool, ServiceError>;
}
