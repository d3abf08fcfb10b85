// Persistence collaborator for emitted signals.
pub mod sqlite;

pub use sqlite::{SqliteSignalStore, StorageSettings};

use crate::error::EngineResult;
use async_trait::async_trait;
use shared::models::SignalRecord;

#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn save(&self, record: &SignalRecord) -> EngineResult<()>;

    /// Most recently stored record, if any.
    async fn latest(&self) -> EngineResult<Option<SignalRecord>>;
}
