// Notification collaborator: pushes a free-text message to one fixed recipient.
pub mod telegram;

pub use telegram::{TelegramNotifier, TelegramSettings};

use crate::error::EngineResult;
use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> EngineResult<()>;
}
