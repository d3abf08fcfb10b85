// Hands an admitted signal to the storage and notification collaborators.
use crate::notify::Notifier;
use crate::storage::SignalStore;
use shared::models::Signal;
use std::sync::Arc;

/// Per-collaborator delivery result. `None` means the collaborator isn't configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStatus {
    pub persisted: Option<bool>,
    pub notified: Option<bool>,
}

impl ReportStatus {
    /// At least one collaborator took the signal, or none is configured.
    pub fn delivered(&self) -> bool {
        match (self.persisted, self.notified) {
            (None, None) => true,
            (persisted, notified) => persisted == Some(true) || notified == Some(true),
        }
    }
}

pub fn notification_text(signal: &Signal) -> String {
    format!("📊 {}", signal.description())
}

/// Both collaborators run concurrently; a failure in one is logged and never
/// prevents the other.
pub async fn report_signal(
    signal: &Signal,
    store: Option<&Arc<dyn SignalStore>>,
    notifier: Option<&Arc<dyn Notifier>>,
) -> ReportStatus {
    let record = signal.to_record();
    let text = notification_text(signal);

    let persist = async {
        let Some(store) = store else {
            return None;
        };
        match store.save(&record).await {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!(error = %e, kind = %record.kind, "Failed to persist signal");
                Some(false)
            }
        }
    };

    let notify = async {
        let Some(notifier) = notifier else {
            return None;
        };
        match notifier.send(&text).await {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!(error = %e, kind = %signal.kind, "Failed to send signal notification");
                Some(false)
            }
        }
    };

    let (persisted, notified) = tokio::join!(persist, notify);
    ReportStatus { persisted, notified }
}
