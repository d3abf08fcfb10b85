// Suppresses repeats of the same signal across consecutive pipeline runs.
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use shared::models::{Signal, SignalKind, SignalRecord};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    /// Same-kind signals closer than this (by candle time) are dropped. 0 disables the window;
    /// repeats on the very same candle are always dropped.
    pub cooldown_secs: u64,
}

#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    cooldown: Duration,
    last: Option<(SignalKind, DateTime<Utc>)>,
}

impl DuplicateGuard {
    pub fn new(settings: &DedupSettings) -> Self {
        Self {
            cooldown: Duration::seconds(settings.cooldown_secs as i64),
            last: None,
        }
    }

    /// Seeds the guard from the last persisted signal so restarts don't re-announce it.
    pub fn prime(&mut self, record: &SignalRecord) {
        self.last = Some((record.kind, record.timestamp));
    }

    /// True when `signal` repeats the last delivered one on the same candle or within the cooldown.
    pub fn is_duplicate(&self, signal: &Signal) -> bool {
        match self.last {
            Some((kind, at)) if kind == signal.kind => {
                let elapsed = signal.timestamp - at;
                elapsed <= Duration::zero() || elapsed < self.cooldown
            }
            _ => false,
        }
    }

    /// Records `signal` as delivered. Only delivered signals count as repeats.
    pub fn commit(&mut self, signal: &Signal) {
        self.last = Some((signal.kind, signal.timestamp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signal_at(kind: SignalKind, minute: i64) -> Signal {
        Signal {
            kind,
            price: 100.0,
            take_profit: 101.0,
            stop_loss: 99.0,
            trailing_stop: 0.3,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
        }
    }

    #[test]
    fn test_same_candle_repeat_is_dropped() {
        let mut guard = DuplicateGuard::new(&DedupSettings::default());
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Buy, 15)));
        guard.commit(&signal_at(SignalKind::Buy, 15));
        assert!(guard.is_duplicate(&signal_at(SignalKind::Buy, 15)));
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Buy, 30)));
    }

    #[test]
    fn test_uncommitted_signal_is_not_remembered() {
        let guard = DuplicateGuard::new(&DedupSettings { cooldown_secs: 3600 });
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Buy, 15)));
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Buy, 15)));
    }

    #[test]
    fn test_opposite_kind_always_passes() {
        let mut guard = DuplicateGuard::new(&DedupSettings { cooldown_secs: 3600 });
        guard.commit(&signal_at(SignalKind::Buy, 15));
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Sell, 15)));
        guard.commit(&signal_at(SignalKind::Sell, 15));
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Buy, 30)));
        assert!(guard.is_duplicate(&signal_at(SignalKind::Sell, 30)));
    }

    #[test]
    fn test_cooldown_window() {
        let mut guard = DuplicateGuard::new(&DedupSettings { cooldown_secs: 3600 });
        guard.commit(&signal_at(SignalKind::Sell, 0));
        assert!(guard.is_duplicate(&signal_at(SignalKind::Sell, 45)));
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Sell, 60)));
    }

    #[test]
    fn test_primed_from_record() {
        let mut guard = DuplicateGuard::new(&DedupSettings::default());
        guard.prime(&signal_at(SignalKind::Buy, 15).to_record());
        assert!(guard.is_duplicate(&signal_at(SignalKind::Buy, 15)));
        assert!(!guard.is_duplicate(&signal_at(SignalKind::Sell, 15)));
    }
}
