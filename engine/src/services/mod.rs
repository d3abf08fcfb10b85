// Pipeline orchestration: fetch -> evaluate -> report, driven by the scheduler.
pub mod scheduler;
pub mod signal_service;

pub use scheduler::Scheduler;
pub use signal_service::{RunOutcome, SignalService};
