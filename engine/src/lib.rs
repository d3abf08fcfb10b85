// Engine library root
// Indicators and the crossover detector are pure; data, storage and notify are the
// I/O collaborators the service wires around them.

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod notify;
pub mod services;
pub mod signals;
pub mod storage;

pub use error::{EngineError, EngineResult};
