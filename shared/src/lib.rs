// Data models and formatting helpers shared by the engine and its collaborators.
pub mod models;
pub mod utils;
