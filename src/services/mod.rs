//! Pipeline services: classification, participant resolution, load
//! orchestration.

pub mod classifier;
pub mod loader;
pub mod participants;

pub use classifier::classify;
pub use loader::{LoadOrchestrator, RunSummary};
pub use participants::resolve_commenters;
