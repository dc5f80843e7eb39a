pub mod divergence;
pub mod engine;

pub use divergence::Divergence;
pub use engine::{SyncEngine, SyncMessage, SyncOutcome, Transition};
