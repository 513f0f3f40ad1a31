//! Task primitives shared by the seed orchestrator.
//!
//! * [`spawn`]: classified task spawning on the ambient tokio runtime
//! * [`settle_all`]: await-all barrier that never short-circuits on failure
//! * [`spawn_periodic`]: cancellable fire-and-forget ticker

mod barrier;
mod class;
mod spawn;
mod ticker;


pub use barrier::{BatchFuture, Settlement, SettledBatch, join_error_panic_message, settle_all};
pub use class::TaskClass;
pub use spawn::spawn;
pub use ticker::{PeriodicTask, spawn_periodic};
