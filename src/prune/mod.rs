//! Rate-limited paginated pruning.

pub mod cursor;
pub mod engine;
pub mod policy;
pub mod report;
pub mod viral;

pub use cursor::{CursorState, PageCursor, Step};
pub use engine::{
    EngineOptions, PruneEngine, RunState, ScanSummary, Sleeper, ThreadSleeper, Transition,
};
pub use policy::{PruneDecision, PrunePolicy};
pub use report::{PruneReport, RunOutcome};
pub use viral::{ViralThreshold, ViralTweet};
