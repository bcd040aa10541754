//! Service Kit
//!
//! Services that compose the engine with its collaborators.

mod advisor;
mod sync;

pub use advisor::{Advisor, AdvisorReport, SkippedAsset};
pub use sync::{SyncReport, SyncService};
