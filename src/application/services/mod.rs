mod admission_permit;
mod artifact_guard;
mod fast_lane;
mod lane_dispatcher;
mod slow_lane;
mod staging_area;

pub use admission_permit::{AdmissionPermit, FastLaneTicket};
pub use artifact_guard::{ArtifactGuard, write_artifact};
pub use fast_lane::FastLaneExecutor;
pub use lane_dispatcher::LaneDispatcher;
pub use slow_lane::SlowLaneExecutor;
pub use staging_area::{STAGED_AUDIO_SUFFIX, StagingArea};
