//! Cooperative, time-sliced execution of per-index work.
//!
//! Large per-vertex passes are split into slices bounded by a wall-clock
//! budget. Between slices the scheduler awaits a host-supplied
//! [`YieldPoint`] (typically the next display refresh), so a long pass never
//! starves the host's redraw loop. Small passes run synchronously.

mod scheduler;
mod yield_point;

pub use scheduler::{
    ChunkReport, ChunkedScheduler, DEFAULT_SLICE_BUDGET, DEFAULT_SYNC_THRESHOLD, ExecutionMode,
    SchedulerConfig,
};
pub use yield_point::{YieldNow, YieldPoint, yield_now};
