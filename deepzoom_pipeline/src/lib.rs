//! Rendering pipeline of deep zoom pyramids.
//!
//! A [`PyramidJob`] takes one source image through normalization, planning and the level loop.
//! Levels are rendered one at a time and handed to the [`TileScheduler`], which cuts and writes
//! tiles on a bounded pool of blocking workers. [`JobQueue`] runs several jobs in sequence.

mod job;
mod layout;
mod level_renderer;
mod normalize;
mod queue;
mod scheduler;
mod tile_writer;

pub use job::{JobParameters, JobReport, PyramidJob};
pub use layout::OutputLayout;
pub use level_renderer::LevelRenderer;
pub use normalize::{NormalizedSource, normalize_source};
pub use queue::JobQueue;
pub use scheduler::{SchedulerSummary, TileFailure, TileJob, TileScheduler, TileWorker};
pub use tile_writer::PngTileWriter;
