//! Progress reporting
//!
//! [`ProgressTracker`] counts finished tile jobs of one pyramid job and publishes them as
//! [`PyramidEvent`](crate::PyramidEvent)s. [`ProgressBar`] draws such counts on the terminal.
//!
//! # Examples
//!
//! ```rust
//! use deepzoom_core::progress::ProgressBar;
//!
//! let progress = ProgressBar::new("map", 100);
//! progress.set_position(50);
//! progress.inc(10);
//! progress.finish();
//! ```

mod progress_bar;
mod tracker;

pub use progress_bar::ProgressBar;
pub use tracker::ProgressTracker;
