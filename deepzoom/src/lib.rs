//! # deepzoom
//!
//! Cuts large raster images into deep zoom tile pyramids:
//!
//! ```text
//! output/<map>/config.json          {"tileSize": 256, "minZoom": 0, "maxZoom": 4}
//! output/<map>/<z>/<x>/<y>.png
//! ```
//!
//! Level `z` is the source image scaled to `tileSize × 2^z` pixels and cut into `2^z × 2^z`
//! tiles. The tile size is picked from a range so that the deepest level matches the source as
//! closely as possible.
//!
//! ## Usage Example
//!
//! ```no_run
//! use deepzoom::{
//!     core::EventBus,
//!     image::DynamicImageEngine,
//!     pipeline::{JobParameters, PyramidJob},
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let parameters = JobParameters::new("scans/berlin.tif", "berlin");
//!     let job = PyramidJob::new(parameters, Arc::new(DynamicImageEngine::new()), EventBus::new());
//!     let report = job.run().await?;
//!     println!("{} tiles written", report.tiles_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod input;

pub use deepzoom_core as core;
pub use deepzoom_image as image;
pub use deepzoom_pipeline as pipeline;
