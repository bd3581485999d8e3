//! Contains the pixel-free building blocks of a deep zoom pyramid: tile coordinates, tile size
//! resolution, normalization and pyramid plans, errors, events and progress reporting.

mod concurrency;
pub use concurrency::ConcurrencyLimits;

mod error;
pub use error::{DeepZoomError, ErrorKind};

pub mod events;
pub use events::{EventBus, PyramidEvent};

pub mod progress;

pub mod types;
pub use types::*;
