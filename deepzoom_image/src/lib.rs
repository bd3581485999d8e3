//! Raster handling for deep zoom pyramids: the [`ImageEngine`] boundary, the shared [`Raster`]
//! handle and the `image` based [`DynamicImageEngine`].

mod dynamic_engine;
mod engine;
pub mod png;
mod raster;

pub use dynamic_engine::DynamicImageEngine;
pub use engine::ImageEngine;
pub use raster::{Anchor, FillColor, Raster};

#[cfg(any(test, feature = "test"))]
pub mod test_images;
