use anyhow::{Context, Result, bail};
use deepzoom_image::{Anchor, FillColor, ImageEngine, Raster};
use std::sync::Arc;

/// Renders the square raster of one zoom level from the working image.
#[derive(Clone)]
pub struct LevelRenderer {
	engine: Arc<dyn ImageEngine>,
	tile_size: u32,
}

impl LevelRenderer {
	pub fn new(engine: Arc<dyn ImageEngine>, tile_size: u32) -> Self {
		Self { engine, tile_size }
	}

	pub fn level_size(&self, level: u8) -> Option<u32> {
		1u32.checked_shl(u32::from(level))
			.and_then(|factor| self.tile_size.checked_mul(factor))
	}

	/// Produce the `tile_size × 2^level` square of `level`.
	///
	/// The working image is fitted top-left into the square; anything it does not cover stays
	/// transparent. At the deepest level of a square working image this is the working image
	/// itself.
	pub fn render(&self, source: &Raster, level: u8) -> Result<Raster> {
		let Some(size) = self.level_size(level) else {
			bail!("level {level} is too deep for tile size {}", self.tile_size);
		};

		log::debug!("rendering level {level} at {size}x{size} from {source:?}");
		self.engine
			.resize_contain(source, size, size, Anchor::TopLeft, FillColor::TRANSPARENT)
			.with_context(|| format!("rendering level {level} at {size}x{size}"))
	}
}
