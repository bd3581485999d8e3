use crate::{OutputLayout, TileJob, TileWorker};
use anyhow::{Context, Result};
use deepzoom_image::ImageEngine;
use std::sync::Arc;

/// Cuts a tile out of its level raster and writes it as `<z>/<x>/<y>.png`.
///
/// The column directories must exist, see [`OutputLayout::create_level_dirs`].
pub struct PngTileWriter {
	engine: Arc<dyn ImageEngine>,
	layout: OutputLayout,
}

impl PngTileWriter {
	pub fn new(engine: Arc<dyn ImageEngine>, layout: OutputLayout) -> Self {
		Self { engine, layout }
	}
}

impl TileWorker for PngTileWriter {
	fn process(&self, job: &TileJob) -> Result<()> {
		let (left, top) = job.coord.pixel_offset(job.tile_size);
		let tile = self
			.engine
			.extract(&job.raster, left, top, job.tile_size, job.tile_size)
			.with_context(|| format!("extracting tile {}", job.coord))?;

		let path = self.layout.tile_path(&job.coord);
		self.engine
			.encode_to_file(&tile, &path)
			.with_context(|| format!("writing tile {}", job.coord))?;
		log::trace!("wrote {path:?}");
		Ok(())
	}
}
