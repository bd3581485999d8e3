use anyhow::{Context, Result};
use deepzoom_core::{DeepZoomError, NormalizePlan, TileConfig};
use deepzoom_image::{Anchor, FillColor, ImageEngine, Raster};

/// The working image of a job, ready for the level loop.
#[derive(Debug, Clone)]
pub struct NormalizedSource {
	pub raster: Raster,
	pub plan: NormalizePlan,
	/// Side length of the working square, `tile_size × 2^pow`.
	pub working_size: u32,
}

/// Bring a rotated source to the working size of `config`.
///
/// A shrunk source is anchored top-left, a padded one is centred. Both fill with transparent
/// pixels. A source that already matches is passed through without copying.
pub fn normalize_source(engine: &dyn ImageEngine, source: &Raster, config: &TileConfig) -> Result<NormalizedSource> {
	let (width, height) = source.dimensions();
	let plan = NormalizePlan::new(width, height, config)?;
	let working_size = u32::try_from(config.working_size())
		.map_err(|_| DeepZoomError::invalid_parameter(format!("working size {} is too large", config.working_size())))?;

	log::debug!("normalizing {width}x{height} with {config}: {plan:?}");

	let raster = match plan {
		NormalizePlan::Keep => source.clone(),
		NormalizePlan::Shrink { size } => engine
			.resize_contain(source, size, size, Anchor::TopLeft, FillColor::TRANSPARENT)
			.with_context(|| format!("shrinking {width}x{height} source to {size}x{size}"))?,
		NormalizePlan::Pad(padding) => engine
			.extend_pad(source, &padding, FillColor::TRANSPARENT)
			.with_context(|| format!("padding {width}x{height} source by {padding:?}"))?,
	};

	Ok(NormalizedSource {
		raster,
		plan,
		working_size,
	})
}
