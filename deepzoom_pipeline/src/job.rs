//! One source image, one pyramid
//!
//! A job runs these steps in order:
//!
//! 1. validate rotation and tile size override
//! 2. decode and rotate the source
//! 3. resolve the tile configuration from the longer source side
//! 4. normalize the source to the working size
//! 5. plan the levels and write `config.json`
//! 6. render each level and hand its tiles to the scheduler
//!
//! A failing level render ends the job after the tiles already submitted have finished, and so
//! does a filesystem error while writing a tile. Any other failing tile only ends up in
//! [`JobReport::failed_tiles`].

use crate::{
	LevelRenderer, NormalizedSource, OutputLayout, PngTileWriter, TileFailure, TileScheduler, TileWorker,
	normalize_source,
};
use anyhow::{Context, Result, anyhow};
use deepzoom_core::{
	ConcurrencyLimits, DEFAULT_TILE_SIZE, EventBus, PyramidEvent, PyramidPlan, Rotation, TileConfig, TileSizeRange,
	TileSizeResolver, progress::ProgressTracker,
};
use deepzoom_image::{ImageEngine, Raster};
use std::{path::PathBuf, sync::Arc};

/// Everything a single pyramid job needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParameters {
	pub image_path: PathBuf,
	pub map_name: String,
	/// The pyramid goes to `<output_root>/<map_name>/`.
	pub output_root: PathBuf,
	/// Clockwise, one of 0, 90, 180, 270.
	pub rotation: u32,
	pub tile_size_range: TileSizeRange,
	pub fallback_tile_size: u32,
	/// Raw override as typed by the user; validated when the job starts.
	pub tile_size_override: Option<String>,
	pub min_zoom: u8,
	pub max_zoom: Option<u8>,
	/// Worker ceiling; the CPU count when unset.
	pub thread_limit: Option<usize>,
}

impl JobParameters {
	pub fn new(image_path: impl Into<PathBuf>, map_name: impl Into<String>) -> Self {
		Self {
			image_path: image_path.into(),
			map_name: map_name.into(),
			output_root: PathBuf::from("output"),
			rotation: 0,
			tile_size_range: TileSizeRange::default(),
			fallback_tile_size: DEFAULT_TILE_SIZE,
			tile_size_override: None,
			min_zoom: 0,
			max_zoom: None,
			thread_limit: None,
		}
	}

	fn resolver(&self) -> TileSizeResolver {
		TileSizeResolver::new(self.tile_size_range)
			.with_fallback(self.fallback_tile_size)
			.with_override(self.tile_size_override.clone())
	}
}

/// The outcome of a job that got through all its levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
	pub map_name: String,
	pub tile_config: TileConfig,
	pub plan: PyramidPlan,
	pub tiles_written: u64,
	pub failed_tiles: Vec<TileFailure>,
	pub peak_in_flight: usize,
}

impl JobReport {
	/// Whether every planned tile was written.
	pub fn is_complete(&self) -> bool {
		self.failed_tiles.is_empty() && self.tiles_written == self.plan.total_tile_count()
	}
}

pub struct PyramidJob {
	parameters: JobParameters,
	engine: Arc<dyn ImageEngine>,
	events: EventBus,
}

impl PyramidJob {
	pub fn new(parameters: JobParameters, engine: Arc<dyn ImageEngine>, events: EventBus) -> Self {
		Self {
			parameters,
			engine,
			events,
		}
	}

	pub fn parameters(&self) -> &JobParameters {
		&self.parameters
	}

	/// Generate the pyramid.
	///
	/// # Errors
	/// Fails on invalid parameters, on an unreadable source, on filesystem errors, and when a
	/// level cannot be rendered.
	pub async fn run(&self) -> Result<JobReport> {
		let parameters = &self.parameters;
		let rotation = Rotation::try_from(parameters.rotation)?;
		let resolver = parameters.resolver();
		resolver.parsed_override()?;
		let layout = OutputLayout::new(&parameters.output_root, &parameters.map_name)?;

		log::info!(
			"generating '{}' from {:?} into {:?}",
			parameters.map_name,
			parameters.image_path,
			layout.map_dir()
		);

		let (tile_config, source) = self.prepare_source(rotation, resolver).await?;
		let plan = PyramidPlan::new(
			tile_config.tile_size,
			source.working_size,
			parameters.min_zoom,
			parameters.max_zoom,
		)?;
		log::debug!("{tile_config}, levels {:?}", plan.levels());

		layout.write_manifest(&plan.manifest())?;

		let total_tiles = plan.total_tile_count();
		let tracker = Arc::new(ProgressTracker::new(total_tiles, self.events.clone()));
		let ceiling = ConcurrencyLimits::default().thread_limit(parameters.thread_limit);
		let mut scheduler = TileScheduler::new(ceiling, tracker);

		self.events.emit(PyramidEvent::JobStart {
			map_name: parameters.map_name.clone(),
			total_tiles,
		});

		let rendered = self
			.render_levels(&plan, &layout, source.raster, &mut scheduler)
			.await;
		// tiles already in flight finish either way
		let summary = scheduler.finish().await?;
		rendered?;

		self.events.emit(PyramidEvent::JobFinish {
			map_name: parameters.map_name.clone(),
			tiles_written: summary.tiles_written,
			tiles_failed: summary.failed_tiles.len() as u64,
		});
		log::info!(
			"finished '{}': {} of {total_tiles} tiles written, {} failed",
			parameters.map_name,
			summary.tiles_written,
			summary.failed_tiles.len()
		);

		Ok(JobReport {
			map_name: parameters.map_name.clone(),
			tile_config,
			plan,
			tiles_written: summary.tiles_written,
			failed_tiles: summary.failed_tiles,
			peak_in_flight: summary.peak_in_flight,
		})
	}

	/// Decode, rotate, resolve and normalize on a blocking thread.
	async fn prepare_source(
		&self,
		rotation: Rotation,
		resolver: TileSizeResolver,
	) -> Result<(TileConfig, NormalizedSource)> {
		let engine = self.engine.clone();
		let image_path = self.parameters.image_path.clone();

		tokio::task::spawn_blocking(move || {
			let decoded = engine
				.open(&image_path)
				.with_context(|| format!("reading source image {image_path:?}"))?;
			let rotated = engine
				.rotate(&decoded, rotation)
				.with_context(|| format!("rotating source image by {rotation}"))?;
			drop(decoded);

			let (width, height) = rotated.dimensions();
			log::debug!("source is {width}x{height} after rotating by {rotation}");
			let tile_config = resolver.resolve(width.max(height))?;
			let source = normalize_source(engine.as_ref(), &rotated, &tile_config)?;
			Ok((tile_config, source))
		})
		.await
		.map_err(|e| anyhow!("preparing source image failed: {e}"))?
	}

	async fn render_levels(
		&self,
		plan: &PyramidPlan,
		layout: &OutputLayout,
		source: Raster,
		scheduler: &mut TileScheduler,
	) -> Result<()> {
		let renderer = LevelRenderer::new(self.engine.clone(), plan.tile_size);
		let worker: Arc<dyn TileWorker> = Arc::new(PngTileWriter::new(self.engine.clone(), layout.clone()));

		for level in plan.levels() {
			if scheduler.is_aborted() {
				log::debug!("not rendering level {level}, a tile could not be written");
				break;
			}
			self.events.emit(PyramidEvent::LevelStart {
				level,
				tiles: plan.tile_count(level),
			});

			let raster = {
				let renderer = renderer.clone();
				let source = source.clone();
				scheduler
					.run_blocking(move || renderer.render(&source, level))
					.await
					.with_context(|| format!("level {level} failed"))?
			};

			layout
				.create_level_dirs(level)
				.with_context(|| format!("level {level} failed"))?;
			scheduler
				.submit_level(raster, level, plan.tile_size, &worker)
				.await?;

			self.events.emit(PyramidEvent::LevelComplete { level });
			log::debug!("level {level} submitted");
		}
		Ok(())
	}
}
