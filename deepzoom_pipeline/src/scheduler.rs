//! Bounded fan-out of tile jobs
//!
//! The scheduler owns a counting semaphore with one permit per worker slot. Every unit of work,
//! a level render as well as a single tile, holds a permit while it runs on tokio's blocking
//! pool. Submission waits for a free permit, so the number of running units never exceeds the
//! ceiling. A finished unit returns its permit on drop, which wakes the waiting submitter; a
//! permit released before anyone waits is kept by the semaphore, so no wakeup is lost.
//!
//! The next level may be rendered while tiles of the previous level are still being written.
//! Both compete for the same slots.
//!
//! A tile that fails with a filesystem error aborts the scheduler: no further tiles are
//! submitted, tiles that have not started yet are skipped, and [`TileScheduler::finish`] returns
//! that error once the running ones have ended. Any other tile error only fails its tile.

use anyhow::{Context, Result, anyhow};
use deepzoom_core::{DeepZoomError, ErrorKind, TileCoord, progress::ProgressTracker};
use deepzoom_image::Raster;
use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};
use tokio::{
	sync::{OwnedSemaphorePermit, Semaphore},
	task::{JoinError, JoinSet},
};

/// One tile to cut out of a level raster.
#[derive(Debug, Clone)]
pub struct TileJob {
	pub coord: TileCoord,
	pub tile_size: u32,
	/// The level raster, shared with every other tile job of the level.
	pub raster: Raster,
}

/// Does the work of a single tile job. Runs on a blocking worker thread.
pub trait TileWorker: Send + Sync + 'static {
	fn process(&self, job: &TileJob) -> Result<()>;
}

/// A tile that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
	pub coord: TileCoord,
	pub message: String,
}

/// Outcome of all tile jobs that went through a scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
	pub tiles_written: u64,
	pub failed_tiles: Vec<TileFailure>,
	/// Highest number of simultaneously running units observed.
	pub peak_in_flight: usize,
}

/// A held worker slot. Dropping it frees the slot.
struct Slot {
	in_flight: Arc<AtomicUsize>,
	_permit: OwnedSemaphorePermit,
}

impl Drop for Slot {
	fn drop(&mut self) {
		// runs before the permit field is dropped, so the count never exceeds the permits
		self.in_flight.fetch_sub(1, Ordering::AcqRel);
	}
}

/// `None` if the tile was skipped after an abort.
type TileOutcome = (TileCoord, Option<Result<()>>);

pub struct TileScheduler {
	ceiling: usize,
	permits: Arc<Semaphore>,
	in_flight: Arc<AtomicUsize>,
	peak: Arc<AtomicUsize>,
	tasks: JoinSet<TileOutcome>,
	tracker: Arc<ProgressTracker>,
	aborted: Arc<AtomicBool>,
	fatal: Option<anyhow::Error>,
	tiles_written: u64,
	failed_tiles: Vec<TileFailure>,
}

impl TileScheduler {
	/// Create a scheduler with `ceiling` worker slots (at least one).
	pub fn new(ceiling: usize, tracker: Arc<ProgressTracker>) -> Self {
		let ceiling = ceiling.max(1);
		Self {
			ceiling,
			permits: Arc::new(Semaphore::new(ceiling)),
			in_flight: Arc::new(AtomicUsize::new(0)),
			peak: Arc::new(AtomicUsize::new(0)),
			tasks: JoinSet::new(),
			tracker,
			aborted: Arc::new(AtomicBool::new(false)),
			fatal: None,
			tiles_written: 0,
			failed_tiles: Vec::new(),
		}
	}

	pub fn ceiling(&self) -> usize {
		self.ceiling
	}

	pub fn in_flight(&self) -> usize {
		self.in_flight.load(Ordering::Acquire)
	}

	pub fn peak_in_flight(&self) -> usize {
		self.peak.load(Ordering::Acquire)
	}

	/// Whether a tile has failed with a filesystem error.
	pub fn is_aborted(&self) -> bool {
		self.aborted.load(Ordering::Acquire)
	}

	/// Wait for a free slot.
	async fn acquire(&self) -> Result<Slot> {
		let permit = self
			.permits
			.clone()
			.acquire_owned()
			.await
			.context("worker slots have been closed")?;
		let running = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
		self.peak.fetch_max(running, Ordering::AcqRel);
		Ok(Slot {
			in_flight: self.in_flight.clone(),
			_permit: permit,
		})
	}

	/// Run `work` on a worker slot and wait for its result.
	///
	/// Used for level renders, which occupy one slot like any tile job.
	pub async fn run_blocking<T, F>(&self, work: F) -> Result<T>
	where
		T: Send + 'static,
		F: FnOnce() -> Result<T> + Send + 'static,
	{
		let slot = self.acquire().await?;
		tokio::task::spawn_blocking(move || {
			let _slot = slot;
			work()
		})
		.await
		.map_err(|e| anyhow!("worker failed: {e}"))?
	}

	/// Submit one tile job per coordinate of `level`.
	///
	/// Returns the number of submitted jobs once every job has been submitted, not when they have
	/// finished. Suspends while all slots are taken. Stops early once the scheduler is aborted.
	/// The scheduler drops its own handle on `raster` before returning, so the pixels are freed
	/// as soon as the last tile job of the level ends.
	pub async fn submit_level(
		&mut self,
		raster: Raster,
		level: u8,
		tile_size: u32,
		worker: &Arc<dyn TileWorker>,
	) -> Result<u64> {
		let mut submitted = 0;
		for coord in TileCoord::iter_level(level) {
			let slot = self.acquire().await?;
			self.collect_finished()?;
			if self.is_aborted() {
				log::debug!("aborted after {submitted} tiles of level {level}");
				break;
			}

			let job = TileJob {
				coord,
				tile_size,
				raster: raster.clone(),
			};
			let worker = worker.clone();
			let tracker = self.tracker.clone();
			let aborted = self.aborted.clone();
			self.tasks.spawn_blocking(move || {
				// dropped last, so the abort flag is visible before the slot is free again
				let _slot = slot;
				if aborted.load(Ordering::Acquire) {
					return (job.coord, None);
				}
				let result = catch_unwind(AssertUnwindSafe(|| worker.process(&job)))
					.unwrap_or_else(|_| Err(anyhow!("tile worker panicked")));
				match &result {
					Ok(()) => {
						tracker.tile_written(job.coord);
					}
					Err(error) => {
						if DeepZoomError::kind_of(error) == Some(ErrorKind::Filesystem) {
							aborted.store(true, Ordering::Release);
						}
						log::error!("tile {} failed: {error:#}", job.coord);
						tracker.tile_failed(job.coord, format!("{error:#}"));
					}
				}
				(job.coord, Some(result))
			});
			submitted += 1;
		}
		log::trace!("submitted {submitted} tiles of level {level}");
		Ok(submitted)
	}

	fn record(&mut self, joined: Result<TileOutcome, JoinError>) -> Result<()> {
		let (coord, result) = joined.map_err(|e| anyhow!("tile task was lost: {e}"))?;
		match result {
			None => {}
			Some(Ok(())) => self.tiles_written += 1,
			Some(Err(error))
				if self.fatal.is_none() && DeepZoomError::kind_of(&error) == Some(ErrorKind::Filesystem) =>
			{
				self.fatal = Some(error);
			}
			Some(Err(error)) => self.failed_tiles.push(TileFailure {
				coord,
				message: format!("{error:#}"),
			}),
		}
		Ok(())
	}

	/// Account for tile jobs that have already ended, without waiting.
	fn collect_finished(&mut self) -> Result<()> {
		while let Some(joined) = self.tasks.try_join_next() {
			self.record(joined)?;
		}
		Ok(())
	}

	/// Wait for every submitted tile job to end.
	///
	/// # Errors
	/// Returns the first filesystem error of a tile, after all running tiles have ended.
	pub async fn finish(mut self) -> Result<SchedulerSummary> {
		while let Some(joined) = self.tasks.join_next().await {
			self.record(joined)?;
		}
		if let Some(error) = self.fatal.take() {
			return Err(error);
		}
		let mut failed_tiles = std::mem::take(&mut self.failed_tiles);
		failed_tiles.sort_by_key(|failure| (failure.coord.level, failure.coord.x, failure.coord.y));
		Ok(SchedulerSummary {
			tiles_written: self.tiles_written,
			failed_tiles,
			peak_in_flight: self.peak_in_flight(),
		})
	}
}
