use crate::{EventBus, PyramidEvent, TileCoord};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts finished tile jobs of one pyramid job and publishes every outcome.
///
/// Failed tiles count as finished, so the tracker reaches its total once every tile job has
/// ended, whatever the outcome.
#[derive(Debug)]
pub struct ProgressTracker {
	total: u64,
	completed: AtomicU64,
	failed: AtomicU64,
	events: EventBus,
}

impl ProgressTracker {
	pub fn new(total: u64, events: EventBus) -> Self {
		Self {
			total,
			completed: AtomicU64::new(0),
			failed: AtomicU64::new(0),
			events,
		}
	}

	/// Record a written tile. Returns the number of finished tile jobs.
	pub fn tile_written(&self, coord: TileCoord) -> u64 {
		let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
		self.events.emit(PyramidEvent::TileComplete {
			coord,
			completed,
			total: self.total,
		});
		completed
	}

	/// Record a tile that could not be written.
	pub fn tile_failed(&self, coord: TileCoord, message: String) -> u64 {
		self.failed.fetch_add(1, Ordering::AcqRel);
		let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
		self.events.emit(PyramidEvent::TileFailed { coord, message });
		completed
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn completed(&self) -> u64 {
		self.completed.load(Ordering::Acquire)
	}

	pub fn failed(&self) -> u64 {
		self.failed.load(Ordering::Acquire)
	}

	/// Finished tile jobs in percent of the planned total.
	pub fn percent(&self) -> f64 {
		if self.total == 0 {
			return 100.0;
		}
		self.completed() as f64 * 100.0 / self.total as f64
	}
}
