//! Worker ceilings for pyramid rendering
//!
//! A pyramid job has two kinds of work: rendering a whole level raster (pure CPU) and cutting,
//! encoding and writing a single tile (CPU plus disk). Both share one ceiling at runtime, and
//! the default for that ceiling is derived from the machine.
//!
//! # Usage
//!
//! ```
//! use deepzoom_core::ConcurrencyLimits;
//!
//! let limits = ConcurrencyLimits::default();
//! assert_eq!(limits.cpu_bound, ConcurrencyLimits::cpu_count());
//!
//! // an explicit request wins, zero is lifted to one
//! assert_eq!(limits.thread_limit(Some(0)), 1);
//! assert_eq!(limits.thread_limit(Some(3)), 3);
//! ```

/// Concurrency limits of a pyramid job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
	/// Limit for pure computation, such as resizing a level raster.
	pub cpu_bound: usize,
}

impl ConcurrencyLimits {
	/// Create concurrency limits with a custom value. Zero is lifted to one.
	pub fn new(cpu_bound: usize) -> Self {
		Self {
			cpu_bound: cpu_bound.max(1),
		}
	}

	/// Get the number of logical CPUs available
	pub fn cpu_count() -> usize {
		num_cpus::get()
	}

	/// The effective worker ceiling of a job.
	///
	/// Without an explicit request this is the CPU count, since level renders dominate the
	/// wall clock and tile jobs compete with them for the same cores.
	pub fn thread_limit(&self, requested: Option<usize>) -> usize {
		requested.unwrap_or(self.cpu_bound).max(1)
	}
}

impl Default for ConcurrencyLimits {
	/// 1x CPU count
	fn default() -> Self {
		Self::new(num_cpus::get())
	}
}
