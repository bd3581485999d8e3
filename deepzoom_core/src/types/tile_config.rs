use std::{fmt, ops::RangeInclusive};

/// The outcome of tile size resolution.
///
/// `tile_size × 2^zoom_level_pow` is the working size: the side length of the square every
/// source image is normalized to before the pyramid is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileConfig {
	pub tile_size: u32,
	pub zoom_level_pow: u32,
	/// Absolute distance between the working size and the longer source side.
	pub difference: u64,
}

impl TileConfig {
	/// The working size as a 64 bit value, since it may exceed the source dimensions.
	pub fn working_size(&self) -> u64 {
		u64::from(self.tile_size) << self.zoom_level_pow
	}

	/// The best grow and shrink candidates for a single tile size.
	///
	/// Growing picks the smallest pow whose working size reaches `full_size`. Shrinking picks the
	/// largest pow whose working size stays below it, and is missing when a single tile already
	/// covers `full_size`.
	pub fn grow_and_shrink(tile_size: u32, full_size: u32) -> (TileConfig, Option<TileConfig>) {
		let tile = u64::from(tile_size);
		let full = u64::from(full_size);

		// 2^pow >= full / tile  <=>  2^pow >= ceil(full / tile)
		let ratio = full.div_ceil(tile).max(1);
		let grow_pow = ratio.next_power_of_two().trailing_zeros();
		let grow = TileConfig {
			tile_size,
			zoom_level_pow: grow_pow,
			difference: (tile << grow_pow) - full,
		};

		// grow_pow is minimal, so one step down is the largest size below full
		let shrink = (grow_pow > 0).then(|| TileConfig {
			tile_size,
			zoom_level_pow: grow_pow - 1,
			difference: full - (tile << (grow_pow - 1)),
		});

		(grow, shrink)
	}

	/// The best configuration for a fixed tile size, picked with the same policy as range
	/// resolution uses.
	pub fn best_for(tile_size: u32, full_size: u32) -> TileConfig {
		let (grow, shrink) = Self::grow_and_shrink(tile_size, full_size);
		choose(Some(grow), shrink).unwrap_or(grow)
	}
}

/// Pick between the best upscaling and the best downscaling candidate.
///
/// Upscaling is preferred whenever its overshoot is at most one tile. Otherwise the candidate
/// with the smaller difference wins, ties going to upscaling.
pub(crate) fn choose(grow: Option<TileConfig>, shrink: Option<TileConfig>) -> Option<TileConfig> {
	match (grow, shrink) {
		(Some(grow), Some(shrink)) => {
			if grow.difference <= u64::from(grow.tile_size) || grow.difference <= shrink.difference {
				Some(grow)
			} else {
				Some(shrink)
			}
		}
		(grow, shrink) => grow.or(shrink),
	}
}

impl fmt::Display for TileConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"tile size {} × 2^{} = {} (difference {})",
			self.tile_size,
			self.zoom_level_pow,
			self.working_size(),
			self.difference
		)
	}
}

/// Inclusive range of acceptable tile sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSizeRange {
	pub min: u32,
	pub max: u32,
}

impl TileSizeRange {
	pub const fn new(min: u32, max: u32) -> Self {
		Self { min, max }
	}

	/// A range is degenerate when it holds no usable tile size.
	pub fn is_degenerate(&self) -> bool {
		self.min == 0 || self.min > self.max
	}

	/// All tile sizes of the range, largest first.
	pub fn descending(&self) -> impl Iterator<Item = u32> {
		let range: RangeInclusive<u32> = if self.is_degenerate() { 1..=0 } else { self.min..=self.max };
		range.rev()
	}
}

impl Default for TileSizeRange {
	fn default() -> Self {
		Self::new(200, 300)
	}
}

impl fmt::Display for TileSizeRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..={}", self.min, self.max)
	}
}
