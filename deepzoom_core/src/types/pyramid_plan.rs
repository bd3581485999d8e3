//! Zoom levels and tile counts of a pyramid
//!
//! Level `z` is a square raster of `tile_size × 2^z` pixels, cut into `2^z × 2^z` tiles. The
//! working image supports `pow + 1` levels; the deepest of them is the working size itself.
//!
//! ```
//! use deepzoom_core::PyramidPlan;
//!
//! let plan = PyramidPlan::new(250, 1000, 0, None).unwrap();
//! assert_eq!(plan.levels().collect::<Vec<_>>(), [0, 1, 2]);
//! assert_eq!(plan.total_tile_count(), 1 + 4 + 16);
//! ```

use crate::{DeepZoomError, Manifest, TileCoord};
use anyhow::Result;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PyramidPlan {
	pub tile_size: u32,
	pub min_zoom: u8,
	pub max_zoom: u8,
}

impl PyramidPlan {
	/// Plan the pyramid for a working image of `working_size` pixels.
	///
	/// The requested max zoom is capped to the deepest level the working image supports.
	///
	/// # Errors
	/// Returns [`DeepZoomError::InvalidParameter`] if the working size is not `tile_size` times a
	/// power of two, or if `min_zoom` exceeds the effective max zoom.
	pub fn new(tile_size: u32, working_size: u32, min_zoom: u8, max_zoom: Option<u8>) -> Result<PyramidPlan> {
		let natural = Self::natural_zoom_levels(tile_size, working_size)?;
		let max_zoom = max_zoom.unwrap_or(natural).min(natural - 1);
		if min_zoom > max_zoom {
			return Err(DeepZoomError::invalid_parameter(format!(
				"min zoom {min_zoom} exceeds max zoom {max_zoom}"
			))
			.into());
		}
		Ok(PyramidPlan {
			tile_size,
			min_zoom,
			max_zoom,
		})
	}

	/// Number of levels a working image of `working_size` pixels supports: `pow + 1`.
	pub fn natural_zoom_levels(tile_size: u32, working_size: u32) -> Result<u8> {
		if tile_size == 0 || working_size % tile_size != 0 || !(working_size / tile_size).is_power_of_two() {
			return Err(DeepZoomError::invalid_parameter(format!(
				"working size {working_size} is not tile size {tile_size} times a power of two"
			))
			.into());
		}
		Ok((working_size / tile_size).trailing_zeros() as u8 + 1)
	}

	pub fn levels(&self) -> RangeInclusive<u8> {
		self.min_zoom..=self.max_zoom
	}

	/// Side length of the level raster in pixels.
	pub fn level_size(&self, level: u8) -> u32 {
		self.tile_size << level
	}

	pub fn tiles_per_side(&self, level: u8) -> u32 {
		TileCoord::tiles_per_side(level)
	}

	pub fn tile_count(&self, level: u8) -> u64 {
		let side = u64::from(self.tiles_per_side(level));
		side * side
	}

	/// Sum of `4^z` over all planned levels.
	pub fn total_tile_count(&self) -> u64 {
		self.levels().map(|level| self.tile_count(level)).sum()
	}

	pub fn manifest(&self) -> Manifest {
		Manifest {
			tile_size: self.tile_size,
			min_zoom: self.min_zoom,
			max_zoom: self.max_zoom,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorKind;
	use rstest::rstest;

	#[rstest]
	#[case(256, 256, 1)]
	#[case(256, 1024, 3)]
	#[case(250, 1000, 3)]
	#[case(1, 1 << 20, 21)]
	fn test_natural_levels(#[case] tile_size: u32, #[case] working_size: u32, #[case] levels: u8) {
		assert_eq!(PyramidPlan::natural_zoom_levels(tile_size, working_size).unwrap(), levels);
	}

	#[rstest]
	#[case(256, 1000)]
	#[case(256, 768)]
	#[case(0, 256)]
	fn test_natural_levels_invalid(#[case] tile_size: u32, #[case] working_size: u32) {
		let error = PyramidPlan::natural_zoom_levels(tile_size, working_size).unwrap_err();
		assert_eq!(DeepZoomError::kind_of(&error), Some(ErrorKind::InvalidParameter));
	}

	#[rstest]
	#[case(0, None, 0, 2, 21)]
	#[case(0, Some(1), 0, 1, 5)]
	#[case(0, Some(9), 0, 2, 21)]
	#[case(1, None, 1, 2, 20)]
	#[case(2, Some(2), 2, 2, 16)]
	fn test_zoom_range(
		#[case] min_zoom: u8,
		#[case] max_zoom: Option<u8>,
		#[case] expected_min: u8,
		#[case] expected_max: u8,
		#[case] total: u64,
	) {
		let plan = PyramidPlan::new(256, 1024, min_zoom, max_zoom).unwrap();
		assert_eq!((plan.min_zoom, plan.max_zoom), (expected_min, expected_max));
		assert_eq!(plan.total_tile_count(), total);
	}

	#[rstest]
	#[case(2, Some(1))]
	#[case(3, None)]
	fn test_min_above_max(#[case] min_zoom: u8, #[case] max_zoom: Option<u8>) {
		let error = PyramidPlan::new(256, 1024, min_zoom, max_zoom).unwrap_err();
		assert_eq!(DeepZoomError::kind_of(&error), Some(ErrorKind::InvalidParameter));
	}

	#[test]
	fn test_level_geometry() {
		let plan = PyramidPlan::new(256, 1024, 0, None).unwrap();
		assert_eq!(plan.level_size(0), 256);
		assert_eq!(plan.level_size(2), 1024);
		assert_eq!(plan.tiles_per_side(2), 4);
		assert_eq!(plan.tile_count(2), 16);
		assert_eq!(plan.level_size(plan.max_zoom), 1024);
	}

	#[test]
	fn test_single_level() {
		let plan = PyramidPlan::new(300, 300, 0, None).unwrap();
		assert_eq!(plan.levels().collect::<Vec<_>>(), [0]);
		assert_eq!(plan.total_tile_count(), 1);
	}
}
