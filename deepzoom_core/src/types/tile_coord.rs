//! Tile coordinates inside a deep zoom pyramid
//!
//! Level 0 holds a single tile. Every further level doubles the number of tiles per side, so
//! level `z` is a `2^z × 2^z` grid with `x` counting columns from the left and `y` counting rows
//! from the top.
//!
//! # Examples
//!
//! ```
//! use deepzoom_core::TileCoord;
//!
//! let coord = TileCoord::new(2, 3, 1).unwrap();
//! assert_eq!(coord.to_string(), "2/3/1");
//!
//! let all: Vec<TileCoord> = TileCoord::iter_level(1).collect();
//! assert_eq!(all.len(), 4);
//! ```

use anyhow::{Result, ensure};
use std::fmt::{self, Debug, Display};

/// A tile coordinate with zoom level, column `x` and row `y`.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The zoom level of the tile.
	pub level: u8,
	/// The column of the tile.
	pub x: u32,
	/// The row of the tile.
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given zoom `level` and tile indices `x`, `y`.
	///
	/// # Errors
	/// Returns an error if `level` > 31 or an index lies outside the level's grid.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= 31, "level ({level}) must be <= 31");
		let max = TileCoord::tiles_per_side(level);
		ensure!(x < max, "x ({x}) out of bounds for level {level}");
		ensure!(y < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Number of tiles along one side of `level`.
	pub fn tiles_per_side(level: u8) -> u32 {
		1u32 << level
	}

	/// Iterate over all coordinates of `level`, column by column.
	///
	/// The order matches the layout on disk: every tile of column `x` is visited before
	/// the first tile of column `x + 1`.
	pub fn iter_level(level: u8) -> impl Iterator<Item = TileCoord> {
		let side = TileCoord::tiles_per_side(level);
		(0..side).flat_map(move |x| (0..side).map(move |y| TileCoord { level, x, y }))
	}

	/// Pixel offset `(left, top)` of this tile in a level raster made of `tile_size` tiles.
	pub fn pixel_offset(&self, tile_size: u32) -> (u32, u32) {
		(self.x * tile_size, self.y * tile_size)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashSet;

	#[test]
	fn test_new_bounds() {
		assert!(TileCoord::new(0, 0, 0).is_ok());
		assert!(TileCoord::new(0, 1, 0).is_err());
		assert!(TileCoord::new(2, 3, 3).is_ok());
		assert!(TileCoord::new(2, 4, 0).is_err());
		assert!(TileCoord::new(32, 0, 0).is_err());
	}

	#[rstest]
	#[case(0, 1)]
	#[case(1, 4)]
	#[case(2, 16)]
	#[case(5, 1024)]
	fn test_iter_level_is_complete(#[case] level: u8, #[case] count: usize) {
		let coords: Vec<TileCoord> = TileCoord::iter_level(level).collect();
		assert_eq!(coords.len(), count);
		let unique: HashSet<TileCoord> = coords.iter().copied().collect();
		assert_eq!(unique.len(), count);
		assert!(coords.iter().all(|c| TileCoord::new(c.level, c.x, c.y).is_ok()));
	}

	#[test]
	fn test_iter_level_order() {
		let coords: Vec<String> = TileCoord::iter_level(1).map(|c| c.to_string()).collect();
		assert_eq!(coords, ["1/0/0", "1/0/1", "1/1/0", "1/1/1"]);
	}

	#[test]
	fn test_pixel_offset() {
		let coord = TileCoord::new(3, 2, 5).unwrap();
		assert_eq!(coord.pixel_offset(256), (512, 1280));
	}

	#[test]
	fn test_debug() {
		assert_eq!(format!("{:?}", TileCoord::new(4, 2, 3).unwrap()), "TileCoord(4, [2, 3])");
	}
}
