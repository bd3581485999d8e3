//! Choosing a tile size and zoom depth for a source image
//!
//! Every tile size `t` of the configured range and every pow `p` spans a working size
//! `t × 2^p`. The resolver picks the pair whose working size fits the longer side of the
//! source best:
//!
//! 1. An exact fit wins immediately. Among several exact fits the largest tile size is taken.
//! 2. Otherwise the best upscaling candidate is taken when it overshoots by at most one tile.
//! 3. Otherwise the candidate with the smaller difference wins.
//!
//! Per tile size only two pows are ever worth looking at, so each candidate is computed
//! directly instead of by doubling.
//!
//! ```
//! use deepzoom_core::{TileSizeRange, TileSizeResolver};
//!
//! let resolver = TileSizeResolver::new(TileSizeRange::new(200, 300));
//! let config = resolver.resolve(1000).unwrap();
//! assert_eq!((config.tile_size, config.zoom_level_pow), (250, 2));
//! ```

use super::tile_config::choose;
use crate::{DeepZoomError, TileConfig, TileSizeRange};
use anyhow::Result;

/// The fallback tile size used when the configured range holds no candidate.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Resolves a [`TileConfig`] for a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSizeResolver {
	pub range: TileSizeRange,
	pub fallback_tile_size: u32,
	/// A raw tile size override as the user typed it. Takes precedence over the range.
	pub tile_size_override: Option<String>,
}

impl TileSizeResolver {
	pub fn new(range: TileSizeRange) -> Self {
		Self {
			range,
			fallback_tile_size: DEFAULT_TILE_SIZE,
			tile_size_override: None,
		}
	}

	pub fn with_override(mut self, tile_size: Option<String>) -> Self {
		self.tile_size_override = tile_size;
		self
	}

	pub fn with_fallback(mut self, tile_size: u32) -> Self {
		self.fallback_tile_size = tile_size;
		self
	}

	/// Resolve the configuration for a source whose longer side is `full_size` pixels.
	///
	/// # Errors
	/// Returns [`DeepZoomError::InvalidParameter`] when the override is not a positive integer.
	pub fn resolve(&self, full_size: u32) -> Result<TileConfig> {
		if let Some(tile_size) = self.parsed_override()? {
			log::debug!("tile size override {tile_size} for full size {full_size}");
			return Ok(TileConfig::best_for(tile_size, full_size));
		}

		if let Some(config) = resolve_in_range(full_size, &self.range) {
			return Ok(config);
		}

		let error = DeepZoomError::NoCandidateTileSize {
			min: self.range.min,
			max: self.range.max,
			full_size,
		};
		log::warn!("{error}, falling back to tile size {}", self.fallback_tile_size);
		Ok(TileConfig::best_for(self.fallback_tile_size.max(1), full_size))
	}

	/// The override as a tile size, if one is set.
	///
	/// # Errors
	/// Returns [`DeepZoomError::InvalidParameter`] when the override is not a positive integer.
	pub fn parsed_override(&self) -> Result<Option<u32>> {
		let Some(raw) = &self.tile_size_override else {
			return Ok(None);
		};
		match raw.trim().parse::<u32>() {
			Ok(0) | Err(_) => Err(DeepZoomError::invalid_parameter(format!(
				"tile size override '{raw}' is not a positive integer"
			))
			.into()),
			Ok(tile_size) => Ok(Some(tile_size)),
		}
	}
}

/// Resolve against a tile size range alone.
///
/// Returns `None` when the range is degenerate.
pub fn resolve_in_range(full_size: u32, range: &TileSizeRange) -> Option<TileConfig> {
	let mut best_grow: Option<TileConfig> = None;
	let mut best_shrink: Option<TileConfig> = None;

	for tile_size in range.descending() {
		let (grow, shrink) = TileConfig::grow_and_shrink(tile_size, full_size);

		if grow.difference == 0 {
			return Some(grow);
		}

		// strict comparison keeps the larger tile size on ties
		if best_grow.is_none_or(|best| grow.difference < best.difference) {
			best_grow = Some(grow);
		}
		if let Some(shrink) = shrink {
			if best_shrink.is_none_or(|best| shrink.difference < best.difference) {
				best_shrink = Some(shrink);
			}
		}
	}

	choose(best_grow, best_shrink)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorKind;
	use rstest::rstest;

	#[rstest]
	// exact fits
	#[case(200, 300, 1000, 250, 2, 0)]
	#[case(200, 300, 1200, 300, 2, 0)]
	#[case(200, 300, 300, 300, 0, 0)]
	// 1024 = 256 × 2^2 is the only exact fit
	#[case(200, 300, 1024, 256, 2, 0)]
	// single tile sizes
	#[case(256, 256, 1000, 256, 2, 24)]
	#[case(256, 256, 257, 256, 1, 255)]
	fn test_resolve(
		#[case] min: u32,
		#[case] max: u32,
		#[case] full_size: u32,
		#[case] tile_size: u32,
		#[case] pow: u32,
		#[case] difference: u64,
	) {
		let config = resolve_in_range(full_size, &TileSizeRange::new(min, max)).unwrap();
		assert_eq!(config.tile_size, tile_size);
		assert_eq!(config.zoom_level_pow, pow);
		assert_eq!(config.difference, difference);
	}

	#[test]
	fn test_exact_fit_prefers_larger_tile() {
		// 1200 = 300 × 4 = 150 × 8
		let config = resolve_in_range(1200, &TileSizeRange::new(150, 300)).unwrap();
		assert_eq!((config.tile_size, config.zoom_level_pow), (300, 2));
	}

	#[test]
	fn test_degenerate_range() {
		assert_eq!(resolve_in_range(1000, &TileSizeRange::new(300, 200)), None);
		assert_eq!(resolve_in_range(1000, &TileSizeRange::new(0, 0)), None);
	}

	/// Reference implementation that walks every tile size and pow.
	fn brute_force(full_size: u32, range: &TileSizeRange) -> TileConfig {
		let full = u64::from(full_size);
		let mut grow: Option<TileConfig> = None;
		let mut shrink: Option<TileConfig> = None;
		for tile_size in range.descending() {
			let mut pow = 0;
			loop {
				let size = u64::from(tile_size) << pow;
				let candidate = TileConfig {
					tile_size,
					zoom_level_pow: pow,
					difference: size.abs_diff(full),
				};
				if size >= full {
					if grow.is_none_or(|g| candidate.difference < g.difference) {
						grow = Some(candidate);
					}
					break;
				}
				if shrink.is_none_or(|s| candidate.difference < s.difference) {
					shrink = Some(candidate);
				}
				pow += 1;
			}
		}
		let grow = grow.unwrap();
		match shrink {
			Some(shrink) if grow.difference > u64::from(grow.tile_size) && shrink.difference < grow.difference => shrink,
			_ => grow,
		}
	}

	#[test]
	fn test_matches_brute_force() {
		let ranges = [
			TileSizeRange::new(200, 300),
			TileSizeRange::new(1, 8),
			TileSizeRange::new(250, 260),
			TileSizeRange::new(512, 512),
		];
		for range in &ranges {
			for full_size in (1..5000).step_by(37).chain([4096, 8191, 8192, 12_345]) {
				let fast = resolve_in_range(full_size, range).unwrap();
				let slow = brute_force(full_size, range);
				assert_eq!(fast.difference, slow.difference, "full size {full_size} in {range}");
				assert_eq!(
					fast.working_size() >= u64::from(full_size),
					slow.working_size() >= u64::from(full_size),
					"full size {full_size} in {range}"
				);
			}
		}
	}

	#[rstest]
	#[case(Some("512"), 512, 1)]
	#[case(Some(" 128 "), 128, 3)]
	#[case(None, 250, 2)]
	fn test_override(#[case] tile_size: Option<&str>, #[case] expected_tile: u32, #[case] expected_pow: u32) {
		let resolver = TileSizeResolver::new(TileSizeRange::default()).with_override(tile_size.map(String::from));
		let config = resolver.resolve(1000).unwrap();
		assert_eq!((config.tile_size, config.zoom_level_pow), (expected_tile, expected_pow));
	}

	#[rstest]
	#[case("abc")]
	#[case("")]
	#[case("0")]
	#[case("-5")]
	fn test_invalid_override(#[case] tile_size: &str) {
		let resolver = TileSizeResolver::new(TileSizeRange::default()).with_override(Some(tile_size.to_string()));
		let error = resolver.resolve(1000).unwrap_err();
		assert_eq!(DeepZoomError::kind_of(&error), Some(ErrorKind::InvalidParameter));
	}

	#[test]
	fn test_fallback() {
		let resolver = TileSizeResolver::new(TileSizeRange::new(300, 200));
		let config = resolver.resolve(1000).unwrap();
		assert_eq!((config.tile_size, config.zoom_level_pow), (256, 2));

		let resolver = resolver.with_fallback(500);
		let config = resolver.resolve(1000).unwrap();
		assert_eq!((config.tile_size, config.zoom_level_pow), (500, 1));
	}
}
