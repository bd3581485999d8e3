//! How a rotated source image becomes the square working image
//!
//! After tile size resolution the source has to match the working size `tile × 2^pow`. A source
//! larger than that is shrunk to fit, a smaller one is padded with transparent pixels and centred.
//! A source that already matches is used as is.

use crate::{DeepZoomError, TileConfig};
use anyhow::Result;

/// Transparent margins added around an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
	pub top: u32,
	pub bottom: u32,
	pub left: u32,
	pub right: u32,
}

impl Padding {
	/// Margins that centre a `width × height` image on a `size × size` canvas.
	///
	/// An odd remainder puts the extra pixel on the top and left side.
	pub fn centered(width: u32, height: u32, size: u32) -> Padding {
		let horizontal = size.saturating_sub(width);
		let vertical = size.saturating_sub(height);
		Padding {
			top: vertical.div_ceil(2),
			bottom: vertical / 2,
			left: horizontal.div_ceil(2),
			right: horizontal / 2,
		}
	}

	/// Size of a `width × height` image after padding.
	pub fn apply_to(&self, width: u32, height: u32) -> (u32, u32) {
		(width + self.left + self.right, height + self.top + self.bottom)
	}

	pub fn is_empty(&self) -> bool {
		*self == Padding::default()
	}
}

/// The operation that turns the rotated source into the working image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizePlan {
	/// The longer side already equals the working size.
	Keep,
	/// Shrink to fit into a `size × size` square, anchored top-left, remainder transparent.
	Shrink { size: u32 },
	/// Pad with transparent margins to a square of the working size.
	Pad(Padding),
}

impl NormalizePlan {
	/// Plan the normalization of a rotated `width × height` source.
	///
	/// # Errors
	/// Returns [`DeepZoomError::InvalidParameter`] if the working size does not fit into `u32`.
	pub fn new(width: u32, height: u32, config: &TileConfig) -> Result<NormalizePlan> {
		let full_size = width.max(height);
		let working_size = u32::try_from(config.working_size()).map_err(|_| {
			DeepZoomError::invalid_parameter(format!("working size {} is too large", config.working_size()))
		})?;

		Ok(if working_size == full_size {
			NormalizePlan::Keep
		} else if working_size < full_size {
			NormalizePlan::Shrink { size: working_size }
		} else {
			NormalizePlan::Pad(Padding::centered(width, height, working_size))
		})
	}

	/// Dimensions of the image after the plan has been applied.
	///
	/// A kept source is not squared yet; that happens when level 0 is rendered.
	pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
		match self {
			NormalizePlan::Keep => (width, height),
			NormalizePlan::Shrink { size } => (*size, *size),
			NormalizePlan::Pad(padding) => padding.apply_to(width, height),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn config(tile_size: u32, zoom_level_pow: u32, full_size: u32) -> TileConfig {
		TileConfig {
			tile_size,
			zoom_level_pow,
			difference: (u64::from(tile_size) << zoom_level_pow).abs_diff(u64::from(full_size)),
		}
	}

	#[rstest]
	#[case(1000, 600)]
	#[case(1000, 601)]
	#[case(999, 1000)]
	#[case(1024, 1024)]
	#[case(1, 1)]
	fn test_centered(#[case] width: u32, #[case] height: u32) {
		let padding = Padding::centered(width, height, 1024);
		assert_eq!(padding.left + padding.right, 1024 - width);
		assert_eq!(padding.top + padding.bottom, 1024 - height);
		assert!(padding.left - padding.right <= 1);
		assert!(padding.top - padding.bottom <= 1);
		assert_eq!(padding.apply_to(width, height), (1024, 1024));
	}

	#[test]
	fn test_centered_odd() {
		let padding = Padding::centered(999, 1000, 1024);
		assert_eq!(
			padding,
			Padding {
				top: 12,
				bottom: 12,
				left: 13,
				right: 12
			}
		);
	}

	#[test]
	fn test_plan_keep() {
		let plan = NormalizePlan::new(1000, 600, &config(250, 2, 1000)).unwrap();
		assert_eq!(plan, NormalizePlan::Keep);
		assert_eq!(plan.output_size(1000, 600), (1000, 600));
	}

	#[test]
	fn test_plan_shrink() {
		let plan = NormalizePlan::new(1200, 900, &config(256, 2, 1200)).unwrap();
		assert_eq!(plan, NormalizePlan::Shrink { size: 1024 });
		assert_eq!(plan.output_size(1200, 900), (1024, 1024));
	}

	#[test]
	fn test_plan_pad() {
		let plan = NormalizePlan::new(1000, 600, &config(256, 2, 1000)).unwrap();
		assert_eq!(
			plan,
			NormalizePlan::Pad(Padding {
				top: 212,
				bottom: 212,
				left: 12,
				right: 12
			})
		);
		assert_eq!(plan.output_size(1000, 600), (1024, 1024));
	}

	#[test]
	fn test_plan_too_large() {
		assert!(NormalizePlan::new(10, 10, &config(u32::MAX, 1, 10)).is_err());
	}
}
