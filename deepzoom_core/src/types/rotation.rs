use crate::DeepZoomError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Clockwise rotation applied to the source image before anything else.
///
/// Only quarter turns are supported. Any other angle is an invalid parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
	#[default]
	Deg0,
	Deg90,
	Deg180,
	Deg270,
}

impl Rotation {
	pub fn degrees(self) -> u32 {
		match self {
			Rotation::Deg0 => 0,
			Rotation::Deg90 => 90,
			Rotation::Deg180 => 180,
			Rotation::Deg270 => 270,
		}
	}

	/// `true` for 90° and 270°, where width and height trade places.
	pub fn swaps_axes(self) -> bool {
		matches!(self, Rotation::Deg90 | Rotation::Deg270)
	}

	/// Dimensions of a `width × height` image after this rotation.
	pub fn rotated_size(self, width: u32, height: u32) -> (u32, u32) {
		if self.swaps_axes() {
			(height, width)
		} else {
			(width, height)
		}
	}
}

impl TryFrom<u32> for Rotation {
	type Error = DeepZoomError;

	fn try_from(degrees: u32) -> Result<Self, Self::Error> {
		Ok(match degrees {
			0 => Rotation::Deg0,
			90 => Rotation::Deg90,
			180 => Rotation::Deg180,
			270 => Rotation::Deg270,
			_ => {
				return Err(DeepZoomError::invalid_parameter(format!(
					"rotation must be one of 0, 90, 180, 270, got {degrees}"
				)));
			}
		})
	}
}

impl From<Rotation> for u32 {
	fn from(rotation: Rotation) -> u32 {
		rotation.degrees()
	}
}

impl FromStr for Rotation {
	type Err = DeepZoomError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let degrees: u32 = s
			.trim()
			.parse()
			.map_err(|_| DeepZoomError::invalid_parameter(format!("rotation '{s}' is not a number")))?;
		Rotation::try_from(degrees)
	}
}

impl fmt::Display for Rotation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}°", self.degrees())
	}
}
