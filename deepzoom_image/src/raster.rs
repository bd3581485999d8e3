use image::{DynamicImage, GenericImageView, Rgba};
use std::{fmt, sync::Arc};

/// An immutable, reference-counted image.
///
/// Cloning a `Raster` is cheap and never copies pixels, so one level raster can be handed to
/// every tile job of its level. The pixels are freed when the last clone is dropped.
#[derive(Clone)]
pub struct Raster {
	image: Arc<DynamicImage>,
}

impl Raster {
	pub fn new(image: DynamicImage) -> Self {
		Self { image: Arc::new(image) }
	}

	pub fn image(&self) -> &DynamicImage {
		&self.image
	}

	pub fn width(&self) -> u32 {
		self.image.width()
	}

	pub fn height(&self) -> u32 {
		self.image.height()
	}

	pub fn dimensions(&self) -> (u32, u32) {
		self.image.dimensions()
	}

	/// `true` if both handles point to the same pixels.
	pub fn ptr_eq(&self, other: &Raster) -> bool {
		Arc::ptr_eq(&self.image, &other.image)
	}
}

impl From<DynamicImage> for Raster {
	fn from(image: DynamicImage) -> Self {
		Raster::new(image)
	}
}

impl fmt::Debug for Raster {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Raster({}x{}, {:?})", self.width(), self.height(), self.image.color())
	}
}

/// Where a smaller image is placed inside a larger canvas. Level rasters and shrunk sources
/// always grow to the right and to the bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
	#[default]
	TopLeft,
}

impl Anchor {
	/// Offset `(left, top)` of the smaller image on the canvas.
	pub fn offset(self) -> (u32, u32) {
		match self {
			Anchor::TopLeft => (0, 0),
		}
	}
}

/// RGBA fill color for padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillColor(pub [u8; 4]);

impl FillColor {
	pub const TRANSPARENT: FillColor = FillColor([0, 0, 0, 0]);
}

impl Default for FillColor {
	fn default() -> Self {
		FillColor::TRANSPARENT
	}
}

impl From<FillColor> for Rgba<u8> {
	fn from(color: FillColor) -> Self {
		Rgba(color.0)
	}
}
