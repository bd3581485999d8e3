//! Synthetic images for tests.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::{io::Cursor, path::Path};

/// RGBA gradient: red grows to the right, green to the bottom, fully opaque.
pub fn gradient_rgba(width: u32, height: u32) -> DynamicImage {
	DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
		Rgba([
			(x * 255 / width.max(2).saturating_sub(1)).min(255) as u8,
			(y * 255 / height.max(2).saturating_sub(1)).min(255) as u8,
			128,
			255,
		])
	}))
}

/// RGB gradient without alpha channel, as most photographs are.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
	DynamicImage::ImageRgb8(gradient_rgba(width, height).to_rgb8())
}

/// Encode `image` as PNG bytes.
pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
	let mut buffer = Cursor::new(Vec::new());
	image.write_to(&mut buffer, ImageFormat::Png).unwrap();
	buffer.into_inner()
}

/// Write `image` to `path`, format chosen by extension.
pub fn save(image: &DynamicImage, path: &Path) {
	image.save(path).unwrap();
}

#[cfg(test)]
mod tests {
	use super::*;
	use image::GenericImageView;

	#[test]
	fn test_gradient_corners() {
		let image = gradient_rgba(10, 5);
		assert_eq!(image.get_pixel(0, 0).0, [0, 0, 128, 255]);
		assert_eq!(image.get_pixel(9, 4).0, [255, 255, 128, 255]);
		assert!(!gradient_rgb(3, 3).color().has_alpha());
	}

	#[test]
	fn test_single_pixel() {
		assert_eq!(gradient_rgba(1, 1).get_pixel(0, 0).0, [0, 0, 128, 255]);
	}
}
