//! PNG encoding of tiles.
//!
//! Tiles are written once and served many times, so the default favours size over speed.

use anyhow::{Result, bail};
use deepzoom_core::DeepZoomError;
use image::{DynamicImage, ImageEncoder, ImageFormat, codecs::png, load_from_memory_with_format};

/// Encode with a `speed` between 0 (smallest file) and 100 (fastest).
pub fn compress(image: &DynamicImage, speed: u8) -> Result<Vec<u8>> {
	if image.color().bytes_per_pixel() / image.color().channel_count() != 1 {
		bail!(DeepZoomError::codec("encoding PNG", "only 8-bit images are supported"));
	}

	use png::{CompressionType, FilterType};
	let (compression_type, filter_type) = match speed.min(100) {
		0..20 => (CompressionType::Best, FilterType::Adaptive),
		20..60 => (CompressionType::Default, FilterType::Adaptive),
		60..90 => (CompressionType::Fast, FilterType::Sub),
		_ => (CompressionType::Fast, FilterType::NoFilter),
	};

	let mut buffer: Vec<u8> = Vec::new();
	png::PngEncoder::new_with_quality(&mut buffer, compression_type, filter_type)
		.write_image(
			image.as_bytes(),
			image.width(),
			image.height(),
			image.color().into(),
		)
		.map_err(|e| DeepZoomError::codec("encoding PNG", e))?;

	Ok(buffer)
}

/// Encode with the default tile settings.
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>> {
	compress(image, 30)
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
	Ok(load_from_memory_with_format(bytes, ImageFormat::Png).map_err(|e| DeepZoomError::codec("decoding PNG", e))?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_images;
	use rstest::rstest;

	#[rstest]
	#[case(0)]
	#[case(30)]
	#[case(75)]
	#[case(100)]
	fn test_lossless(#[case] speed: u8) {
		let image = test_images::gradient_rgba(64, 48);
		let buffer = compress(&image, speed).unwrap();
		assert!(buffer.starts_with(b"\x89PNG"));
		assert_eq!(decode(&buffer).unwrap(), image);
	}

	#[test]
	fn test_rejects_16_bit() {
		let image = DynamicImage::new_rgba16(2, 2);
		assert!(encode(&image).is_err());
	}

	#[test]
	fn test_decode_garbage() {
		let error = decode(b"not a png").unwrap_err();
		assert_eq!(
			DeepZoomError::kind_of(&error),
			Some(deepzoom_core::ErrorKind::Codec)
		);
	}
}
