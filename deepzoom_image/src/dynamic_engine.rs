//! [`ImageEngine`] on top of the `image` crate, with `fast_image_resize` doing the resampling.

use crate::{Anchor, FillColor, ImageEngine, Raster, png};
use anyhow::{Context, Result, ensure};
use deepzoom_core::{DeepZoomError, Padding, Rotation};
use fast_image_resize::{ResizeOptions, Resizer};
use image::{DynamicImage, RgbaImage, imageops};
use std::{borrow::Cow, path::Path};

#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicImageEngine;

impl DynamicImageEngine {
	pub fn new() -> Self {
		DynamicImageEngine
	}
}

/// Largest `(width, height)` with the aspect ratio of `source` that fits into `target`.
fn contain_size(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
	let (sw, sh) = (u64::from(source.0.max(1)), u64::from(source.1.max(1)));
	let (tw, th) = (u64::from(target.0), u64::from(target.1));
	if sw * th >= sh * tw {
		// limited by width
		let height = (sh * tw + sw / 2) / sw;
		(target.0, height.clamp(1, th) as u32)
	} else {
		let width = (sw * th + sh / 2) / sh;
		(width.clamp(1, tw) as u32, target.1)
	}
}

fn as_rgba8(image: &DynamicImage) -> Cow<'_, RgbaImage> {
	match image.as_rgba8() {
		Some(rgba) => Cow::Borrowed(rgba),
		None => Cow::Owned(image.to_rgba8()),
	}
}

fn resample(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
	let mut dst_image = DynamicImage::new(width, height, image.color());
	Resizer::new()
		.resize(image, &mut dst_image, &ResizeOptions::default())
		.map_err(|e| DeepZoomError::codec("resampling", e))?;
	Ok(dst_image)
}

/// Paste `image` onto a `width × height` canvas of `fill` at `(left, top)`.
fn place_on_canvas(image: &DynamicImage, width: u32, height: u32, left: u32, top: u32, fill: FillColor) -> DynamicImage {
	let mut canvas = RgbaImage::from_pixel(width, height, fill.into());
	imageops::replace(&mut canvas, as_rgba8(image).as_ref(), i64::from(left), i64::from(top));
	DynamicImage::ImageRgba8(canvas)
}

impl ImageEngine for DynamicImageEngine {
	fn decode(&self, bytes: &[u8]) -> Result<Raster> {
		let image = image::load_from_memory(bytes).map_err(|e| DeepZoomError::codec("decoding image", e))?;
		log::trace!("decoded {}x{} {:?} image", image.width(), image.height(), image.color());
		let image = match image {
			DynamicImage::ImageRgba8(_) => image,
			other => DynamicImage::ImageRgba8(other.into_rgba8()),
		};
		Ok(Raster::new(image))
	}

	fn rotate(&self, raster: &Raster, rotation: Rotation) -> Result<Raster> {
		let image = raster.image();
		Ok(match rotation {
			Rotation::Deg0 => raster.clone(),
			Rotation::Deg90 => Raster::new(image.rotate90()),
			Rotation::Deg180 => Raster::new(image.rotate180()),
			Rotation::Deg270 => Raster::new(image.rotate270()),
		})
	}

	fn resize_contain(
		&self,
		raster: &Raster,
		width: u32,
		height: u32,
		anchor: Anchor,
		fill: FillColor,
	) -> Result<Raster> {
		ensure!(
			width > 0 && height > 0,
			DeepZoomError::codec("resizing", format!("target size {width}x{height} is empty"))
		);
		if raster.dimensions() == (width, height) {
			return Ok(raster.clone());
		}

		let (fit_width, fit_height) = contain_size(raster.dimensions(), (width, height));
		let scaled = if (fit_width, fit_height) == raster.dimensions() {
			Cow::Borrowed(raster.image())
		} else {
			Cow::Owned(
				resample(raster.image(), fit_width, fit_height)
					.with_context(|| format!("resizing {:?} to fit {width}x{height}", raster))?,
			)
		};

		if (fit_width, fit_height) == (width, height) {
			return Ok(Raster::new(scaled.into_owned()));
		}

		let (left, top) = anchor.offset();
		Ok(Raster::new(place_on_canvas(&scaled, width, height, left, top, fill)))
	}

	fn extend_pad(&self, raster: &Raster, padding: &Padding, fill: FillColor) -> Result<Raster> {
		if padding.is_empty() {
			return Ok(raster.clone());
		}
		let (width, height) = padding.apply_to(raster.width(), raster.height());
		Ok(Raster::new(place_on_canvas(
			raster.image(),
			width,
			height,
			padding.left,
			padding.top,
			fill,
		)))
	}

	fn extract(&self, raster: &Raster, left: u32, top: u32, width: u32, height: u32) -> Result<Raster> {
		let (raster_width, raster_height) = raster.dimensions();
		let inside = u64::from(left) + u64::from(width) <= u64::from(raster_width)
			&& u64::from(top) + u64::from(height) <= u64::from(raster_height);
		ensure!(
			inside && width > 0 && height > 0,
			DeepZoomError::codec(
				"extracting",
				format!("region {width}x{height} at ({left}, {top}) is outside of {raster_width}x{raster_height}")
			)
		);
		Ok(Raster::new(raster.image().crop_imm(left, top, width, height)))
	}

	fn to_buffer(&self, raster: &Raster) -> Result<Vec<u8>> {
		png::encode(raster.image())
	}

	fn probe(&self, path: &Path) -> Result<(u32, u32)> {
		image::image_dimensions(path).map_err(|e| match e {
			image::ImageError::IoError(io) => DeepZoomError::filesystem(path, io).into(),
			other => DeepZoomError::codec("reading image header", other).into(),
		})
	}
}
