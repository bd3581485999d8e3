use crate::{Anchor, FillColor, Raster};
use anyhow::Result;
use deepzoom_core::{DeepZoomError, Padding, Rotation};
use std::path::Path;

/// The operations a pyramid job needs from an image library.
///
/// Every operation returns a new [`Raster`] and leaves its input untouched, so rasters can be
/// shared between worker threads. Failures are [`DeepZoomError::Codec`] unless stated otherwise.
///
/// Implementations are called from blocking worker threads and must be `Send + Sync`.
pub trait ImageEngine: Send + Sync {
	/// Decode an encoded image (PNG, JPEG, WebP, TIFF, …).
	fn decode(&self, bytes: &[u8]) -> Result<Raster>;

	/// Rotate clockwise by a quarter turn multiple.
	fn rotate(&self, raster: &Raster, rotation: Rotation) -> Result<Raster>;

	/// Scale without distortion so the image fits into `width × height`, then place it on a
	/// canvas of exactly that size at `anchor`, filling the rest with `fill`.
	fn resize_contain(&self, raster: &Raster, width: u32, height: u32, anchor: Anchor, fill: FillColor)
	-> Result<Raster>;

	/// Add margins filled with `fill`.
	fn extend_pad(&self, raster: &Raster, padding: &Padding, fill: FillColor) -> Result<Raster>;

	/// Copy the `width × height` region at `(left, top)`. The region must lie inside the raster.
	fn extract(&self, raster: &Raster, left: u32, top: u32, width: u32, height: u32) -> Result<Raster>;

	/// Encode as PNG.
	fn to_buffer(&self, raster: &Raster) -> Result<Vec<u8>>;

	/// Encode as PNG and write to `path`. Write failures are [`DeepZoomError::Filesystem`].
	fn encode_to_file(&self, raster: &Raster, path: &Path) -> Result<()> {
		let buffer = self.to_buffer(raster)?;
		std::fs::write(path, buffer).map_err(|e| DeepZoomError::filesystem(path, e))?;
		Ok(())
	}

	/// Read and decode an image file.
	fn open(&self, path: &Path) -> Result<Raster> {
		let bytes = std::fs::read(path).map_err(|e| DeepZoomError::filesystem(path, e))?;
		self.decode(&bytes)
	}

	/// Width and height of an image file, read from its header where possible.
	fn probe(&self, path: &Path) -> Result<(u32, u32)> {
		Ok(self.open(path)?.dimensions())
	}
}
