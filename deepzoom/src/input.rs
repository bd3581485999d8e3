//! Turning command line inputs into source image paths
//!
//! An input is one of
//! - an image file,
//! - a directory, which stands for every supported image directly inside it, sorted by name,
//! - `<directory>#<n>`, the `n`-th (0-based) of those images.

use anyhow::Result;
use deepzoom_core::DeepZoomError;
use std::{
	fs,
	path::{Path, PathBuf},
};

/// File extensions the image engine can decode, lower case.
pub const SUPPORTED_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "webp", "tif", "tiff", "bmp", "gif"];

pub fn is_supported_image(path: &Path) -> bool {
	path.extension()
		.and_then(|extension| extension.to_str())
		.is_some_and(|extension| SUPPORTED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()))
}

/// Resolve one input into the image files it stands for.
///
/// # Errors
/// Returns [`DeepZoomError::InvalidParameter`] if the path does not exist, a directory holds no
/// supported images, or a selection index is out of range.
pub fn resolve_input(input: &str) -> Result<Vec<PathBuf>> {
	let path = Path::new(input);
	if path.is_file() {
		return Ok(vec![path.to_path_buf()]);
	}
	if path.is_dir() {
		return list_images(path);
	}

	if let Some((dir, index)) = input.rsplit_once('#') {
		let dir = Path::new(dir);
		if let Ok(index) = index.parse::<usize>()
			&& dir.is_dir()
		{
			return select_image(dir, index).map(|image| vec![image]);
		}
	}

	Err(DeepZoomError::invalid_parameter(format!("input '{input}' does not exist")).into())
}

/// Every supported image directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
	let entries = fs::read_dir(dir).map_err(|e| DeepZoomError::filesystem(dir, e))?;
	let mut images = Vec::new();
	for entry in entries {
		let path = entry.map_err(|e| DeepZoomError::filesystem(dir, e))?.path();
		if path.is_file() && is_supported_image(&path) {
			images.push(path);
		}
	}
	images.sort();

	if images.is_empty() {
		return Err(DeepZoomError::invalid_parameter(format!(
			"directory {dir:?} contains no images ({})",
			SUPPORTED_EXTENSIONS.join(", ")
		))
		.into());
	}
	log::debug!("found {} images in {dir:?}", images.len());
	Ok(images)
}

fn select_image(dir: &Path, index: usize) -> Result<PathBuf> {
	let mut images = list_images(dir)?;
	let count = images.len();
	if index >= count {
		return Err(DeepZoomError::invalid_parameter(format!(
			"selection {index} is out of range, {dir:?} contains {count} images"
		))
		.into());
	}
	Ok(images.swap_remove(index))
}

/// The default map name of a source image: its file stem.
pub fn map_name_for(path: &Path) -> Result<String> {
	path.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.filter(|stem| !stem.is_empty())
		.ok_or_else(|| DeepZoomError::invalid_parameter(format!("cannot derive a map name from {path:?}")).into())
}
