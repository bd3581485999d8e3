#![allow(dead_code)]

use anyhow::{Result, bail};
use deepzoom_core::{DeepZoomError, Padding, Rotation};
use deepzoom_image::{Anchor, DynamicImageEngine, FillColor, ImageEngine, Raster, test_images};
use deepzoom_pipeline::JobParameters;
use std::{
	collections::BTreeSet,
	fs,
	path::{Path, PathBuf},
	sync::atomic::{AtomicUsize, Ordering},
};

/// Delegates to [`DynamicImageEngine`] and fails where told to.
#[derive(Default)]
pub struct FaultInjectingEngine {
	inner: DynamicImageEngine,
	/// Fail every `resize_contain` to this square size.
	fail_resize_to: Option<u32>,
	/// Fail `extract` at `(left, top)` from a raster of this width: `(width, left, top)`.
	fail_extract_at: Option<(u32, u32, u32)>,
	running: AtomicUsize,
	pub max_running: AtomicUsize,
}

impl FaultInjectingEngine {
	/// Fails with a codec error when resizing to a `size × size` square.
	pub fn failing_resize(size: u32) -> Self {
		Self {
			fail_resize_to: Some(size),
			..Default::default()
		}
	}

	/// Fails when cutting at `(left, top)` out of a raster `raster_width` pixels wide.
	pub fn failing_extract(raster_width: u32, left: u32, top: u32) -> Self {
		Self {
			fail_extract_at: Some((raster_width, left, top)),
			..Default::default()
		}
	}

	fn enter(&self) -> Running<'_> {
		let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_running.fetch_max(running, Ordering::SeqCst);
		Running(&self.running)
	}
}

struct Running<'a>(&'a AtomicUsize);

impl Drop for Running<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

impl ImageEngine for FaultInjectingEngine {
	fn decode(&self, bytes: &[u8]) -> Result<Raster> {
		self.inner.decode(bytes)
	}

	fn rotate(&self, raster: &Raster, rotation: Rotation) -> Result<Raster> {
		self.inner.rotate(raster, rotation)
	}

	fn resize_contain(&self, raster: &Raster, width: u32, height: u32, anchor: Anchor, fill: FillColor) -> Result<Raster> {
		let _running = self.enter();
		if self.fail_resize_to == Some(width) && width == height {
			return Err(DeepZoomError::codec(
				format!("resizing to {width}x{height}"),
				"injected resize failure",
			)
			.into());
		}
		self.inner.resize_contain(raster, width, height, anchor, fill)
	}

	fn extend_pad(&self, raster: &Raster, padding: &Padding, fill: FillColor) -> Result<Raster> {
		self.inner.extend_pad(raster, padding, fill)
	}

	fn extract(&self, raster: &Raster, left: u32, top: u32, width: u32, height: u32) -> Result<Raster> {
		let _running = self.enter();
		if self.fail_extract_at == Some((raster.width(), left, top)) {
			bail!("injected extract failure at {left},{top}");
		}
		self.inner.extract(raster, left, top, width, height)
	}

	fn to_buffer(&self, raster: &Raster) -> Result<Vec<u8>> {
		self.inner.to_buffer(raster)
	}
}

/// Write a gradient source image and return job parameters that put the pyramid into
/// `<dir>/output/<map_name>`.
pub fn source_job(dir: &Path, map_name: &str, width: u32, height: u32) -> JobParameters {
	let image_path = dir.join(format!("{map_name}.png"));
	test_images::save(&test_images::gradient_rgba(width, height), &image_path);
	let mut parameters = JobParameters::new(image_path, map_name);
	parameters.output_root = dir.join("output");
	parameters
}

/// Every file below `root`, relative to it, with `/` separators.
pub fn list_files(root: &Path) -> BTreeSet<String> {
	fn walk(root: &Path, dir: &Path, files: &mut BTreeSet<String>) {
		for entry in fs::read_dir(dir).unwrap() {
			let path: PathBuf = entry.unwrap().path();
			if path.is_dir() {
				walk(root, &path, files);
			} else {
				let relative = path.strip_prefix(root).unwrap();
				let parts: Vec<String> = relative
					.components()
					.map(|c| c.as_os_str().to_string_lossy().into_owned())
					.collect();
				files.insert(parts.join("/"));
			}
		}
	}

	let mut files = BTreeSet::new();
	if root.exists() {
		walk(root, root, &mut files);
	}
	files
}
