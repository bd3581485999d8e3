//! Where a pyramid lives on disk.
//!
//! ```text
//! <root>/<map>/config.json
//! <root>/<map>/<z>/<x>/<y>.png
//! ```

use anyhow::{Context, Result};
use deepzoom_core::{DeepZoomError, Manifest, TileCoord};
use std::{
	fs, io,
	path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
	root: PathBuf,
	map_name: String,
}

impl OutputLayout {
	/// # Errors
	/// Returns [`DeepZoomError::InvalidParameter`] if `map_name` is empty or not a plain
	/// directory name.
	pub fn new(root: impl Into<PathBuf>, map_name: &str) -> Result<Self> {
		let valid = !map_name.is_empty()
			&& map_name != "."
			&& map_name != ".."
			&& !map_name.contains(['/', '\\']);
		if !valid {
			return Err(DeepZoomError::invalid_parameter(format!("map name '{map_name}' is not a valid directory name")).into());
		}
		Ok(Self {
			root: root.into(),
			map_name: map_name.to_string(),
		})
	}

	pub fn map_name(&self) -> &str {
		&self.map_name
	}

	pub fn map_dir(&self) -> PathBuf {
		self.root.join(&self.map_name)
	}

	pub fn manifest_path(&self) -> PathBuf {
		self.map_dir().join(Manifest::FILE_NAME)
	}

	pub fn level_dir(&self, level: u8) -> PathBuf {
		self.map_dir().join(level.to_string())
	}

	pub fn column_dir(&self, level: u8, x: u32) -> PathBuf {
		self.level_dir(level).join(x.to_string())
	}

	pub fn tile_path(&self, coord: &TileCoord) -> PathBuf {
		self.column_dir(coord.level, coord.x).join(format!("{}.png", coord.y))
	}

	/// Create `<z>/` and every `<z>/<x>/` of a level.
	pub fn create_level_dirs(&self, level: u8) -> Result<()> {
		for x in 0..TileCoord::tiles_per_side(level) {
			ensure_dir(&self.column_dir(level, x))?;
		}
		Ok(())
	}

	/// Write the manifest, creating the map directory if needed.
	pub fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
		ensure_dir(&self.map_dir())?;
		let path = self.manifest_path();
		let text = manifest
			.to_json_string()
			.context("serializing manifest")?;
		fs::write(&path, text).map_err(|e| DeepZoomError::filesystem(&path, e))?;
		log::debug!("wrote manifest {path:?}");
		Ok(())
	}
}

/// Create a directory and its parents. An existing directory is fine.
pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
	match fs::create_dir_all(path) {
		Ok(()) => Ok(()),
		Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
		Err(e) => Err(DeepZoomError::filesystem(path, e).into()),
	}
}
