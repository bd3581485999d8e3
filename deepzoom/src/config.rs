//! YAML job files
//!
//! ```yaml
//! defaults:
//!   output: tiles
//!   min_tile_size: 240
//!   max_tile_size: 260
//! jobs:
//!   - image: scans/berlin.tif
//!     rotation: 90
//!   - image: scans/potsdam.png
//!     name: potsdam-1900
//!     max_zoom: 4
//! ```
//!
//! Every job inherits the `defaults` field by field. A relative `image` is resolved against the
//! directory of the job file.

use crate::input::map_name_for;
use anyhow::{Context, Result, ensure};
use deepzoom_core::DeepZoomError;
use deepzoom_pipeline::JobParameters;
use serde::Deserialize;
use std::{
	fmt,
	fs::File,
	io::{BufReader, Read},
	path::{Path, PathBuf},
};

/// A tile size override as written in YAML: a number or any string.
///
/// Kept raw so that an invalid value fails the job that uses it, not the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTileSize {
	Number(i64),
	Text(String),
}

impl fmt::Display for RawTileSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RawTileSize::Number(n) => write!(f, "{n}"),
			RawTileSize::Text(text) => f.write_str(text),
		}
	}
}

/// Settings of one job. Every field is optional, unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSettings {
	/// Source image. Required for jobs, not allowed in `defaults`.
	pub image: Option<PathBuf>,
	/// Map name, the image file stem when unset. Not allowed in `defaults`.
	pub name: Option<String>,
	pub output: Option<PathBuf>,
	pub rotation: Option<u32>,
	pub min_tile_size: Option<u32>,
	pub max_tile_size: Option<u32>,
	pub tile_size: Option<RawTileSize>,
	pub fallback_tile_size: Option<u32>,
	pub min_zoom: Option<u8>,
	pub max_zoom: Option<u8>,
	pub threads: Option<usize>,
}

impl JobSettings {
	/// Fill every unset field from `defaults`.
	#[must_use]
	pub fn or(self, defaults: &JobSettings) -> JobSettings {
		JobSettings {
			image: self.image.or_else(|| defaults.image.clone()),
			name: self.name.or_else(|| defaults.name.clone()),
			output: self.output.or_else(|| defaults.output.clone()),
			rotation: self.rotation.or(defaults.rotation),
			min_tile_size: self.min_tile_size.or(defaults.min_tile_size),
			max_tile_size: self.max_tile_size.or(defaults.max_tile_size),
			tile_size: self.tile_size.or_else(|| defaults.tile_size.clone()),
			fallback_tile_size: self.fallback_tile_size.or(defaults.fallback_tile_size),
			min_zoom: self.min_zoom.or(defaults.min_zoom),
			max_zoom: self.max_zoom.or(defaults.max_zoom),
			threads: self.threads.or(defaults.threads),
		}
	}

	/// Overwrite the parameters with every field that is set.
	pub fn apply_to(&self, parameters: &mut JobParameters) {
		if let Some(output) = &self.output {
			parameters.output_root = output.clone();
		}
		if let Some(rotation) = self.rotation {
			parameters.rotation = rotation;
		}
		if let Some(min) = self.min_tile_size {
			parameters.tile_size_range.min = min;
		}
		if let Some(max) = self.max_tile_size {
			parameters.tile_size_range.max = max;
		}
		if let Some(tile_size) = &self.tile_size {
			parameters.tile_size_override = Some(tile_size.to_string());
		}
		if let Some(fallback) = self.fallback_tile_size {
			parameters.fallback_tile_size = fallback;
		}
		if let Some(min_zoom) = self.min_zoom {
			parameters.min_zoom = min_zoom;
		}
		if self.max_zoom.is_some() {
			parameters.max_zoom = self.max_zoom;
		}
		if self.threads.is_some() {
			parameters.thread_limit = self.threads;
		}
	}

	/// Build the parameters of a job for `image`.
	///
	/// # Errors
	/// Returns [`DeepZoomError::InvalidParameter`] if no map name is set and none can be derived
	/// from the image path.
	pub fn to_parameters(&self, image: &Path) -> Result<JobParameters> {
		let map_name = match &self.name {
			Some(name) => name.clone(),
			None => map_name_for(image)?,
		};
		let mut parameters = JobParameters::new(image, map_name);
		self.apply_to(&mut parameters);
		Ok(parameters)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobFile {
	#[serde(default)]
	pub defaults: JobSettings,
	#[serde(default)]
	pub jobs: Vec<JobSettings>,
}

impl JobFile {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		let file: JobFile = serde_yaml_ng::from_reader(reader)?;
		file.validate()?;
		Ok(file)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		let file: JobFile = serde_yaml_ng::from_str(text)?;
		file.validate()?;
		Ok(file)
	}

	/// Parse a job file and resolve relative image paths against its directory.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).map_err(|e| DeepZoomError::filesystem(path, e))?;
		let mut job_file =
			JobFile::from_reader(BufReader::new(file)).with_context(|| format!("parsing job file {path:?}"))?;
		if let Some(base) = path.parent() {
			job_file.resolve_paths(base);
		}
		Ok(job_file)
	}

	pub fn resolve_paths(&mut self, base: &Path) {
		for job in &mut self.jobs {
			if let Some(image) = &job.image
				&& image.is_relative()
			{
				job.image = Some(base.join(image));
			}
		}
	}

	fn validate(&self) -> Result<()> {
		ensure!(
			self.defaults.image.is_none() && self.defaults.name.is_none(),
			DeepZoomError::invalid_parameter("'image' and 'name' cannot be set in defaults")
		);
		for (index, job) in self.jobs.iter().enumerate() {
			ensure!(
				job.image.is_some(),
				DeepZoomError::invalid_parameter(format!("job {index} has no image"))
			);
		}
		Ok(())
	}

	/// Merged settings of every job, `fallback` filling what neither the job nor the file's
	/// defaults set.
	pub fn merged_jobs(&self, fallback: &JobSettings) -> Vec<JobSettings> {
		let defaults = self.defaults.clone().or(fallback);
		self.jobs.iter().map(|job| job.clone().or(&defaults)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use deepzoom_core::{ErrorKind, TileSizeRange};
	use pretty_assertions::assert_eq;

	const EXAMPLE: &str = "
defaults:
  output: tiles
  min_tile_size: 240
  max_tile_size: 260
  threads: 2
jobs:
  - image: scans/berlin.tif
    rotation: 90
  - image: /data/potsdam.png
    name: potsdam-1900
    tile_size: 250
    max_zoom: 4
    threads: 8
";

	#[test]
	fn test_parse_and_merge() {
		let mut file = JobFile::from_string(EXAMPLE).unwrap();
		file.resolve_paths(Path::new("/work"));
		let jobs = file.merged_jobs(&JobSettings::default());
		assert_eq!(jobs.len(), 2);

		let berlin = jobs[0].to_parameters(jobs[0].image.as_deref().unwrap()).unwrap();
		assert_eq!(berlin.image_path, PathBuf::from("/work/scans/berlin.tif"));
		assert_eq!(berlin.map_name, "berlin");
		assert_eq!(berlin.output_root, PathBuf::from("tiles"));
		assert_eq!(berlin.rotation, 90);
		assert_eq!(berlin.tile_size_range, TileSizeRange::new(240, 260));
		assert_eq!(berlin.thread_limit, Some(2));
		assert_eq!(berlin.tile_size_override, None);

		let potsdam = jobs[1].to_parameters(jobs[1].image.as_deref().unwrap()).unwrap();
		assert_eq!(potsdam.image_path, PathBuf::from("/data/potsdam.png"));
		assert_eq!(potsdam.map_name, "potsdam-1900");
		assert_eq!(potsdam.tile_size_override.as_deref(), Some("250"));
		assert_eq!(potsdam.max_zoom, Some(4));
		assert_eq!(potsdam.thread_limit, Some(8));
	}

	#[test]
	fn test_fallback_below_file_defaults() {
		let file = JobFile::from_string("defaults:\n  min_zoom: 1\njobs:\n  - image: a.png\n").unwrap();
		let fallback = JobSettings {
			min_zoom: Some(3),
			max_zoom: Some(5),
			..Default::default()
		};
		let jobs = file.merged_jobs(&fallback);
		assert_eq!((jobs[0].min_zoom, jobs[0].max_zoom), (Some(1), Some(5)));
	}

	#[test]
	fn test_text_tile_size_is_kept() {
		let file = JobFile::from_string("jobs:\n  - image: a.png\n    tile_size: big\n").unwrap();
		assert_eq!(file.jobs[0].tile_size, Some(RawTileSize::Text("big".to_string())));
	}

	#[test]
	fn test_empty() {
		assert_eq!(JobFile::from_string("").unwrap(), JobFile::default());
		assert_eq!(JobFile::from_string("jobs: []").unwrap(), JobFile::default());
	}

	#[test]
	fn test_unknown_field() {
		assert!(JobFile::from_string("jobs:\n  - image: a.png\n    zoom: 3\n").is_err());
	}

	#[test]
	fn test_missing_image() {
		let error = JobFile::from_string("jobs:\n  - name: a\n").unwrap_err();
		assert_eq!(DeepZoomError::kind_of(&error), Some(ErrorKind::InvalidParameter));
	}

	#[test]
	fn test_image_in_defaults() {
		let error = JobFile::from_string("defaults:\n  image: a.png\n").unwrap_err();
		assert_eq!(DeepZoomError::kind_of(&error), Some(ErrorKind::InvalidParameter));
	}

	#[test]
	fn test_from_path_resolves_relative_images() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("jobs.yml");
		std::fs::write(&path, "jobs:\n  - image: a.png\n").unwrap();
		let file = JobFile::from_path(&path).unwrap();
		assert_eq!(file.jobs[0].image, Some(dir.path().join("a.png")));
	}
}
