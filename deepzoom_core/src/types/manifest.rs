use serde::{Deserialize, Serialize};

/// Metadata written next to the tiles as `config.json`.
///
/// ```
/// use deepzoom_core::Manifest;
///
/// let manifest = Manifest { tile_size: 256, min_zoom: 0, max_zoom: 3 };
/// assert!(manifest.to_json_string().unwrap().contains("\"tileSize\": 256"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Manifest {
	pub tile_size: u32,
	pub min_zoom: u8,
	pub max_zoom: u8,
}

impl Manifest {
	pub const FILE_NAME: &'static str = "config.json";

	/// Pretty printed JSON with a trailing newline.
	pub fn to_json_string(&self) -> serde_json::Result<String> {
		let mut text = serde_json::to_string_pretty(self)?;
		text.push('\n');
		Ok(text)
	}

	pub fn from_json_str(text: &str) -> serde_json::Result<Manifest> {
		serde_json::from_str(text)
	}
}
