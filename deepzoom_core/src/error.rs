//! Error taxonomy of pyramid generation.
//!
//! All fallible functions in the workspace return [`anyhow::Result`]. Where a caller needs to
//! react to the *kind* of failure (tests, the CLI summary), the underlying cause is a
//! [`DeepZoomError`] somewhere in the error chain and can be recovered with
//! [`DeepZoomError::find`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while planning or rendering a pyramid.
#[derive(Debug, Error)]
pub enum DeepZoomError {
	/// A parameter failed validation: non-numeric tile size override, unsupported rotation,
	/// min zoom above max zoom, unknown input selection.
	#[error("invalid parameter: {0}")]
	InvalidParameter(String),

	/// The configured tile size range held no candidate. Handled by falling back to the default
	/// tile size, so it only ever surfaces in logs.
	#[error("no tile size candidate in range {min}..={max} for full size {full_size}")]
	NoCandidateTileSize { min: u32, max: u32, full_size: u32 },

	/// Decoding, transforming or encoding a raster failed.
	#[error("{operation} failed: {message}")]
	Codec { operation: String, message: String },

	/// Creating a directory or writing a file failed.
	#[error("filesystem error at {path:?}")]
	Filesystem {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// The category of a [`DeepZoomError`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	InvalidParameter,
	NoCandidateTileSize,
	Codec,
	Filesystem,
}

impl DeepZoomError {
	pub fn invalid_parameter(message: impl Into<String>) -> Self {
		DeepZoomError::InvalidParameter(message.into())
	}

	pub fn codec(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
		DeepZoomError::Codec {
			operation: operation.into(),
			message: message.to_string(),
		}
	}

	pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		DeepZoomError::Filesystem {
			path: path.into(),
			source,
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			DeepZoomError::InvalidParameter(_) => ErrorKind::InvalidParameter,
			DeepZoomError::NoCandidateTileSize { .. } => ErrorKind::NoCandidateTileSize,
			DeepZoomError::Codec { .. } => ErrorKind::Codec,
			DeepZoomError::Filesystem { .. } => ErrorKind::Filesystem,
		}
	}

	/// Find the first [`DeepZoomError`] in the chain of an [`anyhow::Error`].
	pub fn find(error: &anyhow::Error) -> Option<&DeepZoomError> {
		error.chain().find_map(|cause| cause.downcast_ref::<DeepZoomError>())
	}

	/// Shorthand for the kind of the first [`DeepZoomError`] in the chain.
	pub fn kind_of(error: &anyhow::Error) -> Option<ErrorKind> {
		Self::find(error).map(DeepZoomError::kind)
	}
}
