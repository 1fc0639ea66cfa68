use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipError {
	#[error("No source video is currently loaded")]
	NoSourceLoaded,

	#[error("Duration must be a positive number of seconds, got {0}")]
	InvalidDuration(f64),

	#[error("Start time must be zero or a positive number of seconds, got {0}")]
	InvalidStartOffset(f64),

	#[error("{program} is not installed or not in PATH. Please install {program} to use the clip feature.")]
	EncoderUnavailable { program: String },

	#[error("Failed to create output directory {}: {source}", path.display())]
	DirectoryCreateFailed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Encoder error: {reason}\nOutput: {output}")]
	EncodingFailed { reason: String, output: String },
}

/// Machine-readable failure category carried by a failed `ClipResult`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipErrorKind {
	NoSourceLoaded,
	InvalidDuration,
	InvalidStartOffset,
	EncoderUnavailable,
	DirectoryCreateFailed,
	EncodingFailed,
}

impl ClipError {
	pub const fn kind(&self) -> ClipErrorKind {
		match self {
			Self::NoSourceLoaded => ClipErrorKind::NoSourceLoaded,
			Self::InvalidDuration(_) => ClipErrorKind::InvalidDuration,
			Self::InvalidStartOffset(_) => ClipErrorKind::InvalidStartOffset,
			Self::EncoderUnavailable { .. } => ClipErrorKind::EncoderUnavailable,
			Self::DirectoryCreateFailed { .. } => ClipErrorKind::DirectoryCreateFailed,
			Self::EncodingFailed { .. } => ClipErrorKind::EncodingFailed,
		}
	}
}
