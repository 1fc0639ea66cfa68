use super::range::RangeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
	#[error("Resource not found: {}", path.display())]
	ResourceNotFound { path: PathBuf },

	#[error("Failed to read {}: {source}", path.display())]
	ResourceReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("{source}")]
	Range {
		#[source]
		source: RangeError,
		/// Length of the resource the range was checked against
		total: u64,
	},
}

impl StreamError {
	pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		let path = path.into();
		match source.kind() {
			std::io::ErrorKind::NotFound => Self::ResourceNotFound { path },
			_ => Self::ResourceReadError { path, source },
		}
	}
}
