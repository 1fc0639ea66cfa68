pub mod encoder;
pub mod error;
pub mod naming;
pub mod storage;

pub use encoder::{EncodeError, EncodeJob, Encoder, FfmpegEncoder};
pub use error::{ClipError, ClipErrorKind};
pub use storage::{StorageOption, StoragePolicy, StorageResolver};

use chrono::Local;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Extensions reported by [`ClipService::list_clips`]
pub const LISTED_EXTENSIONS: [&str; 3] = ["mp4", "webm", "mov"];

#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
	pub source: Option<PathBuf>,
	pub start_time: f64,
	pub duration: f64,
	pub title: Option<String>,
}

/// Terminal outcome of a clip request. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipResult {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file_path: Option<PathBuf>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_kind: Option<ClipErrorKind>,
}

impl From<Result<PathBuf, ClipError>> for ClipResult {
	fn from(result: Result<PathBuf, ClipError>) -> Self {
		match result {
			Ok(path) => Self {
				success: true,
				file_path: Some(path),
				error: None,
				error_kind: None,
			},
			Err(e) => Self {
				success: false,
				file_path: None,
				error: Some(e.to_string()),
				error_kind: Some(e.kind()),
			},
		}
	}
}

/// Cuts clips out of the loaded media with an external [`Encoder`].
pub struct ClipService {
	resolver: StorageResolver,
	policy: RwLock<StoragePolicy>,
	encoder: Arc<dyn Encoder>,
}

impl ClipService {
	pub fn new(resolver: StorageResolver, policy: StoragePolicy, encoder: Arc<dyn Encoder>) -> Self {
		Self {
			resolver,
			policy: RwLock::new(policy),
			encoder,
		}
	}

	pub fn encoder(&self) -> &dyn Encoder {
		self.encoder.as_ref()
	}

	/// Extract a clip. Every outcome, including invalid input, is reported in the returned [`ClipResult`].
	#[instrument(skip(self, request), fields(source = ?request.source, start = request.start_time, duration = request.duration))]
	pub async fn create_clip(&self, request: ClipRequest) -> ClipResult {
		let result = self.try_create_clip(request).await;
		match &result {
			Ok(path) => info!(output = %path.display(), "clip created"),
			Err(e) => warn!(kind = ?e.kind(), error = %e, "clip request failed"),
		}
		result.into()
	}

	async fn try_create_clip(&self, request: ClipRequest) -> Result<PathBuf, ClipError> {
		let source = request.source.ok_or(ClipError::NoSourceLoaded)?;
		if !(request.duration.is_finite() && request.duration > 0.0) {
			return Err(ClipError::InvalidDuration(request.duration));
		}
		if !(request.start_time.is_finite() && request.start_time >= 0.0) {
			return Err(ClipError::InvalidStartOffset(request.start_time));
		}

		if !self.encoder.is_available().await {
			return Err(ClipError::EncoderUnavailable {
				program: self.encoder.program().to_string(),
			});
		}

		let stem = naming::clip_file_stem(request.title.as_deref(), Local::now());
		let policy = self.policy.read().await.clone();
		let dir = self.resolver.resolve(&policy, Some(&source)).await?;
		let output = dir.join(format!("{stem}.{}", naming::CLIP_EXTENSION));

		let job = EncodeJob {
			source,
			start: request.start_time,
			duration: request.duration,
			output,
		};

		self.encoder.encode(&job).await.map_err(|e| ClipError::EncodingFailed {
			reason: e.to_string(),
			output: e.output().to_string(),
		})?;

		Ok(absolute(&job.output).await)
	}

	/// Change where subsequent clips are written.
	pub async fn set_storage_option(&self, option: StorageOption, custom_dir: Option<PathBuf>) -> StoragePolicy {
		let mut policy = self.policy.write().await;
		policy.apply(option, custom_dir);
		info!(option = ?policy.option, custom_dir = ?policy.custom_dir, "clip storage updated");
		policy.clone()
	}

	/// Directory the next clip of `source` would be written to.
	///
	/// # Errors
	/// See [`StorageResolver::target_dir`].
	pub async fn current_clips_dir(&self, source: Option<&Path>) -> Result<PathBuf, ClipError> {
		let policy = self.policy.read().await;
		self.resolver.target_dir(&policy, source)
	}

	/// Saved clips across every known clips folder, sorted and de-duplicated.
	pub async fn list_clips(&self, source: Option<&Path>) -> Vec<PathBuf> {
		let mut dirs = vec![self.resolver.app_data_clips_dir()];
		dirs.extend(self.resolver.library_clip_dirs());
		if let Some(custom) = self.policy.read().await.custom_dir.clone() {
			dirs.push(custom);
		}
		if let Some(parent) = source.and_then(Path::parent) {
			dirs.push(parent.join(storage::CLIPS_SUBFOLDER));
		}

		let mut clips = BTreeSet::new();
		for dir in dirs {
			let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
				debug!(dir = %dir.display(), "clips folder not readable, skipping");
				continue;
			};

			while let Ok(Some(entry)) = entries.next_entry().await {
				let path = entry.path();
				if is_listed_clip(&path) && entry.file_type().await.is_ok_and(|t| t.is_file()) {
					clips.insert(absolute(&path).await);
				}
			}
		}

		clips.into_iter().collect()
	}
}

fn is_listed_clip(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| LISTED_EXTENSIONS.iter().any(|listed| listed.eq_ignore_ascii_case(ext)))
}

async fn absolute(path: &Path) -> PathBuf {
	match tokio::fs::canonicalize(path).await {
		Ok(resolved) => resolved,
		Err(_) if path.is_absolute() => path.to_path_buf(),
		Err(_) => std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf()),
	}
}
