use super::error::ClipError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subfolder created under the video library (or home) directory
pub const LIBRARY_SUBFOLDER: &str = "replay-clips";
/// Subfolder created next to the source media, and under the app data directory
pub const CLIPS_SUBFOLDER: &str = "clips";
/// Library directory names probed under the home directory, in order
pub const LIBRARY_CANDIDATES: [&str; 3] = ["Videos", "videos", "Documents"];

/// Where exported clips are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StorageOption {
	/// `<home>/<Videos|videos|Documents>/replay-clips`
	#[default]
	VideosDir,
	/// `<source dir>/clips`
	SourceVideoDir,
	/// The configured custom directory, or `<app data>/clips` when unset
	CustomDir,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoragePolicy {
	pub option: StorageOption,
	pub custom_dir: Option<PathBuf>,
}

impl StoragePolicy {
	pub fn new(option: StorageOption, custom_dir: Option<PathBuf>) -> Self {
		Self {
			option,
			custom_dir: custom_dir.filter(|dir| !dir.as_os_str().is_empty()),
		}
	}

	/// Switch option. An empty or absent `custom_dir` keeps the previously configured one.
	pub fn apply(&mut self, option: StorageOption, custom_dir: Option<PathBuf>) {
		self.option = option;
		if option == StorageOption::CustomDir {
			if let Some(dir) = custom_dir.filter(|dir| !dir.as_os_str().is_empty()) {
				self.custom_dir = Some(dir);
			}
		}
	}
}

/// Maps a [`StoragePolicy`] and a source path to an output directory.
#[derive(Debug, Clone)]
pub struct StorageResolver {
	app_data_dir: PathBuf,
	home_dir: Option<PathBuf>,
}

impl StorageResolver {
	pub fn new(app_data_dir: impl Into<PathBuf>, home_dir: Option<PathBuf>) -> Self {
		Self {
			app_data_dir: app_data_dir.into(),
			home_dir,
		}
	}

	/// Resolver rooted at the current user's home directory
	pub fn for_current_user(app_data_dir: impl Into<PathBuf>) -> Self {
		Self::new(app_data_dir, dirs::home_dir())
	}

	pub fn app_data_clips_dir(&self) -> PathBuf {
		self.app_data_dir.join(CLIPS_SUBFOLDER)
	}

	/// Library clip folders that exist-or-could-exist under the home directory
	pub fn library_clip_dirs(&self) -> Vec<PathBuf> {
		self.home_dir
			.iter()
			.flat_map(|home| LIBRARY_CANDIDATES.iter().map(move |name| home.join(name).join(LIBRARY_SUBFOLDER)))
			.collect()
	}

	/// Target directory for `policy`, without touching the filesystem beyond probing the library candidates.
	///
	/// # Errors
	/// `NoSourceLoaded` for the co-located policy without a source, and
	/// `DirectoryCreateFailed` when the home directory cannot be determined.
	pub fn target_dir(&self, policy: &StoragePolicy, source: Option<&Path>) -> Result<PathBuf, ClipError> {
		match policy.option {
			StorageOption::VideosDir => {
				let home = self.home_dir.as_deref().ok_or_else(|| ClipError::DirectoryCreateFailed {
					path: PathBuf::from("~"),
					source: io::Error::new(io::ErrorKind::NotFound, "could not determine the user home directory"),
				})?;

				let library = LIBRARY_CANDIDATES
					.iter()
					.map(|name| home.join(name))
					.find(|candidate| candidate.is_dir())
					.unwrap_or_else(|| home.to_path_buf());

				Ok(library.join(LIBRARY_SUBFOLDER))
			}
			StorageOption::SourceVideoDir => {
				let source = source.ok_or(ClipError::NoSourceLoaded)?;
				let parent = source.parent().unwrap_or_else(|| Path::new(""));
				Ok(parent.join(CLIPS_SUBFOLDER))
			}
			StorageOption::CustomDir => Ok(policy.custom_dir.clone().unwrap_or_else(|| self.app_data_clips_dir())),
		}
	}

	/// Target directory for `policy`, created with its parents when missing.
	///
	/// # Errors
	/// See [`Self::target_dir`]; additionally `DirectoryCreateFailed` with the
	/// underlying cause when the directory cannot be created.
	pub async fn resolve(&self, policy: &StoragePolicy, source: Option<&Path>) -> Result<PathBuf, ClipError> {
		let dir = self.target_dir(policy, source)?;

		if !tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) {
			debug!(dir = %dir.display(), "creating clip output directory");
			tokio::fs::create_dir_all(&dir).await.map_err(|source| ClipError::DirectoryCreateFailed { path: dir.clone(), source })?;
		}

		Ok(dir)
	}
}
