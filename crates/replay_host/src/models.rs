use crate::clip::{StorageOption, StoragePolicy};
use crate::session::{MediaReference, SessionState};
use chat_timeline::Seconds;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct LoadMediaRequest {
	pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct MediaInfo {
	pub playback_url: String,
	#[serde(flatten)]
	pub media: MediaReference,
}

impl From<&MediaReference> for MediaInfo {
	fn from(media: &MediaReference) -> Self {
		Self {
			playback_url: media.playback_url(),
			media: media.clone(),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
	pub state: SessionState,
	pub media: Option<MediaInfo>,
	pub event_count: usize,
	pub tip_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct LoadTimelineRequest {
	pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct TimelineLoaded {
	pub event_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
	pub current_time: Seconds,
	pub window_size: Seconds,
}

#[derive(Debug, Deserialize)]
pub struct CreateClipRequest {
	pub start_time: Seconds,
	pub duration: Seconds,
	#[serde(default)]
	pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetStorageRequest {
	pub option: StorageOption,
	#[serde(default)]
	pub custom_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct StorageInfo {
	#[serde(flatten)]
	pub policy: StoragePolicy,
	/// Directory the next clip would be written to, when it can be determined
	pub clips_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ClipsDir {
	pub dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ClipList {
	pub clips: Vec<PathBuf>,
}
