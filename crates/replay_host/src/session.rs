use crate::streaming_service::content_type_for;
use bytes::Bytes;
use chat_timeline::{ChatEvent, Seconds, Timeline, TimelineError};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

const CHAT_FILE_SUFFIX: &str = "_chat.json";
const THUMBNAIL_SUFFIX: &str = "_contact_sheet.jpg";

/// Characters escaped when a file name is placed into a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'/')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}');

#[derive(Debug, Error)]
pub enum SessionError {
	#[error("Media file not found: {}", path.display())]
	MediaNotFound { path: PathBuf },

	#[error("Not a regular file: {}", path.display())]
	NotAFile { path: PathBuf },

	#[error("Failed to inspect {}: {source}", path.display())]
	MediaRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("No media loaded")]
	NoMediaLoaded,

	#[error("Media was replaced before the timeline finished loading")]
	MediaChanged,

	#[error("Timeline decoding was aborted: {0}")]
	IngestAborted(String),

	#[error("Failed to read timeline file {}: {source}", path.display())]
	TimelineRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Timeline(#[from] TimelineError),
}

/// The media file currently offered for playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaReference {
	pub path: PathBuf,
	pub file_name: String,
	pub content_type: &'static str,
	pub size: u64,
	/// `<stem>_chat.json` next to the media, when present
	pub chat_file: Option<PathBuf>,
	/// `<stem>_contact_sheet.jpg` next to the media, when present
	pub thumbnail: Option<PathBuf>,
}

impl MediaReference {
	/// Resolve `path` to an absolute regular file and discover its sibling files.
	///
	/// # Errors
	/// `MediaNotFound` when nothing exists at `path`, `NotAFile` for directories
	/// and other non-regular files, `MediaRead` for any other I/O failure.
	pub async fn probe(path: &Path) -> Result<Self, SessionError> {
		let resolved = tokio::fs::canonicalize(path).await.map_err(|source| match source.kind() {
			std::io::ErrorKind::NotFound => SessionError::MediaNotFound { path: path.to_path_buf() },
			_ => SessionError::MediaRead { path: path.to_path_buf(), source },
		})?;

		let metadata = tokio::fs::metadata(&resolved).await.map_err(|source| SessionError::MediaRead { path: resolved.clone(), source })?;
		if !metadata.is_file() {
			return Err(SessionError::NotAFile { path: resolved });
		}

		let file_name = resolved.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
		let chat_file = sibling(&resolved, CHAT_FILE_SUFFIX).await;
		let thumbnail = sibling(&resolved, THUMBNAIL_SUFFIX).await;

		Ok(Self {
			content_type: content_type_for(&resolved),
			size: metadata.len(),
			path: resolved,
			file_name,
			chat_file,
			thumbnail,
		})
	}

	/// Path the content server answers for this media
	pub fn playback_url(&self) -> String {
		format!("/video/{}", utf8_percent_encode(&self.file_name, PATH_SEGMENT))
	}

	/// Whether a decoded `/video/<name>` request refers to this media
	pub fn is_named(&self, name: &str) -> bool {
		name.trim_start_matches('/') == self.file_name
	}
}

async fn sibling(media: &Path, suffix: &str) -> Option<PathBuf> {
	let stem = media.file_stem()?.to_string_lossy();
	let candidate = media.with_file_name(format!("{stem}{suffix}"));
	tokio::fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()).then_some(candidate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	Idle,
	MediaLoaded,
	TimelineLoaded,
}

/// An immutable view of the session. Replaced as a whole on every load.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
	pub media: Option<Arc<MediaReference>>,
	pub timeline: Option<Arc<Timeline>>,
}

impl SessionSnapshot {
	pub const fn state(&self) -> SessionState {
		match (&self.media, &self.timeline) {
			(None, _) => SessionState::Idle,
			(Some(_), None) => SessionState::MediaLoaded,
			(Some(_), Some(_)) => SessionState::TimelineLoaded,
		}
	}
}

/// Current media and timeline shared by every request handler.
///
/// Readers clone the snapshot `Arc` and never observe a half-applied load.
#[derive(Debug, Default)]
pub struct ActiveSession {
	current: RwLock<Arc<SessionSnapshot>>,
}

impl ActiveSession {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn snapshot(&self) -> Arc<SessionSnapshot> {
		self.current.read().await.clone()
	}

	pub async fn state(&self) -> SessionState {
		self.snapshot().await.state()
	}

	pub async fn media(&self) -> Option<Arc<MediaReference>> {
		self.snapshot().await.media.clone()
	}

	/// Make `path` the current media. Any loaded timeline is discarded.
	///
	/// # Errors
	/// See [`MediaReference::probe`]. The session is unchanged on failure.
	#[instrument(skip(self))]
	pub async fn load_media(&self, path: &Path) -> Result<Arc<MediaReference>, SessionError> {
		let media = Arc::new(MediaReference::probe(path).await?);

		*self.current.write().await = Arc::new(SessionSnapshot {
			media: Some(media.clone()),
			timeline: None,
		});

		info!(path = %media.path.display(), size = media.size, "media loaded");
		Ok(media)
	}

	/// Ingest a raw timeline payload for the current media and return the event count.
	///
	/// Decoding runs on the blocking pool. The timeline is only attached if the media
	/// it was uploaded for is still the current one.
	///
	/// # Errors
	/// `NoMediaLoaded` while idle, `MediaChanged` when other media was loaded in the
	/// meantime, `Timeline` when the payload is unparsable or empty.
	/// The previous timeline stays in place on failure.
	#[instrument(skip(self, raw), fields(bytes = raw.len()))]
	pub async fn load_timeline_bytes(&self, raw: Bytes) -> Result<usize, SessionError> {
		let media = self.snapshot().await.media.clone().ok_or(SessionError::NoMediaLoaded)?;

		let timeline = tokio::task::spawn_blocking(move || chat_timeline::ingest(&raw))
			.await
			.map_err(|e| SessionError::IngestAborted(e.to_string()))??;

		self.attach_timeline(&media, timeline).await
	}

	async fn attach_timeline(&self, media: &Arc<MediaReference>, timeline: Timeline) -> Result<usize, SessionError> {
		let mut current = self.current.write().await;
		match &current.media {
			Some(loaded) if Arc::ptr_eq(loaded, media) => {}
			Some(loaded) => {
				debug!(uploaded_for = %media.file_name, loaded = %loaded.file_name, "discarding timeline for replaced media");
				return Err(SessionError::MediaChanged);
			}
			None => return Err(SessionError::NoMediaLoaded),
		}

		let count = timeline.len();
		*current = Arc::new(SessionSnapshot {
			media: Some(media.clone()),
			timeline: Some(Arc::new(timeline)),
		});

		info!(events = count, "timeline loaded");
		Ok(count)
	}

	/// Read a timeline file from disk and load it.
	///
	/// # Errors
	/// `TimelineRead` when the file cannot be read, otherwise as [`Self::load_timeline_bytes`].
	pub async fn load_timeline_file(&self, path: &Path) -> Result<usize, SessionError> {
		debug!(path = %path.display(), "reading timeline file");
		let raw = tokio::fs::read(path).await.map_err(|source| SessionError::TimelineRead { path: path.to_path_buf(), source })?;
		self.load_timeline_bytes(Bytes::from(raw)).await
	}

	/// Events with `current_time - window_size <= offset <= current_time`, ascending.
	/// Empty when no timeline is loaded.
	pub async fn messages_at(&self, current_time: Seconds, window_size: Seconds) -> Vec<ChatEvent> {
		self.snapshot()
			.await
			.timeline
			.as_ref()
			.map(|timeline| timeline.window(current_time, window_size).to_vec())
			.unwrap_or_default()
	}

	pub async fn all_events(&self) -> Vec<ChatEvent> {
		self.snapshot().await.timeline.as_ref().map(|timeline| timeline.events().to_vec()).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TIMELINE: &str = r#"[
		{"message_id": "b", "message": "later", "time_in_seconds": 9.0},
		{"message_id": "a", "message": "first", "time_in_seconds": 1.0},
		{"message_id": "c", "message": "middle", "time_in_seconds": 5.0}
	]"#;

	fn media_dir() -> (tempfile::TempDir, PathBuf) {
		let dir = tempfile::tempdir().unwrap();
		let media = dir.path().join("stream one.mp4");
		std::fs::write(&media, vec![0u8; 64]).unwrap();
		(dir, media)
	}

	#[tokio::test]
	async fn states_follow_loads() {
		let (_dir, media) = media_dir();
		let session = ActiveSession::new();
		assert_eq!(session.state().await, SessionState::Idle);

		session.load_media(&media).await.unwrap();
		assert_eq!(session.state().await, SessionState::MediaLoaded);

		assert_eq!(session.load_timeline_bytes(Bytes::from_static(TIMELINE.as_bytes())).await.unwrap(), 3);
		assert_eq!(session.state().await, SessionState::TimelineLoaded);

		session.load_media(&media).await.unwrap();
		assert_eq!(session.state().await, SessionState::MediaLoaded);
		assert!(session.all_events().await.is_empty());
	}

	#[tokio::test]
	async fn timeline_requires_media() {
		let session = ActiveSession::new();
		let result = session.load_timeline_bytes(Bytes::from_static(TIMELINE.as_bytes())).await;
		assert!(matches!(result, Err(SessionError::NoMediaLoaded)));
		assert_eq!(session.state().await, SessionState::Idle);
	}

	#[tokio::test]
	async fn failed_timeline_keeps_previous_one() {
		let (_dir, media) = media_dir();
		let session = ActiveSession::new();
		session.load_media(&media).await.unwrap();
		session.load_timeline_bytes(Bytes::from_static(TIMELINE.as_bytes())).await.unwrap();

		let result = session.load_timeline_bytes(Bytes::from_static(b"{not json")).await;
		assert!(matches!(result, Err(SessionError::Timeline(TimelineError::Unparsable(_)))));
		assert_eq!(session.all_events().await.len(), 3);
	}

	#[tokio::test]
	async fn timeline_for_replaced_media_is_discarded() {
		let (dir, first) = media_dir();
		let second = dir.path().join("second.mp4");
		std::fs::write(&second, b"other").unwrap();

		let session = ActiveSession::new();
		let uploaded_for = session.load_media(&first).await.unwrap();
		let timeline = chat_timeline::ingest(TIMELINE.as_bytes()).unwrap();
		session.load_media(&second).await.unwrap();

		let result = session.attach_timeline(&uploaded_for, timeline).await;
		assert!(matches!(result, Err(SessionError::MediaChanged)));

		let snapshot = session.snapshot().await;
		assert_eq!(snapshot.state(), SessionState::MediaLoaded);
		assert_eq!(snapshot.media.as_ref().unwrap().file_name, "second.mp4");
	}

	#[tokio::test]
	async fn reloading_same_path_invalidates_pending_timeline() {
		let (_dir, media) = media_dir();
		let session = ActiveSession::new();
		let uploaded_for = session.load_media(&media).await.unwrap();
		session.load_media(&media).await.unwrap();

		let timeline = chat_timeline::ingest(TIMELINE.as_bytes()).unwrap();
		let result = session.attach_timeline(&uploaded_for, timeline).await;
		assert!(matches!(result, Err(SessionError::MediaChanged)));
		assert!(session.all_events().await.is_empty());
	}

	#[tokio::test]
	async fn window_query_is_inclusive() {
		let (_dir, media) = media_dir();
		let session = ActiveSession::new();
		assert!(session.messages_at(5.0, 4.0).await.is_empty());

		session.load_media(&media).await.unwrap();
		session.load_timeline_bytes(Bytes::from_static(TIMELINE.as_bytes())).await.unwrap();

		let ids: Vec<String> = session.messages_at(5.0, 4.0).await.into_iter().map(|e| e.message_id).collect();
		assert_eq!(ids, vec!["a", "c"]);
	}

	#[tokio::test]
	async fn missing_media_leaves_session_untouched() {
		let (dir, media) = media_dir();
		let session = ActiveSession::new();
		session.load_media(&media).await.unwrap();

		let missing = session.load_media(&dir.path().join("gone.mp4")).await;
		assert!(matches!(missing, Err(SessionError::MediaNotFound { .. })));

		let directory = session.load_media(dir.path()).await;
		assert!(matches!(directory, Err(SessionError::NotAFile { .. })));

		assert_eq!(session.media().await.unwrap().file_name, "stream one.mp4");
	}

	#[tokio::test]
	async fn probe_discovers_sibling_files() {
		let (dir, media) = media_dir();
		std::fs::write(dir.path().join("stream one_chat.json"), TIMELINE).unwrap();

		let reference = MediaReference::probe(&media).await.unwrap();
		assert_eq!(reference.content_type, "video/mp4");
		assert_eq!(reference.size, 64);
		assert_eq!(reference.chat_file.as_deref().and_then(Path::file_name).unwrap(), "stream one_chat.json");
		assert_eq!(reference.thumbnail, None);
		assert_eq!(reference.playback_url(), "/video/stream%20one.mp4");
		assert!(reference.is_named("stream one.mp4"));
		assert!(!reference.is_named("other.mp4"));
	}
}
