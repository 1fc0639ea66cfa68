use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

pub mod clip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod streaming_service;

pub use clip::{ClipRequest, ClipResult, ClipService, Encoder, FfmpegEncoder, StoragePolicy, StorageResolver};
pub use config::Config;
pub use error::ReplayHostError;
pub use session::{ActiveSession, MediaReference, SessionError, SessionState};
pub use streaming_service::StreamingService;

#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub session: Arc<ActiveSession>,
	pub streaming: Arc<StreamingService>,
	pub clips: Arc<ClipService>,
}

impl AppState {
	/// Wire every service from configuration, with `ffmpeg` (or `ENCODER_BIN`) as the encoder
	pub fn build(config: Arc<Config>) -> Self {
		let encoder = Arc::new(FfmpegEncoder::new(config.encoder_bin.clone()));
		let resolver = StorageResolver::for_current_user(config.resolved_app_data_dir());
		Self::with_parts(config, resolver, encoder)
	}

	pub fn with_parts(config: Arc<Config>, resolver: StorageResolver, encoder: Arc<dyn Encoder>) -> Self {
		let policy = StoragePolicy::new(config.clip_storage, config.clip_dir.clone());

		Self {
			streaming: Arc::new(StreamingService::new(&config)),
			session: Arc::new(ActiveSession::new()),
			clips: Arc::new(ClipService::new(resolver, policy, encoder)),
			config,
		}
	}

	/// Load `MEDIA_PATH` and then `CHAT_PATH` (or the media's sibling chat file).
	///
	/// Failures are logged and leave the session in whatever state was reached.
	pub async fn preload(&self) {
		let Some(media_path) = self.config.media_path.as_deref() else {
			return;
		};

		let media = match self.session.load_media(media_path).await {
			Ok(media) => media,
			Err(e) => {
				warn!(error = %e, "could not preload media");
				return;
			}
		};
		info!(url = %media.playback_url(), "media available");

		let Some(chat_path) = self.config.chat_path.clone().or_else(|| media.chat_file.clone()) else {
			return;
		};
		match self.session.load_timeline_file(&chat_path).await {
			Ok(count) => info!(events = count, path = %chat_path.display(), "timeline preloaded"),
			Err(e) => warn!(error = %e, path = %chat_path.display(), "could not preload timeline"),
		}
	}
}

/// The complete HTTP surface with tracing and the upload size limit applied
pub fn router(state: AppState) -> Router {
	let body_limit = state.config.max_payload_bytes();

	Router::new()
		.merge(routes::health::get_health())
		.merge(routes::media::media())
		.merge(routes::timeline::timeline())
		.merge(routes::clips::clips())
		.with_state(state)
		.layer(DefaultBodyLimit::disable())
		.layer(RequestBodyLimitLayer::new(body_limit))
		.layer(TraceLayer::new_for_http())
}
