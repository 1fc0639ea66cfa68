use crate::models::{LoadMediaRequest, MediaInfo, SessionInfo};
use crate::streaming_service::MediaStream;
use crate::{AppState, ReplayHostError};
use axum::{
	extract::{Path, State},
	http::{header::RANGE, HeaderMap},
	Json,
};
use tracing::{debug, instrument};

fn range_header(headers: &HeaderMap) -> Option<&str> {
	headers.get(RANGE).and_then(|value| value.to_str().ok())
}

/// Stream the loaded media, honoring `Range`
#[axum::debug_handler]
#[instrument(skip(state, headers))]
pub async fn stream_video(State(state): State<AppState>, Path(name): Path<String>, headers: HeaderMap) -> Result<MediaStream, ReplayHostError> {
	let media = state.session.media().await.ok_or(ReplayHostError::NoMediaLoaded)?;
	if !media.is_named(&name) {
		debug!(requested = %name, loaded = %media.file_name, "stale playback url");
		return Err(ReplayHostError::NotFound);
	}

	Ok(state.streaming.serve_file(&media.path, range_header(&headers)).await?)
}

/// Contact sheet image shipped next to the loaded media
#[axum::debug_handler]
#[instrument(skip(state, headers))]
pub async fn thumbnail(State(state): State<AppState>, headers: HeaderMap) -> Result<MediaStream, ReplayHostError> {
	let media = state.session.media().await.ok_or(ReplayHostError::NoMediaLoaded)?;
	let thumbnail = media.thumbnail.as_deref().ok_or(ReplayHostError::NotFound)?;

	Ok(state.streaming.serve_file(thumbnail, range_header(&headers)).await?)
}

#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn load_media(State(state): State<AppState>, Json(request): Json<LoadMediaRequest>) -> Result<Json<MediaInfo>, ReplayHostError> {
	let media = state.session.load_media(&request.path).await?;
	Ok(Json(MediaInfo::from(media.as_ref())))
}

#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn media_info(State(state): State<AppState>) -> Result<Json<MediaInfo>, ReplayHostError> {
	let media = state.session.media().await.ok_or(ReplayHostError::NoMediaLoaded)?;
	Ok(Json(MediaInfo::from(media.as_ref())))
}

#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn session_info(State(state): State<AppState>) -> Json<SessionInfo> {
	let snapshot = state.session.snapshot().await;

	Json(SessionInfo {
		state: snapshot.state(),
		media: snapshot.media.as_deref().map(MediaInfo::from),
		event_count: snapshot.timeline.as_ref().map_or(0, |timeline| timeline.len()),
		tip_count: snapshot.timeline.as_ref().map_or(0, |timeline| timeline.tips().count()),
	})
}
