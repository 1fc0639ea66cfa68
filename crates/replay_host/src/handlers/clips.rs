use crate::clip::{ClipError, ClipRequest, ClipResult};
use crate::models::{ClipList, ClipsDir, CreateClipRequest, SetStorageRequest, StorageInfo};
use crate::session::SessionError;
use crate::{AppState, ReplayHostError};
use axum::{extract::State, Json};
use tracing::{instrument, warn};

/// Cut a clip from the loaded media. Failures are reported in the body, never as an error status.
#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn create_clip(State(state): State<AppState>, Json(request): Json<CreateClipRequest>) -> Json<ClipResult> {
	let source = state.session.media().await.map(|media| media.path.clone());

	let result = state
		.clips
		.create_clip(ClipRequest {
			source,
			start_time: request.start_time,
			duration: request.duration,
			title: request.title,
		})
		.await;

	Json(result)
}

#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn list_clips(State(state): State<AppState>) -> Json<ClipList> {
	let source = state.session.media().await;
	let clips = state.clips.list_clips(source.as_ref().map(|media| media.path.as_path())).await;
	Json(ClipList { clips })
}

/// Directory the next clip would be written to
#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn clips_dir(State(state): State<AppState>) -> Result<Json<ClipsDir>, ReplayHostError> {
	let source = state.session.media().await;
	let dir = state.clips.current_clips_dir(source.as_ref().map(|media| media.path.as_path())).await.map_err(|e| {
		warn!(error = %e, "clips directory unavailable");
		match e {
			ClipError::NoSourceLoaded => ReplayHostError::Session(SessionError::NoMediaLoaded),
			_ => ReplayHostError::NotFound,
		}
	})?;

	Ok(Json(ClipsDir { dir }))
}

#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn set_storage(State(state): State<AppState>, Json(request): Json<SetStorageRequest>) -> Json<StorageInfo> {
	let policy = state.clips.set_storage_option(request.option, request.custom_dir).await;
	let source = state.session.media().await;
	let clips_dir = state.clips.current_clips_dir(source.as_ref().map(|media| media.path.as_path())).await.ok();

	Json(StorageInfo { policy, clips_dir })
}
