use crate::models::{LoadTimelineRequest, MessagesQuery, TimelineLoaded};
use crate::{AppState, ReplayHostError};
use axum::{
	body::Bytes,
	extract::{Query, State},
	Json,
};
use chat_timeline::ChatEvent;
use tracing::instrument;

/// Load a timeline from the raw request body
#[axum::debug_handler]
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn upload_timeline(State(state): State<AppState>, body: Bytes) -> Result<Json<TimelineLoaded>, ReplayHostError> {
	let event_count = state.session.load_timeline_bytes(body).await?;
	Ok(Json(TimelineLoaded { event_count }))
}

/// Load a timeline from a file on the host
#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn load_timeline(State(state): State<AppState>, Json(request): Json<LoadTimelineRequest>) -> Result<Json<TimelineLoaded>, ReplayHostError> {
	let event_count = state.session.load_timeline_file(&request.path).await?;
	Ok(Json(TimelineLoaded { event_count }))
}

#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn all_events(State(state): State<AppState>) -> Json<Vec<ChatEvent>> {
	Json(state.session.all_events().await)
}

/// Events inside `[current_time - window_size, current_time]`
#[axum::debug_handler]
#[instrument(skip(state))]
pub async fn messages(State(state): State<AppState>, Query(query): Query<MessagesQuery>) -> Json<Vec<ChatEvent>> {
	Json(state.session.messages_at(query.current_time, query.window_size).await)
}
