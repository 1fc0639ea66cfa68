use crate::handlers::media as routes;
use crate::AppState;
use axum::routing::get;
use axum::{
	extract::FromRef,
	http::{
		header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE},
		Method,
	},
	Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Playback endpoints and media loading
pub fn media<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	// Range framing headers must be readable cross-origin
	let cors = CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::HEAD, Method::POST])
		.allow_headers(Any)
		.expose_headers([ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE]);

	Router::new()
		.route("/video/*name", get(routes::stream_video))
		.route("/thumbnail", get(routes::thumbnail))
		.route("/api/session", get(routes::session_info))
		.route("/api/media", get(routes::media_info).post(routes::load_media))
		.layer(cors)
}
