use crate::handlers::clips as routes;
use crate::AppState;
use axum::routing::{get, put};
use axum::{extract::FromRef, http::Method, Router};
use tower_http::cors::{Any, CorsLayer};

pub fn clips<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	let cors = CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::POST, Method::PUT])
		.allow_headers(Any);

	Router::new()
		.route("/api/clips", get(routes::list_clips).post(routes::create_clip))
		.route("/api/clips/dir", get(routes::clips_dir))
		.route("/api/clips/storage", put(routes::set_storage))
		.layer(cors)
}
