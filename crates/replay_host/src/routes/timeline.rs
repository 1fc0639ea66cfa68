use crate::handlers::timeline as routes;
use crate::AppState;
use axum::routing::{get, post};
use axum::{extract::FromRef, http::Method, Router};
use tower_http::cors::{Any, CorsLayer};

pub fn timeline<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET, Method::POST]).allow_headers(Any);

	Router::new()
		.route("/api/timeline", get(routes::all_events).post(routes::upload_timeline))
		.route("/api/timeline/load", post(routes::load_timeline))
		.route("/api/messages", get(routes::messages))
		.layer(cors)
}
