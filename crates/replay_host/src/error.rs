use crate::session::SessionError;
use crate::streaming_service::StreamError;
use axum::body::Body;
use axum::http::header::CONTENT_RANGE;
use axum::http::{HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use chat_timeline::TimelineError;

#[derive(thiserror::Error, Debug)]
pub enum ReplayHostError {
	#[error("No media loaded")]
	NoMediaLoaded,

	#[error("request path not found")]
	NotFound,

	#[error(transparent)]
	Stream(#[from] StreamError),

	#[error(transparent)]
	Session(#[from] SessionError),

	#[error(transparent)]
	Timeline(#[from] TimelineError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl ReplayHostError {
	const fn status_code(&self) -> StatusCode {
		match self {
			Self::NoMediaLoaded | Self::NotFound => StatusCode::NOT_FOUND,
			Self::Stream(StreamError::ResourceNotFound { .. }) => StatusCode::NOT_FOUND,
			Self::Stream(StreamError::ResourceReadError { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Stream(StreamError::Range { .. }) => StatusCode::RANGE_NOT_SATISFIABLE,
			Self::Session(SessionError::MediaNotFound { .. }) => StatusCode::NOT_FOUND,
			Self::Session(SessionError::NotAFile { .. }) => StatusCode::BAD_REQUEST,
			Self::Session(SessionError::NoMediaLoaded | SessionError::MediaChanged) => StatusCode::CONFLICT,
			Self::Session(SessionError::TimelineRead { .. }) => StatusCode::BAD_REQUEST,
			Self::Session(SessionError::Timeline(_)) | Self::Timeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Self::Session(SessionError::MediaRead { .. } | SessionError::IngestAborted(_)) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl IntoResponse for ReplayHostError {
	fn into_response(self) -> Response<Body> {
		let status = self.status_code();

		match self {
			Self::Stream(StreamError::Range { ref source, total }) => {
				tracing::debug!(error = %source, total, "rejecting range request");
				let mut response = (status, self.to_string()).into_response();
				if let Ok(value) = HeaderValue::from_str(&format!("bytes */{total}")) {
					response.headers_mut().insert(CONTENT_RANGE, value);
				}
				return response;
			}

			Self::Stream(StreamError::ResourceReadError { .. }) | Self::Session(SessionError::MediaRead { .. } | SessionError::IngestAborted(_)) | Self::Io(_) => {
				tracing::error!(error = %self, "request failed");
			}

			// Other errors get mapped normally.
			_ => tracing::debug!(error = %self, status = status.as_u16(), "request rejected"),
		}

		(status, self.to_string()).into_response()
	}
}
