pub mod error;
pub mod mime_types;
pub mod range;

pub use error::StreamError;
pub use mime_types::content_type_for;
pub use range::{parse_range, ByteRange, RangeError, RangeSelection};

use crate::Config;
use axum::{
	body::Body,
	http::{
		header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE},
		HeaderValue, StatusCode,
	},
	response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::Stream;
use std::io::{self, SeekFrom};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, instrument};

/// Serves files from disk honoring single `Range` requests.
///
/// Every response body is fed by its own reader task; the file handle lives in
/// that task and is dropped when the window is exhausted, a read fails, or the
/// client goes away.
#[derive(Debug, Clone)]
pub struct StreamingService {
	max_chunks: usize,
	chunk_size: usize,
}

/// A ready-to-send file response: status, framing headers and a lazily read body.
pub struct MediaStream {
	pub status: StatusCode,
	pub content_type: &'static str,
	pub content_length: u64,
	pub content_range: Option<String>,
	body: Body,
}

impl StreamingService {
	pub fn new(config: &Config) -> Self {
		Self::with_limits(config.max_chunks, config.chunk_size)
	}

	pub fn with_limits(max_chunks: usize, chunk_size: usize) -> Self {
		Self {
			max_chunks: max_chunks.max(1),
			chunk_size: chunk_size.max(1),
		}
	}

	/// Open `path` and prepare a 200 or 206 response for the given `Range` header.
	///
	/// # Errors
	/// `ResourceNotFound` when the path does not exist or is not a regular file,
	/// `ResourceReadError` when it cannot be opened, inspected or seeked, and
	/// `Range` when the header is malformed or unsatisfiable.
	#[instrument(skip(self, path), fields(path = %path.display()))]
	pub async fn serve_file(&self, path: &Path, range_header: Option<&str>) -> Result<MediaStream, StreamError> {
		let mut file = File::open(path).await.map_err(|e| StreamError::from_io(path, e))?;
		let metadata = file.metadata().await.map_err(|e| StreamError::from_io(path, e))?;
		if !metadata.is_file() {
			return Err(StreamError::ResourceNotFound { path: path.to_path_buf() });
		}

		let total = metadata.len();
		let selection = parse_range(range_header, total).map_err(|source| StreamError::Range { source, total })?;

		let (status, content_length, content_range) = match selection {
			RangeSelection::Whole => (StatusCode::OK, total, None),
			RangeSelection::Partial(range) => {
				file.seek(SeekFrom::Start(range.start())).await.map_err(|e| StreamError::from_io(path, e))?;
				(StatusCode::PARTIAL_CONTENT, range.len(), Some(range.content_range(total)))
			}
		};

		debug!(status = status.as_u16(), content_length, total, "streaming file");

		Ok(MediaStream {
			status,
			content_type: content_type_for(path),
			content_length,
			content_range,
			body: Body::from_stream(self.create_stream_with_backpressure(file.take(content_length))),
		})
	}

	/// Creates a backpressure-aware stream from any `AsyncRead` source.
	///
	/// At most `max_chunks` chunks are buffered ahead of the consumer.
	pub fn create_stream_with_backpressure<R>(&self, reader: R) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static
	where
		R: AsyncRead + Unpin + Send + 'static,
	{
		let (tx, rx) = mpsc::channel(self.max_chunks);
		let chunk_size = self.chunk_size;

		tokio::spawn(async move {
			let mut reader = reader;
			let mut buffer = vec![0u8; chunk_size].into_boxed_slice();

			loop {
				let bytes_read = match reader.read(&mut buffer).await {
					Ok(0) => break,
					Ok(n) => n,
					Err(e) => {
						let _ = tx.send(Err(e)).await;
						break;
					}
				};

				if tx.send(Ok(Bytes::copy_from_slice(&buffer[..bytes_read]))).await.is_err() {
					debug!("stream receiver dropped, releasing reader");
					break;
				}
			}
		});

		ReceiverStream::new(rx)
	}
}

impl IntoResponse for MediaStream {
	fn into_response(self) -> Response {
		let mut response = Response::new(self.body);
		*response.status_mut() = self.status;

		let headers = response.headers_mut();
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
		headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
		headers.insert(CONTENT_LENGTH, HeaderValue::from(self.content_length));
		if let Some(content_range) = self.content_range.and_then(|v| HeaderValue::from_str(&v).ok()) {
			headers.insert(CONTENT_RANGE, content_range);
		}

		response
	}
}
