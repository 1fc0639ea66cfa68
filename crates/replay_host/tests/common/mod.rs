#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use replay_host::clip::{EncodeError, EncodeJob, Encoder};
use replay_host::{router, AppState, Config, StorageResolver};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

// ============================================================================
// Recording encoder
// ============================================================================

/// Encoder double that records every job and writes a placeholder output file.
pub struct RecordingEncoder {
	available: bool,
	failure: Option<String>,
	jobs: Mutex<Vec<EncodeJob>>,
}

impl RecordingEncoder {
	pub fn working() -> Self {
		Self {
			available: true,
			failure: None,
			jobs: Mutex::new(Vec::new()),
		}
	}

	pub fn missing() -> Self {
		Self {
			available: false,
			..Self::working()
		}
	}

	pub fn failing(output: &str) -> Self {
		Self {
			failure: Some(output.to_string()),
			..Self::working()
		}
	}

	pub fn jobs(&self) -> Vec<EncodeJob> {
		self.jobs.lock().unwrap().clone()
	}
}

#[async_trait]
impl Encoder for RecordingEncoder {
	fn program(&self) -> &str {
		"ffmpeg"
	}

	async fn is_available(&self) -> bool {
		self.available
	}

	async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
		self.jobs.lock().unwrap().push(job.clone());

		if let Some(output) = &self.failure {
			return Err(EncodeError::Exit {
				program: "ffmpeg".to_string(),
				status: "exit status: 1".to_string(),
				output: output.clone(),
			});
		}

		std::fs::write(&job.output, b"clip").unwrap();
		Ok(())
	}
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
	pub dir: TempDir,
	pub state: AppState,
	pub encoder: Arc<RecordingEncoder>,
}

impl Harness {
	pub fn new(encoder: RecordingEncoder) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let app_data = dir.path().join("appdata");
		let home = dir.path().join("home");
		std::fs::create_dir_all(&home).unwrap();

		let config = Config {
			app_data_dir: Some(app_data.clone()),
			chunk_size: 7,
			max_chunks: 2,
			..Config::default()
		};

		let encoder = Arc::new(encoder);
		let state = AppState::with_parts(Arc::new(config), StorageResolver::new(app_data, Some(home)), encoder.clone());

		Self { dir, state, encoder }
	}

	pub fn path(&self, relative: &str) -> PathBuf {
		self.dir.path().join(relative)
	}

	/// Write `len` bytes of patterned data to `relative` and return its path
	pub fn write_media(&self, relative: &str, len: usize) -> PathBuf {
		let path = self.path(relative);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(&path, media_bytes(len)).unwrap();
		path
	}

	pub fn app(&self) -> Router {
		router(self.state.clone())
	}

	pub async fn get(&self, uri: &str) -> TestResponse {
		self.send(Request::get(uri).body(Body::empty()).unwrap()).await
	}

	pub async fn get_range(&self, uri: &str, range: &str) -> TestResponse {
		self.send(Request::get(uri).header("range", range).body(Body::empty()).unwrap()).await
	}

	pub async fn send_json(&self, method: &str, uri: &str, json: serde_json::Value) -> TestResponse {
		let request = Request::builder()
			.method(method)
			.uri(uri)
			.header("content-type", "application/json")
			.body(Body::from(json.to_string()))
			.unwrap();
		self.send(request).await
	}

	pub async fn post_raw(&self, uri: &str, body: &str) -> TestResponse {
		self.send(Request::post(uri).body(Body::from(body.to_string())).unwrap()).await
	}

	pub async fn send(&self, request: Request<Body>) -> TestResponse {
		let response = self.app().oneshot(request).await.unwrap();
		let status = response.status();
		let headers = response.headers().clone();
		let body = response.into_body().collect().await.unwrap().to_bytes();
		TestResponse { status, headers, body }
	}
}

pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl TestResponse {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	pub fn json(&self) -> serde_json::Value {
		serde_json::from_slice(&self.body).unwrap()
	}

	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

pub fn media_bytes(len: usize) -> Vec<u8> {
	(0..len).map(|i| u8::try_from(i % 251).unwrap()).collect()
}

pub fn canonical(path: &Path) -> PathBuf {
	std::fs::canonicalize(path).unwrap()
}
