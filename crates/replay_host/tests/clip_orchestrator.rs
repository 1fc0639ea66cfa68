mod common;

use axum::http::StatusCode;
use common::{canonical, Harness, RecordingEncoder};
use replay_host::clip::{ClipErrorKind, ClipRequest, StorageOption};
use serde_json::json;
use std::path::PathBuf;

fn request(source: Option<PathBuf>, start_time: f64, duration: f64, title: &str) -> ClipRequest {
	ClipRequest {
		source,
		start_time,
		duration,
		title: Some(title.to_string()),
	}
}

#[tokio::test]
async fn non_positive_duration_never_invokes_encoder() {
	let harness = Harness::new(RecordingEncoder::working());
	let source = harness.write_media("vods/a.mp4", 10);

	for duration in [0.0, -5.0, f64::NAN] {
		let result = harness.state.clips.create_clip(request(Some(source.clone()), 1.0, duration, "x")).await;
		assert!(!result.success);
		assert_eq!(result.error_kind, Some(ClipErrorKind::InvalidDuration));
	}

	assert!(harness.encoder.jobs().is_empty());
}

#[tokio::test]
async fn invalid_start_and_missing_source_are_rejected() {
	let harness = Harness::new(RecordingEncoder::working());
	let source = harness.write_media("vods/a.mp4", 10);

	let negative = harness.state.clips.create_clip(request(Some(source), -1.0, 5.0, "x")).await;
	assert_eq!(negative.error_kind, Some(ClipErrorKind::InvalidStartOffset));

	let no_source = harness.state.clips.create_clip(request(None, 0.0, 5.0, "x")).await;
	assert_eq!(no_source.error_kind, Some(ClipErrorKind::NoSourceLoaded));
	assert_eq!(no_source.error.as_deref(), Some("No source video is currently loaded"));

	assert!(harness.encoder.jobs().is_empty());
}

#[tokio::test]
async fn missing_encoder_is_reported_without_invocation() {
	let harness = Harness::new(RecordingEncoder::missing());
	let source = harness.write_media("vods/a.mp4", 10);

	let result = harness.state.clips.create_clip(request(Some(source), 0.0, 5.0, "x")).await;
	assert!(!result.success);
	assert_eq!(result.error_kind, Some(ClipErrorKind::EncoderUnavailable));
	assert!(result.error.unwrap().contains("ffmpeg is not installed or not in PATH"));
	assert!(harness.encoder.jobs().is_empty());
}

#[tokio::test]
async fn clip_is_written_next_to_source() {
	let harness = Harness::new(RecordingEncoder::working());
	let source = harness.write_media("vods/a.mp4", 10);
	harness.state.clips.set_storage_option(StorageOption::SourceVideoDir, None).await;

	let result = harness.state.clips.create_clip(request(Some(source.clone()), 12.5, 30.0, " a/b:c ")).await;
	assert!(result.success, "{:?}", result.error);

	let expected = canonical(&harness.path("vods/clips")).join("a_b_c.mp4");
	assert_eq!(result.file_path, Some(expected.clone()));
	assert!(expected.is_file());

	let jobs = harness.encoder.jobs();
	assert_eq!(jobs.len(), 1);
	assert_eq!(jobs[0].source, source);
	assert_eq!(jobs[0].start, 12.5);
	assert_eq!(jobs[0].duration, 30.0);
}

#[tokio::test]
async fn untitled_clip_gets_timestamp_name() {
	let harness = Harness::new(RecordingEncoder::working());
	let source = harness.write_media("vods/a.mp4", 10);

	let result = harness.state.clips.create_clip(request(Some(source), 0.0, 1.0, "")).await;
	let path = result.file_path.unwrap();
	let name = path.file_name().unwrap().to_string_lossy().into_owned();

	assert!(name.starts_with("clip_"), "{name}");
	assert!(name.ends_with(".mp4"), "{name}");
	assert_eq!(name.len(), "clip_YYYYMMDD_HHMMSS.mp4".len());
	assert!(path.starts_with(canonical(&harness.path("home")).join("replay-clips")));
}

#[tokio::test]
async fn encoder_failure_carries_its_output() {
	let harness = Harness::new(RecordingEncoder::failing("Unknown encoder 'libx264'"));
	let source = harness.write_media("vods/a.mp4", 10);

	let result = harness.state.clips.create_clip(request(Some(source), 0.0, 1.0, "x")).await;
	assert!(!result.success);
	assert_eq!(result.error_kind, Some(ClipErrorKind::EncodingFailed));
	assert!(result.error.unwrap().contains("Unknown encoder 'libx264'"));
	assert_eq!(harness.encoder.jobs().len(), 1);
}

#[tokio::test]
async fn uncreatable_output_directory_is_reported() {
	let harness = Harness::new(RecordingEncoder::working());
	let source = harness.write_media("vods/a.mp4", 10);
	let blocker = harness.write_media("blocker", 1);
	harness.state.clips.set_storage_option(StorageOption::CustomDir, Some(blocker.join("out"))).await;

	let result = harness.state.clips.create_clip(request(Some(source), 0.0, 1.0, "x")).await;
	assert_eq!(result.error_kind, Some(ClipErrorKind::DirectoryCreateFailed));
	assert!(harness.encoder.jobs().is_empty());
}

#[tokio::test]
async fn saved_clips_are_listed_sorted_and_filtered() {
	let harness = Harness::new(RecordingEncoder::working());
	let custom = harness.path("exports");
	harness.state.clips.set_storage_option(StorageOption::CustomDir, Some(custom.clone())).await;

	harness.write_media("exports/b.webm", 1);
	harness.write_media("exports/notes.txt", 1);
	harness.write_media("appdata/clips/a.mp4", 1);
	harness.write_media("home/Videos/replay-clips/c.MOV", 1);

	let clips = harness.state.clips.list_clips(None).await;
	let names: Vec<String> = clips.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();

	assert_eq!(names.len(), 3, "{names:?}");
	assert!(names.contains(&"a.mp4".to_string()));
	assert!(names.contains(&"b.webm".to_string()));
	assert!(names.contains(&"c.MOV".to_string()));

	let mut sorted = clips.clone();
	sorted.sort();
	assert_eq!(clips, sorted);
}

#[tokio::test]
async fn custom_storage_over_http() {
	let harness = Harness::new(RecordingEncoder::working());
	let media = harness.write_media("vods/a.mp4", 10);
	harness.send_json("POST", "/api/media", json!({ "path": media })).await;

	let exports = harness.path("exports");
	let storage = harness
		.send_json("PUT", "/api/clips/storage", json!({ "option": "custom_dir", "custom_dir": exports }))
		.await;
	assert_eq!(storage.status, StatusCode::OK);
	assert_eq!(storage.json()["option"], "custom_dir");

	// An empty directory keeps the previously configured one.
	harness.send_json("PUT", "/api/clips/storage", json!({ "option": "custom_dir", "custom_dir": "" })).await;
	let dir = harness.get("/api/clips/dir").await.json();
	assert_eq!(dir["dir"], json!(exports));

	let created = harness.send_json("POST", "/api/clips", json!({ "start_time": 3.0, "duration": 2.0, "title": "highlight" })).await;
	assert_eq!(created.status, StatusCode::OK);
	let body = created.json();
	assert_eq!(body["success"], true, "{body}");
	assert_eq!(body["filePath"], json!(canonical(&exports).join("highlight.mp4")));

	let listed = harness.get("/api/clips").await.json();
	assert_eq!(listed["clips"], json!([canonical(&exports).join("highlight.mp4")]));
}

#[tokio::test]
async fn clip_request_while_idle_is_a_failed_result() {
	let harness = Harness::new(RecordingEncoder::working());

	let response = harness.send_json("POST", "/api/clips", json!({ "start_time": 0.0, "duration": 2.0 })).await;
	assert_eq!(response.status, StatusCode::OK);

	let body = response.json();
	assert_eq!(body["success"], false);
	assert_eq!(body["errorKind"], "no_source_loaded");
}
