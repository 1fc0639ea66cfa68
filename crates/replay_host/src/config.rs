use crate::clip::StorageOption;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Folder created under the platform config directory when `APP_DATA_DIR` is unset
pub const APP_DATA_FOLDER: &str = "replay-host";

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log level
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,

	/// Server host
	#[arg(long, env = "HOST", default_value = "127.0.0.1")]
	pub host: String,

	/// Server port
	#[arg(long, env = "PORT", default_value = "8080")]
	pub port: u16,

	/// Streaming Chunk Size
	#[arg(long, env = "BUFFER_SIZE", default_value = "65536")]
	pub chunk_size: usize,

	/// Streaming Max Chunk Size
	#[arg(long, env = "MAX_CHUNKS_IN_FLIGHT", default_value = "5")]
	pub max_chunks: usize,

	/// Largest accepted timeline upload, in megabytes
	#[arg(long, env = "MAX_PAYLOAD_MB", default_value = "64")]
	pub max_payload_mb: usize,

	/// Application data directory (defaults to `<config dir>/replay-host`)
	#[arg(long, env = "APP_DATA_DIR")]
	pub app_data_dir: Option<PathBuf>,

	/// Encoder binary, resolved on PATH unless a path is given
	#[arg(long, env = "ENCODER_BIN", default_value = "ffmpeg")]
	pub encoder_bin: String,

	/// Where exported clips are written
	#[arg(long, env = "CLIP_STORAGE", value_enum, default_value_t = StorageOption::VideosDir)]
	pub clip_storage: StorageOption,

	/// Clip directory used by the custom-dir storage option
	#[arg(long, env = "CLIP_DIR")]
	pub clip_dir: Option<PathBuf>,

	/// Media file loaded at startup
	#[arg(long, env = "MEDIA_PATH")]
	pub media_path: Option<PathBuf>,

	/// Timeline file loaded at startup, after the media
	#[arg(long, env = "CHAT_PATH")]
	pub chat_path: Option<PathBuf>,
}

impl Config {
	pub fn resolved_app_data_dir(&self) -> PathBuf {
		self.app_data_dir
			.clone()
			.or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DATA_FOLDER)))
			.unwrap_or_else(|| PathBuf::from(format!(".{APP_DATA_FOLDER}")))
	}

	pub const fn max_payload_bytes(&self) -> usize {
		self.max_payload_mb.saturating_mul(1024 * 1024)
	}

	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_json: false,
			rust_log: None,
			host: "127.0.0.1".to_string(),
			port: 8080,
			chunk_size: 65536,
			max_chunks: 5,
			max_payload_mb: 64,
			app_data_dir: None,
			encoder_bin: "ffmpeg".to_string(),
			clip_storage: StorageOption::VideosDir,
			clip_dir: None,
			media_path: None,
			chat_path: None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flags_override_defaults() {
		let config = Config::try_parse_from([
			"replay_host",
			"--port",
			"9000",
			"--clip-storage",
			"custom-dir",
			"--clip-dir",
			"/exports",
			"--app-data-dir",
			"/var/lib/replay",
		])
		.unwrap();

		assert_eq!(config.port, 9000);
		assert_eq!(config.clip_storage, StorageOption::CustomDir);
		assert_eq!(config.clip_dir, Some(PathBuf::from("/exports")));
		assert_eq!(config.resolved_app_data_dir(), PathBuf::from("/var/lib/replay"));
	}

	#[test]
	fn payload_limit_is_in_megabytes() {
		let config = Config {
			max_payload_mb: 2,
			..Config::default()
		};
		assert_eq!(config.max_payload_bytes(), 2 * 1024 * 1024);
		assert_eq!(config.bind_address(), "127.0.0.1:8080");
	}
}
