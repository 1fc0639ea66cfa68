use super::naming::format_timestamp;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

/// One clip extraction: `duration` seconds of `source` starting at `start`, written to `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
	pub source: PathBuf,
	pub start: f64,
	pub duration: f64,
	pub output: PathBuf,
}

#[derive(Debug, Error)]
pub enum EncodeError {
	#[error("failed to launch {program}: {source}")]
	Launch {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("{program} exited with {status}")]
	Exit { program: String, status: String, output: String },
}

impl EncodeError {
	/// Captured encoder output, empty when the process never started
	pub fn output(&self) -> &str {
		match self {
			Self::Launch { .. } => "",
			Self::Exit { output, .. } => output,
		}
	}
}

/// External transcoder used to cut clips.
#[async_trait]
pub trait Encoder: Send + Sync {
	/// Name shown in remediation messages
	fn program(&self) -> &str;

	/// Whether the encoder can be invoked at all
	async fn is_available(&self) -> bool;

	/// Run the job to completion.
	async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError>;
}

/// `ffmpeg` resolved by name on `PATH` (or an explicit path to the binary).
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
	program: String,
}

impl FfmpegEncoder {
	pub fn new(program: impl Into<String>) -> Self {
		Self { program: program.into() }
	}

	/// Seek before the input for a fast seek, then re-encode to H.264/AAC and overwrite the target.
	pub fn arguments(job: &EncodeJob) -> Vec<OsString> {
		let mut args: Vec<OsString> = Vec::with_capacity(17);
		args.extend(["-ss".into(), format_timestamp(job.start).into()]);
		args.extend(["-i".into(), job.source.clone().into_os_string()]);
		args.extend(["-t".into(), format_timestamp(job.duration).into()]);
		args.extend(["-c:v", "libx264", "-c:a", "aac", "-strict", "experimental", "-b:a", "128k", "-y"].map(OsString::from));
		args.push(job.output.clone().into_os_string());
		args
	}

	/// Full path of the binary, if it can be found
	pub fn locate(&self) -> Option<PathBuf> {
		let program = Path::new(&self.program);
		if program.components().count() > 1 {
			return is_executable(program).then(|| program.to_path_buf());
		}

		let search_path = std::env::var_os("PATH")?;
		std::env::split_paths(&search_path).find_map(|dir| {
			executable_names(&self.program)
				.into_iter()
				.map(|name| dir.join(name))
				.find(|candidate| is_executable(candidate))
		})
	}
}

impl Default for FfmpegEncoder {
	fn default() -> Self {
		Self::new("ffmpeg")
	}
}

#[async_trait]
impl Encoder for FfmpegEncoder {
	fn program(&self) -> &str {
		&self.program
	}

	/// `PATH` lookup stats the filesystem, so it runs on the blocking pool.
	async fn is_available(&self) -> bool {
		let encoder = self.clone();
		tokio::task::spawn_blocking(move || encoder.locate().is_some()).await.unwrap_or(false)
	}

	#[instrument(skip(self, job), fields(output = %job.output.display()))]
	async fn encode(&self, job: &EncodeJob) -> Result<(), EncodeError> {
		let args = Self::arguments(job);
		debug!(program = %self.program, ?args, "running encoder");

		let output = Command::new(&self.program)
			.args(&args)
			.stdin(Stdio::null())
			.output()
			.await
			.map_err(|source| EncodeError::Launch {
				program: self.program.clone(),
				source,
			})?;

		if output.status.success() {
			return Ok(());
		}

		let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
		combined.push_str(&String::from_utf8_lossy(&output.stderr));

		Err(EncodeError::Exit {
			program: self.program.clone(),
			status: output.status.to_string(),
			output: combined,
		})
	}
}

fn executable_names(program: &str) -> Vec<String> {
	if cfg!(windows) && Path::new(program).extension().is_none() {
		vec![format!("{program}.exe"), program.to_string()]
	} else {
		vec![program.to_string()]
	}
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
	use std::os::unix::fs::PermissionsExt;
	path.metadata().is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
	path.is_file()
}
