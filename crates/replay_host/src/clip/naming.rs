use chrono::{DateTime, Local};

/// Extension of every exported clip, independent of the source container
pub const CLIP_EXTENSION: &str = "mp4";

const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const MAX_FILE_NAME_BYTES: usize = 255;
/// Room left for the stem once `.mp4` is appended
const MAX_STEM_BYTES: usize = MAX_FILE_NAME_BYTES - CLIP_EXTENSION.len() - 1;

/// `clip_YYYYMMDD_HHMMSS` for the given wall-clock time
pub fn timestamp_name(now: DateTime<Local>) -> String {
	format!("clip_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Replace forbidden characters with `_`, trim and cap the length.
///
/// The cap is in bytes and lands on a character boundary, so the stem plus its
/// extension fits a 255-byte file name. Returns an empty string when nothing
/// usable is left.
pub fn sanitize_title(title: &str) -> String {
	let replaced: String = title.chars().map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c }).collect();
	let trimmed = replaced.trim();

	let mut end = trimmed.len().min(MAX_STEM_BYTES);
	while !trimmed.is_char_boundary(end) {
		end -= 1;
	}
	trimmed[..end].trim_end().to_string()
}

/// File stem for a clip: the sanitized title, or a timestamp name when the title is empty.
pub fn clip_file_stem(title: Option<&str>, now: DateTime<Local>) -> String {
	let sanitized = title.map(sanitize_title).unwrap_or_default();
	if sanitized.is_empty() {
		timestamp_name(now)
	} else {
		sanitized
	}
}

/// Encoder timestamp `HH:MM:SS.mmm`.
///
/// Milliseconds are rounded; a fraction that rounds up to a full second carries
/// into the seconds field. Negative and non-finite input is formatted as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_timestamp(seconds: f64) -> String {
	let total_millis = if seconds.is_finite() && seconds > 0.0 { (seconds * 1000.0).round() as u64 } else { 0 };

	let millis = total_millis % 1000;
	let total_secs = total_millis / 1000;
	let hours = total_secs / 3600;
	let minutes = (total_secs % 3600) / 60;
	let secs = total_secs % 60;

	format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}
