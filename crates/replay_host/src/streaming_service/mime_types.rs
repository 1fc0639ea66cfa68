use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

const CONTENT_TYPES: &[(&str, &str)] = &[
	("mp4", "video/mp4"),
	("m4v", "video/mp4"),
	("webm", "video/webm"),
	("ogg", "video/ogg"),
	("ogv", "video/ogg"),
	("mkv", "video/x-matroska"),
	("avi", "video/x-msvideo"),
	("mov", "video/quicktime"),
	("ts", "video/mp2t"),
	("jpg", "image/jpeg"),
	("jpeg", "image/jpeg"),
	("png", "image/png"),
	("json", "application/json"),
];

/// Content type for a file, chosen by extension. Unknown extensions are served as octet-stream.
pub fn content_type_for(path: &Path) -> &'static str {
	path.extension()
		.and_then(|ext| ext.to_str())
		.and_then(|ext| CONTENT_TYPES.iter().find(|(known, _)| known.eq_ignore_ascii_case(ext)))
		.map_or(OCTET_STREAM, |&(_, content_type)| content_type)
}
