//! `Range: bytes=<start>-<end>` parsing against a known resource length.
//!
//! Single ranges only. The suffix form `bytes=-N` is not special-cased: a missing
//! start is read as `0`, so `bytes=-500` selects `0-500` rather than the last 500 bytes.

use thiserror::Error;

const UNIT_PREFIX: &str = "bytes=";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
	#[error("Malformed range header: {0:?}")]
	Malformed(String),

	#[error("Range start {start} is beyond resource length {total}")]
	Unsatisfiable { start: u64, total: u64 },
}

/// Inclusive byte interval, `start <= end < total`. Only produced by [`parse_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
	start: u64,
	end: u64,
}

impl ByteRange {
	pub const fn start(&self) -> u64 {
		self.start
	}

	pub const fn end(&self) -> u64 {
		self.end
	}

	/// Number of bytes covered, `end - start + 1`
	pub const fn len(&self) -> u64 {
		self.end - self.start + 1
	}

	pub const fn is_empty(&self) -> bool {
		false
	}

	/// `Content-Range` header value for this interval
	pub fn content_range(&self, total: u64) -> String {
		format!("bytes {}-{}/{}", self.start, self.end, total)
	}
}

/// What a request's `Range` header selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
	/// No header, or an empty one: serve everything with a 200
	Whole,
	/// A satisfiable single range: serve it with a 206
	Partial(ByteRange),
}

/// Parse an optional `Range` header value against a resource of `total` bytes.
///
/// # Errors
/// `Malformed` when the value is not a single `bytes=<digits?>-<digits?>` range
/// (or `start > end`), `Unsatisfiable` when `start >= total`.
pub fn parse_range(header: Option<&str>, total: u64) -> Result<RangeSelection, RangeError> {
	let value = match header.map(str::trim) {
		None | Some("") => return Ok(RangeSelection::Whole),
		Some(value) => value,
	};

	let malformed = || RangeError::Malformed(value.to_string());

	let spec = value
		.get(..UNIT_PREFIX.len())
		.filter(|unit| unit.eq_ignore_ascii_case(UNIT_PREFIX))
		.map(|_| &value[UNIT_PREFIX.len()..])
		.ok_or_else(malformed)?;

	if spec.contains(',') {
		return Err(malformed());
	}

	let (start, end) = spec.split_once('-').ok_or_else(malformed)?;
	let start = parse_bound(start).map_err(|()| malformed())?;
	let end = parse_bound(end).map_err(|()| malformed())?;

	let start = start.unwrap_or(0);
	if start >= total {
		return Err(RangeError::Unsatisfiable { start, total });
	}

	let last = total - 1;
	let end = end.map_or(last, |end| end.min(last));
	if start > end {
		return Err(malformed());
	}

	Ok(RangeSelection::Partial(ByteRange { start, end }))
}

fn parse_bound(raw: &str) -> Result<Option<u64>, ()> {
	let raw = raw.trim();
	if raw.is_empty() {
		return Ok(None);
	}
	if !raw.bytes().all(|b| b.is_ascii_digit()) {
		return Err(());
	}
	raw.parse().map(Some).map_err(|_| ())
}
