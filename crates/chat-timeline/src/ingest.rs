use crate::error::{Result, TimelineError};
use crate::event::ChatEvent;
use crate::timeline::Timeline;
use serde::Deserialize;
use tracing::debug;

/// The JSON layouts a chat payload is accepted in, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
	/// `[ {event}, {event}, .. ]`
	List,
	/// `{ "messages": [ {event}, .. ] }`
	Envelope,
	/// `{event}`
	Single,
}

#[derive(Deserialize)]
struct MessagesEnvelope {
	messages: Vec<ChatEvent>,
}

impl PayloadShape {
	pub const ATTEMPT_ORDER: [Self; 3] = [Self::List, Self::Envelope, Self::Single];

	fn decode(self, raw: &[u8]) -> serde_json::Result<Vec<ChatEvent>> {
		match self {
			Self::List => serde_json::from_slice(raw),
			Self::Envelope => serde_json::from_slice::<MessagesEnvelope>(raw).map(|envelope| envelope.messages),
			Self::Single => serde_json::from_slice::<ChatEvent>(raw).map(|event| vec![event]),
		}
	}
}

/// Decode `raw` with the first shape that parses.
///
/// # Errors
/// `TimelineError::Unparsable` carrying the last attempt's error when no shape matches.
pub fn decode(raw: &[u8]) -> Result<(PayloadShape, Vec<ChatEvent>)> {
	let mut last_error = None;

	for shape in PayloadShape::ATTEMPT_ORDER {
		match shape.decode(raw) {
			Ok(events) => return Ok((shape, events)),
			Err(e) => {
				debug!(?shape, error = %e, "payload shape did not match");
				last_error = Some(e);
			}
		}
	}

	Err(TimelineError::Unparsable(
		last_error.unwrap_or_else(|| serde_json::Error::io(std::io::Error::other("no payload shapes to try"))),
	))
}

/// Build a timeline from a raw chat payload.
///
/// Tip amounts are extracted from each record's `raw_data` on a best-effort basis.
///
/// # Errors
/// `Unparsable` when no accepted shape matches, `Empty` when the payload holds no records.
pub fn ingest(raw: &[u8]) -> Result<Timeline> {
	let (shape, events) = decode(raw)?;
	if events.is_empty() {
		return Err(TimelineError::Empty);
	}

	let events: Vec<ChatEvent> = events.into_iter().map(ChatEvent::with_extracted_tip).collect();
	let tips = events.iter().filter(|e| e.is_tip()).count();
	debug!(?shape, events = events.len(), tips, "chat payload ingested");

	Ok(Timeline::from_events(events))
}
