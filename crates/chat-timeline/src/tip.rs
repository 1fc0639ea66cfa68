//! Tip amount extraction from the opaque `raw_data` payload.
//!
//! Expected nesting, each string level being JSON encoded again:
//!
//! ```text
//! raw_data (string) -> { "event": string }
//!   event -> { "chatRoomMessage": { "attachments": [ { "metadata": string }, .. ] } }
//!     metadata -> { "amount": number }
//! ```
//!
//! Every step is speculative. A miss at any level yields `None`.

use serde::Deserialize;
use serde_json::{Number, Value};

#[derive(Deserialize)]
struct Envelope {
	event: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventBody {
	chat_room_message: RoomMessage,
}

#[derive(Deserialize)]
struct RoomMessage {
	attachments: Vec<Value>,
}

#[derive(Deserialize)]
struct Attachment {
	metadata: String,
}

#[derive(Deserialize)]
struct AttachmentMetadata {
	amount: Number,
}

/// Returns the amount of the first attachment carrying one.
pub fn extract_tip_amount(raw_data: &str) -> Option<i64> {
	if raw_data.is_empty() {
		return None;
	}

	let envelope: Envelope = serde_json::from_str(raw_data).ok()?;
	let body: EventBody = serde_json::from_str(&envelope.event).ok()?;

	body.chat_room_message.attachments.into_iter().find_map(attachment_amount)
}

fn attachment_amount(attachment: Value) -> Option<i64> {
	let attachment: Attachment = serde_json::from_value(attachment).ok()?;
	let metadata: AttachmentMetadata = serde_json::from_str(&attachment.metadata).ok()?;
	number_to_amount(&metadata.amount)
}

/// Whole-unit amount of a JSON number; fractional parts are truncated
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub(crate) fn number_to_amount(number: &Number) -> Option<i64> {
	number.as_i64().or_else(|| {
		number
			.as_f64()
			.filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
			.map(|f| f.trunc() as i64)
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn raw_with_attachments(attachments: Value) -> String {
		let event = json!({ "chatRoomMessage": { "attachments": attachments } }).to_string();
		json!({ "event": event }).to_string()
	}

	fn tip_attachment(amount: Value) -> Value {
		json!({ "metadata": json!({ "amount": amount }).to_string() })
	}

	#[test]
	fn extracts_amount_from_nested_payload() {
		let raw = raw_with_attachments(json!([tip_attachment(json!(500))]));
		assert_eq!(extract_tip_amount(&raw), Some(500));
	}

	#[test]
	fn skips_attachments_without_amount() {
		let raw = raw_with_attachments(json!([
			{ "kind": "sticker" },
			{ "metadata": "not json" },
			{ "metadata": json!({ "currency": "usd" }).to_string() },
			tip_attachment(json!(12.75)),
		]));
		assert_eq!(extract_tip_amount(&raw), Some(12));
	}

	#[test]
	fn missing_levels_yield_none() {
		assert_eq!(extract_tip_amount(""), None);
		assert_eq!(extract_tip_amount("plain text"), None);
		assert_eq!(extract_tip_amount(&json!({ "other": 1 }).to_string()), None);
		assert_eq!(extract_tip_amount(&json!({ "event": 42 }).to_string()), None);
		assert_eq!(extract_tip_amount(&json!({ "event": "{broken" }).to_string()), None);
		assert_eq!(extract_tip_amount(&json!({ "event": json!({ "chatRoomMessage": {} }).to_string() }).to_string()), None);
		assert_eq!(extract_tip_amount(&raw_with_attachments(json!([]))), None);
		assert_eq!(extract_tip_amount(&raw_with_attachments(json!("nope"))), None);
	}

	#[test]
	fn non_numeric_amount_yields_none() {
		let raw = raw_with_attachments(json!([tip_attachment(json!("500"))]));
		assert_eq!(extract_tip_amount(&raw), None);
	}
}
