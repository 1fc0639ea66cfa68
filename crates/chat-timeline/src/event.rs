use crate::tip;
use crate::Seconds;
use serde::{Deserialize, Deserializer, Serialize};

/// Subscription tier attached to a chat author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierInfo {
	#[serde(default)]
	pub tier_id: String,
	#[serde(default)]
	pub tier_color: String,
	#[serde(default)]
	pub tier_name: String,
}

/// Author of a chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub images: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub badges: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tier_info: Option<TierInfo>,
}

/// A single timestamped chat or tip record.
///
/// `time_in_seconds` is the playback-relative offset every ordering and window
/// query is keyed on. A missing or `null` offset places the record at `0.0`;
/// every other field falls back to an empty value when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
	#[serde(default)]
	pub message_id: String,
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub message_type: String,
	/// Wall-clock epoch timestamp of the original message
	#[serde(default)]
	pub timestamp: i64,
	#[serde(default, deserialize_with = "lenient_offset")]
	pub time_in_seconds: Seconds,
	#[serde(default)]
	pub time_text: String,
	#[serde(default)]
	pub author: Author,
	/// Opaque upstream payload, kept verbatim for tip extraction
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub raw_data: String,
	#[serde(default, deserialize_with = "lenient_amount", skip_serializing_if = "Option::is_none")]
	pub tip_amount: Option<i64>,
}

impl ChatEvent {
	/// Minimal event at the given offset, mostly useful for building fixtures
	pub fn at(message_id: impl Into<String>, time_in_seconds: Seconds) -> Self {
		Self {
			message_id: message_id.into(),
			message: String::new(),
			message_type: String::new(),
			timestamp: 0,
			time_in_seconds,
			time_text: String::new(),
			author: Author::default(),
			raw_data: String::new(),
			tip_amount: None,
		}
	}

	pub fn is_tip(&self) -> bool {
		self.tip_amount.is_some()
	}

	/// Fill in `tip_amount` from the raw payload, keeping any existing amount on a miss
	pub(crate) fn with_extracted_tip(mut self) -> Self {
		if let Some(amount) = tip::extract_tip_amount(&self.raw_data) {
			self.tip_amount = Some(amount);
		}
		self
	}
}

fn lenient_offset<'de, D>(deserializer: D) -> Result<Seconds, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Seconds>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	let number = Option::<serde_json::Number>::deserialize(deserializer)?;
	Ok(number.as_ref().and_then(tip::number_to_amount))
}
