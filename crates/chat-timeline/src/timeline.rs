use crate::event::ChatEvent;
use crate::Seconds;
use serde::Serialize;
use std::cmp::Ordering;

/// Immutable sequence of chat events sorted ascending by `time_in_seconds`.
///
/// Built wholesale from one payload and never mutated afterwards; a new payload
/// produces a new `Timeline`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
	events: Vec<ChatEvent>,
}

/// Offsets compare with `total_cmp`. Ties fall back to the epoch timestamp and
/// then the message id, so the order does not depend on input order.
fn playback_order(a: &ChatEvent, b: &ChatEvent) -> Ordering {
	a.time_in_seconds
		.total_cmp(&b.time_in_seconds)
		.then_with(|| a.timestamp.cmp(&b.timestamp))
		.then_with(|| a.message_id.cmp(&b.message_id))
}

impl Timeline {
	pub fn from_events(mut events: Vec<ChatEvent>) -> Self {
		events.sort_by(playback_order);
		Self { events }
	}

	pub fn events(&self) -> &[ChatEvent] {
		&self.events
	}

	pub fn len(&self) -> usize {
		self.events.len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Events with `current_time - window_size <= offset <= current_time`, in playback order.
	///
	/// Never fails: an empty timeline, a window before the first event or a
	/// negative/NaN window all produce an empty slice.
	pub fn window(&self, current_time: Seconds, window_size: Seconds) -> &[ChatEvent] {
		if current_time.is_nan() || window_size.is_nan() {
			return &[];
		}

		let lower = current_time - window_size;
		let start = self.events.partition_point(|e| e.time_in_seconds < lower);
		let end = self.events.partition_point(|e| e.time_in_seconds <= current_time);

		if start >= end {
			return &[];
		}
		&self.events[start..end]
	}

	pub fn tips(&self) -> impl Iterator<Item = &ChatEvent> {
		self.events.iter().filter(|e| e.is_tip())
	}
}
