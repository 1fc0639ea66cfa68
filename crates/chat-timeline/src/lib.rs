pub mod error;
pub mod event;
pub mod ingest;
pub mod timeline;
pub mod tip;

pub use error::{Result, TimelineError};
pub use event::{Author, ChatEvent, TierInfo};
pub use ingest::{ingest, PayloadShape};
pub use timeline::Timeline;
pub use tip::extract_tip_amount;

/// Playback-relative time in seconds from the start of the media item
pub type Seconds = f64;
