use thiserror::Error;

pub type Result<T> = std::result::Result<T, TimelineError>;

#[derive(Error, Debug)]
pub enum TimelineError {
	/// None of the accepted payload shapes matched. Carries the error of the last attempt.
	#[error("Unparsable timeline payload: {0}")]
	Unparsable(#[source] serde_json::Error),

	#[error("Timeline payload contains no events")]
	Empty,
}
