use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Event type tags emitted by the platform event listener.
pub mod event_type {
	/// A notification delivered by the platform event source.
	pub const WMI_EVENT: &str = "WMI_EVENT";
	/// Emitted once when the listener connects.
	pub const WMI_TEST: &str = "WMI_TEST";
	/// Emitted once when a running listener is stopped.
	pub const WMI_CLOSE: &str = "WMI_CLOSE";
	/// The event source is missing or refused the connection.
	pub const WMI_UNAVAILABLE: &str = "WMI_UNAVAILABLE";
}

/// One asynchronous notification raised by the monitor.
///
/// Rendered as `{"type":..,"data":[..]|null,"message":..,"details":..}`.
/// Absent message or details render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEvent {
	#[serde(rename = "type")]
	pub kind: String,
	pub data: Option<Vec<i32>>,
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub details: String,
}

impl PlatformEvent {
	pub fn new(kind: impl Into<String>) -> Self {
		Self {
			kind: kind.into(),
			data: None,
			message: String::new(),
			details: String::new(),
		}
	}

	pub fn with_data(mut self, data: impl Into<Vec<i32>>) -> Self {
		self.data = Some(data.into());
		self
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = message.into();
		self
	}

	pub fn with_details(mut self, details: impl Into<String>) -> Self {
		self.details = details.into();
		self
	}

	/// Serialize into the text record handed to pollers.
	pub fn to_record(&self) -> Result<String, ProtocolError> {
		serde_json::to_string(self).map_err(ProtocolError::from)
	}

	pub fn from_record(record: &str) -> Result<Self, ProtocolError> {
		serde_json::from_str(record).map_err(ProtocolError::from)
	}
}
