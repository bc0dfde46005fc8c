use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Point-in-time caps/num lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
	pub caps_lock: bool,
	pub num_lock: bool,
	/// Local time of the read, rendered as RFC 3339.
	pub timestamp: DateTime<Local>,
}

impl KeyStatus {
	pub fn now(caps_lock: bool, num_lock: bool) -> Self {
		Self {
			caps_lock,
			num_lock,
			timestamp: Local::now(),
		}
	}

	/// Compares lock state only, ignoring when it was read.
	pub fn same_state(&self, other: &Self) -> bool {
		self.caps_lock == other.caps_lock && self.num_lock == other.num_lock
	}

	pub fn to_json(&self) -> Result<String, ProtocolError> {
		serde_json::to_string(self).map_err(ProtocolError::from)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn renders_booleans_and_iso_timestamp() {
		let timestamp = Local.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap();
		let status = KeyStatus {
			caps_lock: true,
			num_lock: false,
			timestamp,
		};
		let json = status.to_json().unwrap();
		assert!(json.starts_with(r#"{"caps_lock":true,"num_lock":false,"timestamp":"2026-03-01T12:30:05"#));

		let value: serde_json::Value = serde_json::from_str(&json).unwrap();
		let parsed = DateTime::parse_from_rfc3339(value["timestamp"].as_str().unwrap()).unwrap();
		assert_eq!(parsed, timestamp);
	}

	#[test]
	fn same_state_ignores_timestamp() {
		let a = KeyStatus::now(true, true);
		let mut b = a;
		b.timestamp = b.timestamp + chrono::Duration::seconds(3);
		assert!(a.same_state(&b));
		b.num_lock = false;
		assert!(!a.same_state(&b));
	}
}
