use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use hwmon_protocol::PlatformEvent;
use tracing::{trace, warn};

/// Unbounded FIFO of rendered event records.
///
/// The lock is held only for the push or pop itself; rendering happens
/// before the lock is taken and copying out after it is released.
#[derive(Debug, Default)]
pub struct EventQueue {
	records: Mutex<VecDeque<String>>,
}

impl EventQueue {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
		self.records.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Notification callback body: render, then enqueue.
	pub fn push_event(&self, event: &PlatformEvent) {
		match event.to_record() {
			Ok(record) => {
				trace!(kind = %event.kind, "queueing platform event");
				self.push(record);
			}
			Err(err) => warn!(kind = %event.kind, "dropping unrenderable event: {err}"),
		}
	}

	pub fn push(&self, record: String) {
		self.lock().push_back(record);
	}

	pub fn pop(&self) -> Option<String> {
		self.lock().pop_front()
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Discard every pending record, returning how many were dropped.
	pub fn clear(&self) -> usize {
		let dropped = std::mem::take(&mut *self.lock());
		dropped.len()
	}
}
