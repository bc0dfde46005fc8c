use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hwmon_core::{Monitor, MonitorConfig, SubscriptionId, SysfsMonitor};
use hwmon_protocol::PlatformEvent;
use tracing::{debug, warn};

use crate::error::BridgeError;
use crate::queue::EventQueue;

/// The object behind an opaque `void*` handle.
///
/// Owns the monitor, the event queue and the subscription that feeds it.
/// Every method takes `&self`, so calls on one handle from several caller
/// threads are safe.
pub struct HwmonHandle {
	monitor: Mutex<Box<dyn Monitor>>,
	queue: Arc<EventQueue>,
	subscription: SubscriptionId,
}

impl HwmonHandle {
	/// Open the default sysfs monitor configured from the environment.
	#[tracing::instrument(level = "debug")]
	pub fn open() -> Result<Self, BridgeError> {
		let monitor = SysfsMonitor::open(MonitorConfig::from_env())?;
		Ok(Self::from_monitor(Box::new(monitor)))
	}

	/// Wrap any monitor and route its platform events into a fresh queue.
	pub fn from_monitor(monitor: Box<dyn Monitor>) -> Self {
		let queue = Arc::new(EventQueue::new());
		let subscription = {
			let q = queue.clone();
			monitor.subscribe_events(Box::new(move |event: &PlatformEvent| q.push_event(event)))
		};
		Self {
			monitor: Mutex::new(monitor),
			queue,
			subscription,
		}
	}

	/// Hand ownership to a C caller. Reclaimed by `hwmon_destroy`.
	pub fn into_raw(self) -> *mut HwmonHandle {
		Box::into_raw(Box::new(self))
	}

	fn monitor(&self) -> MutexGuard<'_, Box<dyn Monitor>> {
		self.monitor.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn update(&self) {
		self.monitor().update();
	}

	/// Current report, or the empty string if it cannot be produced.
	pub fn report(&self) -> String {
		let report = self.monitor().report();
		report.unwrap_or_else(|err| {
			warn!("report unavailable: {err}");
			String::new()
		})
	}

	pub fn start_event_listener(&self) -> bool {
		self.monitor().start_event_listener()
	}

	pub fn stop_event_listener(&self) {
		self.monitor().stop_event_listener();
	}

	/// Take the oldest pending event record, never waiting for a new one.
	pub fn poll_event(&self) -> Option<String> {
		self.queue.pop()
	}

	pub fn start_key_monitor(&self) {
		self.monitor().start_key_monitor();
	}

	pub fn stop_key_monitor(&self) {
		self.monitor().stop_key_monitor();
	}

	/// Fresh key status as JSON, or the empty string if rendering fails.
	pub fn key_status(&self) -> String {
		let status = self.monitor().key_status();
		status.to_json().unwrap_or_else(|err| {
			warn!("key status unavailable: {err}");
			String::new()
		})
	}
}

impl Drop for HwmonHandle {
	fn drop(&mut self) {
		let monitor = self.monitor.get_mut().unwrap_or_else(PoisonError::into_inner);
		monitor.unsubscribe_events(self.subscription);
		let discarded = self.queue.clear();
		debug!(discarded, "hardware monitor handle released");
	}
}
