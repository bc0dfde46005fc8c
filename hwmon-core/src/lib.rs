//! Hardware monitor: sensor tree, platform event listener and key state.
//!
//! [`Monitor`] is the seam the native boundary talks to. [`SysfsMonitor`]
//! is the Linux implementation backed by `/sys` and `/proc`.

mod acpi;
pub mod config;
mod error;
mod keys;
mod monitor;
mod notify;
mod sensors;
mod sysfs;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use monitor::SysfsMonitor;
pub use notify::{Callback, NotificationHub, SubscriptionId};

use hwmon_protocol::{KeyStatus, PlatformEvent};

pub type EventCallback = Callback<PlatformEvent>;

/// Everything the boundary layer needs from a monitor.
///
/// Event callbacks may be invoked from monitor-owned threads, so they must
/// be `Send + Sync` and must return promptly.
pub trait Monitor: Send {
	/// Refresh every sensor reading.
	fn update(&mut self);

	/// JSON report of the readings taken by the last [`Monitor::update`].
	fn report(&self) -> Result<String, MonitorError>;

	/// Begin delivering platform events. Returns whether the listener is active.
	fn start_event_listener(&mut self) -> bool;

	/// Stop delivering platform events. No listener event is delivered after
	/// this returns.
	fn stop_event_listener(&mut self);

	fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId;

	/// After this returns the callback registered under `id` is never invoked again.
	fn unsubscribe_events(&self, id: SubscriptionId);

	fn start_key_monitor(&mut self);

	fn stop_key_monitor(&mut self);

	/// Fresh caps/num lock snapshot.
	fn key_status(&self) -> KeyStatus;
}
