use std::sync::Arc;

use hwmon_protocol::{KeyStatus, PlatformEvent, event_type, render_report};
use tracing::{debug, info, warn};

use crate::acpi::AcpiListener;
use crate::keys::{KeyMonitor, read_key_status};
use crate::sensors::SensorTree;
use crate::{Callback, EventCallback, Monitor, MonitorConfig, MonitorError, NotificationHub, SubscriptionId};

/// Linux monitor reading `/sys` and `/proc`, with acpid as the platform
/// event source.
pub struct SysfsMonitor {
	config: MonitorConfig,
	sensors: SensorTree,
	events: Arc<NotificationHub<PlatformEvent>>,
	key_events: Arc<NotificationHub<KeyStatus>>,
	listener: Option<AcpiListener>,
	key_monitor: Option<KeyMonitor>,
}

impl SysfsMonitor {
	/// Discover sensors and take the first reading.
	#[tracing::instrument(skip_all, fields(sysfs_root = %config.sysfs_root.display()))]
	pub fn open(config: MonitorConfig) -> Result<Self, MonitorError> {
		if !config.sysfs_root.is_dir() {
			return Err(MonitorError::NotAvailable {
				path: config.sysfs_root.clone(),
			});
		}
		let sensors = SensorTree::discover(&config);
		info!(hardware = sensors.hardware().len(), "hardware monitor opened");
		Ok(Self {
			config,
			sensors,
			events: Arc::new(NotificationHub::new()),
			key_events: Arc::new(NotificationHub::new()),
			listener: None,
			key_monitor: None,
		})
	}

	/// Notified from the key monitor thread whenever caps/num lock changes.
	pub fn subscribe_key_status(&self, callback: Callback<KeyStatus>) -> SubscriptionId {
		self.key_events.subscribe(callback)
	}

	pub fn unsubscribe_key_status(&self, id: SubscriptionId) {
		self.key_events.unsubscribe(id);
	}

	pub fn is_listening(&self) -> bool {
		self.listener.as_ref().is_some_and(|l| !l.is_finished())
	}

	pub fn is_monitoring_keys(&self) -> bool {
		self.key_monitor.is_some()
	}
}

impl Monitor for SysfsMonitor {
	#[tracing::instrument(level = "debug", skip_all)]
	fn update(&mut self) {
		self.sensors.update();
	}

	fn report(&self) -> Result<String, MonitorError> {
		Ok(render_report(self.sensors.hardware())?)
	}

	#[tracing::instrument(skip_all, fields(socket = %self.config.acpi_socket.display()))]
	fn start_event_listener(&mut self) -> bool {
		match self.listener.take() {
			Some(listener) if !listener.is_finished() => {
				self.listener = Some(listener);
				return true;
			}
			Some(lost) => {
				debug!("reconnecting platform event listener");
				lost.stop();
			}
			None => {}
		}
		match AcpiListener::spawn(&self.config.acpi_socket, self.events.clone()) {
			Ok(listener) => {
				self.listener = Some(listener);
				info!("platform event listener started");
				self.events.emit(
					&PlatformEvent::new(event_type::WMI_TEST)
						.with_message("WMI Event Listener Started")
						.with_details("Connection verified"),
				);
				true
			}
			Err(err) => {
				warn!("platform event listener unavailable: {err}");
				self.events.emit(&unavailable_event(&err));
				false
			}
		}
	}

	fn stop_event_listener(&mut self) {
		let Some(listener) = self.listener.take() else {
			return;
		};
		if !listener.stop() {
			// Already reported when the source went away.
			return;
		}
		info!("platform event listener stopped");
		self.events.emit(
			&PlatformEvent::new(event_type::WMI_CLOSE)
				.with_message("WMI Event Listener Closed")
				.with_details("The event listener has been stopped"),
		);
	}

	fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId {
		self.events.subscribe(callback)
	}

	fn unsubscribe_events(&self, id: SubscriptionId) {
		self.events.unsubscribe(id);
	}

	#[tracing::instrument(skip_all, fields(interval = ?self.config.key_poll_interval))]
	fn start_key_monitor(&mut self) {
		if self.key_monitor.is_some() {
			return;
		}
		match KeyMonitor::spawn(
			self.config.sysfs_root.clone(),
			self.config.key_poll_interval,
			self.key_events.clone(),
		) {
			Ok(monitor) => self.key_monitor = Some(monitor),
			Err(err) => warn!("key monitor failed to start: {err}"),
		}
	}

	fn stop_key_monitor(&mut self) {
		if let Some(monitor) = self.key_monitor.take() {
			monitor.stop();
		}
	}

	fn key_status(&self) -> KeyStatus {
		read_key_status(&self.config.sysfs_root)
	}
}

/// A missing source and a failure to start are reported differently.
fn unavailable_event(err: &MonitorError) -> PlatformEvent {
	let (message, details) = match err {
		MonitorError::ListenerConnect { .. } => (
			"WMI Event Listener not available",
			"The platform event source is not available on this device".to_string(),
		),
		other => (
			"WMI Event Listener failed to start",
			format!("An error occurred while starting the WMI event listener: {other}"),
		),
	};
	PlatformEvent::new(event_type::WMI_UNAVAILABLE)
		.with_message(message)
		.with_details(details)
}

impl Drop for SysfsMonitor {
	fn drop(&mut self) {
		if let Some(listener) = self.listener.take() {
			listener.stop();
		}
		self.stop_key_monitor();
	}
}
