//! Caps/num lock state from keyboard LEDs (`class/leds/*::capslock`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hwmon_protocol::KeyStatus;
use tracing::{debug, warn};

use crate::sysfs::read_number;
use crate::{MonitorError, NotificationHub};

/// Delay before the first reading so a just-toggled key settles.
const KEY_SETTLE_DELAY: Duration = Duration::from_millis(200);

/// Any keyboard with the LED lit counts as on. Missing LEDs read as off.
fn led_on(sysfs_root: &Path, suffix: &str) -> bool {
	let Ok(entries) = fs::read_dir(sysfs_root.join("class/leds")) else {
		return false;
	};
	entries
		.filter_map(Result::ok)
		.filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
		.any(|e| read_number(&e.path().join("brightness")).is_ok_and(|b| b > 0.0))
}

pub(crate) fn read_key_status(sysfs_root: &Path) -> KeyStatus {
	KeyStatus::now(
		led_on(sysfs_root, "::capslock"),
		led_on(sysfs_root, "::numlock"),
	)
}

/// Background thread that notifies subscribers when the lock state changes.
pub(crate) struct KeyMonitor {
	stop_tx: Sender<()>,
	thread: JoinHandle<()>,
}

impl KeyMonitor {
	pub fn spawn(
		sysfs_root: PathBuf,
		interval: Duration,
		hub: Arc<NotificationHub<KeyStatus>>,
	) -> Result<Self, MonitorError> {
		let (stop_tx, stop_rx) = mpsc::channel::<()>();
		let thread = thread::Builder::new()
			.name("hwmon-keys".into())
			.spawn(move || {
				// Sender dropped or signalled: stop.
				let stopped = |timeout| !matches!(stop_rx.recv_timeout(timeout), Err(RecvTimeoutError::Timeout));
				if stopped(KEY_SETTLE_DELAY) {
					return;
				}
				let mut last = read_key_status(&sysfs_root);
				debug!(caps_lock = last.caps_lock, num_lock = last.num_lock, "key monitor started");
				while !stopped(interval) {
					let current = read_key_status(&sysfs_root);
					if !current.same_state(&last) {
						debug!(caps_lock = current.caps_lock, num_lock = current.num_lock, "key status changed");
						hub.emit(&current);
						last = current;
					}
				}
			})
			.map_err(|source| MonitorError::Thread {
				name: "key monitor",
				source,
			})?;
		Ok(Self { stop_tx, thread })
	}

	pub fn stop(self) {
		let _ = self.stop_tx.send(());
		if self.thread.join().is_err() {
			warn!("key monitor thread panicked");
		}
	}
}
