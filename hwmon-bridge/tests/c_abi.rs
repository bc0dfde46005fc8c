//! Drives the exported functions the way a native caller would, with a
//! scripted monitor behind the handle.

use std::ffi::{CStr, c_char, c_int};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use hwmon_bridge::HwmonHandle;
use hwmon_bridge::c_bindings::*;
use hwmon_core::{EventCallback, Monitor, MonitorError, NotificationHub, SubscriptionId};
use hwmon_protocol::{KeyStatus, PlatformEvent, event_type};

#[derive(Default)]
struct Controls {
	hub: NotificationHub<PlatformEvent>,
	report: Mutex<String>,
	caps_lock: AtomicBool,
	listener_available: AtomicBool,
	updates: Mutex<usize>,
	dropped: AtomicBool,
}

struct FakeMonitor(Arc<Controls>);

impl Monitor for FakeMonitor {
	fn update(&mut self) {
		*self.0.updates.lock().unwrap() += 1;
	}

	fn report(&self) -> Result<String, MonitorError> {
		Ok(self.0.report.lock().unwrap().clone())
	}

	fn start_event_listener(&mut self) -> bool {
		self.0.listener_available.load(Ordering::SeqCst)
	}

	fn stop_event_listener(&mut self) {
		self.0.hub.emit(&PlatformEvent::new(event_type::WMI_CLOSE));
	}

	fn subscribe_events(&self, callback: EventCallback) -> SubscriptionId {
		self.0.hub.subscribe(callback)
	}

	fn unsubscribe_events(&self, id: SubscriptionId) {
		self.0.hub.unsubscribe(id);
	}

	fn start_key_monitor(&mut self) {}

	fn stop_key_monitor(&mut self) {}

	fn key_status(&self) -> KeyStatus {
		KeyStatus::now(self.0.caps_lock.load(Ordering::SeqCst), false)
	}
}

impl Drop for FakeMonitor {
	fn drop(&mut self) {
		self.0.dropped.store(true, Ordering::SeqCst);
	}
}

fn fake_handle() -> (*mut HwmonHandle, Arc<Controls>) {
	let controls = Arc::new(Controls::default());
	let handle = HwmonHandle::from_monitor(Box::new(FakeMonitor(controls.clone())));
	(handle.into_raw(), controls)
}

fn text(buf: &[u8]) -> &str {
	CStr::from_bytes_until_nul(buf).unwrap().to_str().unwrap()
}

fn poll(handle: *mut HwmonHandle, capacity: usize) -> (bool, Vec<u8>) {
	let mut buf = vec![0xaau8; capacity];
	let got = unsafe { hwmon_poll_wmi_event(handle, buf.as_mut_ptr().cast(), capacity as c_int) };
	(got, buf)
}

#[test]
fn events_are_polled_in_arrival_order() {
	let (handle, controls) = fake_handle();
	for kind in ["Insertion", "Removal", "Alert"] {
		controls.hub.emit(&PlatformEvent::new(kind).with_data([1, 2]));
	}

	for kind in ["Insertion", "Removal", "Alert"] {
		let (got, buf) = poll(handle, 4096);
		assert!(got);
		let record: serde_json::Value = serde_json::from_str(text(&buf)).unwrap();
		assert_eq!(record["type"], kind);
		assert_eq!(record["data"], serde_json::json!([1, 2]));
	}
	let (got, buf) = poll(handle, 4096);
	assert!(!got);
	assert_eq!(text(&buf), "");

	unsafe { hwmon_destroy(handle) };
}

#[test]
fn empty_queue_writes_empty_string() {
	let (handle, _controls) = fake_handle();
	let (got, buf) = poll(handle, 8);
	assert!(!got);
	assert_eq!(buf[0], 0);
	unsafe { hwmon_destroy(handle) };
}

#[test]
fn zero_capacity_poll_keeps_the_event() {
	let (handle, controls) = fake_handle();
	controls.hub.emit(&PlatformEvent::new("Alert"));

	let mut canary = [0x5au8; 4];
	let got = unsafe { hwmon_poll_wmi_event(handle, canary.as_mut_ptr().cast(), 0) };
	assert!(!got);
	assert_eq!(canary, [0x5a; 4]);

	let (got, buf) = poll(handle, 256);
	assert!(got);
	assert!(text(&buf).contains("\"Alert\""));
	unsafe { hwmon_destroy(handle) };
}

#[test]
fn report_is_truncated_to_capacity() {
	let (handle, controls) = fake_handle();
	let report: String = "x".repeat(200);
	*controls.report.lock().unwrap() = report.clone();

	unsafe {
		hwmon_update(handle);
		assert_eq!(hwmon_report_size(handle), 200);

		let mut small = vec![0xaau8; 128];
		hwmon_get_report(handle, small.as_mut_ptr().cast(), 128);
		assert_eq!(text(&small).len(), 127);
		assert_eq!(small[127], 0);

		let mut exact = vec![0xaau8; 201];
		hwmon_get_report(handle, exact.as_mut_ptr().cast(), 201);
		assert_eq!(text(&exact), report);

		hwmon_destroy(handle);
	}
	assert_eq!(*controls.updates.lock().unwrap(), 1);
}

#[test]
fn report_of_127_bytes_fits_in_128() {
	let (handle, controls) = fake_handle();
	*controls.report.lock().unwrap() = "y".repeat(127);
	let mut buf = vec![0xaau8; 128];
	unsafe {
		assert_eq!(hwmon_report_size(handle), 127);
		hwmon_get_report(handle, buf.as_mut_ptr().cast(), 128);
		hwmon_destroy(handle);
	}
	assert_eq!(text(&buf), "y".repeat(127));
}

#[test]
fn non_positive_capacity_writes_nothing() {
	let (handle, controls) = fake_handle();
	*controls.report.lock().unwrap() = "[]".into();
	let mut canary = [0x5au8; 4];
	unsafe {
		hwmon_get_report(handle, canary.as_mut_ptr().cast(), 0);
		hwmon_get_report(handle, canary.as_mut_ptr().cast(), -1);
		hwmon_get_key_status(handle, canary.as_mut_ptr().cast(), 0);
		hwmon_destroy(handle);
	}
	assert_eq!(canary, [0x5a; 4]);
}

#[test]
fn interior_nul_yields_empty_report() {
	let (handle, controls) = fake_handle();
	*controls.report.lock().unwrap() = "a\0b".into();
	let mut buf = [0xaau8; 16];
	unsafe {
		hwmon_get_report(handle, buf.as_mut_ptr().cast(), buf.len() as c_int);
		hwmon_destroy(handle);
	}
	assert_eq!(text(&buf), "");
}

#[test]
fn key_status_reflects_current_state() {
	let (handle, controls) = fake_handle();
	let mut buf = [0u8; 256];
	unsafe {
		hwmon_start_key_monitor(handle);
		hwmon_get_key_status(handle, buf.as_mut_ptr().cast(), buf.len() as c_int);
		assert!(text(&buf).contains("\"caps_lock\":false"));

		controls.caps_lock.store(true, Ordering::SeqCst);
		hwmon_get_key_status(handle, buf.as_mut_ptr().cast(), buf.len() as c_int);
		hwmon_stop_key_monitor(handle);
		hwmon_destroy(handle);
	}
	let status: serde_json::Value = serde_json::from_str(text(&buf)).unwrap();
	assert_eq!(status["caps_lock"], true);
	assert_eq!(status["num_lock"], false);
	assert!(status["timestamp"].is_string());
}

#[test]
fn listener_result_is_passed_through() {
	let (handle, controls) = fake_handle();
	unsafe {
		assert!(!hwmon_start_wmi_listener(handle));
		controls.listener_available.store(true, Ordering::SeqCst);
		assert!(hwmon_start_wmi_listener(handle));

		hwmon_stop_wmi_listener(handle);
		let (got, buf) = poll(handle, 256);
		assert!(got);
		assert!(text(&buf).contains(event_type::WMI_CLOSE));
		hwmon_destroy(handle);
	}
}

#[test]
fn concurrent_producers_and_consumer_lose_nothing() {
	const PRODUCERS: i32 = 4;
	const PER_PRODUCER: i32 = 200;

	let (handle, controls) = fake_handle();
	let producers: Vec<_> = (0..PRODUCERS)
		.map(|p| {
			let controls = controls.clone();
			thread::spawn(move || {
				for i in 0..PER_PRODUCER {
					controls.hub.emit(&PlatformEvent::new("Alert").with_data([p, i]));
				}
			})
		})
		.collect();

	// Raw pointers are not Send; hand the address to the consumer instead.
	let addr = handle as usize;
	let consumer = thread::spawn(move || {
		let handle = addr as *mut HwmonHandle;
		let mut seen = Vec::new();
		while seen.len() < (PRODUCERS * PER_PRODUCER) as usize {
			let (got, buf) = poll(handle, 512);
			if got {
				let record: serde_json::Value = serde_json::from_str(text(&buf)).unwrap();
				let data = record["data"].as_array().unwrap();
				seen.push((data[0].as_i64().unwrap(), data[1].as_i64().unwrap()));
			} else {
				thread::yield_now();
			}
		}
		seen
	});

	for producer in producers {
		producer.join().unwrap();
	}
	let seen = consumer.join().unwrap();

	let mut next = [0i64; PRODUCERS as usize];
	for (p, i) in seen {
		assert_eq!(i, next[p as usize]);
		next[p as usize] += 1;
	}
	assert_eq!(next, [PER_PRODUCER as i64; PRODUCERS as usize]);
	assert!(!poll(handle, 512).0);

	unsafe { hwmon_destroy(handle) };
}

#[test]
fn destroy_discards_pending_events_and_releases_monitor() {
	for _ in 0..3 {
		let (handle, controls) = fake_handle();
		controls.hub.emit(&PlatformEvent::new("Alert"));
		controls.hub.emit(&PlatformEvent::new("Alert"));
		unsafe { hwmon_destroy(handle) };

		assert!(controls.dropped.load(Ordering::SeqCst));
		assert_eq!(controls.hub.subscriber_count(), 0);
	}
}

#[test]
fn null_handle_is_ignored() {
	let null = ptr::null_mut::<HwmonHandle>();
	let mut buf = [0x5au8; 8];
	let out = buf.as_mut_ptr().cast::<c_char>();
	unsafe {
		hwmon_update(null);
		assert_eq!(hwmon_report_size(null), 0);
		hwmon_get_report(null, out, 8);
		assert!(!hwmon_start_wmi_listener(null));
		hwmon_stop_wmi_listener(null);
		assert!(!hwmon_poll_wmi_event(null, out, 8));
		hwmon_start_key_monitor(null);
		hwmon_stop_key_monitor(null);
		hwmon_get_key_status(null, out, 8);
		hwmon_destroy(null);
	}
	assert_eq!(buf, [0x5a; 8]);
}
