//! The exported C ABI.
//!
//! Every function except `hwmon_create` takes the handle returned by
//! `hwmon_create`. A null handle is tolerated (the call does nothing and
//! returns the default); a destroyed handle is not detected.
//!
//! Text outputs are written into caller-owned buffers: at most
//! `capacity - 1` bytes of UTF-8 followed by a NUL, nothing at all when
//! `capacity <= 0`.

use std::ffi::{c_char, c_int};

use tracing::error;

use crate::handle::HwmonHandle;
use crate::{logging, marshal};

/// Create a monitor handle. Aborts the process if the monitor cannot be
/// opened; a null or dangling handle is never returned.
#[unsafe(no_mangle)]
pub extern "C" fn hwmon_create() -> *mut HwmonHandle {
	logging::init();
	match HwmonHandle::open() {
		Ok(handle) => handle.into_raw(),
		Err(err) => {
			error!("hwmon_create failed: {err}");
			std::process::abort();
		}
	}
}

/// Release the handle and discard any events that were never polled.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_destroy(handle: *mut HwmonHandle) {
	unsafe {
		if !handle.is_null() {
			drop(Box::from_raw(handle));
		}
	}
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_update(handle: *mut HwmonHandle) {
	unsafe {
		if let Some(handle) = handle.as_ref() {
			handle.update();
		}
	}
}

/// Byte length of the current report, excluding the terminator. A buffer
/// of at least this plus one receives the report untruncated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_report_size(handle: *mut HwmonHandle) -> c_int {
	unsafe {
		handle
			.as_ref()
			.map(|h| marshal::c_len(&h.report()))
			.unwrap_or(0)
	}
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_get_report(
	handle: *mut HwmonHandle,
	buffer: *mut c_char,
	capacity: c_int,
) {
	unsafe {
		debug_assert!(capacity <= 0 || !buffer.is_null());
		let Some(handle) = handle.as_ref() else {
			return;
		};
		if capacity <= 0 {
			return;
		}
		marshal::write_c_string(&handle.report(), buffer, capacity);
	}
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_start_wmi_listener(handle: *mut HwmonHandle) -> bool {
	unsafe {
		handle
			.as_ref()
			.map(|h| h.start_event_listener())
			.unwrap_or(false)
	}
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_stop_wmi_listener(handle: *mut HwmonHandle) {
	unsafe {
		if let Some(handle) = handle.as_ref() {
			handle.stop_event_listener();
		}
	}
}

/// Take one pending event record. Returns false and writes an empty string
/// when nothing is queued. With no room to write (`capacity <= 0`) the
/// queue is left untouched and false is returned.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_poll_wmi_event(
	handle: *mut HwmonHandle,
	buffer: *mut c_char,
	capacity: c_int,
) -> bool {
	unsafe {
		debug_assert!(capacity <= 0 || !buffer.is_null());
		let Some(handle) = handle.as_ref() else {
			return false;
		};
		if capacity <= 0 || buffer.is_null() {
			return false;
		}
		match handle.poll_event() {
			Some(record) => {
				marshal::write_c_string(&record, buffer, capacity);
				true
			}
			None => {
				marshal::write_c_string("", buffer, capacity);
				false
			}
		}
	}
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_start_key_monitor(handle: *mut HwmonHandle) {
	unsafe {
		if let Some(handle) = handle.as_ref() {
			handle.start_key_monitor();
		}
	}
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_stop_key_monitor(handle: *mut HwmonHandle) {
	unsafe {
		if let Some(handle) = handle.as_ref() {
			handle.stop_key_monitor();
		}
	}
}

/// Write `{"caps_lock":..,"num_lock":..,"timestamp":".."}` for the current state.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn hwmon_get_key_status(
	handle: *mut HwmonHandle,
	buffer: *mut c_char,
	capacity: c_int,
) {
	unsafe {
		debug_assert!(capacity <= 0 || !buffer.is_null());
		let Some(handle) = handle.as_ref() else {
			return;
		};
		if capacity <= 0 {
			return;
		}
		marshal::write_c_string(&handle.key_status(), buffer, capacity);
	}
}
