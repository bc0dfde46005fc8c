//! Copying text into caller-owned, fixed-size C buffers.
//!
//! Text is emitted as UTF-8. At most `capacity - 1` bytes are copied and a
//! NUL terminator always follows them; truncation is silent and may split a
//! multi-byte character. Text containing an interior NUL cannot be expressed
//! as a C string and is written as the empty string instead.

use std::ffi::{c_char, c_int};
use std::ptr;

use tracing::warn;

/// The bytes that fit in a buffer of `capacity`, leaving room for the terminator.
pub(crate) fn truncated_bytes(text: &str, capacity: usize) -> &[u8] {
	let Some(room) = capacity.checked_sub(1) else {
		return &[];
	};
	let bytes = text.as_bytes();
	if bytes.contains(&0) {
		warn!(len = bytes.len(), "text contains an interior NUL, writing an empty string");
		return &[];
	}
	&bytes[..bytes.len().min(room)]
}

/// Write `text` into `buffer` as a NUL-terminated string.
///
/// Nothing is written when `capacity <= 0` or `buffer` is null. Returns the
/// number of content bytes written.
///
/// # Safety
/// `buffer` must be null or valid for writes of `capacity` bytes.
pub(crate) unsafe fn write_c_string(text: &str, buffer: *mut c_char, capacity: c_int) -> usize {
	if capacity <= 0 || buffer.is_null() {
		return 0;
	}
	let content = truncated_bytes(text, capacity as usize);
	unsafe {
		let dst = buffer.cast::<u8>();
		ptr::copy_nonoverlapping(content.as_ptr(), dst, content.len());
		dst.add(content.len()).write(0);
	}
	content.len()
}

/// Byte length of `text` as reported to C callers.
pub(crate) fn c_len(text: &str) -> c_int {
	c_int::try_from(text.len()).unwrap_or(c_int::MAX)
}
