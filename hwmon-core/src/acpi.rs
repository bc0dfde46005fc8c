//! Platform event listener backed by the acpid event socket.
//!
//! acpid writes one line per event: `class/device BUSID 0000000a 00000001`.
//! The hex fields after the bus id become the event's data array.

use std::io::{self, ErrorKind, Read};
use std::os::fd::AsFd;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use chrono::Local;
use hwmon_protocol::{PlatformEvent, event_type};
use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use tracing::{debug, trace, warn};

use crate::{MonitorError, NotificationHub};

/// Upper bound on how long `stop` waits for the reader to notice.
const POLL_INTERVAL_MS: u16 = 200;

pub(crate) struct AcpiListener {
	stop: Arc<AtomicBool>,
	thread: JoinHandle<()>,
}

impl AcpiListener {
	pub fn spawn(
		socket: &Path,
		events: Arc<NotificationHub<PlatformEvent>>,
	) -> Result<Self, MonitorError> {
		let stream = UnixStream::connect(socket).map_err(|source| MonitorError::ListenerConnect {
			path: socket.to_path_buf(),
			source,
		})?;
		let stop = Arc::new(AtomicBool::new(false));
		let thread = {
			let stop = stop.clone();
			thread::Builder::new()
				.name("hwmon-acpi".into())
				.spawn(move || read_events(stream, &stop, &events))
				.map_err(|source| MonitorError::Thread {
					name: "platform event listener",
					source,
				})?
		};
		Ok(Self { stop, thread })
	}

	/// The reader has exited on its own, e.g. because acpid went away.
	pub fn is_finished(&self) -> bool {
		self.thread.is_finished()
	}

	/// Signal the reader and wait for it. No event is emitted after this
	/// returns. Returns false if the reader had already lost its source.
	pub fn stop(self) -> bool {
		let was_live = !self.stop.swap(true, Ordering::AcqRel);
		if self.thread.join().is_err() {
			warn!("platform event listener thread panicked");
		}
		was_live
	}
}

/// Longest line kept while waiting for its newline.
const MAX_LINE_LEN: usize = 4096;

fn read_events(stream: UnixStream, stop: &AtomicBool, events: &NotificationHub<PlatformEvent>) {
	match read_lines(&stream, stop, events) {
		// Whoever sets the flag first reports the close.
		Err(err) if !stop.swap(true, Ordering::AcqRel) => {
			warn!("platform event listener lost its source: {err}");
			events.emit(
				&PlatformEvent::new(event_type::WMI_CLOSE)
					.with_message("WMI Event Listener Closed")
					.with_details(format!("The platform event source went away: {err}")),
			);
		}
		_ => debug!("platform event listener stopped"),
	}
}

/// Runs until `stop` is set or the source fails.
fn read_lines(
	mut stream: &UnixStream,
	stop: &AtomicBool,
	events: &NotificationHub<PlatformEvent>,
) -> io::Result<()> {
	let mut pending = Vec::new();
	// Set after an overlong line was cut; the rest of it is dropped.
	let mut discarding = false;
	let mut buf = [0u8; 1024];
	while !stop.load(Ordering::Acquire) {
		let mut fds = [PollFd::new(stream.as_fd(), PollFlags::POLLIN)];
		match poll(&mut fds, PollTimeout::from(POLL_INTERVAL_MS)) {
			Ok(0) => continue,
			Ok(_) => {}
			Err(Errno::EINTR) => continue,
			Err(errno) => return Err(errno.into()),
		}
		match stream.read(&mut buf) {
			Ok(0) => return Err(io::Error::new(ErrorKind::UnexpectedEof, "connection closed")),
			Ok(n) => pending.extend_from_slice(&buf[..n]),
			Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => continue,
			Err(e) => return Err(e),
		}
		while let Some(end) = pending.iter().position(|b| *b == b'\n') {
			let line: Vec<u8> = pending.drain(..=end).collect();
			if std::mem::take(&mut discarding) || line.len() > MAX_LINE_LEN {
				continue;
			}
			let line = String::from_utf8_lossy(&line);
			let line = line.trim();
			if line.is_empty() {
				continue;
			}
			if stop.load(Ordering::Acquire) {
				return Ok(());
			}
			trace!(line, "platform event");
			events.emit(&parse_event_line(line));
		}
		if pending.len() > MAX_LINE_LEN {
			warn!(len = pending.len(), "dropping overlong platform event line");
			pending.clear();
			discarding = true;
		}
	}
	Ok(())
}

/// Hex fields are 32-bit words; values above `i32::MAX` keep their bit
/// pattern and come out negative (`ffffffff` is `-1`).
pub(crate) fn parse_event_line(line: &str) -> PlatformEvent {
	let data: Vec<i32> = line
		.split_whitespace()
		.skip(2)
		.filter_map(|field| u32::from_str_radix(field, 16).ok())
		.map(|value| value as i32)
		.collect();
	PlatformEvent::new(event_type::WMI_EVENT)
		.with_data(data)
		.with_message("WMI Event received")
		.with_details(format!(
			"Event received at {}: {line}",
			Local::now().format("%Y-%m-%d %H:%M:%S")
		))
}
