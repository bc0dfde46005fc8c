use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
	#[error("failed to read {path}: {source}")]
	Read {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to parse value from {path}: {detail}")]
	Parse { path: PathBuf, detail: String },
	#[error("path not found: {path}")]
	NotAvailable { path: PathBuf },
	#[error("failed to connect to platform event source {path}: {source}")]
	ListenerConnect {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to spawn {name} thread: {source}")]
	Thread {
		name: &'static str,
		source: std::io::Error,
	},
	#[error("protocol error: {0}")]
	Protocol(#[from] hwmon_protocol::ProtocolError),
}
