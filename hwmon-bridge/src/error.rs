use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
	#[error("monitor error: {0}")]
	Monitor(#[from] hwmon_core::MonitorError),
}
