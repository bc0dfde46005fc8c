//! Data contracts shared between the monitor and the native boundary.
//!
//! Everything that crosses the C ABI does so as JSON text. This crate owns
//! the shape of that text: platform event records, key status snapshots and
//! the sensor report tree.

mod error;
mod event;
mod key_status;
mod report;

pub use error::ProtocolError;
pub use event::{PlatformEvent, event_type};
pub use key_status::KeyStatus;
pub use report::{Hardware, HardwareType, Sensor, SensorType, render_report};
