//! C-callable boundary around the hardware monitor.
//!
//! A native caller creates a handle with [`c_bindings::hwmon_create`],
//! polls reports, platform events and key status into buffers it owns, and
//! finally releases the handle with [`c_bindings::hwmon_destroy`]. Platform
//! events arrive on monitor threads and wait in a per-handle queue until
//! polled.

pub mod c_bindings;
mod error;
mod handle;
mod logging;
mod marshal;
mod queue;

pub use error::BridgeError;
pub use handle::HwmonHandle;
pub use queue::EventQueue;
