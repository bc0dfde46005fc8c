//! Monitor configuration, read from `HWMON_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys";
pub const DEFAULT_PROCFS_ROOT: &str = "/proc";
pub const DEFAULT_ACPI_SOCKET: &str = "/var/run/acpid.socket";
pub const DEFAULT_KEY_POLL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
	pub sysfs_root: PathBuf,
	pub procfs_root: PathBuf,
	pub acpi_socket: PathBuf,
	pub key_poll_interval: Duration,
	pub thermal_zones: bool,
	pub memory: bool,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
			procfs_root: PathBuf::from(DEFAULT_PROCFS_ROOT),
			acpi_socket: PathBuf::from(DEFAULT_ACPI_SOCKET),
			key_poll_interval: Duration::from_millis(DEFAULT_KEY_POLL_MS),
			thermal_zones: true,
			memory: true,
		}
	}
}

impl MonitorConfig {
	pub fn from_env() -> Self {
		let defaults = Self::default();
		Self {
			sysfs_root: env_path("HWMON_SYSFS_ROOT", defaults.sysfs_root),
			procfs_root: env_path("HWMON_PROCFS_ROOT", defaults.procfs_root),
			acpi_socket: env_path("HWMON_ACPI_SOCKET", defaults.acpi_socket),
			key_poll_interval: env_millis("HWMON_KEY_POLL_MS", defaults.key_poll_interval),
			thermal_zones: env_bool("HWMON_ENABLE_THERMAL", defaults.thermal_zones),
			memory: env_bool("HWMON_ENABLE_MEMORY", defaults.memory),
		}
	}

	pub fn sysfs_root(mut self, path: impl Into<PathBuf>) -> Self {
		self.sysfs_root = path.into();
		self
	}

	pub fn procfs_root(mut self, path: impl Into<PathBuf>) -> Self {
		self.procfs_root = path.into();
		self
	}

	pub fn acpi_socket(mut self, path: impl Into<PathBuf>) -> Self {
		self.acpi_socket = path.into();
		self
	}

	pub fn key_poll_interval(mut self, interval: Duration) -> Self {
		self.key_poll_interval = interval;
		self
	}

	pub fn thermal_zones(mut self, enabled: bool) -> Self {
		self.thermal_zones = enabled;
		self
	}

	pub fn memory(mut self, enabled: bool) -> Self {
		self.memory = enabled;
		self
	}
}

fn env_path(name: &str, default: PathBuf) -> PathBuf {
	match std::env::var_os(name) {
		Some(v) if !v.is_empty() => PathBuf::from(v),
		_ => default,
	}
}

fn env_bool(name: &str, default: bool) -> bool {
	parse_bool(std::env::var(name).ok().as_deref(), default)
}

fn parse_bool(value: Option<&str>, default: bool) -> bool {
	match value {
		Some(v) => !matches!(
			v.trim().to_ascii_lowercase().as_str(),
			"0" | "false" | "off" | "no"
		),
		None => default,
	}
}

fn env_millis(name: &str, default: Duration) -> Duration {
	parse_millis(name, std::env::var(name).ok().as_deref(), default)
}

fn parse_millis(name: &str, value: Option<&str>, default: Duration) -> Duration {
	let Some(raw) = value else {
		return default;
	};
	match raw.trim().parse::<u64>() {
		Ok(ms) if ms > 0 => Duration::from_millis(ms),
		_ => {
			warn!(variable = name, value = raw, "invalid interval, using default");
			default
		}
	}
}
