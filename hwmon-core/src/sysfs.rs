//! Discovery of sensor files under `/sys` and `/proc`.
//!
//! hwmon chips live under `class/hwmon/hwmonN/` and expose one file per
//! channel (`temp1_input`, `fan2_input`, ...) in fixed integer units.
//! Thermal zones report millidegrees in `class/thermal/thermal_zoneN/temp`.

use std::fs;
use std::path::{Path, PathBuf};

use hwmon_protocol::{HardwareType, SensorType};
use tracing::debug;

use crate::MonitorError;

/// One readable sensor file and how to convert its integer contents.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Channel {
	pub sensor_type: SensorType,
	pub name: String,
	pub index: i32,
	pub path: PathBuf,
	pub scale: f64,
}

impl Channel {
	pub fn read(&self) -> Result<f32, MonitorError> {
		Ok((read_number(&self.path)? * self.scale) as f32)
	}
}

/// A group of channels reported as one hardware node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeSource {
	pub hardware_type: HardwareType,
	pub name: String,
	pub channels: Vec<Channel>,
}

/// Reads a sysfs/procfs file and returns its trimmed content.
pub(crate) fn read_sysfs_file(path: &Path) -> Result<String, MonitorError> {
	if !path.exists() {
		return Err(MonitorError::NotAvailable {
			path: path.to_path_buf(),
		});
	}
	fs::read_to_string(path)
		.map(|s| s.trim().to_string())
		.map_err(|source| MonitorError::Read {
			path: path.to_path_buf(),
			source,
		})
}

pub(crate) fn read_number(path: &Path) -> Result<f64, MonitorError> {
	let content = read_sysfs_file(path)?;
	content.parse::<f64>().map_err(|_| MonitorError::Parse {
		path: path.to_path_buf(),
		detail: format!("expected a number, got '{content}'"),
	})
}

/// Sorted entries of `dir` whose file name starts with `prefix`.
fn entries_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
	let Ok(entries) = fs::read_dir(dir) else {
		debug!(path = %dir.display(), "directory not available");
		return Vec::new();
	};
	let mut paths: Vec<PathBuf> = entries
		.filter_map(Result::ok)
		.filter(|e| e.file_name().to_string_lossy().starts_with(prefix))
		.map(|e| e.path())
		.collect();
	paths.sort_by_key(|p| trailing_number(p).unwrap_or(u32::MAX));
	paths
}

fn trailing_number(path: &Path) -> Option<u32> {
	let name = path.file_name()?.to_str()?;
	let digits: String = name
		.chars()
		.rev()
		.take_while(char::is_ascii_digit)
		.collect::<Vec<_>>()
		.into_iter()
		.rev()
		.collect();
	digits.parse().ok()
}

fn classify_chip(name: &str) -> HardwareType {
	let lower = name.to_ascii_lowercase();
	match lower.as_str() {
		"coretemp" | "k10temp" | "k8temp" | "zenpower" | "cpu_thermal" => HardwareType::Cpu,
		"amdgpu" | "radeon" | "nouveau" | "i915" | "xe" => HardwareType::Gpu,
		"nvme" | "drivetemp" => HardwareType::Storage,
		"acpitz" | "pch_cannonlake" | "pch_skylake" => HardwareType::Motherboard,
		_ if lower.starts_with("bat") || lower.contains("battery") => HardwareType::Battery,
		_ if lower.starts_with("iwlwifi") || lower.contains("phy") => HardwareType::Network,
		_ => HardwareType::Controller,
	}
}

/// Maps a channel attribute prefix to its sensor type and the factor that
/// converts the raw integer into display units (°C, RPM, V, A, W, MHz).
fn channel_kind(prefix: &str) -> Option<(SensorType, f64)> {
	match prefix {
		"temp" => Some((SensorType::Temperature, 1e-3)),
		"fan" => Some((SensorType::Fan, 1.0)),
		"in" => Some((SensorType::Voltage, 1e-3)),
		"curr" => Some((SensorType::Current, 1e-3)),
		"power" => Some((SensorType::Power, 1e-6)),
		"freq" => Some((SensorType::Clock, 1e-6)),
		_ => None,
	}
}

fn default_channel_name(sensor_type: SensorType, index: i32) -> String {
	let kind = match sensor_type {
		SensorType::Temperature => "Temperature",
		SensorType::Fan => "Fan",
		SensorType::Voltage => "Voltage",
		SensorType::Current => "Current",
		SensorType::Power => "Power",
		SensorType::Clock => "Clock",
		SensorType::Load => "Load",
		SensorType::Data => "Data",
	};
	format!("{kind} #{index}")
}

/// Splits `temp1_input` into `("temp", 1)`.
fn parse_input_attribute(file_name: &str) -> Option<(&str, i32)> {
	let stem = file_name.strip_suffix("_input")?;
	let split = stem.find(|c: char| c.is_ascii_digit())?;
	let (prefix, number) = stem.split_at(split);
	Some((prefix, number.parse().ok()?))
}

fn chip_channels(chip_dir: &Path) -> Vec<Channel> {
	let Ok(entries) = fs::read_dir(chip_dir) else {
		return Vec::new();
	};
	let mut channels: Vec<Channel> = entries
		.filter_map(Result::ok)
		.filter_map(|entry| {
			let file_name = entry.file_name();
			let file_name = file_name.to_str()?;
			let (prefix, index) = parse_input_attribute(file_name)?;
			let (sensor_type, scale) = channel_kind(prefix)?;
			let label_path = chip_dir.join(format!("{prefix}{index}_label"));
			let name = read_sysfs_file(&label_path)
				.ok()
				.filter(|l| !l.is_empty())
				.unwrap_or_else(|| default_channel_name(sensor_type, index));
			Some(Channel {
				sensor_type,
				name,
				index,
				path: entry.path(),
				scale,
			})
		})
		.collect();
	channels.sort_by(|a, b| {
		(a.sensor_type as u8, a.index).cmp(&(b.sensor_type as u8, b.index))
	});
	channels
}

/// Enumerates `class/hwmon/hwmon*` chips.
pub(crate) fn discover_hwmon(sysfs_root: &Path) -> Vec<NodeSource> {
	entries_with_prefix(&sysfs_root.join("class/hwmon"), "hwmon")
		.into_iter()
		.filter_map(|chip_dir| {
			let name = read_sysfs_file(&chip_dir.join("name")).ok()?;
			let channels = chip_channels(&chip_dir);
			if channels.is_empty() {
				debug!(chip = %name, "hwmon chip exposes no readable channels");
				return None;
			}
			Some(NodeSource {
				hardware_type: classify_chip(&name),
				name,
				channels,
			})
		})
		.collect()
}

/// Collects `class/thermal/thermal_zone*` into a single node.
pub(crate) fn discover_thermal_zones(sysfs_root: &Path) -> Option<NodeSource> {
	let channels: Vec<Channel> = entries_with_prefix(&sysfs_root.join("class/thermal"), "thermal_zone")
		.into_iter()
		.filter_map(|zone_dir| {
			let index = trailing_number(&zone_dir)? as i32;
			let path = zone_dir.join("temp");
			if !path.exists() {
				return None;
			}
			let name = read_sysfs_file(&zone_dir.join("type"))
				.unwrap_or_else(|_| format!("thermal_zone{index}"));
			Some(Channel {
				sensor_type: SensorType::Temperature,
				name,
				index,
				path,
				scale: 1e-3,
			})
		})
		.collect();
	if channels.is_empty() {
		return None;
	}
	Some(NodeSource {
		hardware_type: HardwareType::Motherboard,
		name: "Thermal Zones".to_string(),
		channels,
	})
}

/// `MemTotal` and `MemAvailable` from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MemInfo {
	pub total_kb: u64,
	pub available_kb: u64,
}

impl MemInfo {
	pub fn read(path: &Path) -> Result<Self, MonitorError> {
		let content = read_sysfs_file(path)?;
		Self::parse(&content).ok_or_else(|| MonitorError::Parse {
			path: path.to_path_buf(),
			detail: "missing MemTotal or MemAvailable".to_string(),
		})
	}

	fn parse(content: &str) -> Option<Self> {
		let field = |key: &str| {
			content
				.lines()
				.find_map(|line| line.strip_prefix(key)?.strip_prefix(':'))
				.and_then(|rest| rest.split_whitespace().next()?.parse::<u64>().ok())
		};
		Some(Self {
			total_kb: field("MemTotal")?,
			available_kb: field("MemAvailable")?,
		})
	}

	pub fn used_kb(&self) -> u64 {
		self.total_kb.saturating_sub(self.available_kb)
	}

	pub fn load_percent(&self) -> f32 {
		if self.total_kb == 0 {
			return 0.0;
		}
		(self.used_kb() as f64 / self.total_kb as f64 * 100.0) as f32
	}
}
