use std::path::PathBuf;

use hwmon_protocol::{Hardware, HardwareType, Sensor, SensorType};
use tracing::debug;

use crate::MonitorConfig;
use crate::sysfs::{self, MemInfo, NodeSource};

const KB_PER_GIB: f64 = 1024.0 * 1024.0;

/// The discovered sensor sources and the latest readings taken from them.
///
/// `hardware[i].sensors[j]` always corresponds to `sources[i].channels[j]`;
/// the memory node, when enabled, is appended after every source.
pub(crate) struct SensorTree {
	sources: Vec<NodeSource>,
	meminfo: Option<PathBuf>,
	hardware: Vec<Hardware>,
}

impl SensorTree {
	/// Enumerate sources and take the first reading of each channel.
	/// Channels that cannot be read now are dropped.
	pub fn discover(config: &MonitorConfig) -> Self {
		let mut sources = sysfs::discover_hwmon(&config.sysfs_root);
		if config.thermal_zones {
			sources.extend(sysfs::discover_thermal_zones(&config.sysfs_root));
		}

		let mut hardware = Vec::with_capacity(sources.len() + 1);
		for source in &mut sources {
			let mut node = Hardware::new(source.hardware_type, source.name.clone());
			source.channels.retain(|channel| match channel.read() {
				Ok(value) => {
					node.sensors.push(Sensor::new(
						channel.sensor_type,
						channel.name.clone(),
						channel.index,
						value,
					));
					true
				}
				Err(err) => {
					debug!(path = %channel.path.display(), "dropping unreadable channel: {err}");
					false
				}
			});
			hardware.push(node);
		}

		let meminfo = config
			.memory
			.then(|| config.procfs_root.join("meminfo"))
			.and_then(|path| match MemInfo::read(&path) {
				Ok(info) => {
					hardware.push(memory_node(&info));
					Some(path)
				}
				Err(err) => {
					debug!("memory readings unavailable: {err}");
					None
				}
			});

		Self {
			sources,
			meminfo,
			hardware,
		}
	}

	/// Re-read every channel. A failed read keeps the previous value.
	pub fn update(&mut self) {
		for (source, node) in self.sources.iter().zip(self.hardware.iter_mut()) {
			for (channel, sensor) in source.channels.iter().zip(node.sensors.iter_mut()) {
				match channel.read() {
					Ok(value) => sensor.record(value),
					Err(err) => debug!(sensor = %channel.name, "sensor read failed: {err}"),
				}
			}
		}
		if let Some(path) = &self.meminfo {
			match MemInfo::read(path) {
				Ok(info) => {
					if let Some(node) = self.hardware.last_mut() {
						record_memory(node, &info);
					}
				}
				Err(err) => debug!("memory read failed: {err}"),
			}
		}
	}

	pub fn hardware(&self) -> &[Hardware] {
		&self.hardware
	}
}

fn memory_node(info: &MemInfo) -> Hardware {
	let mut node = Hardware::new(HardwareType::Memory, "System Memory");
	node.sensors = vec![
		Sensor::new(SensorType::Load, "Memory", 0, info.load_percent()),
		Sensor::new(SensorType::Data, "Memory Used", 0, gib(info.used_kb())),
		Sensor::new(SensorType::Data, "Memory Available", 1, gib(info.available_kb)),
	];
	node
}

fn record_memory(node: &mut Hardware, info: &MemInfo) {
	let values = [info.load_percent(), gib(info.used_kb()), gib(info.available_kb)];
	for (sensor, value) in node.sensors.iter_mut().zip(values) {
		sensor.record(value);
	}
}

fn gib(kb: u64) -> f32 {
	(kb as f64 / KB_PER_GIB) as f32
}
