use serde::{Deserialize, Serialize};

use crate::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HardwareType {
	Motherboard,
	Cpu,
	Gpu,
	Memory,
	Storage,
	Network,
	Battery,
	Controller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
	Voltage,
	Current,
	Power,
	Clock,
	Temperature,
	Load,
	Fan,
	Data,
}

/// A hardware component and the sensors it exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hardware {
	pub hardware_type: HardwareType,
	pub name: String,
	pub sub_hardware: Vec<Hardware>,
	pub sensors: Vec<Sensor>,
}

impl Hardware {
	pub fn new(hardware_type: HardwareType, name: impl Into<String>) -> Self {
		Self {
			hardware_type,
			name: name.into(),
			sub_hardware: Vec::new(),
			sensors: Vec::new(),
		}
	}
}

/// One sensor reading. `min`/`max` cover every reading since monitoring began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sensor {
	pub sensor_type: SensorType,
	pub name: String,
	pub index: i32,
	pub value: f32,
	pub min: f32,
	pub max: f32,
}

impl Sensor {
	pub fn new(sensor_type: SensorType, name: impl Into<String>, index: i32, value: f32) -> Self {
		let value = finite_or_zero(value);
		Self {
			sensor_type,
			name: name.into(),
			index,
			value,
			min: value,
			max: value,
		}
	}

	/// Store a new reading and widen the observed range.
	pub fn record(&mut self, value: f32) {
		let value = finite_or_zero(value);
		self.value = value;
		self.min = self.min.min(value);
		self.max = self.max.max(value);
	}
}

// NaN and infinities would serialize as `null`; the report contract wants numbers.
fn finite_or_zero(value: f32) -> f32 {
	if value.is_finite() { value } else { 0.0 }
}

/// Render the hardware list as the report JSON array.
pub fn render_report(hardware: &[Hardware]) -> Result<String, ProtocolError> {
	serde_json::to_string(hardware).map_err(ProtocolError::from)
}
