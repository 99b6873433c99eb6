use serde::{Deserialize, Serialize};

use super::error::{Result, SchematicError};

/// Longest tick period `window.setInterval` accepts.
pub const MAX_TICK_PERIOD_MS: u32 = i32::MAX as u32;
/// Fastest dash advance, in layout units per second.
pub const MAX_TIME_SCALE: i64 = 1000;

/// Where one row's cables meet the trunk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowLayout {
	/// Extra drop below the trunk baseline before the cable turns sideways.
	pub trunk_drop: f64,
	/// Horizontal shift towards the trunk. Zero means the cable runs straight down.
	pub trunk_shift: f64,
}

impl RowLayout {
	pub const fn new(trunk_drop: f64, trunk_shift: f64) -> Self {
		Self {
			trunk_drop,
			trunk_shift,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CableLayout {
	pub origin_x: f64,
	pub origin_y: f64,
	pub col_step: f64,
	pub row_step: f64,
	pub cable_width: f64,
	pub cable_width_step: f64,
	pub radius: f64,
	pub trunk_y: f64,
	pub trunk_tail: f64,
	/// One entry per supported grid row; the row count of the layout.
	pub rows: Vec<RowLayout>,
}

impl Default for CableLayout {
	fn default() -> Self {
		Self {
			origin_x: 148.5,
			origin_y: 50.5,
			col_step: 170.5,
			row_step: 230.0,
			cable_width: 33.0,
			cable_width_step: 7.0,
			radius: 5.0,
			trunk_y: 1000.0,
			trunk_tail: 35.0,
			rows: vec![
				RowLayout::new(30.0, 0.0),
				RowLayout::new(20.0, -50.0),
				RowLayout::new(10.0, -80.0),
				RowLayout::new(0.0, -100.0),
			],
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
	pub dash: Vec<f64>,
	pub line_width: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchematicConfig {
	pub tick_period_ms: u32,
	/// Period of the packet dash pattern, in layout units.
	pub gap_len: i64,
	/// Dash offset units advanced per second.
	pub time_scale: i64,
	pub cable: StrokeStyle,
	pub packet: StrokeStyle,
	pub packet_colour: String,
	pub canvas_width: u32,
	pub canvas_height: u32,
	pub layout: CableLayout,
}

impl Default for StrokeStyle {
	fn default() -> Self {
		Self {
			dash: vec![0.0, 0.0],
			line_width: 3.0,
		}
	}
}

impl Default for SchematicConfig {
	fn default() -> Self {
		Self {
			tick_period_ms: 500,
			gap_len: 275,
			time_scale: 10,
			cable: StrokeStyle::default(),
			packet: StrokeStyle {
				dash: vec![2.0, 50.0, 2.0, 25.0, 2.0, 200.0],
				line_width: 2.0,
			},
			packet_colour: "white".into(),
			canvas_width: 695,
			canvas_height: 950,
			layout: CableLayout::default(),
		}
	}
}

impl SchematicConfig {
	pub fn from_json(raw: &str) -> Result<Self> {
		let config: Self =
			serde_json::from_str(raw).map_err(|e| SchematicError::InvalidConfig(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		let invalid = |msg: &str| Err(SchematicError::InvalidConfig(msg.into()));
		if self.tick_period_ms == 0 || self.tick_period_ms > MAX_TICK_PERIOD_MS {
			return invalid("tick_period_ms must be between 1 and i32::MAX");
		}
		if self.gap_len <= 0 {
			return invalid("gap_len must be positive");
		}
		if !(1..=MAX_TIME_SCALE).contains(&self.time_scale) {
			return invalid("time_scale must be between 1 and 1000");
		}
		if self.layout.rows.is_empty() {
			return invalid("layout needs at least one row");
		}
		if self.layout.radius <= 0.0 {
			return invalid("arc radius must be positive");
		}
		if self.packet_colour.is_empty() {
			return invalid("packet_colour must not be empty");
		}
		Ok(())
	}
}
