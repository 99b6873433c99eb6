use std::f64::consts::PI;

use super::config::CableLayout;
use super::error::{Result, SchematicError};
use super::types::GridCoord;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

/// One canvas path command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawOp {
	MoveTo(Point),
	LineTo(Point),
	Arc {
		center: Point,
		radius: f64,
		start: f64,
		end: f64,
		counterclockwise: bool,
	},
}

/// The cable from a node to the trunk.
#[derive(Clone, Debug, PartialEq)]
pub struct CablePath {
	/// The node point the cable hangs off.
	pub anchor: Point,
	pub ops: Vec<DrawOp>,
}

impl CableLayout {
	pub fn row_count(&self) -> usize {
		self.rows.len()
	}

	pub fn anchor(&self, coord: GridCoord) -> Point {
		Point {
			x: self.origin_x + self.col_step * coord.col as f64,
			y: self.origin_y + self.row_step * coord.row as f64,
		}
	}

	/// Cables narrow for deeper rows.
	pub fn cable_width(&self, row: usize) -> f64 {
		self.cable_width - self.cable_width_step * row as f64
	}

	/// Lead-in across the top of the anchor, a quarter turn down, and for
	/// rows with a trunk shift two more quarter turns that swing the cable
	/// sideways before it drops onto the trunk.
	pub fn build_path(&self, coord: GridCoord) -> Result<CablePath> {
		let Some(row) = self.rows.get(coord.row) else {
			return Err(SchematicError::InvalidGridCoordinate {
				row: coord.row,
				col: coord.col,
				rows: self.row_count(),
			});
		};
		let anchor = self.anchor(coord);
		let r = self.radius;
		let right = anchor.x + self.cable_width(coord.row);
		let turn_y = self.trunk_y + row.trunk_drop;

		let mut ops = vec![
			DrawOp::MoveTo(Point {
				x: anchor.x,
				y: anchor.y - r,
			}),
			DrawOp::Arc {
				center: Point {
					x: right - r,
					y: anchor.y,
				},
				radius: r,
				start: 1.5 * PI,
				end: 2.0 * PI,
				counterclockwise: false,
			},
		];
		if row.trunk_shift != 0.0 {
			ops.push(DrawOp::Arc {
				center: Point {
					x: right - r,
					y: turn_y - r,
				},
				radius: r,
				start: 0.0,
				end: 0.5 * PI,
				counterclockwise: false,
			});
			ops.push(DrawOp::Arc {
				center: Point {
					x: right + row.trunk_shift + r,
					y: turn_y + r,
				},
				radius: r,
				start: 1.5 * PI,
				end: PI,
				counterclockwise: true,
			});
		}
		ops.push(DrawOp::LineTo(Point {
			x: right + row.trunk_shift,
			y: self.trunk_y + self.trunk_tail,
		}));

		Ok(CablePath { anchor, ops })
	}
}
