use std::collections::BTreeMap;

use super::error::{Result, SchematicError};
use super::types::{GridCoord, GridInfo, NodeInfo, cells};

/// Stroke colour to the cells drawn with it, in row-major order.
pub type StyleMap = BTreeMap<String, Vec<GridCoord>>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleGroups {
	/// Static cables, one group per job colour.
	pub cables: StyleMap,
	/// Links carrying traffic, all under the packet colour.
	pub packets: StyleMap,
}

impl StyleGroups {
	pub fn group_count(&self) -> usize {
		self.cables.len() + self.packets.len()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregation {
	pub groups: StyleGroups,
	pub rejected: Vec<SchematicError>,
}

fn cable_colour(coord: GridCoord, info: &NodeInfo) -> Result<&str> {
	match info.job.colour.as_deref() {
		Some(colour) if !colour.trim().is_empty() => Ok(colour),
		Some(_) => Err(SchematicError::MalformedNodeInfo {
			row: coord.row,
			col: coord.col,
			reason: "job colour is empty",
		}),
		None => Err(SchematicError::MalformedNodeInfo {
			row: coord.row,
			col: coord.col,
			reason: "job colour is missing",
		}),
	}
}

/// Groups every well-formed cell under its job colour.
pub fn cable_groups(grid: &GridInfo) -> (StyleMap, Vec<SchematicError>) {
	let mut groups = StyleMap::new();
	let mut rejected = Vec::new();
	for (coord, info) in cells(grid) {
		match cable_colour(coord, info) {
			Ok(colour) => groups.entry(colour.to_owned()).or_default().push(coord),
			Err(e) => rejected.push(e),
		}
	}
	(groups, rejected)
}

/// Collects the well-formed cells whose job has an id. The packet colour key
/// is always present, even when nothing is flowing.
pub fn packet_groups(grid: &GridInfo, packet_colour: &str) -> StyleMap {
	let active = cells(grid)
		.filter(|(coord, info)| info.has_traffic() && cable_colour(*coord, info).is_ok())
		.map(|(coord, _)| coord)
		.collect();
	StyleMap::from([(packet_colour.to_owned(), active)])
}

/// Builds both groupings, setting aside malformed cells instead of failing.
pub fn aggregate_lenient(grid: &GridInfo, packet_colour: &str) -> Aggregation {
	let (cables, rejected) = cable_groups(grid);
	Aggregation {
		groups: StyleGroups {
			cables,
			packets: packet_groups(grid, packet_colour),
		},
		rejected,
	}
}

/// Builds both groupings, failing on the first malformed cell.
pub fn aggregate(grid: &GridInfo, packet_colour: &str) -> Result<StyleGroups> {
	let Aggregation { groups, rejected } = aggregate_lenient(grid, packet_colour);
	match rejected.into_iter().next() {
		Some(e) => Err(e),
		None => Ok(groups),
	}
}
