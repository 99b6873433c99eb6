use log::{debug, warn};

use super::styles::{StyleGroups, aggregate_lenient};
use super::types::GridSnapshot;

/// Style groups derived from the last grid generation seen.
#[derive(Debug, Default)]
pub struct StyleCache {
	generation: Option<u64>,
	groups: StyleGroups,
	rebuilds: u64,
}

impl StyleCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn groups(&self) -> &StyleGroups {
		&self.groups
	}

	/// Times the groups have been rebuilt.
	pub fn rebuilds(&self) -> u64 {
		self.rebuilds
	}

	/// Rebuilds the groups when `snapshot` carries a new generation. Returns
	/// whether anything was rebuilt.
	pub fn observe(&mut self, snapshot: &GridSnapshot, packet_colour: &str) -> bool {
		if self.generation == Some(snapshot.generation) {
			return false;
		}
		let aggregation = aggregate_lenient(&snapshot.rows, packet_colour);
		for e in &aggregation.rejected {
			warn!("skipping cable: {e}");
		}
		self.groups = aggregation.groups;
		self.generation = Some(snapshot.generation);
		self.rebuilds += 1;
		debug!(
			"style groups rebuilt for generation {} ({} groups)",
			snapshot.generation,
			self.groups.group_count()
		);
		true
	}
}
