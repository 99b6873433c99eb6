use serde::{Deserialize, Deserializer, Serialize};

/// Rows of nodes, all rows the same length.
pub type GridInfo = Vec<Vec<NodeInfo>>;

/// Job ids arrive as strings or as the scheduler's integer ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawJobId {
	Text(String),
	Number(i64),
}

fn job_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(Option::<RawJobId>::deserialize(deserializer)?.map(|id| match id {
		RawJobId::Text(text) => text,
		RawJobId::Number(n) => n.to_string(),
	}))
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
	#[serde(default, deserialize_with = "job_id", skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default)]
	pub colour: Option<String>,
	#[serde(default)]
	pub name: String,
	#[serde(default, alias = "avatar_id")]
	pub avatar_id: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
	pub job: JobInfo,
	#[serde(default)]
	pub cpu_history: Vec<f64>,
	#[serde(default)]
	pub cpu_colour_history: Vec<String>,
	#[serde(default)]
	pub temp: Option<f64>,
}

impl NodeInfo {
	/// Most recent load sample, if any.
	pub fn current_load(&self) -> Option<f64> {
		self.cpu_history.last().copied()
	}

	pub fn current_colour(&self) -> Option<&str> {
		self.cpu_colour_history.last().map(String::as_str)
	}

	/// A job id means packets are flowing on this node's cable.
	pub fn has_traffic(&self) -> bool {
		self.job.id.is_some()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
	pub row: usize,
	pub col: usize,
}

impl GridCoord {
	pub fn new(row: usize, col: usize) -> Self {
		Self { row, col }
	}
}

/// A published grid matrix. The publisher bumps `generation` for every new
/// matrix; consumers treat an equal generation as an unchanged grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
	pub generation: u64,
	pub rows: GridInfo,
}

impl GridSnapshot {
	pub fn new(generation: u64, rows: GridInfo) -> Self {
		Self { generation, rows }
	}
}

/// Every cell of the grid with its coordinate, row by row.
pub fn cells(grid: &GridInfo) -> impl Iterator<Item = (GridCoord, &NodeInfo)> {
	grid.iter().enumerate().flat_map(|(row, nodes)| {
		nodes
			.iter()
			.enumerate()
			.map(move |(col, info)| (GridCoord::new(row, col), info))
	})
}
