use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchematicError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchematicError {
	#[error("malformed node info at ({row}, {col}): {reason}")]
	MalformedNodeInfo {
		row: usize,
		col: usize,
		reason: &'static str,
	},

	#[error("grid coordinate ({row}, {col}) is outside the {rows}-row cable layout")]
	InvalidGridCoordinate { row: usize, col: usize, rows: usize },

	#[error("drawing surface unavailable: {0}")]
	SurfaceUnavailable(String),

	#[error("interval timer unavailable: {0}")]
	TimerUnavailable(String),

	#[error("invalid schematic config: {0}")]
	InvalidConfig(String),
}
