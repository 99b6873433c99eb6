mod component;
mod config;
mod error;
mod geometry;
mod render;
mod scheduler;
mod state;
mod styles;
mod types;

pub use component::ClusterSchematic;
pub use config::SchematicConfig;
pub use types::{GridInfo, GridSnapshot, JobInfo, NodeInfo};
