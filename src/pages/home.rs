use std::time::Duration;

use leptos::prelude::*;
use log::warn;

use crate::components::cluster_schematic::{
	ClusterSchematic, GridInfo, GridSnapshot, JobInfo, NodeInfo, SchematicConfig,
};

const SCHEMATIC_CONFIG: &str = include_str!("../../schematic.json");

const ROWS: usize = 4;
const COLS: usize = 4;
const HISTORY: usize = 12;
const JOBS: &[(&str, &str)] = &[
	("#1f77b4", "Aerofoil"),
	("#ff7f0e", "Wing"),
	("#2ca02c", "Bicycle"),
	("#d62728", "Hull"),
	("#9467bd", "Kite"),
];
const IDLE: &str = "#3a3a4a";

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn demo_node(row: usize, col: usize, step: u64) -> NodeInfo {
	let seed = (row * COLS + col) * 31 + step as usize * 7;
	let busy = rand_simple(seed) > 0.35;
	let job = if busy {
		let (colour, name) = JOBS[(row + col + step as usize / 5) % JOBS.len()];
		JobInfo {
			id: Some(format!("{}", 100 + (row * COLS + col))),
			colour: Some(colour.into()),
			name: name.into(),
			avatar_id: Some((seed % 25) as u32 + 1),
		}
	} else {
		JobInfo {
			colour: Some(IDLE.into()),
			name: "idle".into(),
			..JobInfo::default()
		}
	};

	let cpu_history: Vec<f64> = (0..HISTORY)
		.map(|i| (rand_simple(seed + i) * if busy { 100.0 } else { 15.0 }).round())
		.collect();
	let cpu_colour_history = vec![job.colour.clone().unwrap_or_default(); HISTORY];
	let temp = cpu_history.iter().sum::<f64>() / HISTORY as f64;

	NodeInfo {
		job,
		cpu_history,
		cpu_colour_history,
		temp: Some(temp.round()),
	}
}

/// Generate a sample cluster grid for the given update step.
fn demo_grid(step: u64) -> GridInfo {
	(0..ROWS)
		.map(|row| (0..COLS).map(|col| demo_node(row, col, step)).collect())
		.collect()
}

/// Bundled schematic settings, or the built-in defaults if they don't load.
fn schematic_config() -> SchematicConfig {
	SchematicConfig::from_json(SCHEMATIC_CONFIG).unwrap_or_else(|e| {
		warn!("using default schematic config: {e}");
		SchematicConfig::default()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (snapshot, set_snapshot) = signal(GridSnapshot::new(0, demo_grid(0)));

	// Stand-in for the telemetry feed: publish a new generation every few seconds.
	if let Ok(handle) = set_interval_with_handle(
		move || {
			set_snapshot.update(|s| {
				s.generation += 1;
				s.rows = demo_grid(s.generation);
			})
		},
		Duration::from_secs(3),
	) {
		on_cleanup(move || handle.clear());
	}

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="schematic-page">
				<ClusterSchematic info=snapshot config=schematic_config() />
				<div class="schematic-overlay">
					<h1>"Cluster"</h1>
					<p class="subtitle">"Cables carry the colour of the job on each node. Moving dashes mark live traffic."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
