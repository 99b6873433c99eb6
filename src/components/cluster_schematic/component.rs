use leptos::prelude::*;
use log::error;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::config::SchematicConfig;
use super::render::SchematicRenderer;
use super::scheduler::WindowTimer;
use super::types::{GridSnapshot, NodeInfo};

const PLOT_WIDTH: f64 = 111.0;
const PLOT_HEIGHT: f64 = 30.0;
const PLOT_MAX: f64 = 105.0;

type CanvasRenderer = SchematicRenderer<CanvasRenderingContext2d, WindowTimer>;

/// The cable canvas. Owns its renderer; disposing the component drops the
/// renderer, which stops the animation timer.
#[component]
pub fn ClusterNetworkCanvas(
	#[prop(into)] info: Signal<GridSnapshot>,
	config: SchematicConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let renderer = StoredValue::new_local(None::<CanvasRenderer>);

	Effect::new(move |_| {
		let snapshot = info.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if renderer.with_value(Option::is_none) {
			let canvas: HtmlCanvasElement = canvas.into();
			match SchematicRenderer::attach_canvas(&canvas, config.clone()) {
				Ok(r) => renderer.set_value(Some(r)),
				Err(e) => {
					error!("cannot start schematic renderer: {e}");
					return;
				}
			}
		}
		renderer.with_value(|r| {
			if let Some(r) = r {
				if r.on_grid_info_changed(&snapshot) {
					r.render_frame();
				}
			}
		});
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="cluster-schematic-canvas"
			style="display: block; position: absolute; pointer-events: none;"
		/>
	}
}

#[component]
fn Thermometer(temp: Option<f64>) -> impl IntoView {
	let percentage = temp.unwrap_or(100.0);
	view! {
		<div class="thermometer">
			<div class="mask" style=format!("height: {percentage}%") />
		</div>
	}
}

/// Bar chart of the load history, bars coloured by the parallel colour history.
#[component]
fn ActivityPlot(values: Vec<f64>, colours: Vec<String>, border: String) -> impl IntoView {
	if values.is_empty() {
		return None;
	}
	let bar_width = PLOT_WIDTH / values.len() as f64;
	let bars = values
		.iter()
		.enumerate()
		.map(|(i, value)| {
			let height = value.clamp(0.0, PLOT_MAX) / PLOT_MAX * PLOT_HEIGHT;
			let fill = colours.get(i).cloned().unwrap_or_else(|| "grey".into());
			view! {
				<rect
					x=format!("{:.2}", i as f64 * bar_width)
					y=format!("{:.2}", PLOT_HEIGHT - height)
					width=format!("{bar_width:.2}")
					height=format!("{height:.2}")
					fill=fill
				/>
			}
		})
		.collect_view();

	Some(view! {
		<svg
			class="activity-plot"
			viewBox=format!("0 0 {PLOT_WIDTH} {PLOT_HEIGHT}")
			preserveAspectRatio="none"
			style=format!("border-color: {border}")
		>
			{bars}
		</svg>
	})
}

#[component]
fn ClusterCore(node: NodeInfo) -> impl IntoView {
	let colour = node.job.colour.clone().unwrap_or_default();
	let load_colour = node.current_colour().unwrap_or_default().to_owned();
	let percentage = node
		.current_load()
		.map(|load| view! { <div class="percentage">{format!("{load}%")}</div> });
	let avatar = node.job.avatar_id.map(|id| {
		view! { <img class="avatar" src=format!("/avatars/{id}.png") alt=node.job.name.clone() /> }
	});

	view! {
		<div class="cluster-core" style=format!("border-color: {colour}")>
			{percentage}
			{avatar}
			<div class="job-name">{node.job.name.clone()}</div>
			<Thermometer temp=node.temp />
			<ActivityPlot
				values=node.cpu_history.clone()
				colours=node.cpu_colour_history.clone()
				border=load_colour
			/>
		</div>
	}
}

/// Node cards laid out row by row over the animated cable canvas.
#[component]
pub fn ClusterSchematic(
	#[prop(into)] info: Signal<GridSnapshot>,
	#[prop(optional)] config: Option<SchematicConfig>,
) -> impl IntoView {
	view! {
		<div class="cluster-schematic">
			<ClusterNetworkCanvas info=info config=config.unwrap_or_default() />
			{move || {
				info.with(|snapshot| {
					snapshot
						.rows
						.iter()
						.map(|row| {
							let cores = row
								.iter()
								.cloned()
								.map(|node| view! { <ClusterCore node=node /> })
								.collect_view();
							view! { <div class="cluster-row">{cores}</div> }
						})
						.collect_view()
				})
			}}
		</div>
	}
}
