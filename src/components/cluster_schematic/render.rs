use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::config::{CableLayout, SchematicConfig, StrokeStyle};
use super::error::{Result, SchematicError};
use super::geometry::DrawOp;
use super::scheduler::{AnimationScheduler, CancellationHandle, IntervalTimer, WindowTimer, dash_offset};
use super::state::StyleCache;
use super::styles::StyleMap;
use super::types::GridSnapshot;

/// The subset of the 2d canvas API the schematic draws with.
pub trait Surface {
	fn clear(&self, width: f64, height: f64);
	fn begin_path(&self);
	fn move_to(&self, x: f64, y: f64);
	fn line_to(&self, x: f64, y: f64);
	fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool);
	fn stroke(&self);
	fn set_line_width(&self, width: f64);
	fn set_line_dash(&self, dash: &[f64]);
	fn set_line_dash_offset(&self, offset: f64);
	fn set_stroke_style(&self, colour: &str);
}

impl Surface for CanvasRenderingContext2d {
	fn clear(&self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn begin_path(&self) {
		CanvasRenderingContext2d::begin_path(self);
	}

	fn move_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::move_to(self, x, y);
	}

	fn line_to(&self, x: f64, y: f64) {
		CanvasRenderingContext2d::line_to(self, x, y);
	}

	fn arc(&self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) {
		let _ = self.arc_with_anticlockwise(x, y, radius, start, end, counterclockwise);
	}

	fn stroke(&self) {
		CanvasRenderingContext2d::stroke(self);
	}

	fn set_line_width(&self, width: f64) {
		CanvasRenderingContext2d::set_line_width(self, width);
	}

	fn set_line_dash(&self, dash: &[f64]) {
		let segments: js_sys::Array = dash.iter().map(|d| JsValue::from_f64(*d)).collect();
		let _ = CanvasRenderingContext2d::set_line_dash(self, &segments);
	}

	fn set_line_dash_offset(&self, offset: f64) {
		CanvasRenderingContext2d::set_line_dash_offset(self, offset);
	}

	fn set_stroke_style(&self, colour: &str) {
		self.set_stroke_style_str(colour);
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
	pub cables_drawn: usize,
	pub cables_skipped: usize,
}

/// Strokes each colour group as one path so dashes stay in phase across
/// every cable of that colour.
fn draw_groups(
	surface: &impl Surface,
	groups: &StyleMap,
	stroke: &StrokeStyle,
	dash_offset: f64,
	layout: &CableLayout,
	report: &mut FrameReport,
) {
	surface.set_line_width(stroke.line_width);
	surface.set_line_dash(&stroke.dash);
	surface.set_line_dash_offset(dash_offset);

	for (colour, coords) in groups {
		surface.begin_path();
		surface.set_stroke_style(colour);
		for &coord in coords {
			let path = match layout.build_path(coord) {
				Ok(path) => path,
				Err(e) => {
					warn!("omitting cable: {e}");
					report.cables_skipped += 1;
					continue;
				}
			};
			for op in &path.ops {
				match *op {
					DrawOp::MoveTo(p) => surface.move_to(p.x, p.y),
					DrawOp::LineTo(p) => surface.line_to(p.x, p.y),
					DrawOp::Arc {
						center,
						radius,
						start,
						end,
						counterclockwise,
					} => surface.arc(center.x, center.y, radius, start, end, counterclockwise),
				}
			}
			report.cables_drawn += 1;
		}
		surface.stroke();
	}
}

/// Milliseconds since the Unix epoch.
pub type Clock = Rc<dyn Fn() -> i64>;

fn wall_clock() -> Clock {
	Rc::new(|| js_sys::Date::now() as i64)
}

struct Frame<S> {
	surface: S,
	cache: StyleCache,
	config: SchematicConfig,
	clock: Clock,
}

impl<S: Surface> Frame<S> {
	fn render(&self) -> FrameReport {
		let config = &self.config;
		let groups = self.cache.groups();
		let mut report = FrameReport::default();

		self.surface
			.clear(config.canvas_width as f64, config.canvas_height as f64);
		draw_groups(&self.surface, &groups.cables, &config.cable, 0.0, &config.layout, &mut report);
		let offset = dash_offset((self.clock)(), config.gap_len, config.time_scale);
		draw_groups(&self.surface, &groups.packets, &config.packet, offset, &config.layout, &mut report);
		report
	}
}

/// Owns the drawing surface and redraws it on every scheduler tick until
/// dropped.
pub struct SchematicRenderer<S, T: IntervalTimer> {
	frame: Rc<RefCell<Frame<S>>>,
	scheduler: AnimationScheduler<T>,
	ticking: CancellationHandle<T::Handle>,
}

impl SchematicRenderer<CanvasRenderingContext2d, WindowTimer> {
	pub fn attach_canvas(canvas: &HtmlCanvasElement, config: SchematicConfig) -> Result<Self> {
		canvas.set_width(config.canvas_width);
		canvas.set_height(config.canvas_height);
		let ctx = canvas
			.get_context("2d")
			.map_err(|e| SchematicError::SurfaceUnavailable(format!("get_context threw: {e:?}")))?
			.ok_or_else(|| SchematicError::SurfaceUnavailable("missing 2d context".into()))?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| SchematicError::SurfaceUnavailable("context is not 2d".into()))?;
		Self::attach(ctx, WindowTimer::new()?, config)
	}
}

impl<S: Surface + 'static, T: IntervalTimer> SchematicRenderer<S, T> {
	pub fn attach(surface: S, timer: T, config: SchematicConfig) -> Result<Self> {
		config.validate()?;
		let period = config.tick_period_ms;
		let frame = Rc::new(RefCell::new(Frame {
			surface,
			cache: StyleCache::new(),
			config,
			clock: wall_clock(),
		}));

		let scheduler = AnimationScheduler::new(timer);
		let weak: Weak<RefCell<Frame<S>>> = Rc::downgrade(&frame);
		let ticking = scheduler.start(period, move || {
			let Some(frame) = weak.upgrade() else {
				return;
			};
			// Busy means a frame is mid-draw; drop this tick.
			if let Ok(frame) = frame.try_borrow() {
				frame.render();
			}
		})?;
		info!("schematic renderer attached, ticking every {period} ms");

		Ok(Self {
			frame,
			scheduler,
			ticking,
		})
	}

	pub fn with_clock(self, clock: Clock) -> Self {
		self.frame.borrow_mut().clock = clock;
		self
	}

	/// Rebuilds the cached style groups if `snapshot` is a new generation.
	pub fn on_grid_info_changed(&self, snapshot: &GridSnapshot) -> bool {
		let mut frame = self.frame.borrow_mut();
		let Frame { cache, config, .. } = &mut *frame;
		cache.observe(snapshot, &config.packet_colour)
	}

	pub fn render_frame(&self) -> FrameReport {
		self.frame.borrow().render()
	}

	/// Times the style groups have been rebuilt.
	pub fn rebuilds(&self) -> u64 {
		self.frame.borrow().cache.rebuilds()
	}

	pub fn is_ticking(&self) -> bool {
		self.ticking.is_live()
	}

	pub fn stop(&mut self) {
		if self.ticking.is_live() {
			self.scheduler.cancel(&mut self.ticking);
			info!("schematic renderer stopped");
		}
	}
}

impl<S, T: IntervalTimer> Drop for SchematicRenderer<S, T> {
	fn drop(&mut self) {
		if self.ticking.is_live() {
			self.scheduler.cancel(&mut self.ticking);
			info!("schematic renderer detached");
		}
	}
}

#[cfg(test)]
mod tests {
	use std::f64::consts::PI;

	use super::*;
	use crate::components::cluster_schematic::scheduler::testing::ManualTimer;
	use crate::components::cluster_schematic::types::{JobInfo, NodeInfo};

	#[derive(Clone, Debug, PartialEq)]
	enum Call {
		Clear,
		BeginPath,
		MoveTo(f64, f64),
		LineTo(f64, f64),
		Arc(f64, f64, f64, f64, f64, bool),
		Stroke,
		LineWidth(f64),
		Dash(Vec<f64>),
		DashOffset(f64),
		StrokeStyle(String),
	}

	#[derive(Clone, Default)]
	struct RecordingSurface {
		calls: Rc<RefCell<Vec<Call>>>,
	}

	impl RecordingSurface {
		fn take(&self) -> Vec<Call> {
			std::mem::take(&mut *self.calls.borrow_mut())
		}

		fn push(&self, call: Call) {
			self.calls.borrow_mut().push(call);
		}
	}

	impl Surface for RecordingSurface {
		fn clear(&self, _: f64, _: f64) {
			self.push(Call::Clear);
		}
		fn begin_path(&self) {
			self.push(Call::BeginPath);
		}
		fn move_to(&self, x: f64, y: f64) {
			self.push(Call::MoveTo(x, y));
		}
		fn line_to(&self, x: f64, y: f64) {
			self.push(Call::LineTo(x, y));
		}
		fn arc(&self, x: f64, y: f64, r: f64, s: f64, e: f64, ccw: bool) {
			self.push(Call::Arc(x, y, r, s, e, ccw));
		}
		fn stroke(&self) {
			self.push(Call::Stroke);
		}
		fn set_line_width(&self, width: f64) {
			self.push(Call::LineWidth(width));
		}
		fn set_line_dash(&self, dash: &[f64]) {
			self.push(Call::Dash(dash.to_vec()));
		}
		fn set_line_dash_offset(&self, offset: f64) {
			self.push(Call::DashOffset(offset));
		}
		fn set_stroke_style(&self, colour: &str) {
			self.push(Call::StrokeStyle(colour.into()));
		}
	}

	fn node(colour: Option<&str>, id: Option<&str>) -> NodeInfo {
		NodeInfo {
			job: JobInfo {
				id: id.map(Into::into),
				colour: colour.map(Into::into),
				..JobInfo::default()
			},
			..NodeInfo::default()
		}
	}

	fn renderer(
		surface: &RecordingSurface,
		timer: &ManualTimer,
	) -> SchematicRenderer<RecordingSurface, ManualTimer> {
		SchematicRenderer::attach(surface.clone(), timer.clone(), SchematicConfig::default())
			.unwrap()
			.with_clock(Rc::new(|| 1_000))
	}

	#[test]
	fn test_frame_strokes_cables_then_packets() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		let r = renderer(&surface, &timer);
		r.on_grid_info_changed(&GridSnapshot::new(1, vec![vec![node(Some("red"), Some("x"))]]));

		let report = r.render_frame();
		assert_eq!(report, FrameReport {
			cables_drawn: 2,
			cables_skipped: 0
		});

		let cable = vec![
			Call::MoveTo(148.5, 45.5),
			Call::Arc(176.5, 50.5, 5.0, 1.5 * PI, 2.0 * PI, false),
			Call::LineTo(181.5, 1035.0),
		];
		let mut expected = vec![
			Call::Clear,
			Call::LineWidth(3.0),
			Call::Dash(vec![0.0, 0.0]),
			Call::DashOffset(0.0),
			Call::BeginPath,
			Call::StrokeStyle("red".into()),
		];
		expected.extend(cable.clone());
		expected.extend([
			Call::Stroke,
			Call::LineWidth(2.0),
			Call::Dash(vec![2.0, 50.0, 2.0, 25.0, 2.0, 200.0]),
			Call::DashOffset(10.0),
			Call::BeginPath,
			Call::StrokeStyle("white".into()),
		]);
		expected.extend(cable);
		expected.push(Call::Stroke);
		assert_eq!(surface.take(), expected);
	}

	#[test]
	fn test_one_path_per_colour() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		let r = renderer(&surface, &timer);
		r.on_grid_info_changed(&GridSnapshot::new(1, vec![
			vec![node(Some("red"), None), node(Some("blue"), None)],
			vec![node(Some("red"), None), node(Some("red"), None)],
		]));
		r.render_frame();

		let calls = surface.take();
		let begins = calls.iter().filter(|c| **c == Call::BeginPath).count();
		let strokes = calls.iter().filter(|c| **c == Call::Stroke).count();
		// blue, red, and the empty packet group
		assert_eq!((begins, strokes), (3, 3));
		let moves = calls
			.iter()
			.filter(|c| matches!(c, Call::MoveTo(..)))
			.count();
		assert_eq!(moves, 4);
	}

	#[test]
	fn test_bad_cells_do_not_stop_the_frame() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		let r = renderer(&surface, &timer);
		let mut rows: Vec<_> = (0..5).map(|_| vec![node(Some("red"), None)]).collect();
		rows[1][0] = node(None, Some("x"));
		r.on_grid_info_changed(&GridSnapshot::new(1, rows));

		let report = r.render_frame();
		// row 1 is malformed and row 4 is outside the layout
		assert_eq!(report, FrameReport {
			cables_drawn: 3,
			cables_skipped: 1
		});
		assert!(surface.take().contains(&Call::StrokeStyle("red".into())));
	}

	#[test]
	fn test_unchanged_generation_aggregates_once() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		let r = renderer(&surface, &timer);
		let snap = GridSnapshot::new(7, vec![vec![node(Some("red"), None)]]);
		assert!(r.on_grid_info_changed(&snap));
		assert!(!r.on_grid_info_changed(&snap));
		assert_eq!(r.rebuilds(), 1);
	}

	#[test]
	fn test_ticks_draw_frames() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		let r = renderer(&surface, &timer);
		r.on_grid_info_changed(&GridSnapshot::new(1, vec![vec![node(Some("red"), None)]]));
		assert_eq!(*timer.periods.borrow(), vec![500]);

		timer.fire();
		timer.fire();
		let clears = surface
			.take()
			.iter()
			.filter(|c| **c == Call::Clear)
			.count();
		assert_eq!(clears, 2);
		assert!(r.is_ticking());
	}

	#[test]
	fn test_no_frames_after_teardown() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		let mut r = renderer(&surface, &timer);
		r.stop();
		assert!(!r.is_ticking());
		assert_eq!(timer.cleared(), 1);

		timer.fire_all();
		assert!(surface.take().is_empty());

		drop(r);
		assert_eq!(timer.cleared(), 1);
		timer.fire_all();
		assert!(surface.take().is_empty());
	}

	#[test]
	fn test_drop_cancels_timer() {
		let (surface, timer) = (RecordingSurface::default(), ManualTimer::default());
		drop(renderer(&surface, &timer));
		assert_eq!(timer.cleared(), 1);
		timer.fire_all();
		assert!(surface.take().is_empty());
	}

	#[test]
	fn test_attach_rejects_invalid_config() {
		let config = SchematicConfig {
			tick_period_ms: 0,
			..SchematicConfig::default()
		};
		let err = SchematicRenderer::attach(RecordingSurface::default(), ManualTimer::default(), config)
			.err();
		assert!(matches!(err, Some(SchematicError::InvalidConfig(_))));
	}
}
