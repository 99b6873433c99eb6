use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::error::{Result, SchematicError};

/// Dash phase for a wall-clock instant: `round(seconds * time_scale) mod gap_len`.
///
/// Works in whole milliseconds so the offset repeats exactly every
/// `gap_len / time_scale` seconds.
pub fn dash_offset(epoch_ms: i64, gap_len: i64, time_scale: i64) -> f64 {
	// round(ms * scale / 1000), halves towards +inf like Math.round
	let ticks = (i128::from(epoch_ms) * i128::from(time_scale) * 2 + 1000).div_euclid(2000);
	ticks.rem_euclid(i128::from(gap_len)) as f64
}

/// A source of repeating callbacks.
pub trait IntervalTimer {
	type Handle;

	fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<Self::Handle>;
	fn clear_interval(&self, handle: Self::Handle);
}

/// `window.setInterval`, holding the closure until the interval is cleared.
pub struct WindowTimer {
	window: Window,
}

pub struct WindowInterval {
	id: i32,
	_callback: Closure<dyn FnMut()>,
}

impl WindowTimer {
	pub fn new() -> Result<Self> {
		let window = web_sys::window()
			.ok_or_else(|| SchematicError::TimerUnavailable("no window".into()))?;
		Ok(Self { window })
	}
}

impl IntervalTimer for WindowTimer {
	type Handle = WindowInterval;

	fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Result<WindowInterval> {
		let timeout = i32::try_from(period_ms)
			.map_err(|_| SchematicError::TimerUnavailable(format!("period {period_ms} ms too long")))?;
		let callback = Closure::wrap(callback);
		let id = self
			.window
			.set_interval_with_callback_and_timeout_and_arguments_0(
				callback.as_ref().unchecked_ref(),
				timeout,
			)
			.map_err(|e| SchematicError::TimerUnavailable(format!("{e:?}")))?;
		Ok(WindowInterval {
			id,
			_callback: callback,
		})
	}

	fn clear_interval(&self, handle: WindowInterval) {
		self.window.clear_interval_with_handle(handle.id);
	}
}

/// A running tick. Ticks that still arrive after cancellation do nothing.
pub struct CancellationHandle<H> {
	live: Rc<Cell<bool>>,
	timer: Option<H>,
}

impl<H> CancellationHandle<H> {
	pub fn is_live(&self) -> bool {
		self.live.get()
	}
}

/// Periodic redraw trigger. Owns no drawing state.
pub struct AnimationScheduler<T: IntervalTimer> {
	timer: T,
}

impl<T: IntervalTimer> AnimationScheduler<T> {
	pub fn new(timer: T) -> Self {
		Self { timer }
	}

	pub fn start(
		&self,
		period_ms: u32,
		mut on_tick: impl FnMut() + 'static,
	) -> Result<CancellationHandle<T::Handle>> {
		let live = Rc::new(Cell::new(true));
		let tick_live = live.clone();
		let timer = self.timer.set_interval(
			period_ms,
			Box::new(move || {
				if tick_live.get() {
					on_tick();
				}
			}),
		)?;
		Ok(CancellationHandle {
			live,
			timer: Some(timer),
		})
	}

	pub fn cancel(&self, handle: &mut CancellationHandle<T::Handle>) {
		handle.live.set(false);
		if let Some(timer) = handle.timer.take() {
			self.timer.clear_interval(timer);
		}
	}
}


#[cfg(test)]
mod tests {
	use super::testing::ManualTimer;
	use super::*;

	#[test]
	fn test_offset_in_range() {
		for ms in [0, 1, 49, 50, 27_499, 1_697_000_000_123, -1234] {
			let offset = dash_offset(ms, 275, 10);
			assert!((0.0..275.0).contains(&offset), "{ms} -> {offset}");
		}
	}

	#[test]
	fn test_offset_rounds_tenths() {
		assert_eq!(dash_offset(0, 275, 10), 0.0);
		assert_eq!(dash_offset(149, 275, 10), 1.0);
		assert_eq!(dash_offset(150, 275, 10), 2.0);
		assert_eq!(dash_offset(27_400, 275, 10), 274.0);
		assert_eq!(dash_offset(27_500, 275, 10), 0.0);
	}

	#[test]
	fn test_offset_at_extreme_scale() {
		let offset = dash_offset(1_760_000_000_000, 275, 10_000_000);
		assert!((0.0..275.0).contains(&offset));
		assert!((0.0..275.0).contains(&dash_offset(i64::MAX, 275, 1000)));
		assert!((0.0..275.0).contains(&dash_offset(i64::MIN, 275, 1000)));
	}

	#[test]
	fn test_offset_period() {
		for ms in (0..60_000).step_by(37) {
			assert_eq!(dash_offset(ms, 275, 10), dash_offset(ms + 27_500, 275, 10));
		}
	}

	#[test]
	fn test_ticks_until_cancelled() {
		let timer = ManualTimer::default();
		let scheduler = AnimationScheduler::new(timer.clone());
		let count = Rc::new(Cell::new(0));
		let tick_count = count.clone();
		let mut handle = scheduler
			.start(500, move || tick_count.set(tick_count.get() + 1))
			.unwrap();

		timer.fire();
		timer.fire();
		assert_eq!(count.get(), 2);
		assert_eq!(*timer.periods.borrow(), vec![500]);

		scheduler.cancel(&mut handle);
		assert!(!handle.is_live());
		assert_eq!(timer.cleared(), 1);

		timer.fire_all();
		assert_eq!(count.get(), 2);

		scheduler.cancel(&mut handle);
		assert_eq!(timer.cleared(), 1);
	}
}
