use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Array;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, ResizeObserver, Window};

use super::types::Viewport;

/// Where the diagram takes its size from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum ViewportPolicy {
	/// Bounding box of the element the diagram is mounted in, or the window
	/// when there is no element yet.
	#[default]
	Container,
	/// A fraction of the browser window.
	Window {
		width_fraction: f64,
		height_fraction: f64,
	},
	/// A set size, whatever the surroundings.
	Fixed(Viewport),
}

impl ViewportPolicy {
	/// Picks a size from whatever measurements are available, falling back
	/// to [`Viewport::DEFAULT`].
	pub fn resolve(&self, container: Option<Viewport>, window: Option<Viewport>) -> Viewport {
		match *self {
			ViewportPolicy::Container => container
				.or(window)
				.unwrap_or(Viewport::DEFAULT)
				.or_default(),
			ViewportPolicy::Window {
				width_fraction,
				height_fraction,
			} => window
				.map(|w| Viewport::new(w.width * width_fraction, w.height * height_fraction))
				.unwrap_or(Viewport::DEFAULT)
				.or_default(),
			ViewportPolicy::Fixed(v) => v.or_default(),
		}
	}
}

/// Collapses bursts of resize notifications into one layout pass per
/// animation frame.
///
/// A request that arrives while a pass is being applied is remembered and
/// answered with a fresh frame once the pass finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCoalescer {
	scheduled: bool,
	applying: bool,
	dirty: bool,
}

impl FrameCoalescer {
	/// Returns true when the caller must schedule a frame.
	pub fn request(&mut self) -> bool {
		if self.applying {
			self.dirty = true;
			return false;
		}
		if self.scheduled {
			return false;
		}
		self.scheduled = true;
		true
	}

	pub fn begin(&mut self) {
		self.scheduled = false;
		self.applying = true;
		self.dirty = false;
	}

	/// Ends a pass; returns true when another frame must be scheduled.
	pub fn finish(&mut self) -> bool {
		self.applying = false;
		if self.dirty {
			self.dirty = false;
			self.scheduled = true;
			return true;
		}
		false
	}
}

fn window_size(window: &Window) -> Option<Viewport> {
	Some(Viewport::new(
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Measures `container` (or the window) according to `policy`.
pub fn measure(policy: &ViewportPolicy, container: Option<&Element>) -> Viewport {
	let container = container.map(|el| {
		let rect = el.get_bounding_client_rect();
		Viewport::new(rect.width(), rect.height())
	});
	let window = web_sys::window().as_ref().and_then(window_size);
	policy.resolve(container, window)
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Watches the container and the window for size changes and runs
/// `relayout` at most once per animation frame. Listeners are removed when
/// the watcher is dropped.
pub struct ResizeWatcher {
	window: Option<Window>,
	observer: Option<ResizeObserver>,
	on_window_resize: Option<Closure<dyn FnMut()>>,
	_on_observe: Option<Closure<dyn FnMut(Array)>>,
	frame: FrameCallback,
	pending: Rc<Cell<Option<i32>>>,
}

impl ResizeWatcher {
	pub fn attach(target: Option<&Element>, mut relayout: impl FnMut() + 'static) -> Self {
		let window = web_sys::window();
		let coalescer = Rc::new(RefCell::new(FrameCoalescer::default()));
		let frame: FrameCallback = Rc::new(RefCell::new(None));
		let pending = Rc::new(Cell::new(None));

		let schedule = {
			let (frame, pending) = (frame.clone(), pending.clone());
			move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				if let Some(ref cb) = *frame.borrow() {
					match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
						Ok(id) => pending.set(Some(id)),
						Err(e) => warn!("requestAnimationFrame failed: {e:?}"),
					}
				}
			}
		};

		*frame.borrow_mut() = Some(Closure::new({
			let (coalescer, pending) = (coalescer.clone(), pending.clone());
			let schedule = schedule.clone();
			move || {
				pending.set(None);
				coalescer.borrow_mut().begin();
				relayout();
				if coalescer.borrow_mut().finish() {
					schedule();
				}
			}
		}));

		let request = move || {
			if coalescer.borrow_mut().request() {
				schedule();
			}
		};

		let on_window_resize = window.as_ref().and_then(|win| {
			let request = request.clone();
			let cb = Closure::<dyn FnMut()>::new(move || request());
			match win.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref()) {
				Ok(()) => Some(cb),
				Err(e) => {
					warn!("could not listen for window resize: {e:?}");
					None
				}
			}
		});

		let (observer, on_observe) = match target {
			Some(el) => {
				let request = request.clone();
				let cb = Closure::<dyn FnMut(Array)>::new(move |_: Array| request());
				match ResizeObserver::new(cb.as_ref().unchecked_ref()) {
					Ok(observer) => {
						observer.observe(el);
						(Some(observer), Some(cb))
					}
					Err(e) => {
						warn!("ResizeObserver unavailable, using window resize only: {e:?}");
						(None, None)
					}
				}
			}
			None => (None, None),
		};

		request();
		debug!("resize watcher attached (observer: {})", observer.is_some());

		Self {
			window,
			observer,
			on_window_resize,
			_on_observe: on_observe,
			frame,
			pending,
		}
	}
}

impl Drop for ResizeWatcher {
	fn drop(&mut self) {
		if let Some(observer) = self.observer.take() {
			observer.disconnect();
		}
		if let Some(ref win) = self.window {
			if let Some(ref cb) = self.on_window_resize {
				let _ = win
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			if let Some(id) = self.pending.take() {
				let _ = win.cancel_animation_frame(id);
			}
		}
		// breaks the frame -> schedule -> frame cycle
		self.frame.borrow_mut().take();
		debug!("resize watcher detached");
	}
}
