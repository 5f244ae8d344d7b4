use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::layout::LayoutStrategy;
use super::render;
use super::state::{FlowOptions, FlowState};
use super::types::FlowData;

type SharedState = Rc<RefCell<Option<FlowState>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Browser resources owned by one canvas instance, released on unmount.
struct Lifecycle {
	state: SharedState,
	animate: SharedClosure,
	resize_cb: SharedClosure,
	frame: Rc<Cell<Option<i32>>>,
	stopped: Rc<Cell<bool>>,
}

impl Lifecycle {
	fn teardown(&self) {
		self.stopped.set(true);
		if let Some(win) = web_sys::window() {
			if let Some(id) = self.frame.take() {
				let _ = win.cancel_animation_frame(id);
			}
			if let Some(ref cb) = *self.resize_cb.borrow() {
				let _ = win
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		self.resize_cb.borrow_mut().take();
		self.animate.borrow_mut().take();
		self.state.borrow_mut().take();
		debug!("canvas torn down");
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	match canvas.get_context("2d") {
		Ok(Some(ctx)) => ctx.dyn_into().ok(),
		Ok(None) => None,
		Err(e) => {
			error!("canvas context unavailable: {:?}", e);
			None
		}
	}
}

/// Pointer position relative to the canvas.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive node/edge canvas with pan, zoom, minimap and controls.
#[component]
pub fn FlowCanvas(
	#[prop(into)] data: Signal<FlowData>,
	#[prop(optional)] strategy: LayoutStrategy,
	#[prop(optional)] options: FlowOptions,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb: SharedClosure = Rc::new(RefCell::new(None));
	let lifecycle = Lifecycle {
		state: state.clone(),
		animate: animate.clone(),
		resize_cb: resize_cb.clone(),
		frame: Rc::new(Cell::new(None)),
		stopped: Rc::new(Cell::new(false)),
	};
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	let (frame_init, stopped_init) = (lifecycle.frame.clone(), lifecycle.stopped.clone());
	let (interactive, set_interactive) = signal(true);

	let teardown = StoredValue::new_local(lifecycle);
	on_cleanup(move || {
		teardown.try_with_value(Lifecycle::teardown);
	});

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let graph = data.get();
		if stopped_init.get() {
			return;
		}
		if let Some(ref mut s) = *state_init.borrow_mut() {
			s.replace_data(&graph);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			warn!("no window, canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = context_2d(&canvas) else {
			warn!("2d context missing, canvas not started");
			return;
		};
		*state_init.borrow_mut() = Some(FlowState::new(
			&graph,
			w,
			h,
			options.clone(),
			strategy.clone(),
		));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let (frame_anim, stopped_anim) = (frame_init.clone(), stopped_init.clone());
		let canvas_anim = canvas.clone();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			frame_anim.set(None);
			// The route may have dropped the canvas before cleanup ran.
			if stopped_anim.get() || !canvas_anim.is_connected() {
				stopped_anim.set(true);
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.sync_layout();
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				frame_anim.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			frame_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if s.minimap().panel.contains(x, y) {
				s.begin_minimap_pan(x, y);
			} else if let Some(handle) = s.handle_at_position(x, y).filter(|_| s.interactive) {
				s.begin_connect(handle, x, y);
			} else if let Some(idx) = s.node_at_position(x, y).filter(|_| s.interactive) {
				s.begin_drag(idx, x, y);
			} else {
				s.begin_pan(x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.minimap_pan.is_some() {
				s.center_on_minimap(x, y);
			} else if s.connect.from.is_some() {
				s.connect_to(x, y);
			} else if s.drag.active {
				s.drag_to(x, y);
			} else if s.pan.active {
				s.pan_to(x, y);
			} else {
				let hovered = s.node_at_position(x, y);
				s.set_hover(hovered);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let pos = pointer(canvas_ref, &ev);
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if let Some((x, y)) = pos {
				s.finish_connect(x, y);
			}
			s.end_drag();
			s.end_pan();
			s.end_minimap_pan();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.cancel_gestures();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			if s.minimap().panel.contains(x, y) {
				let (cx, cy) = (s.width / 2.0, s.height / 2.0);
				s.zoom_at(cx, cy, factor);
			} else {
				s.zoom_at(x, y, factor);
			}
		}
	};

	let (state_zi, state_zo, state_fit, state_lock) =
		(state.clone(), state.clone(), state.clone(), state.clone());

	view! {
		<canvas
			node_ref=canvas_ref
			class="flow-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
		<div class="flow-controls">
			<button title="zoom in" on:click=move |_| {
				if let Some(ref mut s) = *state_zi.borrow_mut() {
					s.zoom_in();
				}
			}>"+"</button>
			<button title="zoom out" on:click=move |_| {
				if let Some(ref mut s) = *state_zo.borrow_mut() {
					s.zoom_out();
				}
			}>"−"</button>
			<button title="fit view" on:click=move |_| {
				if let Some(ref mut s) = *state_fit.borrow_mut() {
					s.fit_view();
				}
			}>"⤢"</button>
			<button title="toggle interactivity" on:click=move |_| {
				if let Some(ref mut s) = *state_lock.borrow_mut() {
					set_interactive.set(s.toggle_interactive());
				}
			}>{move || if interactive.get() { "🔓" } else { "🔒" }}</button>
		</div>
	}
}
