use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, TouchEvent};
use yew::prelude::*;

use crate::model::{CanvasAction, CanvasState, Shape, ShapeKind, ViewSettings};
use crate::state::{GestureEvent, TouchTracker};
use crate::util::clog;

use super::{
    controls_panel::ControlsPanel, intro_overlay::IntroOverlay, settings_modal::SettingsModal,
    stats_panel::StatsPanel,
};

#[derive(Properties, PartialEq, Clone)]
pub struct SpawnerViewProps {
    pub canvas_state: UseReducerHandle<CanvasState>,
    pub settings: UseStateHandle<ViewSettings>,
}

/// Maps recognized gestures onto controller actions. Pinch deltas need the
/// shape resolved at gesture start; everything else routes straight through.
fn dispatch_gestures(
    handle: &UseReducerHandle<CanvasState>,
    pinch_target: Option<u64>,
    events: Vec<GestureEvent>,
) {
    for ev in events {
        match ev {
            GestureEvent::Tap { .. } => handle.dispatch(CanvasAction::Tap),
            GestureEvent::SwipeDown => handle.dispatch(CanvasAction::SwipeDown),
            GestureEvent::PanBegin { x, y } => handle.dispatch(CanvasAction::PanBegin { x, y }),
            GestureEvent::PanMove { x, y } => handle.dispatch(CanvasAction::PanMove { x, y }),
            GestureEvent::PanEnd { x, y } => handle.dispatch(CanvasAction::PanEnd { x, y }),
            GestureEvent::Pinch { scale } => {
                if let Some(shape_id) = pinch_target {
                    handle.dispatch(CanvasAction::Pinch {
                        shape_id,
                        factor: scale,
                    });
                }
            }
            GestureEvent::RotationEnded => handle.dispatch(CanvasAction::RotationEnded),
        }
    }
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &Shape) {
    let f = shape.frame;
    let (cx, cy) = f.center();
    ctx.save();
    ctx.set_global_alpha(shape.opacity);
    if (shape.scale - 1.0).abs() > f64::EPSILON {
        ctx.translate(cx, cy).ok();
        ctx.scale(shape.scale, shape.scale).ok();
        ctx.translate(-cx, -cy).ok();
    }
    ctx.set_fill_style_str(shape.fill.css());
    match shape.kind() {
        ShapeKind::Triangle => {
            // Isosceles: base along the bottom edge, apex at top-mid.
            ctx.begin_path();
            ctx.move_to(f.x, f.y + f.height);
            ctx.line_to(f.x + f.width, f.y + f.height);
            ctx.line_to(f.x + f.width / 2.0, f.y);
            ctx.close_path();
            ctx.fill();
        }
        ShapeKind::Oval => {
            ctx.begin_path();
            ctx.ellipse(
                cx,
                cy,
                f.width / 2.0,
                f.height / 2.0,
                0.0,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
            ctx.fill();
        }
        ShapeKind::Rect => {
            ctx.fill_rect(f.x, f.y, f.width, f.height);
        }
    }
    ctx.restore();
}

#[function_component(SpawnerView)]
pub fn spawner_view(props: &SpawnerViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let draw_ref = use_mut_ref(|| None::<Rc<dyn Fn()>>);
    let canvas_state_ref = use_mut_ref(|| props.canvas_state.clone());
    let tracker = use_mut_ref(TouchTracker::default);
    let pinch_target = use_mut_ref(|| None::<u64>);
    let open_settings = use_state(|| false);
    let show_intro = {
        let initial = {
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    // Show only if key absent
                    store.get_item("ss_intro_seen").ok().flatten().is_none()
                } else {
                    true
                }
            } else {
                true
            }
        };
        use_state(|| initial)
    };

    // Effect: refresh the handle and redraw on each model version
    {
        let canvas_state_ref = canvas_state_ref.clone();
        let current_handle = props.canvas_state.clone();
        let draw_ref_local = draw_ref.clone();
        let version = props.canvas_state.version;
        use_effect_with(version, move |_| {
            *canvas_state_ref.borrow_mut() = current_handle.clone();
            if let Some(f) = &*draw_ref_local.borrow() {
                f();
            }
            || ()
        });
    }

    // Main mount effect (listeners, fade interval)
    {
        let canvas_ref = canvas_ref.clone();
        let canvas_state = props.canvas_state.clone();
        let canvas_state_ref_setup = canvas_state_ref.clone();
        let draw_ref_setup = draw_ref.clone();
        let tracker_setup = tracker.clone();
        let pinch_target_setup = pinch_target.clone();
        let show_intro_clone = show_intro.clone();
        use_effect_with((), move |_| {
            let show_intro_handle = show_intro_clone.clone();
            let window = web_sys::window().expect("window");
            let canvas: HtmlCanvasElement = canvas_ref.cast::<HtmlCanvasElement>().expect("canvas");
            let compute_and_apply_canvas_size = {
                let canvas = canvas.clone();
                let window = window.clone();
                let canvas_state = canvas_state.clone();
                move || {
                    let width = window
                        .inner_width()
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(800.0);
                    let height = window
                        .inner_height()
                        .ok()
                        .and_then(|v| v.as_f64())
                        .unwrap_or(600.0);
                    canvas.set_width(width.max(0.0) as u32);
                    canvas.set_height(height.max(0.0) as u32);
                    canvas_state.dispatch(CanvasAction::Resized { width, height });
                }
            };
            compute_and_apply_canvas_size();
            clog("shape spawner canvas ready");
            // Draw closure
            let draw_closure: Rc<dyn Fn()> = {
                let canvas = canvas.clone();
                let canvas_state_ref = canvas_state_ref_setup.clone();
                Rc::new(move || {
                    if !canvas.is_connected() {
                        return;
                    }
                    let ctx = match canvas.get_context("2d").ok().flatten() {
                        Some(c) => c.dyn_into::<CanvasRenderingContext2d>().unwrap(),
                        None => return,
                    };
                    let w = canvas.width() as f64;
                    let h = canvas.height() as f64;
                    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
                    ctx.set_fill_style_str("#0e1116");
                    ctx.fill_rect(0.0, 0.0, w, h);
                    let handle = canvas_state_ref.borrow().clone();
                    for shape in &handle.shapes {
                        draw_shape(&ctx, shape);
                    }
                })
            };
            *draw_ref_setup.borrow_mut() = Some(draw_closure);
            if let Some(f) = &*draw_ref_setup.borrow() {
                f();
            }
            // Fade interval: drives delete animations through the reducer so
            // eviction stays serialized with gesture handling.
            let fade_tick = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                Closure::wrap(Box::new(move || {
                    let handle = canvas_state_ref.borrow().clone();
                    handle.dispatch(CanvasAction::FadeTick { dt: 0.016 });
                }) as Box<dyn FnMut()>)
            };
            let fade_tick_id = window
                .set_interval_with_callback_and_timeout_and_arguments_0(
                    fade_tick.as_ref().unchecked_ref(),
                    16,
                )
                .unwrap();
            // Resize
            let resize_cb = {
                let compute_and_apply_canvas_size = compute_and_apply_canvas_size.clone();
                let draw_ref = draw_ref_setup.clone();
                Closure::wrap(Box::new(move |_e: web_sys::Event| {
                    compute_and_apply_canvas_size();
                    if let Some(f) = &*draw_ref.borrow() {
                        f();
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .unwrap();
            // Mouse events feed the same tracker as single-touch
            let mousedown_cb = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let tracker = tracker_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    if e.button() != 0 {
                        return;
                    }
                    let x = e.offset_x() as f64;
                    let y = e.offset_y() as f64;
                    let handle = canvas_state_ref.borrow().clone();
                    let on_shape = handle.topmost_shape_at(x, y).is_some();
                    let now = js_sys::Date::now() / 1000.0;
                    let events = tracker.borrow_mut().pointer_down(x, y, now, on_shape);
                    dispatch_gestures(&handle, None, events);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                )
                .unwrap();
            let mousemove_cb = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let tracker = tracker_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
                    let events = tracker
                        .borrow_mut()
                        .pointer_move(e.offset_x() as f64, e.offset_y() as f64);
                    if events.is_empty() {
                        return;
                    }
                    let handle = canvas_state_ref.borrow().clone();
                    dispatch_gestures(&handle, None, events);
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                )
                .unwrap();
            let mouseup_cb = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let tracker = tracker_setup.clone();
                Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
                    let now = js_sys::Date::now() / 1000.0;
                    let events = tracker.borrow_mut().pointer_up(now);
                    if events.is_empty() {
                        return;
                    }
                    let handle = canvas_state_ref.borrow().clone();
                    dispatch_gestures(&handle, None, events);
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
                .unwrap();
            // Wheel over a shape stands in for pinch on the desktop
            let wheel_cb = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                    e.prevent_default();
                    let x = e.offset_x() as f64;
                    let y = e.offset_y() as f64;
                    let handle = canvas_state_ref.borrow().clone();
                    if let Some(shape_id) = handle.topmost_shape_at(x, y) {
                        let factor = (-e.delta_y() * 0.001).exp();
                        handle.dispatch(CanvasAction::Pinch { shape_id, factor });
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
                .unwrap();
            // Keydown: desktop stand-ins for the two-finger/swipe gestures
            let keydown_cb = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let show_intro_handle_k = show_intro_handle.clone();
                Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
                    let key = e.key();
                    if key == " " || key == "Space" || key == "Spacebar" {
                        e.prevent_default();
                        if *show_intro_handle_k {
                            show_intro_handle_k.set(false);
                            if let Some(win) = web_sys::window() {
                                if let Ok(Some(store)) = win.local_storage() {
                                    let _ = store.set_item("ss_intro_seen", "1");
                                }
                            }
                        }
                        return;
                    }
                    if key == "c" || key == "C" {
                        let handle = canvas_state_ref.borrow().clone();
                        handle.dispatch(CanvasAction::RotationEnded);
                    } else if key == "x" || key == "X" {
                        let handle = canvas_state_ref.borrow().clone();
                        handle.dispatch(CanvasAction::SwipeDown);
                    }
                }) as Box<dyn FnMut(_)>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();
            // Touch
            let touch_start_cb = {
                let canvas_tc = canvas.clone();
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let tracker = tracker_setup.clone();
                let pinch_target = pinch_target_setup.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    let rect = canvas_tc.get_bounding_client_rect();
                    let handle = canvas_state_ref.borrow().clone();
                    if touches.length() == 1 {
                        if let Some(t0) = touches.item(0) {
                            let cx = t0.client_x() as f64 - rect.left();
                            let cy = t0.client_y() as f64 - rect.top();
                            let on_shape = handle.topmost_shape_at(cx, cy).is_some();
                            let now = js_sys::Date::now() / 1000.0;
                            let events = tracker.borrow_mut().pointer_down(cx, cy, now, on_shape);
                            dispatch_gestures(&handle, None, events);
                        }
                    } else if touches.length() >= 2 {
                        if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                            let p0 = (
                                t0.client_x() as f64 - rect.left(),
                                t0.client_y() as f64 - rect.top(),
                            );
                            let p1 = (
                                t1.client_x() as f64 - rect.left(),
                                t1.client_y() as f64 - rect.top(),
                            );
                            let mid = ((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0);
                            *pinch_target.borrow_mut() = handle.topmost_shape_at(mid.0, mid.1);
                            let events = tracker.borrow_mut().two_pointer_down(p0, p1);
                            dispatch_gestures(&handle, None, events);
                        }
                    }
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                )
                .ok();
            let touch_move_cb = {
                let canvas_tc = canvas.clone();
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let tracker = tracker_setup.clone();
                let pinch_target = pinch_target_setup.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let touches = e.touches();
                    if touches.length() == 0 {
                        e.prevent_default();
                        return;
                    }
                    let rect = canvas_tc.get_bounding_client_rect();
                    if touches.length() == 1 {
                        if let Some(t0) = touches.item(0) {
                            let cx = t0.client_x() as f64 - rect.left();
                            let cy = t0.client_y() as f64 - rect.top();
                            let events = tracker.borrow_mut().pointer_move(cx, cy);
                            if !events.is_empty() {
                                let handle = canvas_state_ref.borrow().clone();
                                dispatch_gestures(&handle, None, events);
                            }
                        }
                    } else if let (Some(t0), Some(t1)) = (touches.item(0), touches.item(1)) {
                        let p0 = (
                            t0.client_x() as f64 - rect.left(),
                            t0.client_y() as f64 - rect.top(),
                        );
                        let p1 = (
                            t1.client_x() as f64 - rect.left(),
                            t1.client_y() as f64 - rect.top(),
                        );
                        let events = tracker.borrow_mut().two_pointer_move(p0, p1);
                        if !events.is_empty() {
                            let handle = canvas_state_ref.borrow().clone();
                            let target = *pinch_target.borrow();
                            dispatch_gestures(&handle, target, events);
                        }
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                )
                .ok();
            let touch_end_cb = {
                let canvas_state_ref = canvas_state_ref_setup.clone();
                let tracker = tracker_setup.clone();
                let pinch_target = pinch_target_setup.clone();
                Closure::wrap(Box::new(move |e: TouchEvent| {
                    let remaining = e.touches().length();
                    let mut tr = tracker.borrow_mut();
                    let events = if tr.two_active() && remaining < 2 {
                        *pinch_target.borrow_mut() = None;
                        tr.two_pointer_up()
                    } else if remaining == 0 {
                        let now = js_sys::Date::now() / 1000.0;
                        tr.pointer_up(now)
                    } else {
                        Vec::new()
                    };
                    drop(tr);
                    if !events.is_empty() {
                        let handle = canvas_state_ref.borrow().clone();
                        dispatch_gestures(&handle, None, events);
                    }
                    e.prevent_default();
                }) as Box<dyn FnMut(_)>)
            };
            canvas
                .add_event_listener_with_callback("touchend", touch_end_cb.as_ref().unchecked_ref())
                .ok();
            canvas
                .add_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                )
                .ok();
            // Cleanup
            let window_clone = window.clone();
            move || {
                let _ = window_clone.remove_event_listener_with_callback(
                    "resize",
                    resize_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousedown",
                    mousedown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "mousemove",
                    mousemove_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "mouseup",
                    mouseup_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "wheel",
                    wheel_cb.as_ref().unchecked_ref(),
                );
                let _ = window_clone.remove_event_listener_with_callback(
                    "keydown",
                    keydown_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchstart",
                    touch_start_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchmove",
                    touch_move_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchend",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                let _ = canvas.remove_event_listener_with_callback(
                    "touchcancel",
                    touch_end_cb.as_ref().unchecked_ref(),
                );
                window_clone.clear_interval_with_handle(fade_tick_id);
                let _keep_alive = (
                    &fade_tick,
                    &resize_cb,
                    &mousedown_cb,
                    &mousemove_cb,
                    &mouseup_cb,
                    &wheel_cb,
                    &keydown_cb,
                    &touch_start_cb,
                    &touch_move_cb,
                    &touch_end_cb,
                );
            }
        });
    }

    let settings = *props.settings;
    let shape_count = props.canvas_state.live_count();
    let next_is_square = props.canvas_state.next_spawn_is_square;

    let hide_intro_cb: Callback<()> = {
        let show_intro = show_intro.clone();
        Callback::from(move |()| {
            show_intro.set(false);
            if let Some(win) = web_sys::window() {
                if let Ok(Some(store)) = win.local_storage() {
                    let _ = store.set_item("ss_intro_seen", "1");
                }
            }
        })
    };
    let show_help_cb: Callback<()> = {
        let show_intro = show_intro.clone();
        Callback::from(move |()| show_intro.set(true))
    };
    let recolor_cb: Callback<()> = {
        let canvas_state = props.canvas_state.clone();
        Callback::from(move |()| canvas_state.dispatch(CanvasAction::RotationEnded))
    };
    let clear_cb: Callback<()> = {
        let canvas_state = props.canvas_state.clone();
        Callback::from(move |()| canvas_state.dispatch(CanvasAction::SwipeDown))
    };
    let open_settings_cb: Callback<()> = {
        let open_settings = open_settings.clone();
        Callback::from(move |()| open_settings.set(true))
    };
    let close_settings_cb: Callback<()> = {
        let open_settings = open_settings.clone();
        Callback::from(move |()| open_settings.set(false))
    };
    let toggle_stats_cb: Callback<()> = {
        let settings_handle = props.settings.clone();
        Callback::from(move |()| {
            let mut s = *settings_handle;
            s.show_stats = !s.show_stats;
            settings_handle.set(s);
        })
    };
    let toggle_hints_cb: Callback<()> = {
        let settings_handle = props.settings.clone();
        Callback::from(move |()| {
            let mut s = *settings_handle;
            s.show_hints = !s.show_hints;
            settings_handle.set(s);
        })
    };

    html! {<div style="position:relative; width:100vw; height:100vh;">
        <canvas ref={canvas_ref.clone()} id="spawner-canvas" style="display:block; width:100%; height:100%; touch-action:none;"></canvas>
        <IntroOverlay show={*show_intro} hide_intro={hide_intro_cb} />
        { if settings.show_stats {
            html! { <StatsPanel shape_count={shape_count} next_is_square={next_is_square} /> }
        } else {
            html! {}
        } }
        <ControlsPanel on_recolor={recolor_cb} on_clear={clear_cb} on_show_help={show_help_cb} on_open_settings={open_settings_cb} show_hints={settings.show_hints} />
        <SettingsModal show={*open_settings} on_close={close_settings_cb} show_stats={settings.show_stats} on_toggle_stats={toggle_stats_cb} show_hints={settings.show_hints} on_toggle_hints={toggle_hints_cb} />
    </div>}
}
