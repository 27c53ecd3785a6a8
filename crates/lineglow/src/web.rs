//! Browser bootstrap: binds the background animator and the copy-link toast
//! to the page's DOM.
//!
//! Expected elements: `<canvas id="bg">`, `#toast`, `#year`, and a
//! `#copyPage` button. An optional
//! `<script type="application/toml" id="lineglow-config">` overrides the
//! built-in tunables.

use std::rc::Rc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use fieldconfig::FieldConfig;
use futures::future::LocalBoxFuture;
use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use js_sys::{Function, Promise, Reflect};
use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::{
    Canvas2d, ColorStop, CompositeMode, LinearGradient, Point, RadialGradient, Rect, Shadow,
    Surface, Transform,
};
use scheduler::{FrameHost, TimerHost};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    CanvasGradient, CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window,
};

use crate::animator::BackgroundAnimator;
use crate::clipboard::{Clipboard, ClipboardError};
use crate::toast::{CopyLinkAction, Toast, ToastView};

const CANVAS_ID: &str = "bg";
const TOAST_ID: &str = "toast";
const YEAR_ID: &str = "year";
const COPY_BUTTON_ID: &str = "copyPage";
const CONFIG_ID: &str = "lineglow-config";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let page = Page::mount().map_err(|err| JsValue::from_str(&format!("{err:#}")))?;
    info!(
        lines = page.animator.line_count(),
        "lineglow background mounted"
    );
    // Lives for the rest of the document's lifetime.
    std::mem::forget(page);
    Ok(())
}

struct Page {
    animator: Rc<BackgroundAnimator<WebCanvas, StdRng, WebFrames>>,
    _copy_action: Rc<CopyLinkAction<WebTimers>>,
    _listeners: Vec<EventListener>,
}

impl Page {
    fn mount() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("window has no document"))?;

        let config = inline_config(&document)?;
        write_year(&document)?;

        let canvas = WebCanvas::from_document(&document, CANVAS_ID)?;
        let mut animator = BackgroundAnimator::new(canvas, &config, StdRng::seed_from_u64(seed()));
        let (width, height, ratio) = window_metrics(&window);
        animator.resize(width, height, ratio);
        animator.start(WebFrames);
        let animator = Rc::new(animator);

        let mut listeners = Vec::with_capacity(2);
        {
            let animator = Rc::clone(&animator);
            let target = window.clone();
            listeners.push(EventListener::new(&window, "resize", move |_event| {
                let (width, height, ratio) = window_metrics(&target);
                animator.resize(width, height, ratio);
            }));
        }

        let toast_element = element::<HtmlElement>(&document, TOAST_ID)?;
        let toast = Toast::new(
            Rc::new(DomToast {
                element: toast_element,
            }),
            WebTimers,
            config.toast.duration,
        );
        let copy_action = Rc::new(CopyLinkAction::new(
            Rc::new(WebClipboard),
            toast,
            config.toast.clone(),
        ));
        {
            let button = element::<HtmlElement>(&document, COPY_BUTTON_ID)?;
            let copy_action = Rc::clone(&copy_action);
            let target = window.clone();
            listeners.push(EventListener::new(&button, "click", move |_event| {
                let href = target.location().href().ok();
                let copy_action = Rc::clone(&copy_action);
                spawn_local(async move {
                    copy_action.copy(href.as_deref()).await;
                });
            }));
        }

        Ok(Self {
            animator,
            _copy_action: copy_action,
            _listeners: listeners,
        })
    }
}

fn inline_config(document: &Document) -> Result<FieldConfig> {
    let Some(script) = document.get_element_by_id(CONFIG_ID) else {
        return Ok(FieldConfig::default());
    };
    let text = script.text_content().unwrap_or_default();
    let config = FieldConfig::from_toml_str(&text).context("invalid inline lineglow config")?;
    info!(lines = config.render.line_count, "using inline config");
    Ok(config)
}

fn write_year(document: &Document) -> Result<()> {
    let year = js_sys::Date::new_0().get_full_year();
    let element = element::<HtmlElement>(document, YEAR_ID)?;
    element.set_text_content(Some(&year.to_string()));
    Ok(())
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("missing #{id} element"))?
        .dyn_into::<T>()
        .map_err(|_| anyhow!("#{id} has an unexpected element type"))
}

fn window_metrics(window: &Window) -> (f64, f64, f64) {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
    };
    (
        dimension(window.inner_width()),
        dimension(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

fn seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}

struct WebCanvas {
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl WebCanvas {
    fn from_document(document: &Document, id: &str) -> Result<Self> {
        let element = element::<HtmlCanvasElement>(document, id)?;
        let context = element
            .get_context("2d")
            .map_err(|err| anyhow!("canvas: get_context threw: {}", describe_js(&err)))?
            .ok_or_else(|| anyhow!("canvas: 2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("canvas: context is not 2d"))?;
        Ok(Self { element, context })
    }

    fn linear_gradient(&self, gradient: &LinearGradient) -> CanvasGradient {
        let canvas_gradient = self.context.create_linear_gradient(
            gradient.start.x,
            gradient.start.y,
            gradient.end.x,
            gradient.end.y,
        );
        add_stops(&canvas_gradient, &gradient.stops);
        canvas_gradient
    }
}

fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) {
    for stop in stops {
        if let Err(err) = gradient.add_color_stop(stop.offset as f32, &stop.color.css()) {
            warn!(offset = stop.offset, error = %describe_js(&err), "gradient stop rejected");
        }
    }
}

impl Surface for WebCanvas {
    fn resize_backing(&mut self, width: u32, height: u32) {
        self.element.set_width(width);
        self.element.set_height(height);
    }

    fn set_display_size(&mut self, width: f64, height: f64) {
        let style = self.element.style();
        let width = style.set_property("width", &format!("{width}px"));
        let height = style.set_property("height", &format!("{height}px"));
        if let Err(err) = width.and(height) {
            warn!(error = %describe_js(&err), "failed to set canvas display size");
        }
    }

    fn set_transform(&mut self, transform: Transform) {
        let [a, b, c, d, e, f] = transform.matrix();
        if let Err(err) = self.context.set_transform(a, b, c, d, e, f) {
            warn!(error = %describe_js(&err), "failed to set canvas transform");
        }
    }
}

impl Canvas2d for WebCanvas {
    fn clear_rect(&mut self, rect: Rect) {
        self.context
            .clear_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_rect_radial(&mut self, rect: Rect, gradient: &RadialGradient) {
        let canvas_gradient = match self.context.create_radial_gradient(
            gradient.center.x,
            gradient.center.y,
            gradient.inner_radius,
            gradient.center.x,
            gradient.center.y,
            gradient.outer_radius,
        ) {
            Ok(canvas_gradient) => canvas_gradient,
            Err(err) => {
                warn!(error = %describe_js(&err), "radial gradient rejected");
                return;
            }
        };
        add_stops(&canvas_gradient, &gradient.stops);
        self.context.set_fill_style_canvas_gradient(&canvas_gradient);
        self.context
            .fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        if let Err(err) = self.context.set_global_composite_operation(mode.as_css()) {
            warn!(mode = mode.as_css(), error = %describe_js(&err), "composite mode rejected");
        }
    }

    fn set_shadow(&mut self, shadow: &Shadow) {
        self.context.set_shadow_blur(shadow.blur);
        self.context.set_shadow_color(&shadow.color.css());
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, gradient: &LinearGradient) {
        let canvas_gradient = self.linear_gradient(gradient);
        self.context
            .set_stroke_style_canvas_gradient(&canvas_gradient);
        self.context.set_line_width(width);
        self.context.begin_path();
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.context.stroke();
    }
}

/// `requestAnimationFrame`; dropping the handle cancels the request.
struct WebFrames;

impl FrameHost for WebFrames {
    type Handle = AnimationFrame;

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) -> Self::Handle {
        request_animation_frame(callback)
    }

    fn cancel_frame(&self, handle: Self::Handle) {
        drop(handle);
    }
}

/// `setTimeout`; dropping the handle clears the timer.
struct WebTimers;

impl TimerHost for WebTimers {
    type Handle = Timeout;

    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Self::Handle {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, callback)
    }

    fn clear_timeout(&self, handle: Self::Handle) {
        drop(handle);
    }
}

struct WebClipboard;

impl Clipboard for WebClipboard {
    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), ClipboardError>> {
        let request = request_clipboard_write(text);
        Box::pin(async move {
            let promise = request?;
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|err| ClipboardError::Rejected(describe_js(&err)))
        })
    }
}

/// Starts `navigator.clipboard.writeText`, treating a missing API as
/// [`ClipboardError::Unavailable`] and a synchronous throw as a rejection.
fn request_clipboard_write(text: &str) -> Result<Promise, ClipboardError> {
    let window = web_sys::window().ok_or(ClipboardError::Unavailable)?;
    let navigator = window.navigator();
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
        .map_err(|_| ClipboardError::Unavailable)?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(ClipboardError::Unavailable);
    }
    let write = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
        .ok_or(ClipboardError::Unavailable)?;
    write
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(|err| ClipboardError::Rejected(describe_js(&err)))?
        .dyn_into::<Promise>()
        .map_err(|_| ClipboardError::Rejected("writeText did not return a promise".into()))
}

struct DomToast {
    element: HtmlElement,
}

impl ToastView for DomToast {
    fn show(&self, message: &str) {
        self.element.set_text_content(Some(message));
        if let Err(err) = self.element.style().set_property("display", "block") {
            warn!(error = %describe_js(&err), "failed to show toast");
        }
    }

    fn hide(&self) {
        if let Err(err) = self.element.style().set_property("display", "none") {
            warn!(error = %describe_js(&err), "failed to hide toast");
        }
    }
}
