//! [`Page`] over the real browser document.
//!
//! Capabilities that are not in every browser (clipboard, share) are looked up
//! through `Reflect` so a missing one turns into [`PageError::Unsupported`]
//! instead of a thrown exception.

use std::time::Duration;

use futures::future::{self, FutureExt, LocalBoxFuture};
use js_sys::{Array, Function, Object, Promise, Reflect};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobPropertyBag, Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent, ScrollIntoViewOptions, Url,
    Window,
};

use crate::page::{ElementEvent, KeyListener, KeyPress, Listener, Page, PageError, Rect, ShareData, Size, Task, TimerId};

pub mod bindings;

pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new() -> Result<Self, PageError> {
        let window = web_sys::window().ok_or(PageError::Unsupported("window"))?;
        let document = window.document().ok_or(PageError::Unsupported("document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Whether `DOMContentLoaded` has already fired.
    pub fn is_ready(&self) -> bool {
        Reflect::get(&self.document, &JsValue::from_str("readyState"))
            .ok()
            .and_then(|state| state.as_string())
            .is_some_and(|state| state != "loading")
    }

    /// Runs `task` once the DOM is parsed, immediately if it already is.
    pub fn when_ready(&self, task: Task) -> Result<(), PageError> {
        if self.is_ready() {
            task();
            return Ok(());
        }
        let callback = Closure::once_into_js(move || task());
        self.document
            .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
            .map_err(js_error)
    }

    fn navigator_method(&self, object: &str, method: &str) -> Option<(JsValue, Function)> {
        let navigator = self.window.navigator();
        let target: JsValue = if object.is_empty() {
            navigator.into()
        } else {
            Reflect::get(&navigator, &JsValue::from_str(object)).ok()?
        };
        if target.is_undefined() || target.is_null() {
            return None;
        }
        let function = Reflect::get(&target, &JsValue::from_str(method)).ok()?.dyn_into::<Function>().ok()?;
        Some((target, function))
    }

    fn html(element: &Element) -> Option<&HtmlElement> {
        element.dyn_ref::<HtmlElement>()
    }
}

/// Best-effort readable message out of a thrown JS value.
pub fn js_error(value: JsValue) -> PageError {
    let message = value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{value:?}"));
    PageError::Js(message)
}

fn promise_result(promise: Result<JsValue, JsValue>) -> LocalBoxFuture<'static, Result<(), PageError>> {
    match promise.and_then(|value| value.dyn_into::<Promise>()) {
        Ok(promise) => JsFuture::from(promise).map(|result| result.map(|_| ()).map_err(js_error)).boxed_local(),
        Err(e) => future::ready(Err(js_error(e))).boxed_local(),
    }
}

fn plain_object(entries: &[(&str, &str)]) -> Object {
    let object = Object::new();
    for (key, value) in entries {
        // setting a property on a fresh plain object cannot fail
        let _ = Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_str(value));
    }
    object
}

fn collect_elements(list: Result<web_sys::NodeList, JsValue>, selector: &str) -> Vec<Element> {
    let list = match list {
        Ok(list) => list,
        Err(e) => {
            warn!(selector, error = %js_error(e), "invalid selector");
            return Vec::new();
        }
    };
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Page for WebPage {
    type Element = Element;

    fn query_all(&self, selector: &str) -> Vec<Element> {
        collect_elements(self.document.query_selector_all(selector), selector)
    }

    fn query_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        collect_elements(root.query_selector_all(selector), selector)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(&self, tag: &str) -> Result<Element, PageError> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn append_to_body(&self, element: &Element) -> Result<(), PageError> {
        let body = self.document.body().ok_or(PageError::MissingBody)?;
        body.append_child(element).map(|_| ()).map_err(js_error)
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn inner_html(&self, element: &Element) -> String {
        element.inner_html()
    }

    fn set_inner_html(&self, element: &Element, html: &str) {
        element.set_inner_html(html);
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn class_name(&self, element: &Element) -> String {
        element.class_name()
    }

    fn set_class_name(&self, element: &Element, class_name: &str) {
        element.set_class_name(class_name);
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), PageError> {
        element.set_attribute(name, value).map_err(js_error)
    }

    fn remove_attribute(&self, element: &Element, name: &str) {
        if let Err(e) = element.remove_attribute(name) {
            warn!(name, error = %js_error(e), "failed to remove attribute");
        }
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) {
        let Some(html) = Self::html(element) else {
            return;
        };
        if let Err(e) = html.style().set_property(property, value) {
            warn!(property, error = %js_error(e), "failed to set style");
        }
    }

    fn value(&self, element: &Element) -> String {
        element.dyn_ref::<HtmlInputElement>().map(HtmlInputElement::value).unwrap_or_default()
    }

    fn focus(&self, element: &Element) {
        if let Some(Err(e)) = Self::html(element).map(HtmlElement::focus) {
            warn!(error = %js_error(e), "failed to focus element");
        }
    }

    fn click(&self, element: &Element) {
        if let Some(html) = Self::html(element) {
            html.click();
        }
    }

    fn scroll_into_view(&self, element: &Element) {
        let options = plain_object(&[("behavior", "smooth"), ("block", "start")]);
        element.scroll_into_view_with_scroll_into_view_options(options.unchecked_ref::<ScrollIntoViewOptions>());
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn offset_size(&self, element: &Element) -> Size {
        Self::html(element)
            .map(|html| Size {
                width: f64::from(html.offset_width()),
                height: f64::from(html.offset_height()),
            })
            .unwrap_or_default()
    }

    fn add_listener(&self, element: &Element, event: ElementEvent, mut listener: Listener) {
        let closure = Closure::wrap(Box::new(move |_: web_sys::Event| listener()) as Box<dyn FnMut(web_sys::Event)>);
        if let Err(e) = element.add_event_listener_with_callback(event.dom_name(), closure.as_ref().unchecked_ref()) {
            warn!(event = event.dom_name(), error = %js_error(e), "failed to add listener");
        }
        // listeners stay for the lifetime of the page
        closure.forget();
    }

    fn add_key_listener(&self, mut listener: KeyListener) {
        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let key = KeyPress {
                key: event.key(),
                ctrl: event.ctrl_key(),
                meta: event.meta_key(),
            };
            if listener(&key) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);
        if let Err(e) = self.document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref()) {
            warn!(error = %js_error(e), "failed to add keydown listener");
        }
        closure.forget();
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> Result<TimerId, PageError> {
        // a cleared timer leaks its boxed task; only clipboard restorations get cleared
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
            .map(TimerId)
            .map_err(js_error)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.window.clear_timeout_with_handle(id.0);
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<(), PageError>> {
        match self.navigator_method("clipboard", "writeText") {
            Some((clipboard, write_text)) => promise_result(write_text.call1(&clipboard, &JsValue::from_str(text))),
            None => future::ready(Err(PageError::Unsupported("navigator.clipboard"))).boxed_local(),
        }
    }

    fn share(&self, data: &ShareData) -> Option<LocalBoxFuture<'static, Result<(), PageError>>> {
        let (navigator, share) = self.navigator_method("", "share")?;
        let payload = plain_object(&[
            ("title", data.title.as_str()),
            ("text", data.text.as_str()),
            ("url", data.url.as_str()),
        ]);
        Some(promise_result(share.call1(&navigator, &payload)))
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            warn!(error = %js_error(e), "failed to show alert");
        }
    }

    fn create_object_url(&self, content: &str, content_type: &str) -> Result<String, PageError> {
        let parts = Array::of1(&JsValue::from_str(content));
        let options = plain_object(&[("type", content_type)]);
        let blob = Blob::new_with_str_sequence_and_options(&parts, options.unchecked_ref::<BlobPropertyBag>())
            .map_err(js_error)?;
        Url::create_object_url_with_blob(&blob).map_err(js_error)
    }

    fn revoke_object_url(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            warn!(error = %js_error(e), "failed to revoke object URL");
        }
    }
}
