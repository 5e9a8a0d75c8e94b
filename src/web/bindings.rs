//! Entry point and the functions page templates call from inline handlers.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, ErrorEvent};

use crate::config::UiConfig;
use crate::controllers::share::DEFAULT_CONTENT_TYPE;
use crate::controllers::validation;
use crate::format;
use crate::logging;
use crate::page::ShareData;
use crate::startup::Ui;
use crate::web::{js_error, WebPage};

thread_local! {
    static UI: RefCell<Option<Rc<Ui<WebPage>>>> = const { RefCell::new(None) };
}

fn with_ui<R>(name: &str, f: impl FnOnce(&Ui<WebPage>) -> R) -> Option<R> {
    let ui = UI.with(|ui| ui.borrow().clone());
    match ui {
        Some(ui) => Some(f(&ui)),
        None => {
            warn!(name, "called before the page finished loading");
            None
        }
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // replaced by the configured level once the page is parsed
    logging::init("info");

    let page = Rc::new(WebPage::new().map_err(|e| JsValue::from_str(&e.to_string()))?);
    log_uncaught_errors(&page);
    install_worker_placeholder(&page);

    let boot = {
        let page = Rc::clone(&page);
        Box::new(move || {
            let config = UiConfig::load(page.as_ref());
            logging::init(&config.log_level);
            let ui = Rc::new(Ui::new(page, config));
            ui.start();
            UI.with(|slot| *slot.borrow_mut() = Some(ui));
        })
    };

    page.when_ready(boot).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn log_uncaught_errors(page: &WebPage) {
    let closure = Closure::wrap(Box::new(|event: ErrorEvent| {
        error!(
            file = %event.filename(),
            line = event.lineno(),
            "JavaScript error: {}",
            event.message()
        );
    }) as Box<dyn FnMut(ErrorEvent)>);

    if let Err(e) = page
        .window()
        .add_event_listener_with_callback("error", closure.as_ref().unchecked_ref())
    {
        warn!(error = %js_error(e), "failed to hook window errors");
    }
    closure.forget();
}

/// Offline support is not offered; the load hook only records that.
fn install_worker_placeholder(page: &WebPage) {
    let navigator = page.window().navigator();
    if !js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false) {
        return;
    }

    let closure = Closure::once_into_js(|| debug!("service worker registration is disabled"));
    if let Err(e) = page
        .window()
        .add_event_listener_with_callback("load", closure.unchecked_ref())
    {
        warn!(error = %js_error(e), "failed to add load hook");
    }
}

#[wasm_bindgen(js_name = copyToClipboard)]
pub fn copy_to_clipboard(text: &str, button: Option<Element>) {
    with_ui("copyToClipboard", |ui| ui.copy_to_clipboard(text, button));
}

#[wasm_bindgen(js_name = togglePassword)]
pub fn toggle_password(input_id: &str) {
    with_ui("togglePassword", |ui| ui.toggle_password(input_id));
}

#[wasm_bindgen(js_name = setButtonLoading)]
pub fn set_button_loading(button: Element, loading: Option<bool>) {
    with_ui("setButtonLoading", |ui| ui.set_button_loading(&button, loading.unwrap_or(true)));
}

#[wasm_bindgen(js_name = scrollToElement)]
pub fn scroll_to_element(element_id: &str) {
    with_ui("scrollToElement", |ui| ui.scroll_to_element(element_id));
}

#[wasm_bindgen(js_name = shareContent)]
pub fn share_content(title: String, text: String, url: String) {
    with_ui("shareContent", |ui| ui.share_content(ShareData { title, text, url }));
}

#[wasm_bindgen(js_name = downloadFile)]
pub fn download_file(content: &str, filename: &str, content_type: Option<String>) -> Result<(), JsValue> {
    let content_type = content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    match with_ui("downloadFile", |ui| ui.download_file(content, filename, &content_type)) {
        Some(result) => result.map_err(|e| JsValue::from_str(&e.to_string())),
        None => Ok(()),
    }
}

#[wasm_bindgen(js_name = validateURL)]
pub fn validate_url(url: &str) -> bool {
    validation::validate_url(url)
}

#[wasm_bindgen(js_name = timeAgo)]
pub fn time_ago(date: &str) -> String {
    match format::parse_timestamp(date) {
        Some(then) => format::time_ago(then),
        None => {
            debug!(date, "unparseable timestamp");
            format::JUST_NOW.to_string()
        }
    }
}

#[wasm_bindgen(js_name = formatNumber)]
pub fn format_number(num: f64) -> String {
    format::format_number(num)
}
