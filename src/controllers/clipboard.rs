//! Copy-to-clipboard with visual confirmation on the trigger control.
//!
//! The control's original markup and classes are stashed in data attributes on
//! the control itself, together with the id of the pending restoration timer.
//! Copying again while the confirmation is showing cancels that timer and keeps
//! the first snapshot, so the control always returns to its pre-copy state,
//! exactly once.

use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::page::{Page, PageError, TimerId};
use crate::theme::{COPIED_HTML, SUCCESS_BG, SUCCESS_HOVER_BG};

const SNAPSHOT_HTML: &str = "data-copy-original-html";
const SNAPSHOT_CLASS: &str = "data-copy-original-class";
const PENDING_RESTORE: &str = "data-copy-restore-timer";

/// Copies `text` and, on success, flashes the confirmation on `trigger` for `feedback`.
///
/// Failures are logged and reported with an alert; the control is left as is.
pub fn copy_to_clipboard<P: Page>(page: &Rc<P>, text: &str, trigger: Option<P::Element>, feedback: Duration) {
    let write = page.write_clipboard(text);
    let page_ref = Rc::clone(page);

    page.spawn(
        async move {
            match write.await {
                Ok(()) => match trigger {
                    Some(trigger) => show_copied(&page_ref, &trigger, feedback),
                    None => debug!("copied text without a trigger control"),
                },
                Err(e) => {
                    error!("Failed to copy text: {}", e);
                    page_ref.alert("Failed to copy to clipboard");
                }
            }
        }
        .boxed_local(),
    );
}

fn show_copied<P: Page>(page: &Rc<P>, trigger: &P::Element, feedback: Duration) {
    match pending_restore(page.as_ref(), trigger) {
        Some(timer) => {
            page.clear_timeout(timer);
            debug!(?timer, "replaced pending copy restoration");
        }
        None => {
            if let Err(e) = snapshot(page.as_ref(), trigger) {
                warn!(%e, "could not snapshot copy button, skipping feedback");
                return;
            }
        }
    }

    page.set_inner_html(trigger, COPIED_HTML);
    page.set_class_name(trigger, &success_classes(&page.class_name(trigger)));

    let timer = page.set_timeout(feedback, {
        let page = Rc::clone(page);
        let trigger = trigger.clone();
        Box::new(move || restore(page.as_ref(), &trigger))
    });

    match timer {
        Ok(timer) => {
            if let Err(e) = page.set_attribute(trigger, PENDING_RESTORE, &timer.0.to_string()) {
                warn!(%e, "could not record restoration timer");
            }
        }
        Err(e) => {
            error!("Failed to schedule copy button reset: {}", e);
            restore(page.as_ref(), trigger);
        }
    }
}

fn pending_restore<P: Page>(page: &P, trigger: &P::Element) -> Option<TimerId> {
    page.attribute(trigger, PENDING_RESTORE)?.parse().ok().map(TimerId)
}

fn snapshot<P: Page>(page: &P, trigger: &P::Element) -> Result<(), PageError> {
    page.set_attribute(trigger, SNAPSHOT_HTML, &page.inner_html(trigger))?;
    page.set_attribute(trigger, SNAPSHOT_CLASS, &page.class_name(trigger))
}

fn restore<P: Page>(page: &P, trigger: &P::Element) {
    if let Some(html) = page.attribute(trigger, SNAPSHOT_HTML) {
        page.set_inner_html(trigger, &html);
    }
    if let Some(class_name) = page.attribute(trigger, SNAPSHOT_CLASS) {
        page.set_class_name(trigger, &class_name);
    }
    for name in [SNAPSHOT_HTML, SNAPSHOT_CLASS, PENDING_RESTORE] {
        page.remove_attribute(trigger, name);
    }
}

/// Swaps the first background token and the first hover background token for the
/// success palette, leaving every other class in place.
pub fn success_classes(class_name: &str) -> String {
    let mut bg_done = false;
    let mut hover_done = false;

    class_name
        .split_whitespace()
        .map(|token| {
            if !hover_done && token.strip_prefix("hover:").is_some_and(is_bg_color) {
                hover_done = true;
                SUCCESS_HOVER_BG
            } else if !bg_done && is_bg_color(token) {
                bg_done = true;
                SUCCESS_BG
            } else {
                token
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `bg-<hue>-<shade>`, e.g. `bg-blue-500`.
fn is_bg_color(token: &str) -> bool {
    let Some(rest) = token.strip_prefix("bg-") else {
        return false;
    };
    match rest.split_once('-') {
        Some((hue, shade)) => {
            !hue.is_empty()
                && hue.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !shade.is_empty()
                && shade.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}
