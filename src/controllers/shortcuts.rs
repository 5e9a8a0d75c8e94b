use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::UiConfig;
use crate::page::{KeyPress, Page};
use crate::theme::{HIDDEN, SHOWN_LAYOUT};

/// What a key press maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    FocusPrimaryInput,
    CloseModals,
}

impl Shortcut {
    pub fn from_key(key: &KeyPress) -> Option<Self> {
        if key.has_platform_modifier() && key.key == "k" {
            Some(Shortcut::FocusPrimaryInput)
        } else if key.key == "Escape" {
            Some(Shortcut::CloseModals)
        } else {
            None
        }
    }
}

/// Registers the document-wide key handler. It lives as long as the page.
pub fn init_keyboard_shortcuts<P: Page>(page: &Rc<P>, config: &UiConfig) {
    let page_ref = Rc::clone(page);
    let config = config.clone();
    page.add_key_listener(Box::new(move |key: &KeyPress| dispatch(page_ref.as_ref(), &config, key)));
    debug!("keyboard shortcuts registered");
}

/// Handles one key press. Returns whether the browser default should be suppressed.
pub fn dispatch<P: Page>(page: &P, config: &UiConfig, key: &KeyPress) -> bool {
    match Shortcut::from_key(key) {
        Some(Shortcut::FocusPrimaryInput) => {
            match page.element_by_id(&config.primary_input_id) {
                Some(input) => page.focus(&input),
                None => debug!(id = %config.primary_input_id, "no primary input to focus"),
            }
            true
        }
        Some(Shortcut::CloseModals) => {
            let closed = close_modals(page, &config.modal_selector);
            trace!(closed, "escape pressed");
            false
        }
        None => false,
    }
}

/// Hides every visible modal-like element. Returns how many were closed.
pub fn close_modals<P: Page>(page: &P, selector: &str) -> usize {
    let mut closed = 0;
    for modal in page.query_all(selector) {
        if page.has_class(&modal, HIDDEN) {
            continue;
        }
        page.add_classes(&modal, &[HIDDEN]);
        page.remove_classes(&modal, &[SHOWN_LAYOUT]);
        closed += 1;
    }
    closed
}
