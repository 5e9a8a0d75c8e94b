use tracing::debug;

use crate::page::Page;
use crate::theme::{ICON_MASKED, ICON_REVEALED, ICON_REVEALED_COLOR};

/// Whether the input shows its content after a [`toggle_password`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Masking {
    Masked,
    Revealed,
}

/// Flips a password input between masked and revealed, syncing the eye icon
/// inside the control that toggles it.
///
/// Returns the new state, or `None` when there is no such input.
pub fn toggle_password<P: Page>(page: &P, input_id: &str) -> Option<Masking> {
    let Some(input) = page.element_by_id(input_id) else {
        debug!(input_id, "no input to toggle");
        return None;
    };

    let next = match page.attribute(&input, "type").as_deref() {
        Some("password") => Masking::Revealed,
        _ => Masking::Masked,
    };
    let input_type = match next {
        Masking::Revealed => "text",
        Masking::Masked => "password",
    };
    if let Err(e) = page.set_attribute(&input, "type", input_type) {
        debug!(%e, "could not change input type");
        return None;
    }

    if let Some(icon) = toggle_icon(page, input_id) {
        match next {
            Masking::Revealed => {
                page.remove_classes(&icon, &[ICON_MASKED]);
                page.add_classes(&icon, &[ICON_REVEALED]);
                page.set_style(&icon, "color", ICON_REVEALED_COLOR);
            }
            Masking::Masked => {
                page.remove_classes(&icon, &[ICON_REVEALED]);
                page.add_classes(&icon, &[ICON_MASKED]);
                page.set_style(&icon, "color", "");
            }
        }
    }

    Some(next)
}

fn toggle_icon<P: Page>(page: &P, input_id: &str) -> Option<P::Element> {
    let control = page.query(&format!(r#"[onclick="togglePassword('{input_id}')"]"#))?;
    page.query_within(&control, "i").into_iter().next()
}

/// Smoothly scrolls the element with `id` to the top of the viewport, if it exists.
pub fn scroll_to_element<P: Page>(page: &P, id: &str) -> bool {
    match page.element_by_id(id) {
        Some(element) => {
            page.scroll_into_view(&element);
            true
        }
        None => false,
    }
}
