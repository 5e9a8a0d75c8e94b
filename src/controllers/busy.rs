//! Loading state for buttons.
//!
//! The original markup is kept in a data attribute on the button itself, so any
//! number of buttons can be toggled independently.

use tracing::warn;

use crate::page::Page;
use crate::theme::SPINNER_HTML;

const ORIGINAL_HTML: &str = "data-original-html";

pub fn set_busy<P: Page>(page: &P, control: &P::Element, busy: bool) {
    if busy {
        // a repeated busy call must not snapshot the spinner
        if page.attribute(control, ORIGINAL_HTML).is_none() {
            if let Err(e) = page.set_attribute(control, ORIGINAL_HTML, &page.inner_html(control)) {
                warn!(%e, "could not snapshot button content, leaving it idle");
                return;
            }
        }
        page.set_disabled(control, true);
        page.set_inner_html(control, SPINNER_HTML);
    } else {
        page.set_disabled(control, false);
        if let Some(html) = page.attribute(control, ORIGINAL_HTML) {
            page.set_inner_html(control, &html);
            page.remove_attribute(control, ORIGINAL_HTML);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPage;

    #[test]
    fn busy_round_trip_restores_content_and_state() {
        let page = MockPage::new();
        let button = page.element("button", &[("type", "submit")]);
        page.set_inner_html(&button, r#"<i class="fas fa-link"></i> Shorten"#);

        set_busy(&page, &button, true);
        assert!(page.is_disabled(&button));
        assert_eq!(page.inner_html(&button), SPINNER_HTML);

        set_busy(&page, &button, false);
        assert!(!page.is_disabled(&button));
        assert_eq!(page.inner_html(&button), r#"<i class="fas fa-link"></i> Shorten"#);
        assert_eq!(page.attribute(&button, ORIGINAL_HTML), None);
    }

    #[test]
    fn repeated_busy_keeps_first_snapshot() {
        let page = MockPage::new();
        let button = page.element("button", &[]);
        page.set_inner_html(&button, "Save");

        set_busy(&page, &button, true);
        set_busy(&page, &button, true);
        set_busy(&page, &button, false);

        assert_eq!(page.inner_html(&button), "Save");
    }

    #[test]
    fn not_busy_without_snapshot_keeps_content() {
        let page = MockPage::new();
        let button = page.element("button", &[("disabled", "")]);
        page.set_inner_html(&button, "Retry");

        set_busy(&page, &button, false);

        assert!(!page.is_disabled(&button));
        assert_eq!(page.inner_html(&button), "Retry");
    }

    #[test]
    fn failed_snapshot_leaves_button_usable() {
        let page = MockPage::new();
        let button = page.element("button", &[]);
        page.set_inner_html(&button, "Shorten");
        page.reject_attribute(ORIGINAL_HTML);

        set_busy(&page, &button, true);

        assert!(!page.is_disabled(&button));
        assert_eq!(page.inner_html(&button), "Shorten");
    }

    #[test]
    fn buttons_toggle_independently() {
        let page = MockPage::new();
        let first = page.element("button", &[]);
        let second = page.element("button", &[]);
        page.set_inner_html(&first, "One");
        page.set_inner_html(&second, "Two");

        set_busy(&page, &first, true);
        set_busy(&page, &second, true);
        set_busy(&page, &first, false);

        assert_eq!(page.inner_html(&first), "One");
        assert_eq!(page.inner_html(&second), SPINNER_HTML);
        set_busy(&page, &second, false);
        assert_eq!(page.inner_html(&second), "Two");
    }
}
