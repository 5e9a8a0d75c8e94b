use std::rc::Rc;

use tracing::{debug, trace};
use url::Url;

use crate::config::UiConfig;
use crate::page::{ElementEvent, Page};
use crate::theme::{INVALID_INPUT, NEUTRAL_INPUT, VALID_INPUT};

/// Whether `url` parses as an absolute URL.
pub fn validate_url(url: &str) -> bool {
    Url::parse(url).is_ok()
}

/// Attaches live validation to every URL input present right now.
pub fn init_url_validation<P: Page>(page: &Rc<P>, config: &UiConfig) -> usize {
    let inputs = page.query_all(&config.url_input_selector);
    for input in &inputs {
        let page_ref = Rc::clone(page);
        let input_ref = input.clone();
        page.add_listener(input, ElementEvent::Input, Box::new(move || refresh(page_ref.as_ref(), &input_ref)));
    }
    debug!(count = inputs.len(), "attached URL validation");
    inputs.len()
}

/// Re-evaluates one input and updates its styling. Empty input is never flagged.
pub fn refresh<P: Page>(page: &P, input: &P::Element) {
    let value = page.value(input);
    let url = value.trim();

    if !url.is_empty() && !validate_url(url) {
        trace!(url, "invalid URL input");
        page.add_classes(input, &INVALID_INPUT);
        page.remove_classes(input, &NEUTRAL_INPUT);
    } else {
        page.remove_classes(input, &INVALID_INPUT);
        page.add_classes(input, &[VALID_INPUT]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPage;

    #[test]
    fn absolute_urls_validate() {
        assert!(validate_url("https://example.com/some/long/path?q=1"));
        assert!(validate_url("http://localhost:8000"));
        assert!(validate_url("mailto:someone@example.com"));
    }

    #[test]
    fn relative_and_garbage_do_not() {
        assert!(!validate_url("not a url"));
        assert!(!validate_url("example.com"));
        assert!(!validate_url("/relative/path"));
        assert!(!validate_url(""));
    }

    #[test]
    fn typing_toggles_error_styling() {
        let page = Rc::new(MockPage::new());
        let input = page.element("input", &[("type", "url"), ("class", "w-full border-gray-300 ring-blue-500")]);

        assert_eq!(init_url_validation(&page, &UiConfig::default()), 1);

        page.type_into(&input, "not a url");
        assert!(page.has_class(&input, "border-red-500"));
        assert!(page.has_class(&input, "ring-red-500"));
        assert!(!page.has_class(&input, "border-gray-300"));
        assert!(!page.has_class(&input, "ring-blue-500"));
        assert!(page.has_class(&input, "w-full"));

        page.type_into(&input, "  https://example.com  ");
        assert!(!page.has_class(&input, "border-red-500"));
        assert!(!page.has_class(&input, "ring-red-500"));
        assert!(page.has_class(&input, "border-gray-300"));
    }

    #[test]
    fn empty_input_is_never_flagged() {
        let page = Rc::new(MockPage::new());
        let input = page.element("input", &[("type", "url")]);
        init_url_validation(&page, &UiConfig::default());

        page.type_into(&input, "bad");
        page.type_into(&input, "   ");

        assert!(!page.has_class(&input, "border-red-500"));
        assert!(!page.has_class(&input, "ring-red-500"));
    }

    #[test]
    fn other_inputs_are_ignored() {
        let page = Rc::new(MockPage::new());
        let alias = page.element("input", &[("type", "text"), ("id", "custom_alias")]);
        init_url_validation(&page, &UiConfig::default());

        page.type_into(&alias, "not a url");
        assert!(!page.has_class(&alias, "border-red-500"));
    }
}
