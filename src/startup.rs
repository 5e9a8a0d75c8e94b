//! Wiring of the page behaviours.
//!
//! [`Ui::start`] runs once the document is ready: it schedules notification
//! dismissal, attaches URL validation and tooltips, registers the keyboard
//! shortcuts and plays the entrance animation. The remaining behaviours are
//! exposed as methods and only run when a page handler calls them.

use std::rc::Rc;

use tracing::{debug, error, info};

use crate::config::UiConfig;
use crate::controllers::busy::set_busy;
use crate::controllers::clipboard::copy_to_clipboard;
use crate::controllers::notifications::init_notifications;
use crate::controllers::share::{download_file, share_content};
use crate::controllers::shortcuts::init_keyboard_shortcuts;
use crate::controllers::tooltip::TooltipManager;
use crate::controllers::validation::init_url_validation;
use crate::controllers::visibility::{scroll_to_element, toggle_password, Masking};
use crate::page::{Page, PageError, ShareData};
use crate::theme::{AT_REST, EASE_OUT_TRANSITION, ENTRANCE_OFFSET};

/// What [`Ui::start`] found on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub notifications: usize,
    pub url_inputs: usize,
    pub tooltips: usize,
    pub animated_main: bool,
}

pub struct Ui<P: Page> {
    page: Rc<P>,
    config: UiConfig,
    tooltips: Rc<TooltipManager<P>>,
}

impl<P: Page> Ui<P> {
    pub fn new(page: Rc<P>, config: UiConfig) -> Self {
        let tooltips = TooltipManager::new(Rc::clone(&page), config.tooltip_gap_px);
        Self { page, config, tooltips }
    }

    pub fn page(&self) -> &Rc<P> {
        &self.page
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn tooltips(&self) -> &Rc<TooltipManager<P>> {
        &self.tooltips
    }

    /// Wires the always-on behaviours. Call once per page.
    pub fn start(&self) -> StartupReport {
        let report = StartupReport {
            notifications: init_notifications(&self.page, &self.config),
            url_inputs: init_url_validation(&self.page, &self.config),
            tooltips: self.tooltips.attach_all(&self.config),
            animated_main: self.animate_entrance(),
        };
        init_keyboard_shortcuts(&self.page, &self.config);

        debug!(?report, "startup complete");
        info!("page interactions initialized");
        report
    }

    /// Slides the main content in from below.
    fn animate_entrance(&self) -> bool {
        let Some(main) = self.page.query(&self.config.main_selector) else {
            return false;
        };

        self.page.set_style(&main, "opacity", "0");
        self.page.set_style(&main, "transform", ENTRANCE_OFFSET);

        let scheduled = self.page.set_timeout(self.config.entrance_delay(), {
            let page = Rc::clone(&self.page);
            let main = main.clone();
            Box::new(move || {
                page.set_style(&main, "transition", EASE_OUT_TRANSITION);
                page.set_style(&main, "opacity", "1");
                page.set_style(&main, "transform", AT_REST);
            })
        });

        match scheduled {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to schedule entrance animation: {}", e);
                // never leave the content invisible
                self.page.set_style(&main, "opacity", "");
                self.page.set_style(&main, "transform", "");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // On-demand behaviours
    // ------------------------------------------------------------------

    pub fn copy_to_clipboard(&self, text: &str, trigger: Option<P::Element>) {
        copy_to_clipboard(&self.page, text, trigger, self.config.copy_feedback());
    }

    pub fn toggle_password(&self, input_id: &str) -> Option<Masking> {
        toggle_password(self.page.as_ref(), input_id)
    }

    pub fn set_button_loading(&self, button: &P::Element, loading: bool) {
        set_busy(self.page.as_ref(), button, loading);
    }

    pub fn scroll_to_element(&self, id: &str) -> bool {
        scroll_to_element(self.page.as_ref(), id)
    }

    pub fn share_content(&self, data: ShareData) {
        share_content(&self.page, data);
    }

    pub fn download_file(&self, content: &str, filename: &str, content_type: &str) -> Result<(), PageError> {
        download_file(self.page.as_ref(), content, filename, content_type)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::page::{ElementEvent, KeyPress};
    use crate::testing::MockPage;

    fn result_page() -> Rc<MockPage> {
        let page = Rc::new(MockPage::new());
        page.element("main", &[("class", "container")]);
        page.element("div", &[("class", "alert-auto-dismiss")]);
        page.element("input", &[("type", "url"), ("id", "long_url")]);
        page.element("button", &[("data-tooltip", "Copy short link")]);
        page.element("div", &[("class", "modal flex")]);
        page
    }

    #[test]
    fn start_wires_every_controller() {
        let page = result_page();
        let ui = Ui::new(Rc::clone(&page), UiConfig::default());

        let report = ui.start();

        assert_eq!(
            report,
            StartupReport {
                notifications: 1,
                url_inputs: 1,
                tooltips: 1,
                animated_main: true,
            }
        );
        // validation input + tooltip enter/leave + key handler
        assert_eq!(page.listener_count(), 4);

        let input = page.element_by_id("long_url").unwrap();
        assert!(page.press(KeyPress::with_ctrl("k")));
        assert_eq!(page.focused(), Some(input));

        let anchor = page.query("[data-tooltip]").unwrap();
        page.fire(&anchor, ElementEvent::MouseEnter);
        assert!(ui.tooltips().is_shown());
    }

    #[test]
    fn entrance_animation_plays_after_delay() {
        let page = result_page();
        Ui::new(Rc::clone(&page), UiConfig::default()).start();
        let main = page.query("main").unwrap();

        assert_eq!(page.style(&main, "opacity").as_deref(), Some("0"));
        assert_eq!(page.style(&main, "transform").as_deref(), Some(ENTRANCE_OFFSET));

        page.advance(Duration::from_millis(100));
        assert_eq!(page.style(&main, "opacity").as_deref(), Some("1"));
        assert_eq!(page.style(&main, "transform").as_deref(), Some(AT_REST));
        assert_eq!(page.style(&main, "transition").as_deref(), Some(EASE_OUT_TRANSITION));
    }

    #[test]
    fn empty_page_starts_cleanly() {
        let page = Rc::new(MockPage::new());
        let report = Ui::new(Rc::clone(&page), UiConfig::default()).start();

        assert_eq!(report, StartupReport::default());
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn on_demand_helpers_use_config() {
        let page = Rc::new(MockPage::new());
        let config = UiConfig {
            copy_feedback_ms: 500,
            ..Default::default()
        };
        let ui = Ui::new(Rc::clone(&page), config);
        let button = page.element("button", &[("class", "bg-blue-500")]);
        page.set_inner_html(&button, "Copy");

        ui.copy_to_clipboard("https://sho.rt/a", Some(button));
        page.run_until_stalled();
        page.advance(Duration::from_millis(500));

        assert_eq!(page.inner_html(&button), "Copy");
        assert_eq!(page.class_name(&button), "bg-blue-500");
    }
}
