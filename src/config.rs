//! Page-level configuration.
//!
//! Templates may embed a JSON block to override any of these values:
//!
//! ```html
//! <script type="application/json" id="ui-config">{ "copyFeedbackMs": 1500 }</script>
//! ```
//!
//! Missing keys keep their defaults; a block that fails to parse is logged and ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::page::Page;

/// Id of the optional configuration block.
pub const CONFIG_ELEMENT_ID: &str = "ui-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    /// How long a copy button shows its confirmation before reverting
    pub copy_feedback_ms: u64,
    /// How long an auto-dismiss notification stays fully visible
    pub dismiss_after_ms: u64,
    /// Duration of the notification fade-out
    pub fade_ms: u64,
    /// Delay before the main content's entrance transition starts
    pub entrance_delay_ms: u64,
    /// Vertical gap between a tooltip and its anchor, in pixels
    pub tooltip_gap_px: f64,
    /// Input focused by the Ctrl/Cmd+K shortcut
    pub primary_input_id: String,
    pub notification_selector: String,
    pub url_input_selector: String,
    pub tooltip_selector: String,
    /// Attribute holding the tooltip text
    pub tooltip_attribute: String,
    pub modal_selector: String,
    pub main_selector: String,
    /// Default tracing directive, e.g. `info` or `shortlink_ui=debug`
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            copy_feedback_ms: 2000,
            dismiss_after_ms: 5000,
            fade_ms: 500,
            entrance_delay_ms: 100,
            tooltip_gap_px: 5.0,
            primary_input_id: "long_url".to_string(),
            notification_selector: ".alert-auto-dismiss".to_string(),
            url_input_selector: r#"input[type="url"]"#.to_string(),
            tooltip_selector: "[data-tooltip]".to_string(),
            tooltip_attribute: "data-tooltip".to_string(),
            modal_selector: r#".modal, [id*="Modal"]"#.to_string(),
            main_selector: "main".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl UiConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads the page's configuration block, falling back to defaults.
    pub fn load<P: Page>(page: &P) -> Self {
        let Some(element) = page.element_by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };

        let json = page.text_content(&element);
        if json.trim().is_empty() {
            return Self::default();
        }

        match Self::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_after_ms)
    }

    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn entrance_delay(&self) -> Duration {
        Duration::from_millis(self.entrance_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPage;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = UiConfig::from_json(r#"{ "copyFeedbackMs": 1500, "primaryInputId": "search" }"#).unwrap();

        assert_eq!(config.copy_feedback(), Duration::from_millis(1500));
        assert_eq!(config.primary_input_id, "search");
        assert_eq!(config.dismiss_after(), Duration::from_secs(5));
        assert_eq!(config.tooltip_gap_px, 5.0);
    }

    #[test]
    fn load_reads_config_block() {
        let page = MockPage::new();
        let block = page.element("script", &[("id", CONFIG_ELEMENT_ID), ("type", "application/json")]);
        page.set_text(&block, r#"{ "fadeMs": 250 }"#);

        let config = UiConfig::load(&page);
        assert_eq!(config.fade(), Duration::from_millis(250));
    }

    #[test]
    fn load_falls_back_on_bad_json() {
        let page = MockPage::new();
        let block = page.element("script", &[("id", CONFIG_ELEMENT_ID)]);
        page.set_text(&block, "{ not json");

        assert_eq!(UiConfig::load(&page), UiConfig::default());
    }

    #[test]
    fn load_without_block_uses_defaults() {
        let page = MockPage::new();
        assert_eq!(UiConfig::load(&page), UiConfig::default());
    }
}
