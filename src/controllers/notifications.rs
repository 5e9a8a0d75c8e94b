//! Auto-dismissal of flash notifications.
//!
//! Each notification gets its own pair of timers: one to start the fade, one to
//! remove the element once the fade has played out. Notifications inserted after
//! startup are not watched; pass them to [`dismiss_later`] directly.

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error};

use crate::config::UiConfig;
use crate::page::Page;
use crate::theme::{DISMISS_OFFSET, EASE_OUT_TRANSITION};

/// Schedules every notification currently in the document. Returns how many were found.
pub fn init_notifications<P: Page>(page: &Rc<P>, config: &UiConfig) -> usize {
    let notifications = page.query_all(&config.notification_selector);
    for notification in &notifications {
        dismiss_later(page, notification, config.dismiss_after(), config.fade());
    }
    debug!(count = notifications.len(), "scheduled notification dismissal");
    notifications.len()
}

pub fn dismiss_later<P: Page>(page: &Rc<P>, notification: &P::Element, visible_for: Duration, fade: Duration) {
    let scheduled = page.set_timeout(visible_for, {
        let page = Rc::clone(page);
        let notification = notification.clone();
        Box::new(move || fade_out(&page, notification, fade))
    });

    if let Err(e) = scheduled {
        error!("Failed to schedule notification dismissal: {}", e);
    }
}

fn fade_out<P: Page>(page: &Rc<P>, notification: P::Element, fade: Duration) {
    page.set_style(&notification, "transition", EASE_OUT_TRANSITION);
    page.set_style(&notification, "opacity", "0");
    page.set_style(&notification, "transform", DISMISS_OFFSET);

    let removal = page.set_timeout(fade, {
        let page = Rc::clone(page);
        Box::new(move || page.remove(&notification))
    });

    if let Err(e) = removal {
        error!("Failed to schedule notification removal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPage;

    #[test]
    fn fades_then_removes_each_notification() {
        let page = Rc::new(MockPage::new());
        let saved = page.element("div", &[("class", "alert alert-auto-dismiss")]);
        let warning = page.element("div", &[("class", "alert-auto-dismiss text-yellow-700")]);
        let sticky = page.element("div", &[("class", "alert")]);

        assert_eq!(init_notifications(&page, &UiConfig::default()), 2);

        page.advance(Duration::from_millis(4999));
        assert_eq!(page.style(&saved, "opacity"), None);

        page.advance(Duration::from_millis(1));
        for alert in [saved, warning] {
            assert_eq!(page.style(&alert, "opacity").as_deref(), Some("0"));
            assert_eq!(page.style(&alert, "transform").as_deref(), Some(DISMISS_OFFSET));
            assert!(page.is_attached(&alert));
        }

        page.advance(Duration::from_millis(500));
        assert!(!page.is_attached(&saved));
        assert!(!page.is_attached(&warning));
        assert!(page.is_attached(&sticky));
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn late_notifications_need_explicit_scheduling() {
        let page = Rc::new(MockPage::new());
        init_notifications(&page, &UiConfig::default());

        let late = page.element("div", &[("class", "alert-auto-dismiss")]);
        page.advance(Duration::from_secs(10));
        assert!(page.is_attached(&late));

        dismiss_later(&page, &late, Duration::from_millis(100), Duration::from_millis(50));
        page.advance(Duration::from_millis(150));
        assert!(!page.is_attached(&late));
    }

    #[test]
    fn element_removed_early_is_tolerated() {
        let page = Rc::new(MockPage::new());
        let alert = page.element("div", &[("class", "alert-auto-dismiss")]);
        init_notifications(&page, &UiConfig::default());

        page.remove(&alert);
        page.advance(Duration::from_secs(6));

        assert!(!page.is_attached(&alert));
        assert_eq!(page.pending_timers(), 0);
    }
}
