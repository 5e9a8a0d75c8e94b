//! Hover tooltips.
//!
//! Every element carrying tooltip text shares one overlay. The manager owns it
//! outright: showing always tears down the previous overlay first, and hiding an
//! absent overlay is a no-op, so rapid enter/leave sequences can never leave
//! more than one overlay in the document.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, error};

use crate::config::UiConfig;
use crate::page::{ElementEvent, Page, Rect, Size};
use crate::theme::{TOOLTIP_CLASS, TOOLTIP_ID};

#[derive(Debug)]
enum Overlay<E> {
    Hidden,
    Shown(E),
}

pub struct TooltipManager<P: Page> {
    page: Rc<P>,
    gap: f64,
    overlay: RefCell<Overlay<P::Element>>,
}

impl<P: Page> TooltipManager<P> {
    pub fn new(page: Rc<P>, gap: f64) -> Rc<Self> {
        Rc::new(Self {
            page,
            gap,
            overlay: RefCell::new(Overlay::Hidden),
        })
    }

    /// Wires hover handlers onto every tooltip anchor present right now.
    pub fn attach_all(self: &Rc<Self>, config: &UiConfig) -> usize {
        let anchors = self.page.query_all(&config.tooltip_selector);
        for anchor in &anchors {
            self.attach(anchor, &config.tooltip_attribute);
        }
        debug!(count = anchors.len(), "attached tooltips");
        anchors.len()
    }

    pub fn attach(self: &Rc<Self>, anchor: &P::Element, text_attribute: &str) {
        let on_enter = {
            let manager = Rc::clone(self);
            let anchor = anchor.clone();
            let text_attribute = text_attribute.to_string();
            Box::new(move || {
                // read on every hover so templates may update the text
                let text = manager.page.attribute(&anchor, &text_attribute).unwrap_or_default();
                manager.show(&anchor, &text);
            })
        };
        let on_leave = {
            let manager = Rc::clone(self);
            Box::new(move || manager.hide())
        };

        self.page.add_listener(anchor, ElementEvent::MouseEnter, on_enter);
        self.page.add_listener(anchor, ElementEvent::MouseLeave, on_leave);
    }

    pub fn show(&self, anchor: &P::Element, text: &str) {
        self.hide();

        let overlay = match self.page.create_element("div") {
            Ok(overlay) => overlay,
            Err(e) => {
                error!("Failed to create tooltip: {}", e);
                return;
            }
        };
        if let Err(e) = self.page.set_attribute(&overlay, "id", TOOLTIP_ID) {
            error!("Failed to create tooltip: {}", e);
            return;
        }
        self.page.set_class_name(&overlay, TOOLTIP_CLASS);
        self.page.set_text(&overlay, text);

        if let Err(e) = self.page.append_to_body(&overlay) {
            error!("Failed to attach tooltip: {}", e);
            return;
        }

        // the overlay has to be in the document before it can be measured
        let (left, top) = position_above(self.page.bounding_rect(anchor), self.page.offset_size(&overlay), self.gap);
        self.page.set_style(&overlay, "left", &format!("{left}px"));
        self.page.set_style(&overlay, "top", &format!("{top}px"));

        *self.overlay.borrow_mut() = Overlay::Shown(overlay);
    }

    pub fn hide(&self) {
        let previous = std::mem::replace(&mut *self.overlay.borrow_mut(), Overlay::Hidden);
        if let Overlay::Shown(overlay) = previous {
            self.page.remove(&overlay);
        }
    }

    pub fn is_shown(&self) -> bool {
        matches!(*self.overlay.borrow(), Overlay::Shown(_))
    }
}

/// Top-left corner that centers `overlay` horizontally above `anchor`, `gap` pixels up.
pub fn position_above(anchor: Rect, overlay: Size, gap: f64) -> (f64, f64) {
    let left = anchor.left + anchor.width / 2.0 - overlay.width / 2.0;
    let top = anchor.top - overlay.height - gap;
    (left, top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPage;

    fn anchored_page() -> (Rc<MockPage>, Rc<TooltipManager<MockPage>>) {
        let page = Rc::new(MockPage::new());
        let manager = TooltipManager::new(Rc::clone(&page), 5.0);
        (page, manager)
    }

    #[test]
    fn centers_overlay_above_anchor() {
        let (page, manager) = anchored_page();
        let anchor = page.element("button", &[("data-tooltip", "Hi")]);
        page.set_rect(
            &anchor,
            Rect {
                left: 100.0,
                top: 200.0,
                width: 50.0,
                height: 30.0,
            },
        );
        manager.attach_all(&UiConfig::default());

        page.fire(&anchor, ElementEvent::MouseEnter);

        let overlay = page.element_by_id(TOOLTIP_ID).expect("tooltip shown");
        assert_eq!(page.text_content(&overlay), "Hi");
        assert_eq!(page.class_name(&overlay), TOOLTIP_CLASS);
        // "Hi" measures 14x18 in the mock
        assert_eq!(page.style(&overlay, "left").as_deref(), Some("118px"));
        assert_eq!(page.style(&overlay, "top").as_deref(), Some("177px"));

        page.fire(&anchor, ElementEvent::MouseLeave);
        assert!(!manager.is_shown());
        assert_eq!(page.count("#tooltip"), 0);
    }

    #[test]
    fn never_more_than_one_overlay() {
        let (page, manager) = anchored_page();
        let copy = page.element("button", &[("data-tooltip", "Copy link")]);
        let qr = page.element("button", &[("data-tooltip", "Show QR code")]);
        manager.attach_all(&UiConfig::default());

        for _ in 0..5 {
            page.fire(&copy, ElementEvent::MouseEnter);
            page.fire(&qr, ElementEvent::MouseEnter);
            assert_eq!(page.count("#tooltip"), 1);
            page.fire(&copy, ElementEvent::MouseLeave);
            assert_eq!(page.count("#tooltip"), 0);
            page.fire(&qr, ElementEvent::MouseLeave);
            assert_eq!(page.count("#tooltip"), 0);
        }
    }

    #[test]
    fn latest_anchor_wins() {
        let (page, manager) = anchored_page();
        let first = page.element("span", &[("data-tooltip", "first")]);
        let second = page.element("span", &[("data-tooltip", "second")]);
        manager.attach_all(&UiConfig::default());

        page.fire(&first, ElementEvent::MouseEnter);
        page.fire(&second, ElementEvent::MouseEnter);

        let overlay = page.query("#tooltip").unwrap();
        assert_eq!(page.text_content(&overlay), "second");
    }

    #[test]
    fn hiding_twice_is_harmless() {
        let (page, manager) = anchored_page();
        manager.hide();
        manager.hide();
        assert!(!manager.is_shown());
        assert_eq!(page.count("#tooltip"), 0);
    }

    #[test]
    fn position_math() {
        let anchor = Rect {
            left: 10.0,
            top: 40.0,
            width: 20.0,
            height: 10.0,
        };
        let overlay = Size {
            width: 60.0,
            height: 24.0,
        };
        assert_eq!(position_above(anchor, overlay, 5.0), (-10.0, 11.0));
    }
}
