//! The platform surface the controllers are written against.
//!
//! Every controller only talks to the document through [`Page`], so the same
//! code drives the real browser document (see `web`) and the in-memory
//! document used by the tests (see `testing`).

use std::fmt::Debug;
use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Failure of a platform call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    /// The host rejected the call, carrying whatever message it gave us.
    #[error("platform call failed: {0}")]
    Js(String),
    #[error("{0} is not available in this browser")]
    Unsupported(&'static str),
    #[error("document has no body")]
    MissingBody,
}

/// On-screen bounding box of an element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Rendered size of an element (offset width/height).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Handle of a scheduled timer, as handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// Element-level events the controllers subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementEvent {
    MouseEnter,
    MouseLeave,
    Input,
}

impl ElementEvent {
    pub fn dom_name(self) -> &'static str {
        match self {
            ElementEvent::MouseEnter => "mouseenter",
            ElementEvent::MouseLeave => "mouseleave",
            ElementEvent::Input => "input",
        }
    }
}

/// The parts of a key-down event the shortcut dispatcher looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ctrl(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Default::default()
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn has_platform_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Payload for the native share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    /// Plain-text rendition used when the content goes to the clipboard instead.
    pub fn as_clipboard_text(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.text, self.url)
    }
}

pub type Task = Box<dyn FnOnce()>;
pub type Listener = Box<dyn FnMut()>;
/// Returns `true` when the browser's default action should be suppressed.
pub type KeyListener = Box<dyn FnMut(&KeyPress) -> bool>;

pub trait Page: 'static {
    type Element: Clone + PartialEq + Debug + 'static;

    // Lookup
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;
    fn query_within(&self, root: &Self::Element, selector: &str) -> Vec<Self::Element>;
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn query(&self, selector: &str) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }

    // Tree
    fn create_element(&self, tag: &str) -> Result<Self::Element, PageError>;
    fn append_to_body(&self, element: &Self::Element) -> Result<(), PageError>;
    /// Detaches the element; detaching a detached element does nothing.
    fn remove(&self, element: &Self::Element);

    // Content and presentation
    fn inner_html(&self, element: &Self::Element) -> String;
    fn set_inner_html(&self, element: &Self::Element, html: &str);
    fn text_content(&self, element: &Self::Element) -> String;
    fn set_text(&self, element: &Self::Element, text: &str);
    fn class_name(&self, element: &Self::Element) -> String;
    fn set_class_name(&self, element: &Self::Element, class_name: &str);
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str) -> Result<(), PageError>;
    fn remove_attribute(&self, element: &Self::Element, name: &str);
    fn set_style(&self, element: &Self::Element, property: &str, value: &str);
    fn value(&self, element: &Self::Element) -> String;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool {
        self.class_name(element).split_whitespace().any(|c| c == class)
    }

    fn add_classes(&self, element: &Self::Element, classes: &[&str]) {
        let mut tokens: Vec<String> = self.class_name(element).split_whitespace().map(str::to_string).collect();
        for class in classes {
            if !tokens.iter().any(|t| t == class) {
                tokens.push(class.to_string());
            }
        }
        self.set_class_name(element, &tokens.join(" "));
    }

    fn remove_classes(&self, element: &Self::Element, classes: &[&str]) {
        let class_name = self.class_name(element);
        let tokens: Vec<&str> = class_name.split_whitespace().filter(|t| !classes.contains(t)).collect();
        self.set_class_name(element, &tokens.join(" "));
    }

    fn is_disabled(&self, element: &Self::Element) -> bool {
        self.attribute(element, "disabled").is_some()
    }

    fn set_disabled(&self, element: &Self::Element, disabled: bool) {
        if disabled {
            if let Err(e) = self.set_attribute(element, "disabled", "") {
                tracing::warn!(%e, "failed to disable control");
            }
        } else {
            self.remove_attribute(element, "disabled");
        }
    }

    // Interaction
    fn focus(&self, element: &Self::Element);
    fn click(&self, element: &Self::Element);
    fn scroll_into_view(&self, element: &Self::Element);

    // Geometry
    fn bounding_rect(&self, element: &Self::Element) -> Rect;
    fn offset_size(&self, element: &Self::Element) -> Size;

    // Events. Listeners live as long as the page does.
    fn add_listener(&self, element: &Self::Element, event: ElementEvent, listener: Listener);
    fn add_key_listener(&self, listener: KeyListener);

    // Scheduling
    fn set_timeout(&self, delay: Duration, task: Task) -> Result<TimerId, PageError>;
    fn clear_timeout(&self, id: TimerId);
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    // Platform capabilities
    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<(), PageError>>;
    /// `None` when the browser has no native share sheet.
    fn share(&self, data: &ShareData) -> Option<LocalBoxFuture<'static, Result<(), PageError>>>;
    fn alert(&self, message: &str);
    fn create_object_url(&self, content: &str, content_type: &str) -> Result<String, PageError>;
    fn revoke_object_url(&self, url: &str);
}
