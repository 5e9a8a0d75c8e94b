//! In-memory document for exercising controllers without a browser.
//!
//! Only what the controllers touch is modelled: a tree of elements hanging off
//! `<body>`, attributes, inline styles, a virtual clock for timers, a local
//! executor for spawned futures, and recorders for the platform capabilities.
//!
//! Selectors support compound simple selectors (`tag`, `.class`, `#id`,
//! `[attr]`, `[attr="v"]`, `[attr*="v"]`) and comma-separated lists. Rendered
//! size is derived from the text content: 7px per character, 18px tall,
//! unless overridden with [`MockPage::set_size`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;

use crate::page::{
    ElementEvent, KeyListener, KeyPress, Listener, Page, PageError, Rect, ShareData, Size, Task, TimerId,
};

const CHAR_WIDTH: f64 = 7.0;
const LINE_HEIGHT: f64 = 18.0;
const BODY: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockElement(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    inner_html: String,
    text: String,
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    rect: Rect,
    size: Option<Size>,
}

struct Timer {
    id: TimerId,
    due: Duration,
    task: Task,
}

/// How the mock answers `navigator.share`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeShare {
    Unavailable,
    Accept,
    Reject,
}

/// A download triggered through an anchor click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub href: String,
    pub filename: String,
    pub content: String,
    pub content_type: String,
}

pub struct MockPage {
    nodes: RefCell<Vec<Node>>,
    focused: Cell<Option<MockElement>>,
    listeners: RefCell<Vec<(MockElement, ElementEvent, Rc<RefCell<Listener>>)>>,
    key_listeners: RefCell<Vec<Rc<RefCell<KeyListener>>>>,

    now: Cell<Duration>,
    next_timer: Cell<i32>,
    timers: RefCell<Vec<Timer>>,

    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,

    clipboard: RefCell<Option<String>>,
    clipboard_denied: Cell<bool>,
    append_fails: Cell<bool>,
    rejected_attribute: RefCell<Option<String>>,
    native_share: Cell<NativeShare>,
    shares: RefCell<Vec<ShareData>>,
    alerts: RefCell<Vec<String>>,

    next_object_url: Cell<u32>,
    object_urls: RefCell<BTreeMap<String, (String, String)>>,
    downloads: RefCell<Vec<Download>>,
    clicks: RefCell<Vec<MockElement>>,
    scrolled: RefCell<Vec<MockElement>>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPage {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let body = Node {
            tag: "body".to_string(),
            ..Default::default()
        };

        Self {
            nodes: RefCell::new(vec![body]),
            focused: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
            key_listeners: RefCell::new(Vec::new()),
            now: Cell::new(Duration::ZERO),
            next_timer: Cell::new(1),
            timers: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
            clipboard: RefCell::new(None),
            clipboard_denied: Cell::new(false),
            append_fails: Cell::new(false),
            rejected_attribute: RefCell::new(None),
            native_share: Cell::new(NativeShare::Unavailable),
            shares: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
            next_object_url: Cell::new(1),
            object_urls: RefCell::new(BTreeMap::new()),
            downloads: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
            scrolled: RefCell::new(Vec::new()),
        }
    }

    // ------------------------------------------------------------------
    // Document building
    // ------------------------------------------------------------------

    /// Appends a new element to `<body>`.
    pub fn element(&self, tag: &str, attributes: &[(&str, &str)]) -> MockElement {
        let element = self.detached(tag, attributes);
        self.attach(BODY, element.0);
        element
    }

    /// Appends a new element under `parent`.
    pub fn child(&self, parent: &MockElement, tag: &str, attributes: &[(&str, &str)]) -> MockElement {
        let element = self.detached(tag, attributes);
        self.attach(parent.0, element.0);
        element
    }

    fn detached(&self, tag: &str, attributes: &[(&str, &str)]) -> MockElement {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            attributes: attributes.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Default::default()
        });
        MockElement(nodes.len() - 1)
    }

    fn attach(&self, parent: usize, child: usize) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child].parent = Some(parent);
        nodes[parent].children.push(child);
    }

    fn detach(&self, child: usize) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[child].parent.take() {
            nodes[parent].children.retain(|&c| c != child);
        }
    }

    pub fn set_rect(&self, element: &MockElement, rect: Rect) {
        self.nodes.borrow_mut()[element.0].rect = rect;
    }

    pub fn set_size(&self, element: &MockElement, size: Size) {
        self.nodes.borrow_mut()[element.0].size = Some(size);
    }

    /// Simulates the user typing: replaces the value and fires `input`.
    pub fn type_into(&self, element: &MockElement, value: &str) {
        self.nodes.borrow_mut()[element.0].value = value.to_string();
        self.fire(element, ElementEvent::Input);
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Whether the element is currently reachable from `<body>`.
    pub fn is_attached(&self, element: &MockElement) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = element.0;
        loop {
            if current == BODY {
                return true;
            }
            match nodes[current].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn count(&self, selector: &str) -> usize {
        self.query_all(selector).len()
    }

    pub fn style(&self, element: &MockElement, property: &str) -> Option<String> {
        self.nodes.borrow()[element.0].styles.get(property).cloned()
    }

    pub fn focused(&self) -> Option<MockElement> {
        self.focused.get()
    }

    pub fn tag(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].tag.clone()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn fire(&self, element: &MockElement, event: ElementEvent) {
        let matching: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(target, kind, _)| target == element && *kind == event)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect();

        for listener in matching {
            (listener.borrow_mut())();
        }
    }

    /// Dispatches a key-down on the document; returns whether default was prevented.
    pub fn press(&self, key: KeyPress) -> bool {
        let listeners: Vec<_> = self.key_listeners.borrow().iter().map(Rc::clone).collect();
        let mut prevented = false;
        for listener in listeners {
            prevented |= (listener.borrow_mut())(&key);
        }
        prevented
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len() + self.key_listeners.borrow().len()
    }

    // ------------------------------------------------------------------
    // Time and tasks
    // ------------------------------------------------------------------

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Moves the virtual clock forward, firing due timers in order.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id.0))
                    .map(|(idx, _)| idx);
                due.map(|idx| timers.remove(idx))
            };

            match next {
                Some(timer) => {
                    self.now.set(timer.due);
                    (timer.task)();
                }
                None => break,
            }
        }
        self.now.set(target);
    }

    /// Polls spawned futures until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    // ------------------------------------------------------------------
    // Platform capabilities
    // ------------------------------------------------------------------

    pub fn deny_clipboard(&self) {
        self.clipboard_denied.set(true);
    }

    /// Makes every later `append_to_body` fail.
    pub fn fail_append(&self) {
        self.append_fails.set(true);
    }

    /// Makes every later `set_attribute` of `name` fail.
    pub fn reject_attribute(&self, name: &str) {
        *self.rejected_attribute.borrow_mut() = Some(name.to_string());
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    pub fn set_native_share(&self, mode: NativeShare) {
        self.native_share.set(mode);
    }

    pub fn shares(&self) -> Vec<ShareData> {
        self.shares.borrow().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.borrow().clone()
    }

    pub fn live_object_urls(&self) -> usize {
        self.object_urls.borrow().len()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.borrow().clone()
    }

    pub fn clicks(&self) -> Vec<MockElement> {
        self.clicks.borrow().clone()
    }

    pub fn scrolled(&self) -> Vec<MockElement> {
        self.scrolled.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Selector matching
    // ------------------------------------------------------------------

    fn descendants(&self, root: usize) -> Vec<usize> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack: Vec<usize> = nodes[root].children.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            out.push(idx);
            stack.extend(nodes[idx].children.iter().rev().copied());
        }
        out
    }

    fn select(&self, root: usize, selector: &str) -> Vec<MockElement> {
        let compounds = parse_selector_list(selector);
        let candidates = self.descendants(root);
        let nodes = self.nodes.borrow();
        candidates
            .into_iter()
            .filter(|&idx| compounds.iter().any(|c| c.matches(&nodes[idx])))
            .map(MockElement)
            .collect()
    }
}

impl Page for MockPage {
    type Element = MockElement;

    fn query_all(&self, selector: &str) -> Vec<MockElement> {
        self.select(BODY, selector)
    }

    fn query_within(&self, root: &MockElement, selector: &str) -> Vec<MockElement> {
        self.select(root.0, selector)
    }

    fn element_by_id(&self, id: &str) -> Option<MockElement> {
        let nodes = self.nodes.borrow();
        self.descendants(BODY)
            .into_iter()
            .find(|&idx| nodes[idx].attributes.get("id").is_some_and(|v| v == id))
            .map(MockElement)
    }

    fn create_element(&self, tag: &str) -> Result<MockElement, PageError> {
        Ok(self.detached(tag, &[]))
    }

    fn append_to_body(&self, element: &MockElement) -> Result<(), PageError> {
        if self.append_fails.get() {
            return Err(PageError::Js("HierarchyRequestError: append rejected".to_string()));
        }
        self.attach(BODY, element.0);
        Ok(())
    }

    fn remove(&self, element: &MockElement) {
        self.detach(element.0);
    }

    fn inner_html(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].inner_html.clone()
    }

    fn set_inner_html(&self, element: &MockElement, html: &str) {
        self.nodes.borrow_mut()[element.0].inner_html = html.to_string();
    }

    fn text_content(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].text.clone()
    }

    fn set_text(&self, element: &MockElement, text: &str) {
        let mut nodes = self.nodes.borrow_mut();
        nodes[element.0].text = text.to_string();
        nodes[element.0].inner_html = text.to_string();
    }

    fn class_name(&self, element: &MockElement) -> String {
        self.attribute(element, "class").unwrap_or_default()
    }

    fn set_class_name(&self, element: &MockElement, class_name: &str) {
        self.nodes.borrow_mut()[element.0]
            .attributes
            .insert("class".to_string(), class_name.to_string());
    }

    fn attribute(&self, element: &MockElement, name: &str) -> Option<String> {
        self.nodes.borrow()[element.0].attributes.get(name).cloned()
    }

    fn set_attribute(&self, element: &MockElement, name: &str, value: &str) -> Result<(), PageError> {
        if self.rejected_attribute.borrow().as_deref() == Some(name) {
            return Err(PageError::Js(format!("InvalidCharacterError: {name}")));
        }
        self.nodes.borrow_mut()[element.0]
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_attribute(&self, element: &MockElement, name: &str) {
        self.nodes.borrow_mut()[element.0].attributes.remove(name);
    }

    fn set_style(&self, element: &MockElement, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let styles = &mut nodes[element.0].styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    fn value(&self, element: &MockElement) -> String {
        self.nodes.borrow()[element.0].value.clone()
    }

    fn focus(&self, element: &MockElement) {
        self.focused.set(Some(*element));
    }

    fn click(&self, element: &MockElement) {
        self.clicks.borrow_mut().push(*element);

        let (tag, href, filename) = {
            let nodes = self.nodes.borrow();
            let node = &nodes[element.0];
            (node.tag.clone(), node.attributes.get("href").cloned(), node.attributes.get("download").cloned())
        };
        if tag != "a" {
            return;
        }
        if let (Some(href), Some(filename)) = (href, filename) {
            let blob = self.object_urls.borrow().get(&href).cloned();
            if let Some((content, content_type)) = blob {
                self.downloads.borrow_mut().push(Download {
                    href,
                    filename,
                    content,
                    content_type,
                });
            }
        }
    }

    fn scroll_into_view(&self, element: &MockElement) {
        self.scrolled.borrow_mut().push(*element);
    }

    fn bounding_rect(&self, element: &MockElement) -> Rect {
        self.nodes.borrow()[element.0].rect
    }

    fn offset_size(&self, element: &MockElement) -> Size {
        let nodes = self.nodes.borrow();
        let node = &nodes[element.0];
        node.size.unwrap_or(Size {
            width: node.text.chars().count() as f64 * CHAR_WIDTH,
            height: LINE_HEIGHT,
        })
    }

    fn add_listener(&self, element: &MockElement, event: ElementEvent, listener: Listener) {
        self.listeners
            .borrow_mut()
            .push((*element, event, Rc::new(RefCell::new(listener))));
    }

    fn add_key_listener(&self, listener: KeyListener) {
        self.key_listeners.borrow_mut().push(Rc::new(RefCell::new(listener)));
    }

    fn set_timeout(&self, delay: Duration, task: Task) -> Result<TimerId, PageError> {
        let id = TimerId(self.next_timer.get());
        self.next_timer.set(id.0 + 1);
        self.timers.borrow_mut().push(Timer {
            id,
            due: self.now.get() + delay,
            task,
        });
        Ok(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|t| t.id != id);
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(task) {
            tracing::warn!(?e, "mock executor rejected task");
        }
    }

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<(), PageError>> {
        let result = if self.clipboard_denied.get() {
            Err(PageError::Js("NotAllowedError: Write permission denied.".to_string()))
        } else {
            *self.clipboard.borrow_mut() = Some(text.to_string());
            Ok(())
        };
        future::ready(result).boxed_local()
    }

    fn share(&self, data: &ShareData) -> Option<LocalBoxFuture<'static, Result<(), PageError>>> {
        let result = match self.native_share.get() {
            NativeShare::Unavailable => return None,
            NativeShare::Accept => {
                self.shares.borrow_mut().push(data.clone());
                Ok(())
            }
            NativeShare::Reject => Err(PageError::Js("AbortError: Share canceled".to_string())),
        };
        Some(future::ready(result).boxed_local())
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn create_object_url(&self, content: &str, content_type: &str) -> Result<String, PageError> {
        let id = self.next_object_url.get();
        self.next_object_url.set(id + 1);
        let url = format!("blob:mock/{id}");
        self.object_urls
            .borrow_mut()
            .insert(url.clone(), (content.to_string(), content_type.to_string()));
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.object_urls.borrow_mut().remove(url);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum AttrTest {
    Exists(String),
    Equals(String, String),
    Contains(String, String),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: BTreeSet<String>,
    attributes: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != node.tag) {
            return false;
        }
        let id = node.attributes.get("id");
        if self.ids.iter().any(|want| id != Some(want)) {
            return false;
        }
        let classes: BTreeSet<&str> = node
            .attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if self.classes.iter().any(|want| !classes.contains(want.as_str())) {
            return false;
        }
        self.attributes.iter().all(|test| match test {
            AttrTest::Exists(name) => node.attributes.contains_key(name),
            AttrTest::Equals(name, want) => node.attributes.get(name) == Some(want),
            AttrTest::Contains(name, want) => node.attributes.get(name).is_some_and(|v| v.contains(want.as_str())),
        })
    }
}

fn split_top_level(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&selector[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

fn parse_selector_list(selector: &str) -> Vec<Compound> {
    split_top_level(selector)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_compound)
        .collect()
}

fn is_ident(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':'
}

fn parse_compound(selector: &str) -> Compound {
    let mut compound = Compound::default();
    let chars: Vec<char> = selector.chars().collect();
    let mut i = 0;

    let ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                compound.classes.insert(ident(&mut i));
            }
            '#' => {
                i += 1;
                compound.ids.push(ident(&mut i));
            }
            '[' => {
                i += 1;
                let name = ident(&mut i);
                let contains = chars.get(i) == Some(&'*');
                if contains {
                    i += 1;
                }
                if chars.get(i) == Some(&'=') {
                    i += 1;
                    let value = match chars.get(i) {
                        Some(&q) if q == '"' || q == '\'' => {
                            i += 1;
                            let start = i;
                            while i < chars.len() && chars[i] != q {
                                i += 1;
                            }
                            let value: String = chars[start..i].iter().collect();
                            i += 1;
                            value
                        }
                        _ => {
                            let start = i;
                            while i < chars.len() && chars[i] != ']' {
                                i += 1;
                            }
                            chars[start..i].iter().collect()
                        }
                    };
                    compound.attributes.push(if contains {
                        AttrTest::Contains(name, value)
                    } else {
                        AttrTest::Equals(name, value)
                    });
                } else {
                    compound.attributes.push(AttrTest::Exists(name));
                }
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i += 1;
            }
            c if is_ident(c) => {
                compound.tag = Some(ident(&mut i).to_ascii_lowercase());
            }
            _ => i += 1,
        }
    }

    compound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_lists_and_attribute_operators() {
        let page = MockPage::new();
        let modal = page.element("div", &[("class", "modal flex")]);
        let named = page.element("section", &[("id", "shareModal")]);
        page.element("div", &[("id", "footer")]);

        assert_eq!(page.query_all(r#".modal, [id*="Modal"]"#), vec![modal, named]);
    }

    #[test]
    fn compound_selector_with_quoted_value() {
        let page = MockPage::new();
        let url = page.element("input", &[("type", "url")]);
        page.element("input", &[("type", "text")]);
        let button = page.element("button", &[("onclick", "togglePassword('pw')")]);

        assert_eq!(page.query_all(r#"input[type="url"]"#), vec![url]);
        assert_eq!(page.query_all(r#"[onclick="togglePassword('pw')"]"#), vec![button]);
    }

    #[test]
    fn detached_elements_are_not_found() {
        let page = MockPage::new();
        let alert = page.element("div", &[("class", "alert-auto-dismiss")]);
        page.remove(&alert);

        assert_eq!(page.count(".alert-auto-dismiss"), 0);
        assert!(!page.is_attached(&alert));
    }

    #[test]
    fn timers_fire_in_due_order() {
        let page = Rc::new(MockPage::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(30, "late"), (10, "early")] {
            let log = Rc::clone(&log);
            page.set_timeout(Duration::from_millis(delay), Box::new(move || log.borrow_mut().push(label)))
                .unwrap();
        }

        page.advance(Duration::from_millis(20));
        assert_eq!(*log.borrow(), vec!["early"]);
        page.advance(Duration::from_millis(20));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
        assert_eq!(page.now(), Duration::from_millis(40));
    }
}
