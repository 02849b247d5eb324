//! In-memory host for tests.
//!
//! [`MemoryPage`] is a small element arena implementing [`Page`] with a
//! virtual clock. Clicks and elapsed timers come back as [`Event`]s for the
//! test to feed into [`crate::Wishlist::handle`], exactly as a browser host
//! would.
//!
//! Selectors support the three forms the markup contract uses: `[attr]`,
//! `.class` and a bare tag name.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::dom::{DrawerRow, Page, Timer, TimerId, attrs, selectors};
use crate::events::{Event, Listener};

/// Marker on a rendered row's "view product" action.
pub const ROW_VIEW: &str = "data-wishlist-view";
/// Marker on a rendered row's "remove" action.
pub const ROW_REMOVE: &str = "data-wishlist-remove";

/// Handle to a node in a [`MemoryPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
    row: Option<DrawerRow>,
}

impl Node {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(attr) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            self.attribute(attr).is_some()
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            self.tag.eq_ignore_ascii_case(selector)
        }
    }
}

#[derive(Debug)]
struct ScheduledTimer {
    id: TimerId,
    due: Duration,
    timer: Timer<NodeId>,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<Node>,
    body: NodeId,
    focused: Option<NodeId>,
    navigations: Vec<String>,
    reflows: usize,
    now: Duration,
    next_timer: u64,
    timers: Vec<ScheduledTimer>,
}

impl Arena {
    fn new() -> Self {
        let body = Node {
            tag: "body".to_string(),
            ..Node::default()
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            focused: None,
            navigations: Vec::new(),
            reflows: 0,
            now: Duration::ZERO,
            next_timer: 1,
            timers: Vec::new(),
        }
    }

    // Node ids are only minted by `create`, and nodes are never freed.
    #[allow(clippy::indexing_slicing)]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[allow(clippy::indexing_slicing)]
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn create(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(root).children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = self.node(node).parent;
        }
        false
    }

    fn text(&self, id: NodeId) -> String {
        let node = self.node(id);
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text(*child));
        }
        text
    }

    fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let node = self.node_mut(id);
        match node.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => node.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn toggle_class(&mut self, id: NodeId, class: &str, on: bool) {
        let classes = &mut self.node_mut(id).classes;
        let present = classes.iter().any(|c| c == class);
        if on && !present {
            classes.push(class.to_string());
        } else if !on {
            classes.retain(|c| c != class);
        }
    }

    /// Deep copy of `id`: markup only, like `cloneNode(true)`.
    fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let source = self.node(id);
        let node = Node {
            tag: source.tag.clone(),
            attributes: source.attributes.clone(),
            classes: source.classes.clone(),
            text: source.text.clone(),
            ..Node::default()
        };
        let children = source.children.clone();

        self.nodes.push(node);
        let copy = NodeId(self.nodes.len() - 1);
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.append(copy, child_copy);
        }
        copy
    }

    fn child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.create(tag);
        self.append(parent, id);
        id
    }
}

/// An in-memory document with a virtual clock.
///
/// Clones share the same document.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    arena: Rc<RefCell<Arena>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// An empty document: just a body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: Rc::new(RefCell::new(Arena::new())),
        }
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.arena.borrow().body
    }

    /// Create a detached element.
    #[must_use]
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.arena.borrow_mut().create(tag)
    }

    /// Append `child` to `parent`, moving it if already attached elsewhere.
    pub fn append_child(&self, parent: &NodeId, child: &NodeId) {
        self.arena.borrow_mut().append(*parent, *child);
    }

    #[must_use]
    pub fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.arena.borrow().node(*element).parent
    }

    /// Detached deep copy of `element` without its listeners.
    #[must_use]
    pub fn clone_node(&self, element: &NodeId) -> NodeId {
        self.arena.borrow_mut().clone_subtree(*element)
    }

    /// Listeners attached to `element`, in attach order.
    #[must_use]
    pub fn listeners(&self, element: &NodeId) -> Vec<Listener> {
        self.arena.borrow().node(*element).listeners.clone()
    }

    /// Click `element`: events from its click listeners and its ancestors'.
    #[must_use]
    pub fn click(&self, element: &NodeId) -> Vec<Event<NodeId>> {
        let arena = self.arena.borrow();
        let mut events = Vec::new();
        let mut current = Some(*element);
        while let Some(id) = current {
            let node = arena.node(id);
            events.extend(
                node.listeners
                    .iter()
                    .filter(|listener| listener.dom_event() == "click")
                    .map(|listener| listener.event(id)),
            );
            current = node.parent;
        }
        events
    }

    /// Finish a CSS transition on `element`.
    #[must_use]
    pub fn end_transition(&self, element: &NodeId) -> Vec<Event<NodeId>> {
        self.arena
            .borrow()
            .node(*element)
            .listeners
            .iter()
            .filter(|listener| listener.dom_event() == "transitionend")
            .map(|listener| listener.event(*element))
            .collect()
    }

    /// Move the clock forward, returning the timers that fired in order.
    #[must_use]
    pub fn advance(&self, by: Duration) -> Vec<Event<NodeId>> {
        let mut arena = self.arena.borrow_mut();
        let target = arena.now + by;
        let mut fired = Vec::new();

        loop {
            let next = arena
                .timers
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= target)
                .min_by_key(|(_, t)| (t.due, t.id.0))
                .map(|(index, _)| index);
            let Some(index) = next else { break };

            let scheduled = arena.timers.remove(index);
            arena.now = scheduled.due;
            fired.push(Event::TimerElapsed(scheduled.timer));
        }

        arena.now = target;
        fired
    }

    /// Number of timers scheduled and not yet fired or cleared.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.arena.borrow().timers.len()
    }

    /// How many forced reflows the engine requested.
    #[must_use]
    pub fn reflow_count(&self) -> usize {
        self.arena.borrow().reflows
    }

    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.arena.borrow().focused
    }

    /// URLs navigated to, oldest first.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.arena.borrow().navigations.clone()
    }

    #[must_use]
    pub fn body_has_class(&self, class: &str) -> bool {
        let arena = self.arena.borrow();
        arena.node(arena.body).matches(&format!(".{class}"))
    }

    /// The row view models currently attached under `list`.
    #[must_use]
    pub fn drawer_rows(&self, list: &NodeId) -> Vec<DrawerRow> {
        let arena = self.arena.borrow();
        arena
            .node(*list)
            .children
            .iter()
            .filter_map(|child| arena.node(*child).row.clone())
            .collect()
    }

    /// A rendered row's remove action.
    #[must_use]
    pub fn row_remove_action(&self, row: &NodeId) -> Option<NodeId> {
        self.query_within(row, &format!("[{ROW_REMOVE}]")).into_iter().next()
    }

    /// A rendered row's view action.
    #[must_use]
    pub fn row_view_action(&self, row: &NodeId) -> Option<NodeId> {
        self.query_within(row, &format!("[{ROW_VIEW}]")).into_iter().next()
    }

    /// Append a favorite button built from `markup` to `parent`.
    pub fn add_product_button(&self, parent: &NodeId, markup: &ProductMarkup) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        let button = arena.child(*parent, "button");

        arena.set_attribute(button, "data-wishlist-button", "");
        arena.set_attribute(button, attrs::PRODUCT_ID, &markup.id);
        let optional = [
            (attrs::VARIANT_ID, &markup.variant),
            (attrs::PRODUCT_TITLE, &markup.title),
            (attrs::PRODUCT_URL, &markup.url),
            (attrs::PRODUCT_PRICE, &markup.price),
            (attrs::PRODUCT_IMAGE, &markup.image),
            (attrs::ADD_LABEL, &markup.add_label),
            (attrs::ADDED_LABEL, &markup.added_label),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                arena.set_attribute(button, name, value);
            }
        }
        if let Some(text) = &markup.text {
            arena.node_mut(button).text.clone_from(text);
        }
        if markup.label_target {
            let target = arena.child(button, "span");
            arena.set_attribute(target, "data-wishlist-label-target", "");
        }

        button
    }
}

impl Page for MemoryPage {
    type Element = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        self.query_within(&self.body(), selector)
    }

    fn query_within(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        let arena = self.arena.borrow();
        arena
            .descendants(*root)
            .into_iter()
            .filter(|id| arena.node(*id).matches(selector))
            .collect()
    }

    fn matches(&self, element: &NodeId, selector: &str) -> bool {
        self.arena.borrow().node(*element).matches(selector)
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.arena
            .borrow()
            .node(*element)
            .attribute(name)
            .map(str::to_string)
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.arena.borrow_mut().set_attribute(*element, name, value);
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.arena
            .borrow()
            .node(*element)
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn toggle_class(&self, element: &NodeId, class: &str, on: bool) {
        self.arena.borrow_mut().toggle_class(*element, class, on);
    }

    fn text_content(&self, element: &NodeId) -> String {
        self.arena.borrow().text(*element)
    }

    fn set_text_content(&self, element: &NodeId, text: &str) {
        let mut arena = self.arena.borrow_mut();
        let children = std::mem::take(&mut arena.node_mut(*element).children);
        for child in children {
            arena.node_mut(child).parent = None;
        }
        arena.node_mut(*element).text = text.to_string();
    }

    fn set_body_class(&self, class: &str, on: bool) {
        let mut arena = self.arena.borrow_mut();
        let body = arena.body;
        arena.toggle_class(body, class, on);
    }

    fn move_to_body(&self, element: &NodeId) {
        let mut arena = self.arena.borrow_mut();
        let body = arena.body;
        if arena.node(*element).parent != Some(body) {
            arena.append(body, *element);
        }
    }

    fn focus(&self, element: &NodeId) {
        self.arena.borrow_mut().focused = Some(*element);
    }

    fn force_reflow(&self, _element: &NodeId) {
        self.arena.borrow_mut().reflows += 1;
    }

    fn is_attached(&self, element: &NodeId) -> bool {
        self.arena.borrow().is_attached(*element)
    }

    fn detach(&self, element: &NodeId) {
        self.arena.borrow_mut().detach(*element);
    }

    fn render_rows(&self, list: &NodeId, rows: &[DrawerRow]) {
        let mut arena = self.arena.borrow_mut();
        let old = std::mem::take(&mut arena.node_mut(*list).children);
        for child in old {
            arena.node_mut(child).parent = None;
        }

        for row in rows {
            let item = arena.child(*list, "li");
            arena.toggle_class(item, "wishlist-item", true);
            arena.set_attribute(item, attrs::ROW_KEY, row.key.as_str());

            if let Some(image) = &row.image {
                let img = arena.child(item, "img");
                arena.set_attribute(img, "src", image);
                arena.set_attribute(img, "alt", &row.title);
            }
            let link = arena.child(item, "a");
            arena.set_attribute(link, "href", &row.url);
            arena.node_mut(link).text.clone_from(&row.title);
            let price = arena.child(item, "span");
            arena.node_mut(price).text.clone_from(&row.price);

            let view = arena.child(item, "button");
            arena.set_attribute(view, ROW_VIEW, "");
            arena.node_mut(view).text.clone_from(&row.view_label);
            arena.node_mut(view).listeners.push(Listener::ViewProduct(row.key.clone()));

            let remove = arena.child(item, "button");
            arena.set_attribute(remove, ROW_REMOVE, "");
            arena.set_attribute(remove, attrs::ARIA_LABEL, &row.remove_label);
            arena.node_mut(remove).listeners.push(Listener::RemoveProduct(row.key.clone()));

            arena.node_mut(item).row = Some(row.clone());
        }
    }

    fn listen(&self, element: &NodeId, listener: Listener) {
        self.arena.borrow_mut().node_mut(*element).listeners.push(listener);
    }

    fn is_bound(&self, element: &NodeId, listener: &Listener) -> bool {
        self.arena.borrow().node(*element).listeners.contains(listener)
    }

    fn navigate(&self, url: &str) {
        self.arena.borrow_mut().navigations.push(url.to_string());
    }

    fn set_timeout(&self, delay: Duration, timer: Timer<NodeId>) -> TimerId {
        let mut arena = self.arena.borrow_mut();
        let id = TimerId(arena.next_timer);
        arena.next_timer += 1;
        let due = arena.now + delay;
        arena.timers.push(ScheduledTimer { id, due, timer });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.arena.borrow_mut().timers.retain(|t| t.id != id);
    }
}

/// Attributes of one favorite button.
#[derive(Debug, Clone, Default)]
pub struct ProductMarkup {
    id: String,
    variant: Option<String>,
    title: Option<String>,
    url: Option<String>,
    price: Option<String>,
    image: Option<String>,
    text: Option<String>,
    add_label: Option<String>,
    added_label: Option<String>,
    label_target: bool,
}

impl ProductMarkup {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Price attribute, in minor units as themes render it.
    #[must_use]
    pub fn price(mut self, minor_units: impl Into<String>) -> Self {
        self.price = Some(minor_units.into());
        self
    }

    #[must_use]
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Visible text of the button.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Per-element add/added label overrides.
    #[must_use]
    pub fn labels(mut self, add: impl Into<String>, added: impl Into<String>) -> Self {
        self.add_label = Some(add.into());
        self.added_label = Some(added.into());
        self
    }

    /// Include a `[data-wishlist-label-target]` child.
    #[must_use]
    pub const fn with_label_target(mut self) -> Self {
        self.label_target = true;
        self
    }
}

/// A storefront page with the full wishlist markup.
///
/// The drawer sits inside a section wrapper, the way themes render it, so
/// mounting has to re-parent it to the body.
#[derive(Debug, Clone, Copy)]
pub struct StorefrontFixture {
    pub header: NodeId,
    pub toggle: NodeId,
    pub header_icon: NodeId,
    pub count_wrapper: NodeId,
    pub count: NodeId,
    pub drawer_section: NodeId,
    pub drawer: NodeId,
    pub panel: NodeId,
    pub close: NodeId,
    pub items: NodeId,
    pub empty: NodeId,
    pub grid: NodeId,
}

impl StorefrontFixture {
    #[must_use]
    pub fn build() -> (MemoryPage, Self) {
        let page = MemoryPage::new();
        let fixture = {
            let mut arena = page.arena.borrow_mut();
            let body = arena.body;

            let header = arena.child(body, "header");
            let toggle = arena.child(header, "button");
            arena.set_attribute(toggle, "data-wishlist-toggle", "");
            let header_icon = arena.child(header, "a");
            arena.toggle_class(header_icon, "header__icon", true);
            arena.toggle_class(header_icon, "header__icon--wishlist", true);
            let count_wrapper = arena.child(header_icon, "span");
            arena.set_attribute(count_wrapper, "data-wishlist-count-wrapper", "");
            let count = arena.child(count_wrapper, "span");
            arena.set_attribute(count, "data-wishlist-count", "");

            let drawer_section = arena.child(body, "div");
            arena.toggle_class(drawer_section, "shopify-section", true);
            let drawer = arena.child(drawer_section, "div");
            arena.set_attribute(drawer, "data-wishlist-drawer", "");
            arena.set_attribute(drawer, attrs::ARIA_HIDDEN, "true");
            let panel = arena.child(drawer, "div");
            arena.set_attribute(panel, "data-wishlist-panel", "");
            let close = arena.child(panel, "button");
            arena.set_attribute(close, "data-wishlist-close", "");
            let items = arena.child(panel, "ul");
            arena.set_attribute(items, "data-wishlist-items", "");
            let empty = arena.child(panel, "p");
            arena.set_attribute(empty, "data-wishlist-empty", "");

            let grid = arena.child(body, "div");
            arena.toggle_class(grid, "product-grid", true);

            Self {
                header,
                toggle,
                header_icon,
                count_wrapper,
                count,
                drawer_section,
                drawer,
                panel,
                close,
                items,
                empty,
                grid,
            }
        };
        (page, fixture)
    }

    /// The rendered row for `key`, if any.
    #[must_use]
    pub fn row(&self, page: &MemoryPage, key: &str) -> Option<NodeId> {
        page.query_within(&self.items, selectors::ROW)
            .into_iter()
            .find(|row| page.attribute(row, attrs::ROW_KEY).as_deref() == Some(key))
    }
}
