//! [`Page`] over the live document.

use std::cell::RefCell;
use std::hint::black_box;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};
use wishlist_engine::Listener;
use wishlist_engine::dom::{DrawerRow, Page, Timer, TimerId, attrs};

use crate::dispatch;
use crate::storage::describe;

/// Marker on a rendered row's "view product" action.
const ROW_VIEW: &str = "data-wishlist-view";
/// Marker on a rendered row's "remove" action.
const ROW_REMOVE: &str = "data-wishlist-remove";

/// A DOM listener attached by the engine, removed again when dropped.
struct BoundListener {
    element: Element,
    listener: Listener,
    kind: &'static str,
    callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for BoundListener {
    fn drop(&mut self) {
        let _removed = self
            .element
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// The browser document.
pub struct WebPage {
    window: Window,
    document: Document,
    listeners: RefCell<Vec<BoundListener>>,
}

impl WebPage {
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Drop listeners whose element left the document.
    ///
    /// A pruned element that comes back is bound again by discovery, since
    /// [`Page::is_bound`] answers from this registry.
    fn prune_listeners(&self) {
        let stale: Vec<BoundListener> = {
            let mut listeners = self.listeners.borrow_mut();
            let (live, stale) = listeners
                .drain(..)
                .partition(|bound| bound.element.is_connected());
            *listeners = live;
            stale
        };
        if !stale.is_empty() {
            tracing::trace!(count = stale.len(), "Released listeners");
        }
    }

    fn create(&self, tag: &str, class: &str) -> Option<Element> {
        match self.document.create_element(tag) {
            Ok(element) => {
                if !class.is_empty() {
                    element.set_class_name(class);
                }
                Some(element)
            }
            Err(e) => {
                tracing::warn!(tag, error = %describe(&e), "Failed to create element");
                None
            }
        }
    }

    fn append(parent: &Element, child: &Element) {
        if let Err(e) = parent.append_child(child) {
            tracing::warn!(error = %describe(&e), "Failed to append element");
        }
    }

    fn build_row(&self, row: &DrawerRow) -> Option<Element> {
        let item = self.create("li", "wishlist-item")?;
        self.set_attribute(&item, attrs::ROW_KEY, row.key.as_str());

        let media = self.create("div", "wishlist-item__media")?;
        if let Some(src) = &row.image {
            let img = self.create("img", "")?;
            self.set_attribute(&img, "src", src);
            self.set_attribute(&img, "alt", &row.title);
            self.set_attribute(&img, "loading", "lazy");
            Self::append(&media, &img);
        }

        let info = self.create("div", "wishlist-item__info")?;
        let meta = self.create("div", "wishlist-item__meta")?;
        let title = self.create("a", "wishlist-item__title link")?;
        self.set_attribute(&title, "href", &row.url);
        title.set_text_content(Some(&row.title));
        let price = self.create("div", "wishlist-item__price")?;
        price.set_text_content(Some(&row.price));
        Self::append(&meta, &title);
        Self::append(&meta, &price);
        Self::append(&info, &meta);

        let actions = self.create("div", "wishlist-item__actions")?;
        let view = self.create("button", "button button--primary wishlist-item__view")?;
        self.set_attribute(&view, "type", "button");
        self.set_attribute(&view, ROW_VIEW, "");
        view.set_text_content(Some(&row.view_label));
        let remove = self.create("button", "button button--primary wishlist-item__remove")?;
        self.set_attribute(&remove, "type", "button");
        self.set_attribute(&remove, ROW_REMOVE, "");
        remove.set_text_content(Some(&row.remove_label));
        Self::append(&actions, &view);
        Self::append(&actions, &remove);

        Self::append(&item, &media);
        Self::append(&item, &info);
        Self::append(&item, &actions);

        self.listen(&view, Listener::ViewProduct(row.key.clone()));
        self.listen(&remove, Listener::RemoveProduct(row.key.clone()));
        Some(item)
    }
}

impl Page for WebPage {
    type Element = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn query_within(&self, root: &Element, selector: &str) -> Vec<Element> {
        root.query_selector_all(selector)
            .map(|list| elements(&list))
            .unwrap_or_default()
    }

    fn matches(&self, element: &Element, selector: &str) -> bool {
        element.matches(selector).unwrap_or(false)
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(e) = element.set_attribute(name, value) {
            tracing::debug!(name, error = %describe(&e), "Failed to set attribute");
        }
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn toggle_class(&self, element: &Element, class: &str, on: bool) {
        if let Err(e) = element.class_list().toggle_with_force(class, on) {
            tracing::debug!(class, error = %describe(&e), "Failed to toggle class");
        }
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn set_body_class(&self, class: &str, on: bool) {
        if let Some(body) = self.document.body() {
            self.toggle_class(&body, class, on);
        }
    }

    fn move_to_body(&self, element: &Element) {
        let Some(body) = self.document.body() else {
            return;
        };
        let body: &Element = body.as_ref();
        if element.parent_element().as_ref() != Some(body) {
            Self::append(body, element);
        }
    }

    fn focus(&self, element: &Element) {
        let focused = element.dyn_ref::<HtmlElement>().map(HtmlElement::focus);
        if let Some(Err(e)) = focused {
            tracing::debug!(error = %describe(&e), "Failed to focus");
        }
    }

    fn force_reflow(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            black_box(html.offset_width());
        }
    }

    fn is_attached(&self, element: &Element) -> bool {
        element.is_connected()
    }

    fn detach(&self, element: &Element) {
        element.remove();
        self.prune_listeners();
    }

    fn render_rows(&self, list: &Element, rows: &[DrawerRow]) {
        list.set_inner_html("");
        self.prune_listeners();

        for row in rows {
            match self.build_row(row) {
                Some(item) => Self::append(list, &item),
                None => return,
            }
        }
    }

    fn listen(&self, element: &Element, listener: Listener) {
        let kind = listener.dom_event();
        let prevent = listener.prevents_default()
            && !(listener == Listener::DrawerClose && element.tag_name().eq_ignore_ascii_case("a"));
        let own_events_only = listener == Listener::RowTransition;
        let target = element.clone();
        let registered = listener.clone();

        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            // transitionend bubbles up from the row's children
            if own_events_only
                && event.target().and_then(|t| t.dyn_into::<Element>().ok()).as_ref() != Some(&target)
            {
                return;
            }
            if prevent {
                event.prevent_default();
            }
            dispatch(listener.event(target.clone()));
        });

        match element.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref()) {
            Ok(()) => self.listeners.borrow_mut().push(BoundListener {
                element: element.clone(),
                listener: registered,
                kind,
                callback,
            }),
            Err(e) => tracing::warn!(kind, error = %describe(&e), "Failed to attach listener"),
        }
    }

    fn is_bound(&self, element: &Element, listener: &Listener) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|bound| bound.element == *element && bound.listener == *listener)
    }

    fn navigate(&self, url: &str) {
        if let Err(e) = self.window.location().set_href(url) {
            tracing::warn!(url, error = %describe(&e), "Navigation failed");
        }
    }

    fn set_timeout(&self, delay: Duration, timer: Timer<Element>) -> TimerId {
        let callback = Closure::once_into_js(move || dispatch(wishlist_engine::Event::TimerElapsed(timer)));
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);

        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            Ok(handle) => TimerId(u64::from(handle.unsigned_abs())),
            Err(e) => {
                tracing::warn!(error = %describe(&e), "Failed to schedule timer");
                TimerId(0)
            }
        }
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Ok(handle) = i32::try_from(id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl std::fmt::Debug for WebPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebPage")
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
