//! Browser bindings for the wishlist engine.
//!
//! Mounts the engine on the live document: favorite buttons, the header
//! toggle and count badge, and the slide-out drawer are all theme markup.
//! The returned handle (also published as `window.Wishlist`) is the API for
//! other page scripts.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { mount } from 'wishlist-wasm';
//!
//! await init();
//!
//! const wishlist = mount();
//! if (wishlist) {
//!     wishlist.add({ id: '7', title: 'Shirt', url: '/products/shirt', price: 25.5 });
//!     console.log(wishlist.list());
//! }
//! ```

mod logging;
mod observer;
mod page;
mod settings;
mod storage;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Element;
use wishlist_core::{EntryKey, FavoriteInput};
use wishlist_engine::config::DEFAULT_LOG_FILTER;
use wishlist_engine::{Event, Wishlist, WishlistConfig};

use crate::page::WebPage;
use crate::storage::{BrowserStorage, describe};

type BrowserWishlist = Wishlist<WebPage, BrowserStorage>;

thread_local! {
    static INSTANCE: RefCell<Option<Rc<RefCell<BrowserWishlist>>>> = const { RefCell::new(None) };
}

/// Initialize panic hook for readable panics in the browser console
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Mount the wishlist on the current document.
///
/// Returns `undefined` when the page has no drawer markup; the feature then
/// stays inert. Mounting twice returns the existing handle.
///
/// # Errors
///
/// Throws if there is no `window`/`document`, or if the browser refuses the
/// document listeners.
#[wasm_bindgen]
pub fn mount() -> Result<Option<WishlistApi>, JsValue> {
    if let Some(existing) = INSTANCE.with(|slot| slot.borrow().clone()) {
        tracing::debug!("Wishlist already mounted");
        return Ok(Some(WishlistApi { inner: existing }));
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let config = match settings::read(&window) {
        Ok(config) => {
            logging::init(&config.log_filter);
            config
        }
        Err(e) => {
            logging::init(DEFAULT_LOG_FILTER);
            tracing::warn!(error = %e, "Using default wishlist settings");
            WishlistConfig::default()
        }
    };

    let page = WebPage::new(window.clone(), document.clone());
    let storage = BrowserStorage::from_window(&window);
    let wishlist = match Wishlist::mount(page, storage, config) {
        Ok(wishlist) => wishlist,
        Err(e) => {
            tracing::warn!(error = %e, "Wishlist disabled");
            return Ok(None);
        }
    };

    let shared = Rc::new(RefCell::new(wishlist));
    INSTANCE.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&shared)));
    observer::install(&document)?;

    let api = WishlistApi { inner: shared };
    if let Err(e) = js_sys::Reflect::set(
        &window,
        &JsValue::from_str("Wishlist"),
        &JsValue::from(api.clone()),
    ) {
        tracing::debug!(error = %describe(&e), "Could not publish window.Wishlist");
    }
    Ok(Some(api))
}

/// Deliver a browser event to the mounted wishlist.
///
/// An event raised while the wishlist is busy handling another one is
/// re-queued on the task queue instead of being dropped.
pub(crate) fn dispatch(event: Event<Element>) {
    let Some(instance) = INSTANCE.with(|slot| slot.borrow().clone()) else {
        return;
    };

    let Ok(mut wishlist) = instance.try_borrow_mut() else {
        defer(event);
        return;
    };
    wishlist.handle(event);
}

fn defer(event: Event<Element>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || dispatch(event));
    if let Err(e) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
    {
        tracing::warn!(error = %describe(&e), "Dropped wishlist event");
    }
}

/// Programmatic wishlist API.
#[wasm_bindgen]
#[derive(Clone)]
pub struct WishlistApi {
    inner: Rc<RefCell<BrowserWishlist>>,
}

#[wasm_bindgen]
impl WishlistApi {
    /// Add a favorite: `{ id, variantId, title, url, price, image }`.
    ///
    /// Returns whether it was added.
    pub fn add(&self, item: JsValue) -> bool {
        let Some(item) = parse_item(item) else {
            return false;
        };
        self.with(|wishlist| wishlist.add(item)).unwrap_or(false)
    }

    /// Remove a favorite by key (variant id, else product id).
    ///
    /// Accepts the key as a string or a number, like `add` accepts ids.
    pub fn remove(&self, key: JsValue) -> bool {
        let Some(key) = parse_key(key) else {
            return false;
        };
        self.with(|wishlist| wishlist.remove(key.as_str())).unwrap_or(false)
    }

    /// Toggle a favorite. Returns whether it is a favorite afterwards.
    pub fn toggle(&self, item: JsValue) -> bool {
        let Some(item) = parse_item(item) else {
            return false;
        };
        self.with(|wishlist| wishlist.toggle(item)).unwrap_or(false)
    }

    /// A copy of the favorites, oldest first.
    pub fn list(&self) -> JsValue {
        let entries = self.with(|wishlist| wishlist.list()).unwrap_or_default();
        serde_wasm_bindgen::to_value(&entries).unwrap_or(JsValue::NULL)
    }

    /// Open the drawer.
    pub fn open(&self) {
        self.with(|wishlist| wishlist.open());
    }

    /// Close the drawer.
    pub fn close(&self) {
        self.with(|wishlist| wishlist.close());
    }
}

impl WishlistApi {
    fn with<T>(&self, f: impl FnOnce(&mut BrowserWishlist) -> T) -> Option<T> {
        match self.inner.try_borrow_mut() {
            Ok(mut wishlist) => Some(f(&mut wishlist)),
            Err(_) => {
                tracing::warn!("Wishlist API called re-entrantly; ignored");
                None
            }
        }
    }
}

fn parse_key(key: JsValue) -> Option<EntryKey> {
    match serde_wasm_bindgen::from_value::<EntryKey>(key) {
        Ok(key) if !key.is_blank() => Some(key),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Refusing malformed favorite key");
            None
        }
    }
}

fn parse_item(item: JsValue) -> Option<FavoriteInput> {
    match serde_wasm_bindgen::from_value(item) {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::debug!(error = %e, "Refusing malformed favorite");
            None
        }
    }
}
