//! Document-level listeners: inserted subtrees, key presses, section reloads.
//!
//! These live as long as the page, so their closures are leaked on purpose.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, KeyboardEvent, MutationObserver, MutationObserverInit, MutationRecord};
use wishlist_engine::Event;

use crate::dispatch;

/// Theme editor notification after a section was re-rendered.
pub const SECTION_LOAD_EVENT: &str = "shopify:section:load";

/// Install the observer and document listeners.
///
/// # Errors
///
/// Returns the thrown value if the browser refuses a registration.
pub fn install(document: &Document) -> Result<(), JsValue> {
    observe_insertions(document)?;

    let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(|event: KeyboardEvent| {
        dispatch(Event::KeyDown(event.key()));
    });
    document.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    on_key.forget();

    let on_section_load = Closure::<dyn FnMut(web_sys::Event)>::new(|_event: web_sys::Event| {
        dispatch(Event::SectionReloaded);
    });
    document.add_event_listener_with_callback(
        SECTION_LOAD_EVENT,
        on_section_load.as_ref().unchecked_ref(),
    )?;
    on_section_load.forget();

    tracing::debug!("Document listeners installed");
    Ok(())
}

fn observe_insertions(document: &Document) -> Result<(), JsValue> {
    let Some(body) = document.body() else {
        return Ok(());
    };

    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        |records: js_sys::Array, _observer: MutationObserver| {
            let inserted: Vec<Element> = records
                .iter()
                .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
                .flat_map(|record| {
                    let added = record.added_nodes();
                    (0..added.length())
                        .filter_map(move |index| added.item(index))
                        .collect::<Vec<_>>()
                })
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect();

            if !inserted.is_empty() {
                dispatch(Event::NodesInserted(inserted));
            }
        },
    );

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)?;
    callback.forget();
    Ok(())
}
