//! Small DOM helpers shared by the controller modules.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlInputElement, NodeList};

use crate::error::UiError;

pub fn document() -> Result<Document, UiError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(UiError::NoDocument)
}

/// CSRF token from the hidden form input, falling back to the meta tag.
pub fn csrf_token(document: &Document) -> Result<String, UiError> {
    if let Ok(Some(input)) = document.query_selector("[name=csrfmiddlewaretoken]") {
        if let Some(input) = input.dyn_ref::<HtmlInputElement>() {
            let value = input.value();
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    if let Ok(Some(meta)) = document.query_selector("meta[name=csrf-token]") {
        if let Some(content) = meta.get_attribute("content") {
            if !content.is_empty() {
                return Ok(content);
            }
        }
    }
    Err(UiError::MissingCsrfToken)
}

pub fn event_target(ev: &Event) -> Option<Element> {
    ev.target().and_then(|t| t.dyn_into::<Element>().ok())
}

pub fn closest(el: &Element, selector: &str) -> Option<Element> {
    el.closest(selector).ok().flatten()
}

pub fn elements(nodes: &NodeList) -> Vec<Element> {
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Pending flag on an actionable button. Non-button elements never read as
/// pending and silently ignore writes.
pub fn is_pending(el: &Element) -> bool {
    el.dyn_ref::<HtmlButtonElement>().is_some_and(HtmlButtonElement::disabled)
}

pub fn set_pending(el: &Element, pending: bool) {
    if let Some(button) = el.dyn_ref::<HtmlButtonElement>() {
        button.set_disabled(pending);
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}
