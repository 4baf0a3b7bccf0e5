//! Post-replacement rebinding pass.
//!
//! All listeners are delegated from the document and bound exactly once, so
//! replaced fragments need no re-listening. What a fresh fragment does need
//! is per-element state the server does not render: draggable handles, the
//! edit affordance hint on project titles, and no stale drag markers. This
//! pass restores those and diagnoses malformed elements; it is attribute
//! only, so running it N times equals running it once.

use web_sys::Element;

use crate::dom;

pub const ACTION_BUTTON_SELECTORS: &str =
    ".delete-task-btn, .edit-task-btn, .delete-project-btn, .edit-project-btn";

const BUTTON_ID_ATTRS: [(&str, &str); 4] = [
    (".delete-task-btn", dom_sortable::TASK_ID_ATTR),
    (".edit-task-btn", dom_sortable::TASK_ID_ATTR),
    (".delete-project-btn", dom_sortable::PROJECT_ID_ATTR),
    (".edit-project-btn", dom_sortable::PROJECT_ID_ATTR),
];

/// Re-establishes interactive state for everything under `root`. Safe to
/// call arbitrarily often; elements missing their identifying attribute are
/// skipped with a diagnostic rather than failing the pass.
pub fn rebind(root: &Element, sort: &dom_sortable::SortController) {
    let lists = count(root, dom_sortable::LIST_SELECTOR);
    let buttons = count(root, ACTION_BUTTON_SELECTORS);
    web_sys::console::log_1(
        &format!("[Rebind] {lists} sortable lists, {buttons} action buttons").into(),
    );

    sort.prepare(root);
    validate_buttons(root);
    restore_edit_hints(root);
}

fn count(root: &Element, selector: &str) -> u32 {
    root.query_selector_all(selector).map_or(0, |nodes| nodes.length())
}

fn validate_buttons(root: &Element) {
    for (selector, attr) in BUTTON_ID_ATTRS {
        let Ok(nodes) = root.query_selector_all(selector) else { continue };
        for button in dom::elements(&nodes) {
            if button.get_attribute(attr).is_none() {
                web_sys::console::warn_1(
                    &format!("[Rebind] {selector} button missing {attr}, skipped").into(),
                );
            }
        }
    }
}

/// Freshly swapped project titles keep their click-to-edit affordance.
fn restore_edit_hints(root: &Element) {
    if let Ok(titles) = root.query_selector_all(".project-title") {
        for title in dom::elements(&titles) {
            let _ = title.set_attribute("title", "Click to edit title");
        }
    }
}
