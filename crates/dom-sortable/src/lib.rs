//! Sortable-list drag and drop over plain DOM.
//!
//! HTML5 drag events are delegated from the document; the controller keeps
//! at most one drag session at a time and reports the destination list's
//! new order through a drop callback. It knows nothing about the network.

mod geometry;

pub use geometry::insert_before_index;

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{DragEvent, Element, NodeList};

pub const LIST_SELECTOR: &str = ".todo-list";
pub const ROW_SELECTOR: &str = ".row[data-task-id]";
pub const HANDLE_SELECTOR: &str = ".handle";
pub const PROJECT_SELECTOR: &str = ".todo-list-project";
pub const TASK_ID_ATTR: &str = "data-task-id";
pub const PROJECT_ID_ATTR: &str = "data-project-id";
pub const DRAGGING_CLASS: &str = "dragging";

/// New visual order of one list after a completed drop.
#[derive(Debug, Clone)]
pub struct Reorder {
    pub project_id: String,
    pub ordered_ids: Vec<String>,
}

/// Transient state for one drag gesture. Never persisted.
struct DragSession {
    task_id: String,
}

/// Drag-and-drop controller for the page's sortable lists.
///
/// State machine per gesture: idle, then dragging after a valid drag start,
/// then idle again on drop or drag end. A second drag start while one is
/// active replaces the session.
pub struct SortController {
    session: RefCell<Option<DragSession>>,
    on_reorder: Box<dyn Fn(Reorder)>,
}

impl SortController {
    pub fn new(on_reorder: impl Fn(Reorder) + 'static) -> Self {
        Self {
            session: RefCell::new(None),
            on_reorder: Box::new(on_reorder),
        }
    }

    /// Task id of the active drag session, if any.
    #[cfg(test)]
    fn active_task(&self) -> Option<String> {
        self.session.borrow().as_ref().map(|s| s.task_id.clone())
    }

    fn begin(&self, task_id: String) {
        *self.session.borrow_mut() = Some(DragSession { task_id });
    }

    fn clear(&self) {
        *self.session.borrow_mut() = None;
    }

    fn take(&self) -> Option<DragSession> {
        self.session.borrow_mut().take()
    }

    /// Drag start on a handle. Aborts the drag when the owning row has no
    /// stable task id, recording no state.
    pub fn handle_drag_start(&self, ev: &DragEvent) {
        let Some(target) = event_target(ev) else { return };
        if closest(&target, HANDLE_SELECTOR).is_none() {
            return;
        }
        let Some(row) = closest(&target, ".row") else {
            ev.prevent_default();
            return;
        };
        let Some(task_id) = row.get_attribute(TASK_ID_ATTR) else {
            warn("[DND] drag source has no data-task-id, drag aborted");
            ev.prevent_default();
            return;
        };
        if let Some(dt) = ev.data_transfer() {
            dt.set_effect_allowed("move");
            let _ = dt.set_data("text/plain", &task_id);
        }
        let _ = row.class_list().add_1(DRAGGING_CLASS);
        log(&format!("[DND] dragging task {task_id}"));
        self.begin(task_id);
    }

    /// Drag end on the originating element. Clears the visual marker and the
    /// session whether or not a drop happened.
    pub fn handle_drag_end(&self, ev: &DragEvent) {
        if let Some(row) = event_target(ev).and_then(|t| closest(&t, ".row")) {
            let _ = row.class_list().remove_1(DRAGGING_CLASS);
        }
        self.clear();
    }

    /// Drag over a sortable list: accept the drop as a move.
    pub fn handle_drag_over(&self, ev: &DragEvent) {
        let Some(target) = event_target(ev) else { return };
        if closest(&target, LIST_SELECTOR).is_none() {
            return;
        }
        ev.prevent_default();
        if let Some(dt) = ev.data_transfer() {
            dt.set_drop_effect("move");
        }
    }

    /// Drop on a sortable list: move the session's row to the insertion
    /// point, report the list's new order, then go idle. A drop with no
    /// active session is a no-op.
    pub fn handle_drop(&self, ev: &DragEvent) {
        let Some(target) = event_target(ev) else { return };
        let Some(list) = closest(&target, LIST_SELECTOR) else { return };
        ev.prevent_default();

        let Some(session) = self.take() else {
            warn("[DND] drop without an active drag session");
            return;
        };

        // Re-resolve the row by id: the source may sit in another list, or a
        // fragment swap may have replaced it mid-drag.
        let row_selector = format!(".row[data-task-id=\"{}\"]", session.task_id);
        let dragged = list
            .owner_document()
            .and_then(|doc| doc.query_selector(&row_selector).ok().flatten());
        let Some(dragged) = dragged else {
            warn("[DND] dragged row no longer in the document");
            return;
        };

        let others = list
            .query_selector_all(&format!("{ROW_SELECTOR}:not(.{DRAGGING_CLASS})"))
            .map(|nodes| elements(&nodes))
            .unwrap_or_default();
        let midpoints: Vec<f64> = others
            .iter()
            .map(|row| {
                let rect = row.get_bounding_client_rect();
                rect.top() + rect.height() / 2.0
            })
            .collect();

        match insert_before_index(&midpoints, f64::from(ev.client_y())) {
            Some(index) => {
                let _ = list.insert_before(&dragged, Some(&others[index]));
            }
            None => {
                let _ = list.append_child(&dragged);
            }
        }

        self.persist_order(&list);
        let _ = dragged.class_list().remove_1(DRAGGING_CLASS);
    }

    /// Reports the list's full order, in visual sequence, to the drop
    /// callback. The project id comes from the owning project card; without
    /// one the order cannot be addressed and is not reported.
    fn persist_order(&self, list: &Element) {
        let project_id = closest(list, PROJECT_SELECTOR)
            .and_then(|project| project.get_attribute(PROJECT_ID_ATTR));
        let Some(project_id) = project_id else {
            warn("[DND] list has no owning project id, order not persisted");
            return;
        };
        let ordered_ids: Vec<String> = list
            .query_selector_all(ROW_SELECTOR)
            .map(|nodes| elements(&nodes))
            .unwrap_or_default()
            .iter()
            .filter_map(|row| row.get_attribute(TASK_ID_ATTR))
            .collect();
        log(&format!(
            "[DND] persisting order for project {project_id}: {} tasks",
            ordered_ids.len()
        ));
        (self.on_reorder)(Reorder { project_id, ordered_ids });
    }

    /// Makes every handle under `root` draggable and sweeps stale drag
    /// markers. Attribute-only, so repeating the pass changes nothing.
    /// Handles outside a task row are skipped with a diagnostic.
    pub fn prepare(&self, root: &Element) {
        if let Ok(handles) = root.query_selector_all(HANDLE_SELECTOR) {
            for handle in elements(&handles) {
                let row_id = closest(&handle, ".row")
                    .and_then(|row| row.get_attribute(TASK_ID_ATTR));
                if row_id.is_none() {
                    warn("[DND] handle outside a task row, skipped");
                    continue;
                }
                let _ = handle.set_attribute("draggable", "true");
            }
        }
        // A fragment swap during a drag can orphan the marker.
        if let Ok(stale) = root.query_selector_all(&format!(".row.{DRAGGING_CLASS}")) {
            for row in elements(&stale) {
                let _ = row.class_list().remove_1(DRAGGING_CLASS);
            }
        }
    }
}

fn event_target(ev: &DragEvent) -> Option<Element> {
    ev.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn closest(el: &Element, selector: &str) -> Option<Element> {
    el.closest(selector).ok().flatten()
}

fn elements(nodes: &NodeList) -> Vec<Element> {
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_session_until_begin() {
        let controller = SortController::new(|_| {});
        assert!(controller.active_task().is_none());
        assert!(controller.take().is_none());
    }

    #[test]
    fn begin_records_the_active_task() {
        let controller = SortController::new(|_| {});
        controller.begin("42".into());
        assert_eq!(controller.active_task().as_deref(), Some("42"));
    }

    #[test]
    fn second_begin_replaces_the_session() {
        let controller = SortController::new(|_| {});
        controller.begin("42".into());
        controller.begin("7".into());
        assert_eq!(controller.active_task().as_deref(), Some("7"));
    }

    #[test]
    fn take_consumes_the_session_once() {
        let controller = SortController::new(|_| {});
        controller.begin("42".into());
        assert_eq!(controller.take().map(|s| s.task_id).as_deref(), Some("42"));
        assert!(controller.take().is_none());
    }

    #[test]
    fn clear_returns_to_idle() {
        let controller = SortController::new(|_| {});
        controller.begin("42".into());
        controller.clear();
        assert!(controller.active_task().is_none());
    }
}
