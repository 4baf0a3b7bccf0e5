//! Top-level event dispatcher.
//!
//! One listener per event type, bound once on the document at attach time;
//! dispatch inspects the target's classes and data attributes. The listeners
//! live for the page lifetime, so duplicate-handler bookkeeping does not
//! exist here.

use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, DragEvent, Element, Event, HtmlInputElement};

use dom_sortable::{Reorder, SortController, PROJECT_ID_ATTR, PROJECT_SELECTOR, TASK_ID_ATTR};

use crate::error::UiError;
use crate::{api, dom, rebind};

/// Role of an actionable button, decided from its class attribute. Match
/// order mirrors the dispatch chain: project actions before task actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonRole {
    DeleteProject,
    EditProject,
    DeleteTask,
    EditTask,
}

impl ButtonRole {
    pub fn from_class_attr(classes: &str) -> Option<Self> {
        let has = |name: &str| classes.split_whitespace().any(|class| class == name);
        if has("delete-project-btn") {
            Some(Self::DeleteProject)
        } else if has("edit-project-btn") {
            Some(Self::EditProject)
        } else if has("delete-task-btn") {
            Some(Self::DeleteTask)
        } else if has("edit-task-btn") {
            Some(Self::EditTask)
        } else {
            None
        }
    }

    fn id_attr(self) -> &'static str {
        match self {
            Self::DeleteProject | Self::EditProject => PROJECT_ID_ATTR,
            Self::DeleteTask | Self::EditTask => TASK_ID_ATTR,
        }
    }
}

/// First half of the pending-flag lifecycle: what a button activation does
/// before any DOM write. `confirm` is only consulted once the button is
/// known to be free, so a pending button never prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingStep {
    /// An earlier activation is still in flight; this one is a no-op.
    AlreadyPending,
    /// User declined the confirmation; nothing gets marked pending.
    Declined,
    /// Request may be issued; the button stays pending until its response.
    InFlight,
}

fn activation_step(pending: bool, confirm: impl FnOnce() -> bool) -> PendingStep {
    if pending {
        PendingStep::AlreadyPending
    } else if confirm() {
        PendingStep::InFlight
    } else {
        PendingStep::Declined
    }
}

/// Second half of the lifecycle: the follow-up once a response arrives.
/// Both arms end with no pending flag set anywhere: a committed delete
/// removes the flagged element outright, a committed edit runs the recovery
/// pass, and a skip re-enables every button in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ResponseStep {
    /// Success: commit the action's local DOM effect.
    CommitEffect,
    /// Failure: leave the document alone and revive the controls.
    SkipAndReenable,
}

fn response_step<T>(outcome: &Result<T, UiError>) -> ResponseStep {
    match outcome {
        Ok(_) => ResponseStep::CommitEffect,
        Err(_) => ResponseStep::SkipAndReenable,
    }
}

/// Page-wide controller. Constructed once and handed to the document's
/// listeners; owns no per-row state beyond the pending flags it toggles on
/// the buttons themselves.
pub struct Dashboard {
    sort: Rc<SortController>,
}

impl Dashboard {
    /// Binds the controller to `document` for the page lifetime and runs the
    /// initial rebind pass.
    pub fn attach(document: &Document) -> Result<Rc<Self>, JsValue> {
        let sort = Rc::new(SortController::new(|reorder: Reorder| {
            let payload = api::ReorderPayload::new(reorder.project_id, reorder.ordered_ids);
            spawn_local(async move {
                match api::persist_order(&payload).await {
                    Ok(()) => log("[API] order saved"),
                    // Optimistic commit: the visual order stays as dropped.
                    Err(err) => error(&format!("[API] saving order failed: {err}")),
                }
            });
        }));
        let this = Rc::new(Self { sort });

        {
            let this = Rc::clone(&this);
            listen(document, "click", move |ev: Event| this.handle_click(&ev))?;
        }
        {
            let this = Rc::clone(&this);
            listen(document, "change", move |ev: Event| this.handle_change(&ev))?;
        }
        {
            let sort = Rc::clone(&this.sort);
            listen(document, "dragstart", move |ev: DragEvent| sort.handle_drag_start(&ev))?;
        }
        {
            let sort = Rc::clone(&this.sort);
            listen(document, "dragend", move |ev: DragEvent| sort.handle_drag_end(&ev))?;
        }
        {
            let sort = Rc::clone(&this.sort);
            listen(document, "dragover", move |ev: DragEvent| sort.handle_drag_over(&ev))?;
        }
        {
            let sort = Rc::clone(&this.sort);
            listen(document, "drop", move |ev: DragEvent| sort.handle_drop(&ev))?;
        }

        // Fragment-replacement hook: the swap mechanism announces each
        // replacement, and recovery runs here and nowhere else.
        {
            let this = Rc::clone(&this);
            listen(document, "htmx:afterSwap", move |_: Event| this.recover(true))?;
        }
        {
            let this = Rc::clone(&this);
            listen(document, "htmx:load", move |_: Event| this.recover(true))?;
        }
        {
            let this = Rc::clone(&this);
            listen(document, "htmx:afterRequest", move |_: Event| this.recover(false))?;
        }

        this.recover(true);
        log("[Dashboard] attached");
        Ok(this)
    }

    fn handle_click(&self, ev: &Event) {
        let Some(target) = dom::event_target(ev) else { return };
        let Some(role) = target
            .get_attribute("class")
            .as_deref()
            .and_then(ButtonRole::from_class_attr)
        else {
            return;
        };
        ev.prevent_default();
        ev.stop_propagation();
        let Some(id) = target.get_attribute(role.id_attr()) else {
            warn(&format!("[Dashboard] button missing {}, action dropped", role.id_attr()));
            return;
        };
        let confirm = || match role {
            ButtonRole::DeleteProject => dom::confirm("Are you sure you want to delete this project?"),
            ButtonRole::DeleteTask => dom::confirm("Are you sure you want to delete this task?"),
            ButtonRole::EditProject | ButtonRole::EditTask => true,
        };
        match activation_step(dom::is_pending(&target), confirm) {
            PendingStep::InFlight => dom::set_pending(&target, true),
            PendingStep::AlreadyPending | PendingStep::Declined => return,
        }
        match role {
            ButtonRole::DeleteProject => Self::delete_project(id),
            ButtonRole::EditProject => self.edit_project(&target, id),
            ButtonRole::DeleteTask => Self::delete_task(id),
            ButtonRole::EditTask => Self::edit_task(&target, &id),
        }
    }

    fn handle_change(&self, ev: &Event) {
        let Some(target) = dom::event_target(ev) else { return };
        let is_checkbox = target
            .get_attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == "task-checkbox"));
        if !is_checkbox {
            return;
        }
        let Some(task_id) = target.get_attribute(TASK_ID_ATTR) else {
            warn("[Dashboard] checkbox missing data-task-id, toggle dropped");
            return;
        };
        let checked = target
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(HtmlInputElement::checked);
        // Placeholder until the toggle endpoint gets a contract.
        log(&format!(
            "[Dashboard] task {task_id} toggled to {checked}; completion toggle not implemented yet"
        ));
    }

    fn delete_project(project_id: String) {
        spawn_local(async move {
            let outcome = api::delete_project(&project_id).await;
            match response_step(&outcome) {
                ResponseStep::CommitEffect => remove_project(&project_id),
                ResponseStep::SkipAndReenable => {
                    if let Err(err) = &outcome {
                        error(&format!("[Dashboard] deleting project {project_id} failed: {err}"));
                    }
                    reenable_everywhere();
                }
            }
        });
    }

    fn delete_task(task_id: String) {
        spawn_local(async move {
            let outcome = api::delete_task(&task_id).await;
            match response_step(&outcome) {
                ResponseStep::CommitEffect => remove_task(&task_id),
                ResponseStep::SkipAndReenable => {
                    if let Err(err) = &outcome {
                        error(&format!("[Dashboard] deleting task {task_id} failed: {err}"));
                    }
                    reenable_everywhere();
                }
            }
        });
    }

    /// Fetches the edit fragment, swaps it over the project title, then runs
    /// the same recovery pass a server-driven swap would trigger.
    fn edit_project(&self, button: &Element, project_id: String) {
        let title = dom::closest(button, ".header-text-shadow")
            .and_then(|header| header.query_selector(".project-title").ok().flatten());
        let Some(title) = title else {
            warn("[Dashboard] edit button has no project title nearby, action dropped");
            dom::set_pending(button, false);
            return;
        };
        let sort = Rc::clone(&self.sort);
        spawn_local(async move {
            let outcome = api::fetch_project_update_fragment(&project_id).await;
            match (response_step(&outcome), outcome) {
                (ResponseStep::CommitEffect, Ok(fragment)) => {
                    title.set_outer_html(&fragment);
                    recover_with(&sort, true);
                }
                (_, outcome) => {
                    if let Err(err) = outcome {
                        error(&format!("[Dashboard] editing project {project_id} failed: {err}"));
                    }
                    reenable_everywhere();
                }
            }
        });
    }

    /// Placeholder until task inline editing gets a contract.
    fn edit_task(button: &Element, task_id: &str) {
        log(&format!("[Dashboard] task editing not implemented yet (task {task_id})"));
        dom::set_pending(button, false);
    }

    /// Blanket recovery after any replacement: every pending flag is cleared
    /// even when the handler that set it never heard back.
    fn recover(&self, rebind_pass: bool) {
        recover_with(&self.sort, rebind_pass);
    }
}

fn recover_with(sort: &SortController, rebind_pass: bool) {
    let Ok(document) = dom::document() else { return };
    let Some(root) = document.document_element() else { return };
    if rebind_pass {
        rebind::rebind(&root, sort);
    }
    reenable_all(&root);
}

fn reenable_all(root: &Element) {
    if let Ok(buttons) = root.query_selector_all(rebind::ACTION_BUTTON_SELECTORS) {
        for button in dom::elements(&buttons) {
            dom::set_pending(&button, false);
        }
    }
}

fn reenable_everywhere() {
    if let Ok(document) = dom::document() {
        if let Some(root) = document.document_element() {
            reenable_all(&root);
        }
    }
}

/// Removal is keyed by the identifier the response was issued for, so a late
/// response for an already-removed element finds nothing and does nothing.
fn remove_project(project_id: &str) {
    let Ok(document) = dom::document() else { return };
    let selector = format!("[{PROJECT_ID_ATTR}=\"{project_id}\"]{PROJECT_SELECTOR}");
    if let Ok(Some(project)) = document.query_selector(&selector) {
        project.remove();
    }
}

fn remove_task(task_id: &str) {
    let Ok(document) = dom::document() else { return };
    let selector = format!(".row[{TASK_ID_ATTR}=\"{task_id}\"]");
    if let Ok(Some(row)) = document.query_selector(&selector) {
        row.remove();
    }
}

fn listen<E>(
    document: &Document,
    event: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    document.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Page-lifetime listener.
    closure.forget();
    Ok(())
}

fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn classifies_each_button_role() {
        assert_eq!(
            ButtonRole::from_class_attr("btn delete-project-btn"),
            Some(ButtonRole::DeleteProject)
        );
        assert_eq!(
            ButtonRole::from_class_attr("edit-project-btn"),
            Some(ButtonRole::EditProject)
        );
        assert_eq!(
            ButtonRole::from_class_attr("btn btn-sm delete-task-btn"),
            Some(ButtonRole::DeleteTask)
        );
        assert_eq!(ButtonRole::from_class_attr("edit-task-btn"), Some(ButtonRole::EditTask));
    }

    #[test]
    fn unrelated_classes_match_nothing() {
        assert_eq!(ButtonRole::from_class_attr("btn btn-primary"), None);
        assert_eq!(ButtonRole::from_class_attr(""), None);
        // substrings of a role class are not that class
        assert_eq!(ButtonRole::from_class_attr("delete-task-btn-wrapper"), None);
    }

    #[test]
    fn role_picks_the_matching_id_attribute() {
        assert_eq!(ButtonRole::DeleteProject.id_attr(), PROJECT_ID_ATTR);
        assert_eq!(ButtonRole::EditProject.id_attr(), PROJECT_ID_ATTR);
        assert_eq!(ButtonRole::DeleteTask.id_attr(), TASK_ID_ATTR);
        assert_eq!(ButtonRole::EditTask.id_attr(), TASK_ID_ATTR);
    }

    #[test]
    fn pending_button_ignores_activation_without_prompting() {
        let prompted = Cell::new(false);
        let step = activation_step(true, || {
            prompted.set(true);
            true
        });
        assert_eq!(step, PendingStep::AlreadyPending);
        assert!(!prompted.get());
    }

    #[test]
    fn declined_confirmation_never_marks_pending() {
        assert_eq!(activation_step(false, || false), PendingStep::Declined);
    }

    #[test]
    fn confirmed_activation_goes_in_flight() {
        assert_eq!(activation_step(false, || true), PendingStep::InFlight);
    }

    #[test]
    fn failed_delete_skips_removal_and_reenables() {
        // non-200 delete: the row stays put and the button comes back to life
        assert_eq!(
            response_step::<()>(&Err(UiError::Status(500))),
            ResponseStep::SkipAndReenable
        );
    }

    #[test]
    fn every_failure_kind_reenables() {
        let failures = [
            UiError::MissingCsrfToken,
            UiError::MissingAttribute("data-task-id"),
            UiError::Status(404),
            UiError::Network("connection reset".into()),
            UiError::NoDocument,
        ];
        for failure in failures {
            assert_eq!(response_step::<()>(&Err(failure)), ResponseStep::SkipAndReenable);
        }
    }

    #[test]
    fn success_commits_the_local_effect() {
        assert_eq!(response_step(&Ok(())), ResponseStep::CommitEffect);
    }
}
