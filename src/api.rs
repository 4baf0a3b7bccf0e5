//! Network boundary.
//!
//! Every state-changing call attaches the CSRF token and reports success by
//! status alone. A missing token aborts locally before anything is sent.

use serde::Serialize;

use crate::dom;
use crate::error::UiError;

const CSRF_HEADER: &str = "X-CSRFToken";
const REORDER_ENDPOINT: &str = "/tasks/reorder/";

fn project_delete_endpoint(project_id: &str) -> String {
    format!("/dashboard/{project_id}/delete/")
}

fn project_update_endpoint(project_id: &str) -> String {
    format!("/dashboard/{project_id}/update/")
}

fn task_delete_endpoint(task_id: &str) -> String {
    format!("/tasks/{task_id}/delete/")
}

/// Full ordering of one project's tasks, sent after every completed drop.
/// Positions are the 1-based visual indices; partial orders are never sent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPayload {
    project_id: String,
    order: Vec<OrderEntry>,
}

#[derive(Debug, Serialize)]
pub struct OrderEntry {
    id: String,
    position: usize,
}

impl ReorderPayload {
    pub fn new(project_id: String, ordered_ids: Vec<String>) -> Self {
        let order = ordered_ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| OrderEntry { id, position: index + 1 })
            .collect();
        Self { project_id, order }
    }
}

fn csrf() -> Result<String, UiError> {
    dom::csrf_token(&dom::document()?)
}

fn check(resp: &gloo_net::http::Response) -> Result<(), UiError> {
    if resp.ok() {
        Ok(())
    } else {
        Err(UiError::Status(resp.status()))
    }
}

pub async fn delete_project(project_id: &str) -> Result<(), UiError> {
    let token = csrf()?;
    let resp = gloo_net::http::Request::post(&project_delete_endpoint(project_id))
        .header(CSRF_HEADER, &token)
        .send()
        .await?;
    check(&resp)
}

pub async fn delete_task(task_id: &str) -> Result<(), UiError> {
    let token = csrf()?;
    let resp = gloo_net::http::Request::delete(&task_delete_endpoint(task_id))
        .header(CSRF_HEADER, &token)
        .send()
        .await?;
    check(&resp)
}

/// Fetches the server-rendered replacement fragment for a project title.
/// The caller swaps it in and must run the rebind pass afterwards.
pub async fn fetch_project_update_fragment(project_id: &str) -> Result<String, UiError> {
    let token = csrf()?;
    let resp = gloo_net::http::Request::get(&project_update_endpoint(project_id))
        .header(CSRF_HEADER, &token)
        .send()
        .await?;
    check(&resp)?;
    Ok(resp.text().await?)
}

/// Order persistence. Fire-and-forget from the UI's perspective: the caller
/// only learns success or failure, the response body is not consumed.
pub async fn persist_order(payload: &ReorderPayload) -> Result<(), UiError> {
    let token = csrf()?;
    let resp = gloo_net::http::Request::post(REORDER_ENDPOINT)
        .header(CSRF_HEADER, &token)
        .json(payload)?
        .send()
        .await?;
    check(&resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_format_expected_paths() {
        assert_eq!(project_delete_endpoint("3"), "/dashboard/3/delete/");
        assert_eq!(project_update_endpoint("3"), "/dashboard/3/update/");
        assert_eq!(task_delete_endpoint("17"), "/tasks/17/delete/");
    }

    #[test]
    fn payload_serializes_to_the_wire_shape() {
        let payload = ReorderPayload::new(
            "7".into(),
            vec!["C".into(), "A".into(), "B".into()],
        );
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"projectId":"7","order":[{"id":"C","position":1},{"id":"A","position":2},{"id":"B","position":3}]}"#
        );
    }

    #[test]
    fn payload_covers_every_row_with_contiguous_positions() {
        let ids: Vec<String> = (0..5).map(|i| format!("t{i}")).collect();
        let payload = ReorderPayload::new("1".into(), ids.clone());
        assert_eq!(payload.order.len(), ids.len());
        for (index, entry) in payload.order.iter().enumerate() {
            assert_eq!(entry.id, ids[index]);
            assert_eq!(entry.position, index + 1);
        }
    }

    #[test]
    fn empty_list_yields_an_empty_order() {
        let payload = ReorderPayload::new("1".into(), Vec::new());
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"projectId":"1","order":[]}"#
        );
    }
}
