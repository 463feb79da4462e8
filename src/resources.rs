//! Workflow, execution and webhook operations.
//!
//! Thin wrappers over [`N8nClient::execute`]; workflow and execution bodies
//! are passed through as opaque JSON.

use reqwest::Method;
use serde_json::Value as JsonValue;

use crate::{
    ErrorKind, ExecutionListParams, N8nClient, N8nError, Page, Request, Result, Scope,
    WorkflowListParams,
};

const HINT_ACTIVATION: &str =
    "a workflow can only be activated when it contains at least one trigger node";
const HINT_WEBHOOK: &str =
    "check that the workflow is active and the webhook path and method are correct";

impl N8nClient {
    /// Lists workflows, one page at a time.
    pub async fn list_workflows(&self, params: &WorkflowListParams) -> Result<Page> {
        let request = Request::get("/workflows")
            .query_opt("active", params.active)
            .query_opt("tags", params.tags.as_deref())
            .query_opt("name", params.name.as_deref())
            .query_opt("limit", params.limit)
            .query_opt("cursor", params.cursor.as_deref());
        self.execute(request).await
    }

    /// Fetches one workflow by id.
    pub async fn get_workflow(&self, id: &str) -> Result<JsonValue> {
        self.execute(Request::get(format!("/workflows/{}", segment(id)?))).await
    }

    /// Creates a workflow from its JSON definition.
    pub async fn create_workflow(&self, workflow: JsonValue) -> Result<JsonValue> {
        self.execute(Request::post("/workflows").body(workflow)).await
    }

    /// Replaces the definition of an existing workflow.
    pub async fn update_workflow(&self, id: &str, workflow: JsonValue) -> Result<JsonValue> {
        let request = Request::put(format!("/workflows/{}", segment(id)?)).body(workflow);
        self.execute(request).await
    }

    /// Deletes a workflow. Returns `Null` when the server answers with no body.
    pub async fn delete_workflow(&self, id: &str) -> Result<JsonValue> {
        self.execute(Request::delete(format!("/workflows/{}", segment(id)?))).await
    }

    /// Activates a workflow.
    ///
    /// A rejection that is not one of the dedicated kinds (typically a 400 for
    /// a workflow without trigger nodes) is reported as `ActivationFailed`.
    pub async fn activate_workflow(&self, id: &str) -> Result<JsonValue> {
        self.execute(Request::post(format!("/workflows/{}/activate", segment(id)?)))
            .await
            .map_err(|err| match err.kind {
                ErrorKind::ApiError => err.rekind(ErrorKind::ActivationFailed, HINT_ACTIVATION),
                _ => err,
            })
    }

    /// Deactivates a workflow so its triggers stop firing.
    pub async fn deactivate_workflow(&self, id: &str) -> Result<JsonValue> {
        let request = Request::post(format!("/workflows/{}/deactivate", segment(id)?));
        self.execute(request).await
    }

    /// Lists executions, one page at a time.
    pub async fn list_executions(&self, params: &ExecutionListParams) -> Result<Page> {
        let request = Request::get("/executions")
            .query_opt("workflowId", params.workflow_id.as_deref())
            .query_opt("status", params.status.map(|status| status.as_str()))
            .query_opt("includeData", params.include_data)
            .query_opt("limit", params.limit)
            .query_opt("cursor", params.cursor.as_deref());
        self.execute(request).await
    }

    /// Fetches one execution, optionally with its node data.
    pub async fn get_execution(&self, id: &str, include_data: bool) -> Result<JsonValue> {
        let request = Request::get(format!("/executions/{}", segment(id)?))
            .query("includeData", include_data);
        self.execute(request).await
    }

    /// Deletes an execution record.
    pub async fn delete_execution(&self, id: &str) -> Result<JsonValue> {
        self.execute(Request::delete(format!("/executions/{}", segment(id)?))).await
    }

    /// Calls a production webhook at `{base}/webhook/{path}`.
    ///
    /// Missing or rejected webhooks surface as `WebhookError`; connection
    /// and timeout failures keep their own kinds.
    pub async fn trigger_webhook(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> Result<JsonValue> {
        let mut request = Request::new(method, webhook_path(path)?).scope(Scope::Webhook);
        request.body = body;
        self.execute(request).await.map_err(|err| match err.kind {
            ErrorKind::NotFound | ErrorKind::ApiError => {
                err.rekind(ErrorKind::WebhookError, HINT_WEBHOOK)
            }
            _ => err,
        })
    }
}

/// Validates an identifier used as a single path segment.
///
/// Dot segments and characters the URL parser would reinterpret are
/// rejected, so an id can never address a different resource.
fn segment(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || is_dot_segment(id) || id.contains(RESERVED) {
        return Err(N8nError::new(
            ErrorKind::ValidationError,
            format!("invalid resource id '{id}'"),
        )
        .with_hint("ids must not be '.' or '..' nor contain / \\ ? # %"));
    }
    Ok(id)
}

/// Validates a webhook path; it may span several segments.
fn webhook_path(path: &str) -> Result<&str> {
    let path = path.trim().trim_matches('/');
    let invalid = path.is_empty()
        || path.contains(['\\', '?', '#', '%'])
        || path.split('/').any(|part| part.is_empty() || is_dot_segment(part));
    if invalid {
        return Err(N8nError::new(
            ErrorKind::WebhookError,
            format!("invalid webhook path '{path}'"),
        )
        .with_hint("use the path configured on the workflow's Webhook node"));
    }
    Ok(path)
}

const RESERVED: [char; 5] = ['/', '\\', '?', '#', '%'];

fn is_dot_segment(part: &str) -> bool {
    part == "." || part == ".."
}
