use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One page of a cursor-paginated listing.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Page<T = JsonValue> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

/// Filters for listing workflows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkflowListParams {
    pub active: Option<bool>,
    /// Comma-separated tag names.
    pub tags: Option<String>,
    pub name: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
    Waiting,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Waiting => "waiting",
        }
    }
}

/// Filters for listing executions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionListParams {
    pub workflow_id: Option<String>,
    pub status: Option<ExecutionStatus>,
    /// Include node input/output data in each execution.
    pub include_data: Option<bool>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Page;

    #[test]
    fn page_reads_next_cursor() {
        let page: Page = serde_json::from_value(json!({
            "data": [{ "id": "1" }],
            "nextCursor": "abc"
        }))
        .expect("must decode");
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn page_tolerates_missing_fields() {
        let page: Page = serde_json::from_value(json!({})).expect("must decode");
        assert!(page.data.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
