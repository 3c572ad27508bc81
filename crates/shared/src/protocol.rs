use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{ColumnSpec, PageResult, QueryState, Record, RecordId},
    error::ApiError,
};

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl ApiEnvelope {
    pub fn ok(message: impl Into<String>, payload: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: Value::Null,
            error: None,
        }
    }
}

/// Payload of the list endpoint. Table-oriented backends name the rows
/// `data`, ours call them `records`; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPayload {
    #[serde(alias = "data")]
    pub records: Vec<Record>,
    pub total: u64,
}

impl From<ListPayload> for PageResult {
    fn from(value: ListPayload) -> Self {
        Self {
            records: value.records,
            total: value.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub state: QueryState,
    pub columns: Vec<String>,
}

impl ListQuery {
    pub fn new(state: QueryState, columns: &[ColumnSpec]) -> Self {
        Self {
            state,
            columns: columns
                .iter()
                .map(|column| column.data_index.clone())
                .collect(),
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.state.page.to_string()),
            ("pageSize".to_string(), self.state.page_size.to_string()),
        ];

        if let Some(sort) = &self.state.sort {
            pairs.push(("sorter[field]".to_string(), sort.field.clone()));
            pairs.push(("sorter[order]".to_string(), sort.order.as_str().to_string()));
        }

        for (column, text) in &self.state.filters {
            if text.trim().is_empty() {
                continue;
            }
            pairs.push((format!("params[{column}]"), text.clone()));
        }

        for column in &self.columns {
            pairs.push(("columns[]".to_string(), column.clone()));
        }

        pairs
    }
}

pub fn delete_query_pairs(ids: &[RecordId]) -> Vec<(String, String)> {
    ids.iter()
        .map(|id| ("ids[]".to_string(), id.0.to_string()))
        .collect()
}
