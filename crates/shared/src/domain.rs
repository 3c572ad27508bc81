use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rows per page. The list screen never lets the user change it.
pub const PAGE_SIZE: u32 = 10;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(RecordId);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn display_value(&self, key: &str) -> String {
        match self.attributes.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascend,
    Descend,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascend => "ascend",
            SortOrder::Descend => "descend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// 1-based, taken as given from the pagination control.
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<SortSpec>,
    pub filters: BTreeMap<String, String>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
            sort: None,
            filters: BTreeMap::new(),
        }
    }
}

impl QueryState {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub total: u64,
}

impl PageResult {
    pub fn page_count(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(page_size))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub data_index: String,
    pub title: String,
    pub sortable: bool,
    pub searchable: bool,
}

impl ColumnSpec {
    pub fn new(data_index: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            data_index: data_index.into(),
            title: title.into(),
            sortable: true,
            searchable: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub title: String,
    pub endpoint: String,
    pub columns: Vec<ColumnSpec>,
}

impl ResourceDescriptor {
    pub fn education() -> Self {
        Self {
            title: "Education History".to_string(),
            endpoint: "/api/admin/education".to_string(),
            columns: vec![
                ColumnSpec::new("institution", "Institution"),
                ColumnSpec::new("period", "Period"),
                ColumnSpec::new("degree", "Degree"),
                ColumnSpec::new("cgpa", "CGPA"),
                ColumnSpec::new("department", "Department"),
                ColumnSpec::new("thesis", "Thesis"),
            ],
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn column(&self, data_index: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|column| column.data_index == data_index)
    }

    pub fn editor_title(&self, editing: bool) -> String {
        if editing {
            format!("Edit {}", self.title)
        } else {
            format!("Add {}", self.title)
        }
    }
}
