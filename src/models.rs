use crate::store::Workbook;
use crate::visitor::VisitorState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field key to value, keyed by the schema's field keys.
pub type FieldValues = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: FieldValues,
}

impl Record {
    /// Value of `key`, blank when the record predates the field.
    pub fn value(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Everything persisted in the data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(rename = "job-application-storage", default)]
    pub workbook: Workbook,
    #[serde(rename = "visitor-counter", default)]
    pub visitors: VisitorState,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    #[serde(default)]
    pub fields: FieldValues,
    pub expected_revision: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RevisionQuery {
    pub expected_revision: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub category: String,
    pub revision: u64,
    pub records: Vec<Record>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CopyResponse {
    pub section: String,
    pub text: String,
    pub message: String,
    pub preview: String,
    pub backend: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FingerprintSignals {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub timezone_offset: i32,
    #[serde(default)]
    pub canvas: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisitResponse {
    pub total: u64,
    pub is_new: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisitorsResponse {
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub revision: u64,
    pub records: usize,
    pub load_notice: Option<String>,
}
