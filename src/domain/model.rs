use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// 單筆原始輸入：欄位名稱對應未型別化的值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn new(data: HashMap<String, Value>) -> Self {
        Self { data }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

pub const REQUIRED_MESSAGE: &str = "is required";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, REQUIRED_MESSAGE)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Output of one transform pass. `values` always has one slot per declared
/// field, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformResult {
    pub values: Vec<Value>,
    pub errors: Vec<FieldError>,
}

impl TransformResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub row: usize,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub started_at: DateTime<FixedOffset>,
    pub finished_at: Option<DateTime<FixedOffset>>,
    pub transformed_records: usize,
    pub invalid_records: Vec<ReportEntry>,
}

impl RunStats {
    pub fn new(started_at: DateTime<FixedOffset>) -> Self {
        Self {
            started_at,
            finished_at: None,
            transformed_records: 0,
            invalid_records: Vec::new(),
        }
    }

    pub fn total_records(&self) -> usize {
        self.transformed_records + self.invalid_records.len()
    }
}

/// Batch 轉換後交給 load 階段的資料
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub invalid_records: usize,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub output_path: String,
    pub report_path: String,
    pub valid_records: usize,
    pub invalid_records: usize,
}
