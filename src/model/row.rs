use serde::{Deserialize, Serialize};

use crate::model::null_as_default;

/// One line of the loaded table. The `index` column identifies the row when
/// a revised response comes back.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub index: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeta {
    pub batch_size: usize,
    pub batch_index: usize,
    pub total_rows: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PayloadRow {
    pub index: i64,
    pub source: String,
    pub target: String,
}

impl From<&TranslationRow> for PayloadRow {
    fn from(row: &TranslationRow) -> Self {
        PayloadRow {
            index: row.index,
            source: row.source.clone(),
            target: row.target.clone(),
        }
    }
}

/// Request exported for the revision service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Payload {
    pub meta: BatchMeta,
    pub rows: Vec<PayloadRow>,
}
