use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffToken {
    Equal { text: String },
    Removed { text: String },
    Added { text: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffRow {
    pub index: i64,
    pub original_target: String,
    pub revised_target: String,
    pub diff_tokens: Vec<DiffToken>,
}
