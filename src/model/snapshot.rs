use serde::{Deserialize, Deserializer, Serialize};

use crate::model::diff::DiffRow;
use crate::model::null_as_default;
use crate::model::row::TranslationRow;
use crate::services::batch;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_INDEX: usize = 1;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_index() -> usize {
    DEFAULT_BATCH_INDEX
}

// Snapshots may hold fractional or negative sizes straight from the form input.
fn lenient_batch_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .map_or(DEFAULT_BATCH_SIZE, batch::batch_size_from_input))
}

// Upper bound is applied once the rows are known.
fn lenient_batch_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .map_or(DEFAULT_BATCH_INDEX, |v| batch::batch_index_from_input(v, usize::MAX)))
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Everything the workspace keeps between sessions. Older snapshots may lack
/// any of these fields, so all of them default.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<TranslationRow>,

    #[serde(default = "default_batch_size", deserialize_with = "lenient_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_batch_index", deserialize_with = "lenient_batch_index")]
    pub batch_index: usize,

    #[serde(default, deserialize_with = "null_as_default")]
    pub payload_json: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub response_json: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub response_error: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub diff_rows: Vec<DiffRow>,

    // None means "follow the OS color scheme" on restore.
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl Default for WorkspaceSnapshot {
    fn default() -> Self {
        WorkspaceSnapshot {
            rows: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_index: DEFAULT_BATCH_INDEX,
            payload_json: String::new(),
            response_json: String::new(),
            response_error: String::new(),
            diff_rows: Vec::new(),
            theme: None,
        }
    }
}
