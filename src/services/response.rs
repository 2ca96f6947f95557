use std::collections::HashMap;

use serde_json::{Number, Value};

use crate::error::ResponseError;
use crate::model::diff::DiffRow;
use crate::model::row::TranslationRow;
use crate::services::diff;

const SKIPPED_PREFIX: &str = "Some rows were skipped because required fields were missing: ";

#[derive(Debug, Default, PartialEq)]
pub struct ParsedResponse {
    pub diff_rows: Vec<DiffRow>,
    pub skipped: Vec<String>,
}

impl ParsedResponse {
    /// One line summarizing every skipped entry, or `None` when nothing was
    /// dropped.
    pub fn warning(&self) -> Option<String> {
        if self.skipped.is_empty() {
            None
        } else {
            Some(format!("{SKIPPED_PREFIX}{}", self.skipped.join(", ")))
        }
    }
}

/// Validates a pasted `{ "rows": [{ "index", "target_revised" }] }` response
/// against the loaded rows and diffs every entry that matches one.
///
/// When indices repeat among `rows`, the last loaded row with that index is
/// the one matched.
pub fn parse(text: &str, rows: &[TranslationRow]) -> Result<ParsedResponse, ResponseError> {
    let parsed: Value =
        serde_json::from_str(text).map_err(|e| ResponseError::Syntax(e.to_string()))?;

    let entries = parsed
        .get("rows")
        .and_then(|v| v.as_array())
        .ok_or(ResponseError::MissingRows)?;

    let by_index: HashMap<i64, &TranslationRow> = rows.iter().map(|r| (r.index, r)).collect();

    let mut out = ParsedResponse::default();

    for entry in entries {
        let Some(Value::Number(index)) = entry.get("index") else {
            out.skipped.push("invalid index value".to_string());
            continue;
        };

        let Some(revised) = entry.get("target_revised").and_then(|v| v.as_str()) else {
            out.skipped
                .push(format!("missing target_revised for index {}", index_label(index)));
            continue;
        };

        let Some(original) = exact_index(index).and_then(|i| by_index.get(&i)) else {
            out.skipped
                .push(format!("index {} not found in CSV", index_label(index)));
            continue;
        };

        out.diff_rows.push(DiffRow {
            index: original.index,
            original_target: original.target.clone(),
            revised_target: revised.to_string(),
            diff_tokens: diff::word_diff(Some(original.target.as_str()), Some(revised)),
        });
    }

    if out.diff_rows.is_empty() {
        return Err(ResponseError::NoMatches);
    }

    if !out.skipped.is_empty() {
        tracing::warn!(skipped = out.skipped.len(), "response rows skipped");
    }

    Ok(out)
}

// Integral numbers only; 1.0 matches row 1, 1.5 matches nothing.
fn exact_index(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn index_label(n: &Number) -> String {
    match exact_index(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}
