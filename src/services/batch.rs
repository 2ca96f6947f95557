use std::ops::Range;

use serde_json::Value;

use crate::model::snapshot::{DEFAULT_BATCH_INDEX, DEFAULT_BATCH_SIZE};

pub const NO_ROWS_LABEL: &str = "No rows loaded yet.";
pub const EMPTY_BATCH_LABEL: &str = "This batch is empty.";

pub fn max_batch_index(total_rows: usize, batch_size: usize) -> usize {
    total_rows.div_ceil(batch_size.max(1)).max(1)
}

/// Row range covered by a 1-based batch, clipped to the loaded rows.
pub fn slice_bounds(total_rows: usize, batch_size: usize, batch_index: usize) -> Range<usize> {
    let start = batch_index
        .saturating_sub(1)
        .saturating_mul(batch_size)
        .min(total_rows);
    let end = start.saturating_add(batch_size).min(total_rows);
    start..end
}

pub fn range_label(total_rows: usize, batch_size: usize, batch_index: usize, slice_len: usize) -> String {
    if total_rows == 0 {
        return NO_ROWS_LABEL.to_string();
    }
    if slice_len == 0 {
        return EMPTY_BATCH_LABEL.to_string();
    }

    let first = batch_index.saturating_sub(1) * batch_size + 1;
    let last = first + slice_len - 1;
    format!("Showing rows {first}–{last} of {total_rows}")
}

/// Reads a form-style numeric input. Text is trimmed and parsed, blank text
/// counts as zero, anything unreadable is NaN.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        _ => f64::NAN,
    }
}

/// Zero, NaN and infinities fall back to the default size; other values are
/// truncated and floored at 1.
pub fn batch_size_from_input(value: f64) -> usize {
    if !value.is_finite() || value == 0.0 {
        return DEFAULT_BATCH_SIZE;
    }
    value.trunc().max(1.0) as usize
}

pub fn batch_index_from_input(value: f64, max_index: usize) -> usize {
    if value.is_nan() || value == 0.0 {
        return DEFAULT_BATCH_INDEX.min(max_index.max(1));
    }
    // `as usize` saturates, so huge inputs land on max_index
    let n = value.trunc().max(1.0) as usize;
    n.min(max_index.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn max_index_matches_ceiling_division() {
        for total in 0..40usize {
            for size in 0..12usize {
                let expected = std::cmp::max(
                    1,
                    ((total as f64) / (size.max(1) as f64)).ceil() as usize,
                );
                assert_eq!(max_batch_index(total, size), expected, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn slice_bounds_clip_to_rows() {
        assert_eq!(slice_bounds(25, 10, 1), 0..10);
        assert_eq!(slice_bounds(25, 10, 3), 20..25);
        assert_eq!(slice_bounds(25, 10, 4), 25..25);
        assert_eq!(slice_bounds(0, 10, 1), 0..0);
        assert_eq!(slice_bounds(5, 10, usize::MAX), 5..5);
    }

    #[test]
    fn labels() {
        assert_eq!(range_label(0, 10, 1, 0), "No rows loaded yet.");
        assert_eq!(range_label(5, 10, 2, 0), "This batch is empty.");
        assert_eq!(range_label(25, 10, 3, 5), "Showing rows 21–25 of 25");
        assert_eq!(range_label(2, 10, 1, 2), "Showing rows 1–2 of 2");
    }

    #[test]
    fn coerces_form_values() {
        assert_eq!(coerce_number(&json!(4)), 4.0);
        assert_eq!(coerce_number(&json!(" 7 ")), 7.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&Value::Null), 0.0);
        assert!(coerce_number(&json!("abc")).is_nan());
        assert!(coerce_number(&json!([1])).is_nan());
    }

    #[test]
    fn batch_size_input_rules() {
        assert_eq!(batch_size_from_input(25.0), 25);
        assert_eq!(batch_size_from_input(0.0), DEFAULT_BATCH_SIZE);
        assert_eq!(batch_size_from_input(f64::NAN), DEFAULT_BATCH_SIZE);
        assert_eq!(batch_size_from_input(f64::INFINITY), DEFAULT_BATCH_SIZE);
        assert_eq!(batch_size_from_input(-3.0), 1);
        assert_eq!(batch_size_from_input(0.4), 1);
        assert_eq!(batch_size_from_input(3.9), 3);
    }

    #[test]
    fn batch_index_input_always_in_range() {
        let inputs = [
            -5.0,
            0.0,
            0.5,
            1.0,
            2.0,
            3.7,
            1e12,
            f64::NAN,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ];
        for max in [1usize, 3, 10] {
            for v in inputs {
                let n = batch_index_from_input(v, max);
                assert!((1..=max).contains(&n), "value={v} max={max} got={n}");
            }
        }
        assert_eq!(batch_index_from_input(1e12, 3), 3);
        assert_eq!(batch_index_from_input(2.0, 3), 2);
        assert_eq!(batch_index_from_input(-1.0, 3), 1);
    }
}
