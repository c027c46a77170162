//! Field ordering shared by the store implementations.
//!
//! Values of the same JSON type compare naturally (numbers numerically,
//! strings lexicographically, which orders ISO dates and RFC 3339 timestamps
//! chronologically). Documents missing the field sort last in either
//! direction. Ties fall back to the document id so listings are stable.

use serde_json::Value;
use std::cmp::Ordering;

use super::traits::{SortDirection, StoredDocument};

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Compare two present field values
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Sort documents in place by `order_by`
pub fn sort_documents(documents: &mut [StoredDocument], order_by: &str, direction: SortDirection) {
    documents.sort_by(|a, b| {
        let by_field = match (a.fields.get(order_by), b.fields.get(order_by)) {
            (Some(x), Some(y)) => match direction {
                SortDirection::Ascending => compare_values(x, y),
                SortDirection::Descending => compare_values(y, x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_field.then_with(|| a.id.cmp(&b.id))
    });
}
