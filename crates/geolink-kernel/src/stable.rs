//! Stable reporting: rounding, canonical serialization, content hashing.
//!
//! Two semantically-equal reports must serialize byte-identically; that is
//! what snapshot regression tests and CI drift detection key on. The
//! canonical form: object keys sorted lexicographically, no insignificant
//! whitespace, floats rounded to a fixed precision before serialization.

use crate::normalize::Adjacency;
use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

/// Default rounding precision in decimal digits.
pub const DEFAULT_PRECISION: u32 = 6;

/// Recursively stabilize a JSON-shaped value at the default precision.
pub fn stabilize(value: &Value) -> Value {
    stabilize_with_precision(value, DEFAULT_PRECISION)
}

/// Recursively stabilize a JSON-shaped value.
///
/// Finite floats are rounded to `digits` decimal digits; integers are left
/// untouched. Map keys are re-emitted in sorted order, sequence order is
/// preserved. Non-finite numbers pass through unchanged: they indicate an
/// upstream defect that stabilization must not mask. Idempotent.
pub fn stabilize_with_precision(value: &Value, digits: u32) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.is_finite() => {
                let scale = 10f64.powi(digits as i32);
                let rounded = (f * scale).round() / scale;
                Number::from_f64(rounded)
                    .map(Value::Number)
                    .unwrap_or_else(|| value.clone())
            }
            _ => value.clone(),
        },
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| stabilize_with_precision(item, digits))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, item) in map {
                out.insert(key.clone(), stabilize_with_precision(item, digits));
            }
            Value::Object(out)
        }
        _ => value.clone(),
    }
}

/// Canonical compact serialization: sorted keys, no whitespace, standard
/// JSON string escaping.
pub fn stable_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                out.push_str(&i.to_string());
            } else if let Some(u) = n.as_u64() {
                out.push_str(&u.to_string());
            } else if let Some(f) = n.as_f64() {
                out.push_str(&format!("{f}"));
            } else {
                out.push_str(&n.to_string());
            }
        }
        Value::String(_) => {
            // Standard JSON escaping.
            out.push_str(&serde_json::to_string(value).unwrap_or_default());
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(
                    &serde_json::to_string(&Value::String((*key).clone())).unwrap_or_default(),
                );
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

/// Content hash of a normalized adjacency.
///
/// The canonical form sorts node keys and neighbor lists, so the digest is
/// a pure function of graph content: permuting key or neighbor order never
/// changes it; adding or removing any edge does. SHA-256, lowercase hex.
pub fn stable_hash(adj: &Adjacency) -> String {
    let mut canonical = Map::new();
    for (node, neighbors) in adj {
        let mut sorted = neighbors.clone();
        sorted.sort();
        canonical.insert(
            node.clone(),
            Value::Array(sorted.into_iter().map(Value::String).collect()),
        );
    }
    let serialized = stable_json(&Value::Object(canonical));
    format!("{:x}", Sha256::digest(serialized.as_bytes()))
}
