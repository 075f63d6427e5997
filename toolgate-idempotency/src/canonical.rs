//! Byte-stable JSON encoding used as hash input.
//!
//! Object keys are sorted by code point, no insignificant whitespace is
//! emitted, and non-ASCII text is written as UTF-8 rather than `\u` escapes.
//! Sorting is done here rather than relying on `serde_json::Map` ordering,
//! which changes when the `preserve_order` feature is enabled anywhere in the
//! dependency graph.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Encode any serializable value as canonical JSON.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_value(item, out)?;
            }
            out.push('}');
        }
        // Scalars already have a single compact encoding.
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
