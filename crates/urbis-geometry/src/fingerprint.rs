//! Geometry cache key.
//!
//! ```text
//! SHA-256(canonical_json({geometry, num_floors, floor_height, setback, lod})) → lowercase hex
//! ```
//!
//! Numeric inputs go through the typed accessors and are serialized as floats,
//! so `11` and `11.0` produce the same key. Canonical JSON sorts object keys at
//! every depth and has no insignificant whitespace, so key order in the
//! footprint never matters.

use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use urbis_core::enums::LevelOfDetail;
use urbis_core::properties::EffectiveProperties;

/// The input document the fingerprint is computed over.
#[must_use]
pub fn fingerprint_inputs(
    footprint: Option<&Value>,
    effective: &EffectiveProperties,
    lod: LevelOfDetail,
) -> Value {
    json!({
        "geometry": footprint.cloned().unwrap_or(Value::Null),
        "num_floors": effective.num_floors(),
        "floor_height": effective.floor_height(),
        "setback": effective.setback(),
        "lod": lod.as_str(),
    })
}

/// Cache key over a building's geometry-affecting inputs (64 hex chars).
#[must_use]
pub fn fingerprint(
    footprint: Option<&Value>,
    effective: &EffectiveProperties,
    lod: LevelOfDetail,
) -> String {
    let canonical = canonical_json(&fingerprint_inputs(footprint, effective, lod));
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Serialize with object keys sorted at every depth and no whitespace.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
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
        scalar => out.push_str(&scalar.to_string()),
    }
}
