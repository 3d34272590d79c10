//! Building inputs → compute request trees.
//!
//! Parameter names and branch paths are fixed by the Grasshopper definition:
//!
//! | parameter               | path    | value                                  |
//! |-------------------------|---------|----------------------------------------|
//! | `GeoJson_Input`         | `{0}`   | footprint FeatureCollection, quoted    |
//! | `Building_Name`         | `{0;0}` | building name, quoted                  |
//! | `_floor_to_floor_hight` | `{0;0}` | floor height as a decimal string       |
//! | `Floors_Numbers`        | `{0}`   | floor count as a decimal string        |

use serde_json::{Value, json};
use urbis_core::properties::EffectiveProperties;

use crate::model::{ComputeRequest, DataItem, DataTree};

pub const GEOJSON_INPUT: &str = "GeoJson_Input";
pub const BUILDING_NAME: &str = "Building_Name";
pub const FLOOR_HEIGHT: &str = "_floor_to_floor_hight";
pub const FLOOR_COUNT: &str = "Floors_Numbers";

/// Assemble the input trees for one building.
#[must_use]
pub fn assemble_request(
    footprint: &Value,
    name: &str,
    effective: &EffectiveProperties,
) -> ComputeRequest {
    let geojson = feature_collection(footprint);
    ComputeRequest::with_inputs(vec![
        DataTree::new(GEOJSON_INPUT).append(
            &[0],
            vec![DataItem::string(quoted(&geojson.to_string()))],
        ),
        DataTree::new(BUILDING_NAME).append(&[0, 0], vec![DataItem::string(quoted(name))]),
        DataTree::new(FLOOR_HEIGHT).append(
            &[0, 0],
            vec![DataItem::string(format_decimal(effective.floor_height()))],
        ),
        DataTree::new(FLOOR_COUNT).append(
            &[0],
            vec![DataItem::string(format_decimal(effective.num_floors()))],
        ),
    ])
}

/// Wrap a bare Polygon into a one-feature FeatureCollection; anything else
/// is sent as is.
#[must_use]
pub fn feature_collection(footprint: &Value) -> Value {
    if footprint.get("type").and_then(Value::as_str) == Some("Polygon") {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": footprint,
            }]
        })
    } else {
        footprint.clone()
    }
}

/// Decimal text that always carries a fractional part (`11` → `11.0`).
#[must_use]
pub fn format_decimal(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') && !text.contains('e') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Wrap a value in double quotes without escaping its contents. Compute
/// strips the outer pair and takes the rest verbatim, which is also how the
/// GeoJSON text with its own inner quotes gets through.
fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}
