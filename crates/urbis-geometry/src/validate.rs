//! Structural GeoJSON validation.
//!
//! Errors are accumulated, never short-circuited across siblings, and each is
//! prefixed with its location, e.g.
//! `Feature 0 ring 0 position 2: Longitude 200 out of range [-180, 180]`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const GEOJSON_TYPES: [&str; 9] = [
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
    "GeometryCollection",
    "Feature",
    "FeatureCollection",
];

const FOOTPRINT_TYPES: [&str; 2] = ["Polygon", "MultiPolygon"];

/// Outcome of a validation run. `ok` is true exactly when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }
}

/// Validate any GeoJSON object.
#[must_use]
pub fn validate(value: &Value) -> ValidationReport {
    let mut errors = Vec::new();
    check_root(value, &mut errors);
    ValidationReport::from_errors(errors)
}

/// Validate a building footprint: a valid GeoJSON object whose every leaf
/// geometry is a Polygon or MultiPolygon.
#[must_use]
pub fn validate_for_building_footprint(value: &Value) -> ValidationReport {
    let report = validate(value);
    if !report.ok {
        return report;
    }

    let mut errors = Vec::new();
    match type_of(value) {
        Some("FeatureCollection") => {
            let features = value.get("features").and_then(Value::as_array);
            for (i, feature) in features.into_iter().flatten().enumerate() {
                if let Some(geometry) = feature.get("geometry") {
                    check_footprint_geometry(geometry, &format!("Feature {i}"), &mut errors);
                }
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get("geometry") {
                check_footprint_geometry(geometry, "Feature", &mut errors);
            }
        }
        _ => check_footprint_geometry(value, "Geometry", &mut errors),
    }
    ValidationReport::from_errors(errors)
}

fn check_footprint_geometry(geometry: &Value, prefix: &str, errors: &mut Vec<String>) {
    match type_of(geometry) {
        Some("GeometryCollection") => {
            let members = geometry.get("geometries").and_then(Value::as_array);
            for (i, member) in members.into_iter().flatten().enumerate() {
                check_footprint_geometry(member, &format!("{prefix} geometry {i}"), errors);
            }
        }
        Some(t) if FOOTPRINT_TYPES.contains(&t) => {}
        other => errors.push(format!(
            "{prefix}: Expected Polygon or MultiPolygon for building footprint, got {}",
            other.unwrap_or("nothing")
        )),
    }
}

fn type_of(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

/// A `type` value for messages: bare text for strings, JSON otherwise.
fn type_label(kind: &Value) -> String {
    kind.as_str().map_or_else(|| kind.to_string(), str::to_string)
}

fn check_root(value: &Value, errors: &mut Vec<String>) {
    let Some(object) = value.as_object() else {
        errors.push("GeoJSON must be an object".into());
        return;
    };
    let Some(kind) = object.get("type") else {
        errors.push("Missing 'type' field".into());
        return;
    };
    let kind = kind.as_str().unwrap_or_default();
    if !GEOJSON_TYPES.contains(&kind) {
        errors.push(format!("Invalid GeoJSON type: {}", type_label(&object["type"])));
        return;
    }

    match kind {
        "FeatureCollection" => check_feature_collection(object, errors),
        "Feature" => check_feature(object, "Feature", errors),
        _ => check_geometry(value, "Geometry", errors),
    }
}

fn check_feature_collection(fc: &Map<String, Value>, errors: &mut Vec<String>) {
    let Some(features) = fc.get("features") else {
        errors.push("FeatureCollection missing 'features' array".into());
        return;
    };
    let Some(features) = features.as_array() else {
        errors.push("'features' must be an array".into());
        return;
    };
    if features.is_empty() {
        errors.push("FeatureCollection has no features".into());
    }

    for (i, feature) in features.iter().enumerate() {
        let Some(object) = feature.as_object() else {
            errors.push(format!("Feature at index {i} is not an object"));
            continue;
        };
        if object.get("type").and_then(Value::as_str) == Some("Feature") {
            check_feature(object, &format!("Feature {i}"), errors);
        } else {
            errors.push(format!("Feature at index {i} has invalid type"));
        }
    }
}

fn check_feature(feature: &Map<String, Value>, prefix: &str, errors: &mut Vec<String>) {
    match feature.get("geometry") {
        None => errors.push(format!("{prefix}: Missing 'geometry' field")),
        Some(Value::Null) => errors.push(format!("{prefix}: Geometry is null")),
        Some(geometry) => check_geometry(geometry, prefix, errors),
    }
}

fn check_geometry(geometry: &Value, prefix: &str, errors: &mut Vec<String>) {
    let Some(object) = geometry.as_object() else {
        errors.push(format!("{prefix}: Geometry must be an object"));
        return;
    };
    let Some(kind) = object.get("type") else {
        errors.push(format!("{prefix}: Missing 'type' field"));
        return;
    };

    if kind.as_str() == Some("GeometryCollection") {
        match object.get("geometries") {
            None => errors.push(format!("{prefix}: Missing 'geometries' field")),
            Some(Value::Array(members)) => {
                for (i, member) in members.iter().enumerate() {
                    check_geometry(member, &format!("{prefix} geometry {i}"), errors);
                }
            }
            Some(_) => errors.push(format!("{prefix}: 'geometries' must be an array")),
        }
        return;
    }

    let Some(coords) = object.get("coordinates") else {
        errors.push(format!("{prefix}: Missing 'coordinates' field"));
        return;
    };
    let Some(coords) = coords.as_array() else {
        errors.push(format!("{prefix}: 'coordinates' must be an array"));
        return;
    };

    match kind.as_str() {
        Some("Point") => check_position(coords, prefix, errors),
        Some("LineString") => check_line_string(coords, prefix, errors),
        Some("Polygon") => check_polygon(coords, prefix, errors),
        Some("MultiPoint") => {
            for (i, pos) in coords.iter().enumerate() {
                check_position_value(pos, &format!("{prefix} Point {i}"), errors);
            }
        }
        Some("MultiLineString") => {
            for (i, line) in coords.iter().enumerate() {
                let prefix = format!("{prefix} LineString {i}");
                match line.as_array() {
                    Some(line) => check_line_string(line, &prefix, errors),
                    None => errors.push(format!(
                        "{prefix}: LineString must have at least 2 positions"
                    )),
                }
            }
        }
        Some("MultiPolygon") => {
            for (i, polygon) in coords.iter().enumerate() {
                let prefix = format!("{prefix} Polygon {i}");
                match polygon.as_array() {
                    Some(rings) => check_polygon(rings, &prefix, errors),
                    None => errors.push(format!("{prefix}: Polygon must have at least one ring")),
                }
            }
        }
        _ => errors.push(format!("{prefix}: Invalid geometry type: {}", type_label(kind))),
    }
}

fn check_position_value(pos: &Value, prefix: &str, errors: &mut Vec<String>) {
    match pos.as_array() {
        Some(pos) => check_position(pos, prefix, errors),
        None => errors.push(format!("{prefix}: Position must be [longitude, latitude]")),
    }
}

fn check_position(pos: &[Value], prefix: &str, errors: &mut Vec<String>) {
    if pos.len() < 2 {
        errors.push(format!("{prefix}: Position must be [longitude, latitude]"));
        return;
    }
    let (Some(lon), Some(lat)) = (pos[0].as_f64(), pos[1].as_f64()) else {
        errors.push(format!("{prefix}: Coordinates must be numbers"));
        return;
    };
    if !(-180.0..=180.0).contains(&lon) {
        errors.push(format!(
            "{prefix}: Longitude {} out of range [-180, 180]",
            pos[0]
        ));
    }
    if !(-90.0..=90.0).contains(&lat) {
        errors.push(format!("{prefix}: Latitude {} out of range [-90, 90]", pos[1]));
    }
}

fn check_line_string(coords: &[Value], prefix: &str, errors: &mut Vec<String>) {
    if coords.len() < 2 {
        errors.push(format!("{prefix}: LineString must have at least 2 positions"));
        return;
    }
    for (i, pos) in coords.iter().enumerate() {
        check_position_value(pos, &format!("{prefix} position {i}"), errors);
    }
}

fn check_polygon(rings: &[Value], prefix: &str, errors: &mut Vec<String>) {
    if rings.is_empty() {
        errors.push(format!("{prefix}: Polygon must have at least one ring"));
        return;
    }

    for (ring_idx, ring) in rings.iter().enumerate() {
        let ring_prefix = format!("{prefix} ring {ring_idx}");
        let Some(ring) = ring.as_array().filter(|r| r.len() >= 4) else {
            errors.push(format!("{ring_prefix}: Ring must have at least 4 positions"));
            continue;
        };

        let (Some(first), Some(last)) = (
            ring.first().and_then(Value::as_array),
            ring.last().and_then(Value::as_array),
        ) else {
            errors.push(format!("{ring_prefix}: Invalid ring positions"));
            continue;
        };
        if first.len() >= 2 && last.len() >= 2 && !same_xy(first, last) {
            errors.push(format!("{ring_prefix}: Ring not closed (first != last)"));
        }

        for (i, pos) in ring.iter().enumerate() {
            check_position_value(pos, &format!("{ring_prefix} position {i}"), errors);
        }
    }
}

/// Exact equality of the first two ordinates. Non-numeric ordinates are left
/// to the position check.
fn same_xy(a: &[Value], b: &[Value]) -> bool {
    let bits = |v: &Value| v.as_f64().map(f64::to_bits);
    match (bits(&a[0]), bits(&a[1]), bits(&b[0]), bits(&b[1])) {
        (Some(ax), Some(ay), Some(bx), Some(by)) => ax == bx && ay == by,
        _ => true,
    }
}
