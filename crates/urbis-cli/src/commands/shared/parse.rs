use serde::de::DeserializeOwned;
use serde_json::Value;
use urbis_core::entities::FloorRange;
use urbis_core::properties::Overrides;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_").to_lowercase();
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Override values are JSON when they parse as JSON, plain strings otherwise.
#[must_use]
pub fn parse_override_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Collect repeated `--set key=value` flags. Later keys win.
pub fn parse_overrides(pairs: &[String]) -> anyhow::Result<Overrides> {
    let mut overrides = Overrides::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("invalid --set '{pair}': expected key=value");
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --set '{pair}': empty key");
        }
        overrides.insert(key.to_string(), parse_override_value(value));
    }
    Ok(overrides)
}

/// `A-B` spans floors A to B; a single label is a one-floor range.
pub fn parse_floor_range(raw: &str) -> anyhow::Result<FloorRange> {
    let (start, end) = raw.split_once('-').unwrap_or((raw, raw));
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        anyhow::bail!("invalid --floors '{raw}': expected A-B");
    }
    Ok(FloorRange {
        start: start.to_string(),
        end: end.to_string(),
    })
}
