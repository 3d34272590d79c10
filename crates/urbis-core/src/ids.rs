//! Entity id generation: `<prefix>-<8 lowercase hex>`, e.g. `bld-a3f8b2c1`.

use crate::enums::EntityKind;
use crate::errors::CoreError;

/// Generate a fresh id for an entity of `kind`.
///
/// # Errors
///
/// Returns [`CoreError::Other`] if the OS random source is unavailable.
pub fn generate_id(kind: EntityKind) -> Result<String, CoreError> {
    let mut bytes = [0u8; 4];
    getrandom::fill(&mut bytes)
        .map_err(|e| CoreError::Other(anyhow::anyhow!("random source unavailable: {e}")))?;
    Ok(format!("{}-{}", kind.id_prefix(), hex::encode(bytes)))
}

/// Kind encoded in an id's prefix, if recognized.
#[must_use]
pub fn kind_of(id: &str) -> Option<EntityKind> {
    let (prefix, rest) = id.split_once('-')?;
    if rest.is_empty() {
        return None;
    }
    [
        EntityKind::Project,
        EntityKind::Site,
        EntityKind::Building,
        EntityKind::Zone,
    ]
    .into_iter()
    .find(|k| k.id_prefix() == prefix)
}
