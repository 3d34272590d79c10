//! Computed-geometry artifacts: the base64 transport form and the binary glTF
//! container behind it.
//!
//! ```text
//! header   magic u32 | version u32 | total length u32      (12 bytes, LE)
//! chunk    length u32 | type u32 | payload (length bytes)  (repeated)
//! ```
//!
//! A container built here carries a single JSON chunk padded with spaces to a
//! 4-byte boundary. Containers coming back from the compute engine may carry
//! further chunks (typically one BIN chunk); [`inspect`] lists them.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// `glTF` in little-endian.
pub const MAGIC: u32 = 0x4654_6C67;
pub const VERSION: u32 = 2;
pub const HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;
/// `JSON` in little-endian.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;
/// `BIN\0` in little-endian.
pub const CHUNK_BIN: u32 = 0x004E_4942;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("artifact is not a binary glTF container")]
    NotContainer,

    #[error("container has no readable JSON chunk")]
    NoPayload,
}

// ---------------------------------------------------------------------------
// Transport form
// ---------------------------------------------------------------------------

/// Standard base64 with padding.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Inverse of [`encode`]. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`ArtifactError::Decode`] for malformed base64.
pub fn decode(text: &str) -> Result<Vec<u8>, ArtifactError> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Whether `text` is already in transport form.
#[must_use]
pub fn is_transport_form(text: &str) -> bool {
    decode(text).is_ok()
}

/// Bring an extracted engine value into transport form.
///
/// Base64 text is kept as is. A JSON document is wrapped into a container
/// first. Anything else is treated as raw bytes and encoded.
#[must_use]
pub fn to_transport(value: &str) -> String {
    if is_transport_form(value) {
        return value.trim().to_string();
    }
    match serde_json::from_str::<Value>(value) {
        Ok(json @ Value::Object(_)) => encode(&build_container(&json)),
        _ => encode(value.as_bytes()),
    }
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let slice = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(slice.try_into().ok()?))
}

/// At least a full header with the glTF magic.
#[must_use]
pub fn is_valid_container(bytes: &[u8]) -> bool {
    bytes.len() >= HEADER_LEN && read_u32(bytes, 0) == Some(MAGIC)
}

/// Wrap `json` (compact form) as the single JSON chunk of a new container.
#[must_use]
pub fn build_container(json: &Value) -> Vec<u8> {
    let mut payload = json.to_string().into_bytes();
    let padding = (4 - payload.len() % 4) % 4;
    payload.resize(payload.len() + padding, b' ');

    let total = HEADER_LEN + CHUNK_HEADER_LEN + payload.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    // Container sizes are bounded by the u32 length field of the format.
    out.extend_from_slice(&u32::try_from(total).unwrap_or(u32::MAX).to_le_bytes());
    out.extend_from_slice(&u32::try_from(payload.len()).unwrap_or(u32::MAX).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Parse the first chunk as JSON. `None` when the container is invalid, the
/// first chunk is not JSON, the chunk is truncated, or the payload does not
/// parse.
#[must_use]
pub fn extract_payload(bytes: &[u8]) -> Option<Value> {
    if !is_valid_container(bytes) {
        return None;
    }
    let length = usize::try_from(read_u32(bytes, HEADER_LEN)?).ok()?;
    if read_u32(bytes, HEADER_LEN + 4)? != CHUNK_JSON {
        return None;
    }
    let start = HEADER_LEN + CHUNK_HEADER_LEN;
    let payload = bytes.get(start..start.checked_add(length)?)?;
    serde_json::from_slice(payload).ok()
}

/// Decode transport text and extract its JSON payload in one step.
///
/// # Errors
///
/// [`ArtifactError::Decode`] for bad base64, [`ArtifactError::NotContainer`]
/// when the bytes are not a container, [`ArtifactError::NoPayload`] when the
/// first chunk is not readable JSON.
pub fn payload_from_transport(text: &str) -> Result<Value, ArtifactError> {
    let bytes = decode(text)?;
    if !is_valid_container(&bytes) {
        return Err(ArtifactError::NotContainer);
    }
    extract_payload(&bytes).ok_or(ArtifactError::NoPayload)
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Json,
    Bin,
    Unknown,
}

impl ChunkKind {
    const fn from_tag(tag: u32) -> Self {
        match tag {
            CHUNK_JSON => Self::Json,
            CHUNK_BIN => Self::Bin,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkInfo {
    pub kind: ChunkKind,
    pub tag: u32,
    pub offset: usize,
    pub length: u32,
    /// The declared length runs past the end of the data.
    pub truncated: bool,
}

/// Header and chunk layout of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub version: u32,
    pub declared_length: u32,
    pub actual_length: usize,
    pub chunks: Vec<ChunkInfo>,
}

impl ContainerInfo {
    /// Declared length matches the data and no chunk is truncated.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.declared_length).is_ok_and(|d| d == self.actual_length)
            && self.chunks.iter().all(|c| !c.truncated)
    }
}

/// Walk the header and chunk table. `None` if `bytes` is not a container.
#[must_use]
pub fn inspect(bytes: &[u8]) -> Option<ContainerInfo> {
    if !is_valid_container(bytes) {
        return None;
    }
    let mut chunks = Vec::new();
    let mut offset = HEADER_LEN;
    while let (Some(length), Some(tag)) = (read_u32(bytes, offset), read_u32(bytes, offset + 4)) {
        let start = offset + CHUNK_HEADER_LEN;
        let end = usize::try_from(length)
            .ok()
            .and_then(|l| start.checked_add(l));
        let truncated = end.is_none_or(|end| end > bytes.len());
        chunks.push(ChunkInfo {
            kind: ChunkKind::from_tag(tag),
            tag,
            offset,
            length,
            truncated,
        });
        match end {
            Some(end) if !truncated => offset = end,
            _ => break,
        }
    }
    Some(ContainerInfo {
        version: read_u32(bytes, 4)?,
        declared_length: read_u32(bytes, 8)?,
        actual_length: bytes.len(),
        chunks,
    })
}
