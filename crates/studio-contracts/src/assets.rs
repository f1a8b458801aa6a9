use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::errors::StudioError;
use crate::objects::{ObjectStore, ObjectUrl};

/// A user supplied input image.
///
/// The payload is kept in its transmission form (base64, optionally with a
/// `data:` prefix, as produced by a browser file reader). The preview handle
/// lives exactly as long as the asset.
#[derive(Debug)]
pub struct ImageAsset {
    mime_type: String,
    encoded: String,
    fingerprint: String,
    preview: ObjectUrl,
}

impl ImageAsset {
    pub fn from_bytes(
        store: &ObjectStore,
        bytes: Vec<u8>,
        declared_mime: &str,
    ) -> Result<Self, StudioError> {
        let mime_type = validate_image(&bytes, declared_mime)?;
        let encoded = format!("data:{mime_type};base64,{}", BASE64.encode(&bytes));
        let fingerprint = fingerprint_bytes(&bytes);
        let preview = store.create(bytes, &mime_type);
        Ok(Self {
            mime_type,
            encoded,
            fingerprint,
            preview,
        })
    }

    pub fn from_data_url(store: &ObjectStore, data_url: &str) -> Result<Self, StudioError> {
        let (declared, payload) = split_data_url(data_url).ok_or_else(|| {
            StudioError::InvalidAsset("expected a base64 data URL".to_string())
        })?;
        let bytes = BASE64
            .decode(payload.as_bytes())
            .map_err(|err| StudioError::InvalidAsset(format!("base64 decode failed: {err}")))?;
        let mime_type = validate_image(&bytes, declared)?;
        let fingerprint = fingerprint_bytes(&bytes);
        let preview = store.create(bytes, &mime_type);
        Ok(Self {
            mime_type,
            encoded: data_url.trim().to_string(),
            fingerprint,
            preview,
        })
    }

    pub fn from_path(store: &ObjectStore, path: &Path) -> Result<Self, StudioError> {
        let bytes = fs::read(path).map_err(|err| {
            StudioError::InvalidAsset(format!("failed reading {}: {err}", path.display()))
        })?;
        let declared = mime_for_path(path).unwrap_or("");
        Self::from_bytes(store, bytes, declared)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn preview(&self) -> &ObjectUrl {
        &self.preview
    }

    /// Bare base64 payload, without any `data:` prefix.
    pub fn payload(&self) -> &str {
        strip_data_uri_prefix(&self.encoded)
    }

    /// Short sha256 of the decoded image bytes. Safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn fingerprint_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..6])
}

/// One uploader slot. Replacing or clearing drops the previous asset, which
/// releases its preview handle.
#[derive(Debug, Default)]
pub struct AssetSlot {
    current: Option<ImageAsset>,
}

impl AssetSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&ImageAsset> {
        self.current.as_ref()
    }

    pub fn replace(&mut self, asset: ImageAsset) {
        self.current = Some(asset);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Strips a leading `data:<anything>,` prefix, leaving the bare payload.
pub fn strip_data_uri_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("data:") {
        return trimmed;
    }
    match trimmed.find(',') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Decodes a `data:<mime>;base64,<payload>` string into its media type and
/// bytes.
pub fn decode_data_url(raw: &str) -> Result<(String, Vec<u8>), StudioError> {
    let (mime, payload) = split_data_url(raw)
        .ok_or_else(|| StudioError::Protocol("expected a base64 data URL".to_string()))?;
    let bytes = BASE64
        .decode(payload.as_bytes())
        .map_err(|err| StudioError::Protocol(format!("base64 decode failed: {err}")))?;
    Ok((mime.to_string(), bytes))
}

fn split_data_url(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.trim().strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    Some((mime, payload))
}

fn validate_image(bytes: &[u8], declared_mime: &str) -> Result<String, StudioError> {
    let declared = declared_mime.trim().to_ascii_lowercase();
    if !declared.is_empty() && !declared.starts_with("image/") {
        return Err(StudioError::InvalidAsset(format!(
            "unsupported media type '{declared}', please upload an image file"
        )));
    }
    let format = image::guess_format(bytes).map_err(|_| {
        StudioError::InvalidAsset("content is not a recognised image".to_string())
    })?;
    if !declared.is_empty() {
        return Ok(declared);
    }
    Ok(format.to_mime_type().to_string())
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
