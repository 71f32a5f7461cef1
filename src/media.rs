use base64::Engine;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

/// Hard cap on reference attachments per generation.
pub const MAX_REFERENCE_MEDIA: usize = 3;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("too many reference files: got {0}, maximum is {MAX_REFERENCE_MEDIA}")]
    TooMany(usize),
    #[error("reference file '{0}' is empty")]
    EmptyFile(String),
    #[error("could not determine the media type of '{0}'")]
    UnknownType(String),
}

/// A reference upload as received from the form, before encoding.
#[derive(Debug, Clone)]
pub struct ReferenceFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Inline-data part for the generation request: base64 payload + MIME type.
/// Owned by the in-flight request only; dropped when the request resolves.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMediaPart {
    pub data: String,
    pub mime_type: String,
}

/// Encodes the full attachment set, in selection order. Rejects the whole
/// set when the cap is exceeded or any file is unusable; there is no partial
/// accept and no silent drop.
pub fn encode_reference_media(files: &[ReferenceFile]) -> Result<Vec<EncodedMediaPart>, MediaError> {
    if files.len() > MAX_REFERENCE_MEDIA {
        return Err(MediaError::TooMany(files.len()));
    }
    files.iter().map(encode_file).collect()
}

fn encode_file(file: &ReferenceFile) -> Result<EncodedMediaPart, MediaError> {
    if file.bytes.is_empty() {
        return Err(MediaError::EmptyFile(file.name.clone()));
    }
    let mime_type = resolve_mime_type(file)?;
    let data = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
    info!(
        "📎 Encoded reference '{}' as {} ({} bytes -> {} chars base64)",
        file.name,
        mime_type,
        file.bytes.len(),
        data.len()
    );
    Ok(EncodedMediaPart { data, mime_type })
}

// Trust the upload's declared content type first; fall back to sniffing the
// magic bytes for uploads that arrive as application/octet-stream.
fn resolve_mime_type(file: &ReferenceFile) -> Result<String, MediaError> {
    if let Some(declared) = &file.content_type {
        if !declared.is_empty() && declared != "application/octet-stream" {
            return Ok(declared.clone());
        }
    }
    image::guess_format(&file.bytes)
        .map(|format| format.to_mime_type().to_string())
        .map_err(|_| MediaError::UnknownType(file.name.clone()))
}
