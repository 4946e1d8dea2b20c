//! Inline local image files as `data:` URLs.

use std::path::Path;

use anyhow::Context;
use base64::Engine as _;

/// MIME type guessed from the file extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

pub fn encode(bytes: &[u8], mime: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

pub fn from_file(path: &Path) -> anyhow::Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    Ok(encode(&bytes, mime_for(path)))
}

/// An existing file is inlined; anything else (URL, provider image id) is
/// passed through unchanged.
pub fn resolve_image(value: &str) -> anyhow::Result<String> {
    let path = Path::new(value);
    if path.is_file() {
        from_file(path)
    } else {
        Ok(value.to_string())
    }
}
