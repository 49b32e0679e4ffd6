//! Content type detection from leading bytes.

use base64::{Engine, engine::general_purpose::STANDARD};

pub const FALLBACK_MIME: &str = "application/octet-stream";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// MIME type derived from the content itself; never fails.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PDF_MAGIC) {
        return "application/pdf";
    }
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => FALLBACK_MIME,
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", sniff_mime(bytes), STANDARD.encode(bytes))
}
