//! Blob URL creation for image previews.
//!
//! Stage artifacts are opaque byte buffers; the browser displays them
//! through object URLs created from Blobs. Every URL handed out here
//! must eventually be revoked via [`revoke_blob_url`] to avoid leaking
//! the backing memory.

use passfoto_pipeline::types::OutputFormat;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur during bytes-to-Blob-URL conversion.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RasterError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Wrap encoded image bytes in a Blob and return an object URL for use
/// as an `<img src>`.
///
/// The MIME type follows the session's output format so the browser
/// decodes the preview the same way the exported file will be decoded.
///
/// # Errors
///
/// Returns [`RasterError::JsError`] if Blob or URL creation fails.
pub fn bytes_to_blob_url(bytes: &[u8], format: OutputFormat) -> Result<String, RasterError> {
    bytes_to_blob_url_with_mime(bytes, format.mime_type())
}

/// [`bytes_to_blob_url`] with an explicit MIME type, for payloads that
/// predate the format selection (the freshly uploaded original).
///
/// # Errors
///
/// Returns [`RasterError::JsError`] if Blob or URL creation fails.
pub fn bytes_to_blob_url_with_mime(bytes: &[u8], mime_type: &str) -> Result<String, RasterError> {
    let uint8_array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;

    let url = web_sys::Url::create_object_url_with_blob(&blob)?;
    Ok(url)
}

/// Revoke a Blob URL previously created by [`bytes_to_blob_url`].
///
/// Best-effort: failures are silently ignored since the URL may have
/// already been revoked or garbage collected.
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}

/// MIME type for an uploaded filename, judged by extension.
///
/// Falls back to `image/png`; browsers sniff image payloads anyway,
/// the Blob type only has to be plausible.
#[must_use]
pub fn mime_for_filename(name: &str) -> &'static str {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();
    if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
        "image/jpeg"
    } else if extension.eq_ignore_ascii_case("webp") {
        "image/webp"
    } else if extension.eq_ignore_ascii_case("bmp") {
        "image/bmp"
    } else {
        "image/png"
    }
}
