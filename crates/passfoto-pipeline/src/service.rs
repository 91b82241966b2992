//! The remote image-operation capability.
//!
//! The external service that performs the actual pixel transforms is
//! modeled as a trait over `(image, parameters) → image` so the
//! session logic and its tests never touch a transport. The browser
//! HTTP implementation lives in `passfoto-io`; tests use an in-memory
//! mock.
//!
//! Every call is one-shot and non-partial: on failure nothing is
//! committed and the caller retries explicitly. Each success returns a
//! freshly generated byte buffer unrelated to prior handles.

use crate::adjust::AdjustmentParams;
use crate::background::BackgroundSpec;
use crate::types::OutputFormat;

/// Errors from the remote image service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with a non-success status.
    #[error("service responded with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The call did not complete within the client-side deadline.
    ///
    /// Without this, a hung call would leave the session busy flag set
    /// forever; the deadline fails exactly the one affected call.
    #[error("service call timed out after {seconds}s")]
    Timeout {
        /// The deadline that elapsed.
        seconds: u64,
    },

    /// The request never reached the service (network, DNS, CORS).
    #[error("service unreachable: {0}")]
    Transport(String),
}

/// The three remote operations, uniform over
/// `(image, parameters) → image`.
// Consumed single-threaded (wasm); implementations need not be Send.
#[allow(async_fn_in_trait)]
pub trait ImageOps {
    /// Remove the background, returning an image with transparency.
    async fn segment(&self, image: &[u8], format: OutputFormat) -> Result<Vec<u8>, RemoteError>;

    /// Layer the foreground over a solid color or a positioned,
    /// scaled background image.
    async fn composite(
        &self,
        image: &[u8],
        background: &BackgroundSpec,
        format: OutputFormat,
    ) -> Result<Vec<u8>, RemoteError>;

    /// Apply brightness/contrast/saturation correction.
    async fn adjust(
        &self,
        image: &[u8],
        params: AdjustmentParams,
        format: OutputFormat,
    ) -> Result<Vec<u8>, RemoteError>;
}
