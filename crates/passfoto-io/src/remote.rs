//! HTTP client for the remote image-processing service.
//!
//! Implements the [`ImageOps`] capability over multipart POSTs. Every
//! call races a client-side deadline: the transport itself has no
//! default timeout in the browser, and without one a hung call would
//! leave the session busy indicator stuck forever. On expiry only the
//! affected call fails — nothing is retried implicitly.

use futures_util::future::{select, Either};
use futures_util::pin_mut;
use gloo_timers::future::TimeoutFuture;
use passfoto_pipeline::adjust::AdjustmentParams;
use passfoto_pipeline::background::BackgroundSpec;
use passfoto_pipeline::service::{ImageOps, RemoteError};
use passfoto_pipeline::types::OutputFormat;
use reqwest::multipart::{Form, Part};

/// Default service base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Client-side deadline for each remote call.
pub const REMOTE_TIMEOUT_SECONDS: u64 = 30;

/// The remote service client.
#[derive(Debug, Clone)]
pub struct HttpImageOps {
    client: reqwest::Client,
    base_url: String,
}

impl Default for HttpImageOps {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl HttpImageOps {
    /// A client for the service rooted at `base_url` (with or without
    /// a trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/{operation}", self.base_url)
    }

    /// POST a multipart form and return the binary response body.
    async fn post(&self, url: String, form: Form) -> Result<Vec<u8>, RemoteError> {
        let request = self.client.post(&url).multipart(form).send();
        #[allow(clippy::cast_possible_truncation)]
        let deadline = TimeoutFuture::new((REMOTE_TIMEOUT_SECONDS * 1000) as u32);
        pin_mut!(request, deadline);

        let response = match select(request, deadline).await {
            Either::Left((response, _)) => {
                response.map_err(|e| RemoteError::Transport(e.to_string()))?
            }
            Either::Right(((), _)) => {
                return Err(RemoteError::Timeout {
                    seconds: REMOTE_TIMEOUT_SECONDS,
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_owned());
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// An image payload part named for the service's upload field.
fn image_part(bytes: &[u8], format: OutputFormat) -> Result<Part, RemoteError> {
    Part::bytes(bytes.to_vec())
        .file_name(format!("image.{}", format.extension()))
        .mime_str(format.mime_type())
        .map_err(|e| RemoteError::Transport(e.to_string()))
}

impl ImageOps for HttpImageOps {
    async fn segment(&self, image: &[u8], format: OutputFormat) -> Result<Vec<u8>, RemoteError> {
        let form = Form::new()
            .part("image", image_part(image, format)?)
            .text("format", format.extension());
        self.post(self.endpoint("segment"), form).await
    }

    async fn composite(
        &self,
        image: &[u8],
        background: &BackgroundSpec,
        format: OutputFormat,
    ) -> Result<Vec<u8>, RemoteError> {
        let mut form = Form::new()
            .part("image", image_part(image, format)?)
            .text("format", format.extension());

        match background {
            BackgroundSpec::Color(color) => {
                form = form.text("backgroundColor", color.to_string());
            }
            BackgroundSpec::Image(bg) => {
                let part = Part::bytes(bg.bytes.as_ref().clone())
                    .file_name("background")
                    .mime_str("application/octet-stream")
                    .map_err(|e| RemoteError::Transport(e.to_string()))?;
                form = form
                    .part("backgroundImg", part)
                    .text("bgScale", bg.scale.to_string())
                    .text("bgOffsetX", bg.offset_x.to_string())
                    .text("bgOffsetY", bg.offset_y.to_string());
            }
        }

        self.post(self.endpoint("composite"), form).await
    }

    async fn adjust(
        &self,
        image: &[u8],
        params: AdjustmentParams,
        format: OutputFormat,
    ) -> Result<Vec<u8>, RemoteError> {
        let form = Form::new()
            .part("image", image_part(image, format)?)
            .text("brightness", params.brightness.to_string())
            .text("contrast", params.contrast.to_string())
            .text("saturation", params.saturation.to_string())
            .text("format", format.extension());
        self.post(self.endpoint("adjust"), form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        let client = HttpImageOps::new("https://photos.example/api/");
        assert_eq!(client.endpoint("segment"), "https://photos.example/api/segment");
        let bare = HttpImageOps::new("https://photos.example/api");
        assert_eq!(bare.endpoint("adjust"), "https://photos.example/api/adjust");
    }
}
