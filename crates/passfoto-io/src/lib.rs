//! passfoto-io: Browser I/O and Dioxus component library.
//!
//! Handles the remote image-service client, Blob URL previews, file
//! downloads, console diagnostics, and provides the reusable UI
//! components for the passfoto web application.

pub mod components;
pub mod console;
pub mod download;
pub mod raster;
pub mod remote;

pub use components::{
    AdjustPanel, BackgroundPanel, ColorPick, CropPanel, ExportPanel, FileUpload, StepIndicator,
};
pub use remote::HttpImageOps;
