//! passfoto-pipeline: Pure passport-photo pipeline core (sans-IO).
//!
//! Coordinates the four-stage flow that turns an arbitrary photograph
//! into a print-ready passport photo:
//! upload -> background removal -> background composition + tonal
//! adjustment -> crop to a national size specification at 300 DPI.
//!
//! The actual pixel transforms (segmentation, compositing, tonal
//! curves) are performed by an external service modeled as the
//! [`ImageOps`] capability trait. This crate has **no I/O
//! dependencies** -- it operates on in-memory byte buffers and
//! returns structured data. All browser/network interaction lives in
//! `passfoto-io`.

pub mod adjust;
pub mod background;
pub mod coalescer;
pub mod diagnostics;
pub mod geometry;
pub mod resample;
pub mod service;
pub mod session;
pub mod types;
pub mod units;

pub use adjust::AdjustmentParams;
pub use background::{BackgroundSpec, HexColor, BACKGROUND_PRESETS};
pub use coalescer::{AdjustRequest, AdjustmentCoalescer, COALESCE_WINDOW};
pub use geometry::{clamp_to_bounds, initial_crop, CropRect, CropUnit};
pub use resample::{crop_to_target, natural_dimensions, pick_color, CropError};
pub use service::{ImageOps, RemoteError};
pub use session::{ArtifactKind, PipelineStage, Session, SessionError, StageArtifact};
pub use types::{
    DisplaySize, GeometryError, OutputFormat, PhysicalSize, PixelDimensions, Unit, PHOTO_SIZES,
};
pub use units::{convert, DPI};
