//! Shared types for the passfoto pipeline core.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Physical measurement units accepted by the photo-size catalog.
///
/// Every unit is convertible to inches, the base unit for DPI math.
/// Parsing an unrecognized unit string fails with
/// [`GeometryError::InvalidUnit`] — there is deliberately no fallback
/// unit, so a typo in a size definition surfaces immediately instead
/// of silently producing millimeter-sized output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Millimeters (25.4 per inch).
    Mm,
    /// Centimeters (2.54 per inch).
    Cm,
    /// Inches.
    Inch,
}

impl Unit {
    /// How many of this unit make up one inch.
    #[must_use]
    pub const fn per_inch(self) -> f64 {
        match self {
            Self::Mm => 25.4,
            Self::Cm => 2.54,
            Self::Inch => 1.0,
        }
    }

    /// Lowercase unit name as used in labels and size definitions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::Inch => "inch",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Self::Mm),
            "cm" => Ok(Self::Cm),
            "inch" | "in" => Ok(Self::Inch),
            other => Err(GeometryError::InvalidUnit(other.to_owned())),
        }
    }
}

/// A physical print size from the photo-size catalog.
///
/// Immutable per session. Drives both the crop aspect ratio and the
/// target pixel dimensions (via [`crate::units::convert`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSize {
    /// Width in `unit`.
    pub width: f64,
    /// Height in `unit`.
    pub height: f64,
    /// Measurement unit for `width` and `height`.
    pub unit: Unit,
    /// Display label (presentation only, e.g. region hints).
    pub label: &'static str,
}

impl PhysicalSize {
    /// Width-to-height ratio. Unit-independent.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

impl fmt::Display for PhysicalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

/// The fixed photo-size catalog offered to the user.
///
/// Labels mirror the national specifications each size satisfies.
pub const PHOTO_SIZES: [PhysicalSize; 4] = [
    PhysicalSize {
        width: 2.0,
        height: 2.0,
        unit: Unit::Inch,
        label: "2x2 inches (US and India)",
    },
    PhysicalSize {
        width: 35.0,
        height: 45.0,
        unit: Unit::Mm,
        label: "35x45 mm (UK, Europe, Australia, Singapore, Nigeria)",
    },
    PhysicalSize {
        width: 5.0,
        height: 7.0,
        unit: Unit::Cm,
        label: "5x7 cm (Canada)",
    },
    PhysicalSize {
        width: 33.0,
        height: 48.0,
        unit: Unit::Mm,
        label: "33x48 mm (China)",
    },
];

/// Integer pixel dimensions, used both for decoded (natural) image
/// sizes and for print targets derived from a [`PhysicalSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelDimensions {
    /// Create pixel dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width-to-height ratio.
    #[must_use]
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl fmt::Display for PixelDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// On-screen rendered size of a previewed image, in CSS pixels.
///
/// Related to the natural [`PixelDimensions`] by a per-axis scale
/// factor; interactive crop coordinates are captured in this space and
/// mapped back to source pixels by the resampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
}

impl DisplaySize {
    /// Create a display size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Output encoding for every remote call, preview, and the exported
/// file. Selected once per session and threaded through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG (default; preserves transparency mid-pipeline).
    #[default]
    Png,
    /// JPEG.
    Jpeg,
}

impl OutputFormat {
    /// File extension (also the wire value sent as the `format` field).
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// MIME type for Blob previews and downloads.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Errors from unit parsing and crop-rectangle validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// A unit string did not name a known measurement unit.
    #[error("unknown measurement unit: {0:?}")]
    InvalidUnit(String),

    /// A crop rectangle collapsed to zero area.
    #[error("degenerate crop rectangle ({width}x{height} px)")]
    DegenerateCrop {
        /// Rounded source width in pixels.
        width: u32,
        /// Rounded source height in pixels.
        height: u32,
    },
}
