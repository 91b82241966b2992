//! Physical-size to pixel conversion at print DPI.
//!
//! Print services expect exact pixel dimensions for a given physical
//! size: `px = round(physical / unit_per_inch * dpi)`. The conversion
//! is pure arithmetic over [`f64`]; each axis is converted and rounded
//! independently so the result never drifts with repeated calls.

use crate::types::{PhysicalSize, PixelDimensions, Unit};

/// Print resolution for passport photos, in pixels per inch.
pub const DPI: u32 = 300;

/// Convert a physical width/height in `unit` to integer pixel
/// dimensions at `dpi`.
///
/// Rounding is half-away-from-zero per axis ([`f64::round`]), matching
/// how print services quantize physical sizes. A 35×45 mm photo at
/// 300 DPI is 413×532 px; 2×2 inches is 600×600 px.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn convert(width: f64, height: f64, unit: Unit, dpi: u32) -> PixelDimensions {
    let per_inch = unit.per_inch();
    let px_width = (width / per_inch * f64::from(dpi)).round() as u32;
    let px_height = (height / per_inch * f64::from(dpi)).round() as u32;
    PixelDimensions::new(px_width, px_height)
}

/// Target pixel dimensions for a catalog size at the standard [`DPI`].
#[must_use]
pub fn target_dimensions(size: &PhysicalSize) -> PixelDimensions {
    convert(size.width, size.height, size.unit, DPI)
}
