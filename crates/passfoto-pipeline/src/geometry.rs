//! Crop-rectangle geometry: initial placement and bounds clamping.
//!
//! Rectangles may be expressed in pixels or as percentages of the
//! image; all invariants (non-negative origin, fully inside the image,
//! aspect ratio within tolerance) are enforced in pixel space after
//! resolution.

use crate::types::{GeometryError, PixelDimensions};

/// Tolerance when comparing a crop's aspect ratio against the target.
pub const ASPECT_TOLERANCE: f64 = 1e-6;

/// Fraction of the constraining image axis used by the initial crop.
///
/// The remaining margin leaves room to reframe the face without
/// immediately hitting an image edge.
const INITIAL_CROP_FRACTION: f64 = 0.8;

/// Coordinate space of a [`CropRect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropUnit {
    /// Percentages of the image dimensions (0–100 per axis).
    Percent,
    /// Pixels in the space the rectangle was captured in (displayed or
    /// natural, depending on context).
    Pixels,
}

/// A crop rectangle.
///
/// Mutable during the Crop stage. Invariants, checked in pixel space:
/// `0 <= x`, `0 <= y`, `x + width <= image width`,
/// `y + height <= image height`, and `width / height` equal to the
/// target aspect ratio within [`ASPECT_TOLERANCE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Rectangle width.
    pub width: f64,
    /// Rectangle height.
    pub height: f64,
    /// Coordinate space of the four fields above.
    pub unit: CropUnit,
}

impl CropRect {
    /// A pixel-space rectangle.
    #[must_use]
    pub const fn from_pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: CropUnit::Pixels,
        }
    }

    /// A percent-space rectangle (each field 0–100).
    #[must_use]
    pub const fn from_percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: CropUnit::Percent,
        }
    }

    /// Width-to-height ratio.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Whether this rectangle's aspect ratio matches `aspect` within
    /// [`ASPECT_TOLERANCE`].
    #[must_use]
    pub fn matches_aspect(&self, aspect: f64) -> bool {
        (self.aspect_ratio() - aspect).abs() <= ASPECT_TOLERANCE
    }

    /// Resolve to pixel space against the given image dimensions.
    ///
    /// Pixel rectangles are returned unchanged; percent rectangles are
    /// scaled by the image size.
    #[must_use]
    pub fn resolve(&self, image: PixelDimensions) -> Self {
        match self.unit {
            CropUnit::Pixels => *self,
            CropUnit::Percent => Self::from_pixels(
                self.x / 100.0 * f64::from(image.width),
                self.y / 100.0 * f64::from(image.height),
                self.width / 100.0 * f64::from(image.width),
                self.height / 100.0 * f64::from(image.height),
            ),
        }
    }

    /// Fail if the rectangle has collapsed to zero area.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateCrop`] when either rounded
    /// axis is below one pixel.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ensure_non_degenerate(&self) -> Result<(), GeometryError> {
        let width = self.width.round().max(0.0) as u32;
        let height = self.height.round().max(0.0) as u32;
        if width == 0 || height == 0 {
            return Err(GeometryError::DegenerateCrop { width, height });
        }
        Ok(())
    }
}

/// Compute the initial centered crop for a target aspect ratio.
///
/// Uses 80% of whichever image axis constrains the target ratio
/// (height when the image is wider than the target, width otherwise),
/// derives the other axis from the ratio, centers the rectangle, and
/// clamps it to the image bounds.
#[must_use]
pub fn initial_crop(image: PixelDimensions, aspect: f64) -> CropRect {
    let image_width = f64::from(image.width);
    let image_height = f64::from(image.height);

    let (width, height) = if image_width / image_height > aspect {
        let height = image_height * INITIAL_CROP_FRACTION;
        (height * aspect, height)
    } else {
        let width = image_width * INITIAL_CROP_FRACTION;
        (width, width / aspect)
    };

    let x = (image_width - width) / 2.0;
    let y = (image_height - height) / 2.0;
    clamp_to_bounds(&CropRect::from_pixels(x, y, width, height), image)
}

/// Clamp a crop rectangle to the image bounds.
///
/// Per axis: shift the rectangle back inside first, and only shrink it
/// if it is larger than the image. The order matters — shrinking
/// before shifting would change the aspect ratio of rectangles that
/// merely overhang an edge.
#[must_use]
pub fn clamp_to_bounds(crop: &CropRect, image: PixelDimensions) -> CropRect {
    let resolved = crop.resolve(image);
    let image_width = f64::from(image.width);
    let image_height = f64::from(image.height);

    let (x, width) = clamp_axis(resolved.x, resolved.width, image_width);
    let (y, height) = clamp_axis(resolved.y, resolved.height, image_height);
    CropRect::from_pixels(x, y, width, height)
}

/// Shift-then-shrink clamping of one axis: returns `(origin, extent)`
/// with `0 <= origin` and `origin + extent <= limit`.
fn clamp_axis(origin: f64, extent: f64, limit: f64) -> (f64, f64) {
    let mut origin = origin.max(0.0);
    let mut extent = extent.max(0.0);
    if origin + extent > limit {
        origin = (limit - extent).max(0.0);
        if origin + extent > limit {
            extent = limit - origin;
        }
    }
    (origin, extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: PixelDimensions = PixelDimensions::new(1200, 900);

    // --- initial_crop tests ---

    #[test]
    fn wide_image_constrains_by_height() {
        // 1200/900 = 1.333 > 35/45, so height drives the crop.
        let aspect = 35.0 / 45.0;
        let crop = initial_crop(IMAGE, aspect);
        assert!((crop.height - 720.0).abs() < 1e-9);
        assert!((crop.width - 720.0 * aspect).abs() < 1e-9);
    }

    #[test]
    fn tall_image_constrains_by_width() {
        let image = PixelDimensions::new(600, 1200);
        let crop = initial_crop(image, 1.0);
        assert!((crop.width - 480.0).abs() < 1e-9);
        assert!((crop.height - 480.0).abs() < 1e-9);
    }

    #[test]
    fn initial_crop_is_centered() {
        let crop = initial_crop(IMAGE, 1.0);
        let expected_x = (1200.0 - crop.width) / 2.0;
        let expected_y = (900.0 - crop.height) / 2.0;
        assert!((crop.x - expected_x).abs() < 1e-9);
        assert!((crop.y - expected_y).abs() < 1e-9);
    }

    #[test]
    fn initial_crop_stays_inside_image_for_varied_ratios() {
        for &aspect in &[0.25, 35.0 / 45.0, 1.0, 5.0 / 7.0, 3.0, 10.0] {
            for &(w, h) in &[(1200_u32, 900_u32), (900, 1200), (50, 2000), (2000, 50)] {
                let image = PixelDimensions::new(w, h);
                let crop = initial_crop(image, aspect);
                assert!(crop.x >= 0.0);
                assert!(crop.y >= 0.0);
                assert!(crop.x + crop.width <= f64::from(w) + 1e-9);
                assert!(crop.y + crop.height <= f64::from(h) + 1e-9);
            }
        }
    }

    #[test]
    fn initial_crop_matches_requested_aspect() {
        for &aspect in &[35.0 / 45.0, 1.0, 5.0 / 7.0, 33.0 / 48.0] {
            let crop = initial_crop(IMAGE, aspect);
            assert!(
                crop.matches_aspect(aspect),
                "aspect {aspect}: got {}",
                crop.aspect_ratio(),
            );
        }
    }

    // --- clamp_to_bounds tests ---

    #[test]
    fn in_bounds_rectangle_is_untouched() {
        let crop = CropRect::from_pixels(100.0, 100.0, 300.0, 300.0);
        assert_eq!(clamp_to_bounds(&crop, IMAGE), crop);
    }

    #[test]
    fn overhanging_rectangle_is_shifted_not_shrunk() {
        // Overhangs the right edge by 100 px; shifting preserves size.
        let crop = CropRect::from_pixels(1000.0, 0.0, 300.0, 300.0);
        let clamped = clamp_to_bounds(&crop, IMAGE);
        assert!((clamped.x - 900.0).abs() < 1e-9);
        assert!((clamped.width - 300.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_rectangle_is_shrunk_after_shifting() {
        let crop = CropRect::from_pixels(100.0, 0.0, 2000.0, 300.0);
        let clamped = clamp_to_bounds(&crop, IMAGE);
        assert!((clamped.x - 0.0).abs() < 1e-9);
        assert!((clamped.width - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn negative_origin_is_clamped_to_zero() {
        let crop = CropRect::from_pixels(-50.0, -20.0, 300.0, 300.0);
        let clamped = clamp_to_bounds(&crop, IMAGE);
        assert!((clamped.x - 0.0).abs() < 1e-9);
        assert!((clamped.y - 0.0).abs() < 1e-9);
        assert!((clamped.width - 300.0).abs() < 1e-9);
    }

    #[test]
    fn clamp_is_idempotent() {
        let cases = [
            CropRect::from_pixels(1000.0, 800.0, 400.0, 400.0),
            CropRect::from_pixels(-10.0, -10.0, 5000.0, 5000.0),
            CropRect::from_pixels(0.0, 0.0, 1200.0, 900.0),
            CropRect::from_pixels(599.5, 449.5, 1.0, 1.0),
        ];
        for crop in cases {
            let once = clamp_to_bounds(&crop, IMAGE);
            let twice = clamp_to_bounds(&once, IMAGE);
            assert_eq!(once, twice, "not idempotent for {crop:?}");
        }
    }

    // --- percent resolution tests ---

    #[test]
    fn percent_rect_resolves_against_image() {
        let crop = CropRect::from_percent(5.0, 5.0, 90.0, 90.0);
        let resolved = crop.resolve(PixelDimensions::new(200, 100));
        assert_eq!(resolved, CropRect::from_pixels(10.0, 5.0, 180.0, 90.0));
    }

    #[test]
    fn pixel_rect_resolution_is_identity() {
        let crop = CropRect::from_pixels(10.0, 5.0, 180.0, 90.0);
        assert_eq!(crop.resolve(IMAGE), crop);
    }

    // --- degeneracy tests ---

    #[test]
    fn zero_width_crop_is_degenerate() {
        let crop = CropRect::from_pixels(10.0, 10.0, 0.2, 50.0);
        assert_eq!(
            crop.ensure_non_degenerate(),
            Err(GeometryError::DegenerateCrop {
                width: 0,
                height: 50,
            }),
        );
    }

    #[test]
    fn unit_crop_is_not_degenerate() {
        let crop = CropRect::from_pixels(10.0, 10.0, 1.0, 1.0);
        assert_eq!(crop.ensure_non_degenerate(), Ok(()));
    }
}
