//! Fused crop-and-resample to exact print dimensions.
//!
//! The crop rectangle is captured against the *displayed* preview, so
//! it is first mapped back to natural pixels by the per-axis
//! displayed→natural scale factor. The source region is then drawn
//! directly into a buffer of exactly the target dimensions in one
//! resampling pass — cropping to an intermediate buffer and resizing
//! separately would round twice and lose sub-pixel precision.
//!
//! Resampling uses the CatmullRom (bicubic) filter. Nearest-neighbor
//! would alias badly on the typical downscale from camera resolution
//! to print size.

use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder};

use crate::background::HexColor;
use crate::geometry::{self, CropRect};
use crate::types::{DisplaySize, GeometryError, OutputFormat, PixelDimensions};

/// Errors from decoding, cropping, or encoding image bytes.
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// The input bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The crop rectangle was invalid.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The output buffer could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}

/// Decode only the natural pixel dimensions of an image.
///
/// # Errors
///
/// Returns [`CropError::Decode`] if the bytes are not a supported
/// image format.
pub fn natural_dimensions(bytes: &[u8]) -> Result<PixelDimensions, CropError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();
    Ok(PixelDimensions::new(width, height))
}

/// Crop `bytes` to `crop` (captured in displayed coordinates) and
/// resample the region into a buffer of exactly `target` pixels,
/// encoded as `format`.
///
/// # Errors
///
/// Returns [`CropError::Decode`] for undecodable input,
/// [`CropError::Geometry`] when the mapped source rectangle collapses
/// to zero area, and [`CropError::Encode`] if encoding fails.
pub fn crop_to_target(
    bytes: &[u8],
    crop: &CropRect,
    displayed: DisplaySize,
    target: PixelDimensions,
    format: OutputFormat,
) -> Result<Vec<u8>, CropError> {
    let image = image::load_from_memory(bytes)?;
    let (natural_width, natural_height) = image.dimensions();
    let natural = PixelDimensions::new(natural_width, natural_height);

    let source = source_rect(crop, displayed, natural)?;

    let view = image::imageops::crop_imm(&image, source.0, source.1, source.2, source.3);
    let resampled = image::imageops::resize(&*view, target.width, target.height, FilterType::CatmullRom);

    encode(&DynamicImage::ImageRgba8(resampled), format)
}

/// Sample the color of the natural pixel under a displayed-coordinate
/// point (the background eyedropper).
///
/// The point is clamped to the image bounds, matching how a click on
/// the very edge of a preview should still pick a color.
///
/// # Errors
///
/// Returns [`CropError::Decode`] for undecodable input.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pick_color(bytes: &[u8], displayed: DisplaySize, x: f64, y: f64) -> Result<HexColor, CropError> {
    let image = image::load_from_memory(bytes)?;
    let (natural_width, natural_height) = image.dimensions();

    let scale_x = f64::from(natural_width) / displayed.width;
    let scale_y = f64::from(natural_height) / displayed.height;
    let px = ((x * scale_x).round().max(0.0) as u32).min(natural_width.saturating_sub(1));
    let py = ((y * scale_y).round().max(0.0) as u32).min(natural_height.saturating_sub(1));

    let pixel = image.get_pixel(px, py);
    Ok(HexColor::rgb(pixel.0[0], pixel.0[1], pixel.0[2]))
}

/// Map a displayed-space crop rectangle to an integer natural-space
/// source rectangle `(x, y, width, height)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn source_rect(
    crop: &CropRect,
    displayed: DisplaySize,
    natural: PixelDimensions,
) -> Result<(u32, u32, u32, u32), CropError> {
    let scale_x = f64::from(natural.width) / displayed.width;
    let scale_y = f64::from(natural.height) / displayed.height;

    let resolved = crop.resolve(PixelDimensions::new(
        displayed.width.round() as u32,
        displayed.height.round() as u32,
    ));
    let scaled = CropRect::from_pixels(
        (resolved.x * scale_x).round(),
        (resolved.y * scale_y).round(),
        (resolved.width * scale_x).round(),
        (resolved.height * scale_y).round(),
    );
    let clamped = geometry::clamp_to_bounds(&scaled, natural);
    clamped.ensure_non_degenerate()?;

    Ok((
        clamped.x.round() as u32,
        clamped.y.round() as u32,
        clamped.width.round() as u32,
        clamped.height.round() as u32,
    ))
}

/// Encode an image in the session's output format.
fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, CropError> {
    let mut out = Vec::new();
    match format {
        OutputFormat::Png => {
            let rgba = image.to_rgba8();
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(CropError::Encode)?;
        }
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel; flatten before encoding.
            let rgb = image.to_rgb8();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 100)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(CropError::Encode)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Encode a small RGBA test image as PNG bytes.
    fn png_of(image: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buf)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .unwrap();
        buf
    }

    /// A left-half red, right-half blue test image.
    fn split_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, _y| {
            if x < width / 2 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        });
        png_of(&img)
    }

    #[test]
    fn whole_image_crop_at_natural_resolution_keeps_dimensions() {
        let png = split_png(64, 48);
        let crop = CropRect::from_pixels(0.0, 0.0, 64.0, 48.0);
        let out = crop_to_target(
            &png,
            &crop,
            DisplaySize::new(64.0, 48.0),
            PixelDimensions::new(64, 48),
            OutputFormat::Png,
        )
        .unwrap();
        assert_eq!(natural_dimensions(&out).unwrap(), PixelDimensions::new(64, 48));
    }

    #[test]
    fn output_has_exact_target_dimensions() {
        let png = split_png(100, 100);
        let crop = CropRect::from_pixels(10.0, 10.0, 35.0, 45.0);
        let out = crop_to_target(
            &png,
            &crop,
            DisplaySize::new(100.0, 100.0),
            PixelDimensions::new(413, 532),
            OutputFormat::Png,
        )
        .unwrap();
        assert_eq!(natural_dimensions(&out).unwrap(), PixelDimensions::new(413, 532));
    }

    #[test]
    fn displayed_scale_maps_back_to_natural_pixels() {
        // Natural 200 px wide, displayed at 100 px: a displayed crop of
        // the left half must sample only red pixels.
        let png = split_png(200, 100);
        let crop = CropRect::from_pixels(0.0, 0.0, 50.0, 50.0);
        let out = crop_to_target(
            &png,
            &crop,
            DisplaySize::new(100.0, 50.0),
            PixelDimensions::new(40, 40),
            OutputFormat::Png,
        )
        .unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        for pixel in decoded.pixels() {
            assert!(pixel.0[0] > 200 && pixel.0[2] < 50, "expected red, got {pixel:?}");
        }
    }

    #[test]
    fn percent_crop_resolves_against_displayed_size() {
        let png = split_png(200, 100);
        let crop = CropRect::from_percent(0.0, 0.0, 50.0, 100.0);
        let out = crop_to_target(
            &png,
            &crop,
            DisplaySize::new(100.0, 50.0),
            PixelDimensions::new(20, 20),
            OutputFormat::Png,
        )
        .unwrap();
        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        for pixel in decoded.pixels() {
            assert!(pixel.0[0] > 200, "expected red, got {pixel:?}");
        }
    }

    #[test]
    fn degenerate_crop_fails() {
        let png = split_png(64, 48);
        let crop = CropRect::from_pixels(10.0, 10.0, 0.1, 0.1);
        let result = crop_to_target(
            &png,
            &crop,
            DisplaySize::new(64.0, 48.0),
            PixelDimensions::new(10, 10),
            OutputFormat::Png,
        );
        assert!(matches!(result, Err(CropError::Geometry(_))));
    }

    #[test]
    fn undecodable_input_fails_with_decode() {
        let crop = CropRect::from_pixels(0.0, 0.0, 10.0, 10.0);
        let result = crop_to_target(
            &[0xde, 0xad],
            &crop,
            DisplaySize::new(10.0, 10.0),
            PixelDimensions::new(10, 10),
            OutputFormat::Png,
        );
        assert!(matches!(result, Err(CropError::Decode(_))));
    }

    #[test]
    fn jpeg_output_decodes_with_target_dimensions() {
        let png = split_png(64, 64);
        let crop = CropRect::from_pixels(0.0, 0.0, 64.0, 64.0);
        let out = crop_to_target(
            &png,
            &crop,
            DisplaySize::new(64.0, 64.0),
            PixelDimensions::new(600, 600),
            OutputFormat::Jpeg,
        )
        .unwrap();
        assert_eq!(natural_dimensions(&out).unwrap(), PixelDimensions::new(600, 600));
    }

    // --- pick_color tests ---

    #[test]
    fn pick_color_on_solid_image_returns_that_color() {
        let img = image::RgbaImage::from_pixel(10, 10, image::Rgba([0x02, 0x84, 0xc7, 255]));
        let png = png_of(&img);
        for &(x, y) in &[(0.0, 0.0), (5.0, 5.0), (9.9, 9.9)] {
            let color = pick_color(&png, DisplaySize::new(10.0, 10.0), x, y).unwrap();
            assert_eq!(color, HexColor::rgb(0x02, 0x84, 0xc7));
        }
    }

    #[test]
    fn pick_color_maps_displayed_click_to_natural_pixel() {
        // Natural 200 px, displayed at 100 px: clicking at displayed
        // x=30 lands in the red half, x=70 in the blue half.
        let png = split_png(200, 100);
        let displayed = DisplaySize::new(100.0, 50.0);
        let red = pick_color(&png, displayed, 30.0, 25.0).unwrap();
        assert_eq!(red, HexColor::rgb(255, 0, 0));
        let blue = pick_color(&png, displayed, 70.0, 25.0).unwrap();
        assert_eq!(blue, HexColor::rgb(0, 0, 255));
    }

    #[test]
    fn pick_color_clamps_out_of_bounds_clicks() {
        let png = split_png(20, 20);
        let color = pick_color(&png, DisplaySize::new(20.0, 20.0), 500.0, 500.0).unwrap();
        assert_eq!(color, HexColor::rgb(0, 0, 255));
    }
}
