//! Background specifications for the composition stage.
//!
//! After segmentation the foreground is layered over either a solid
//! color or an uploaded background image with its own scale and
//! position. The spec is read fresh at composite time — the session
//! never caches a background artifact, so the most recently uploaded
//! background is always the one transmitted.

use std::fmt;
use std::ops::RangeInclusive;
use std::rc::Rc;
use std::str::FromStr;

/// Allowed background-image scale factor.
pub const BG_SCALE_RANGE: RangeInclusive<f32> = 0.5..=2.0;

/// Allowed background-image offset per axis, as a fraction of the
/// canvas (0.0 = centered).
pub const BG_OFFSET_RANGE: RangeInclusive<f32> = -1.0..=1.0;

/// Errors from background color parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackgroundError {
    /// A color string was not `#RGB` or `#RRGGBB`.
    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),
}

/// An RGB color parsed from a CSS-style hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor([u8; 3]);

impl HexColor {
    /// White — the default passport background.
    pub const WHITE: Self = Self([0xff, 0xff, 0xff]);

    /// A color from its RGB components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// The RGB components.
    #[must_use]
    pub const fn components(self) -> [u8; 3] {
        self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for HexColor {
    type Err = BackgroundError;

    /// Parse `#RRGGBB` or the `#RGB` short form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || BackgroundError::InvalidColor(s.to_owned());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, ch) in rgb.iter_mut().zip(hex.chars()) {
                    let n = ch.to_digit(16).ok_or_else(invalid)?;
                    #[expect(clippy::cast_possible_truncation)]
                    {
                        *slot = (n * 17) as u8;
                    }
                }
                Ok(Self(rgb))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16);
                let g = u8::from_str_radix(&hex[2..4], 16);
                let b = u8::from_str_radix(&hex[4..6], 16);
                match (r, g, b) {
                    (Ok(r), Ok(g), Ok(b)) => Ok(Self([r, g, b])),
                    _ => Err(invalid()),
                }
            }
            _ => Err(invalid()),
        }
    }
}

/// Preset background colors offered in the composition panel.
pub const BACKGROUND_PRESETS: [(&str, HexColor); 5] = [
    ("White", HexColor::rgb(0xff, 0xff, 0xff)),
    ("Blue", HexColor::rgb(0x02, 0x84, 0xc7)),
    ("Red", HexColor::rgb(0xdc, 0x26, 0x26)),
    ("Gray", HexColor::rgb(0x9c, 0xa3, 0xaf)),
    ("Black", HexColor::rgb(0x00, 0x00, 0x00)),
];

/// An uploaded background image with placement controls.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundImage {
    /// Raw bytes of the uploaded background image.
    pub bytes: Rc<Vec<u8>>,
    /// Scale factor applied to the background before compositing.
    pub scale: f32,
    /// Horizontal offset as a fraction of the canvas.
    pub offset_x: f32,
    /// Vertical offset as a fraction of the canvas.
    pub offset_y: f32,
}

impl BackgroundImage {
    /// Build a background image, clamping placement into range.
    #[must_use]
    pub fn new(bytes: Rc<Vec<u8>>, scale: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            bytes,
            scale: scale.clamp(*BG_SCALE_RANGE.start(), *BG_SCALE_RANGE.end()),
            offset_x: offset_x.clamp(*BG_OFFSET_RANGE.start(), *BG_OFFSET_RANGE.end()),
            offset_y: offset_y.clamp(*BG_OFFSET_RANGE.start(), *BG_OFFSET_RANGE.end()),
        }
    }
}

/// What to composite behind the segmented foreground.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSpec {
    /// A solid fill color.
    Color(HexColor),
    /// A positioned, scaled background photograph.
    Image(BackgroundImage),
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self::Color(HexColor::WHITE)
    }
}
