use serde::{Deserialize, Serialize};

/// RGBA color of a rendered element.
///
/// Stored in configuration files as `"#RRGGBBAA"`. The short `"#RRGGBB"` form is also accepted and
/// means an opaque color.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque white, the default background.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    /// Opaque black, the default outline color.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque light gray.
    pub const GRAY: Self = Self::rgba(170, 170, 170, 255);
    /// Opaque steel blue, the default polygon fill.
    pub const STEEL_BLUE: Self = Self::rgba(70, 130, 180, 255);

    /// Creates a color from its channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels in `[r, g, b, a]` order, as stored in PNG pixels.
    pub fn to_u8_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Formats the color as `#RRGGBBAA`.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_u8_array();
        format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`. Hex digits are case-insensitive.
    pub fn try_from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
            return None;
        }

        let channel =
            |index: usize| u8::from_str_radix(digits.get(index * 2..index * 2 + 2)?, 16).ok();
        let alpha = match digits.len() {
            8 => channel(3)?,
            _ => 255,
        };

        Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, alpha))
    }

    /// Same color with the opacity replaced.
    pub fn with_alpha(&self, a: u8) -> Self {
        Self { a, ..*self }
    }

    /// Returns true if nothing drawn with this color would be visible.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Red channel.
    pub fn r(&self) -> u8 {
        self.r
    }

    /// Green channel.
    pub fn g(&self) -> u8 {
        self.g
    }

    /// Blue channel.
    pub fn b(&self) -> u8 {
        self.b
    }

    /// Alpha channel.
    pub fn a(&self) -> u8 {
        self.a
    }

    pub(crate) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_hex(&value).ok_or_else(|| format!("invalid color: {value:?}"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}
