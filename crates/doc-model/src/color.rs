//! Element colors.
//!
//! Elements keep the user's hex string (`#rrggbb`); this type is what the
//! exporter resolves it into.

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color {0:?}")]
pub struct ColorParseError(pub String);

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    /// Create an opaque color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or the short `#rgb` form. The leading `#` is optional.
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let hex = value.trim().trim_start_matches('#');
        let err = || ColorParseError(value.to_owned());

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());

        match hex.len() {
            6 if hex.is_ascii() => {
                Ok(Self::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?))
            }
            3 if hex.is_ascii() => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            _ => Err(err()),
        }
    }

    /// Convert to normalized RGBA values (0.0 to 1.0)
    pub fn to_normalized(&self) -> (f32, f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        )
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Color::from_hex("#FF0000"), Ok(Color::RED));
        assert_eq!(Color::from_hex("00f"), Ok(Color::BLUE));
        assert_eq!(Color::from_hex("#ff8c00").map(|c| c.to_hex()), Ok("#ff8c00".to_owned()));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::from_hex("red").is_err());
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
    }

    #[test]
    fn normalizes_channels() {
        let (r, g, b, a) = Color::RED.to_normalized();
        assert_eq!((r, g, b, a), (1.0, 0.0, 0.0, 1.0));
    }
}
