//! Font roles used on the face.
//!
//! Fonts come from the `iso_8859_1` tables so the degree sign renders.

use embedded_graphics::mono_font::{MonoFont, iso_8859_1};

/// Text roles on the face, each pinned to one mono font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceFont {
    /// Hour digits, bold.
    HourBold,
    /// Minute digits.
    Minute,
    /// Date line.
    Date,
    /// High temperature, bold.
    TempBold,
    /// Low temperature.
    Temp,
}

impl FaceFont {
    pub const fn font(self) -> &'static MonoFont<'static> {
        match self {
            Self::HourBold => &iso_8859_1::FONT_9X18_BOLD,
            Self::Minute => &iso_8859_1::FONT_9X18,
            Self::Date => &iso_8859_1::FONT_6X10,
            Self::TempBold => &iso_8859_1::FONT_7X13_BOLD,
            Self::Temp => &iso_8859_1::FONT_7X13,
        }
    }

    /// Pixel width of `text` in this font; the measured-width input to the
    /// centering math.
    pub fn measure(self, text: &str) -> u32 {
        let font = self.font();
        let glyphs = text.chars().count() as u32;
        glyphs * (font.character_size.width + font.character_spacing)
    }
}
