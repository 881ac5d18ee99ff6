//! Built-in condition glyphs and nearest-neighbor scaling.
//!
//! Each glyph is a 16x16 1-bpp bitmap stored as one `u16` per row, MSB on
//! the left. At draw time the glyph is scaled up to the quarter-width icon
//! box with nearest-neighbor sampling, which keeps the chunky pixel look
//! on the low-color display.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::weather::WeatherCondition;

/// Source glyph side length in pixels.
pub const GLYPH_SIZE: u32 = 16;

/// 1-bpp 16x16 icon bitmap, one `u16` per row, MSB leftmost.
#[derive(Debug, Clone, Copy)]
pub struct IconGlyph {
    rows: [u16; GLYPH_SIZE as usize],
}

impl IconGlyph {
    const fn new(rows: [u16; GLYPH_SIZE as usize]) -> Self {
        Self { rows }
    }

    /// Whether the source pixel at (x, y) is set. Out of range reads as
    /// clear.
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= GLYPH_SIZE || y >= GLYPH_SIZE {
            return false;
        }
        self.rows[y as usize] & (0x8000 >> x) != 0
    }

    /// Draws the glyph scaled to a `target`-pixel square at `top_left`.
    ///
    /// Target pixel (tx, ty) samples source (tx*16/target, ty*16/target),
    /// so any target size works, not just integer multiples.
    pub fn draw_scaled<D>(
        &self,
        display: &mut D,
        top_left: Point,
        target: u32,
        color: Rgb565,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if target == 0 {
            return Ok(());
        }

        let glyph = *self;
        let pixels = (0..target).flat_map(move |ty| {
            (0..target).filter_map(move |tx| {
                let sx = tx * GLYPH_SIZE / target;
                let sy = ty * GLYPH_SIZE / target;
                glyph.pixel(sx, sy).then(|| {
                    Pixel(
                        Point::new(top_left.x + tx as i32, top_left.y + ty as i32),
                        color,
                    )
                })
            })
        });

        display.draw_iter(pixels)
    }
}

pub static SUN: IconGlyph = IconGlyph::new([
    0x0180, 0x0180, 0x2004, 0x1008, 0x07E0, 0x0FF0, 0x1FF8, 0xDFFB, 0xDFFB, 0x1FF8, 0x0FF0,
    0x07E0, 0x1008, 0x2004, 0x0180, 0x0180,
]);

pub static CLOUD: IconGlyph = IconGlyph::new([
    0x0000, 0x0000, 0x0000, 0x0780, 0x0FC0, 0x1FE0, 0x3FF0, 0x7FFC, 0xFFFE, 0xFFFE, 0xFFFE,
    0x7FFC, 0x0000, 0x0000, 0x0000, 0x0000,
]);

pub static SUN_BEHIND_CLOUD: IconGlyph = IconGlyph::new([
    0x0600, 0x0F00, 0x1F80, 0x1F80, 0x1F80, 0x0F00, 0x0600, 0x0000, 0x01E0, 0x03F0, 0x07F8,
    0x0FFC, 0x1FFE, 0x1FFE, 0x0FFC, 0x0000,
]);

pub static RAIN: IconGlyph = IconGlyph::new([
    0x0780, 0x0FC0, 0x1FE0, 0x3FF0, 0x7FFC, 0xFFFE, 0xFFFE, 0x7FFC, 0x0000, 0x4924, 0x4924,
    0x0000, 0x4924, 0x4924, 0x0000, 0x0000,
]);

pub static DRIZZLE: IconGlyph = IconGlyph::new([
    0x0780, 0x0FC0, 0x1FE0, 0x3FF0, 0x7FFC, 0xFFFE, 0xFFFE, 0x7FFC, 0x0000, 0x0000, 0x4924,
    0x0000, 0x0000, 0x2492, 0x0000, 0x0000,
]);

pub static SNOW: IconGlyph = IconGlyph::new([
    0x0780, 0x0FC0, 0x1FE0, 0x3FF0, 0x7FFC, 0xFFFE, 0xFFFE, 0x7FFC, 0x0000, 0x2492, 0x0000,
    0x4924, 0x0000, 0x2492, 0x0000, 0x0000,
]);

pub static FOG: IconGlyph = IconGlyph::new([
    0x0000, 0x0000, 0x3FFC, 0x0000, 0x0000, 0x7FFE, 0x0000, 0x0000, 0x3FFC, 0x0000, 0x0000,
    0x7FFE, 0x0000, 0x0000, 0x3FFC, 0x0000,
]);

pub static STORM: IconGlyph = IconGlyph::new([
    0x0780, 0x0FC0, 0x1FE0, 0x3FF0, 0x7FFC, 0xFFFE, 0xFFFE, 0x7FFC, 0x0300, 0x0600, 0x0FC0,
    0x0180, 0x0300, 0x0600, 0x0400, 0x0000,
]);

/// Glyph and tint for a condition family.
pub fn for_condition(condition: WeatherCondition) -> (&'static IconGlyph, Rgb565) {
    match condition {
        WeatherCondition::Clear => (&SUN, Rgb565::CSS_GOLD),
        WeatherCondition::LightClouds => (&SUN_BEHIND_CLOUD, Rgb565::CSS_LIGHT_GRAY),
        WeatherCondition::Cloudy => (&CLOUD, Rgb565::CSS_GAINSBORO),
        WeatherCondition::Drizzle => (&DRIZZLE, Rgb565::CSS_LIGHT_STEEL_BLUE),
        WeatherCondition::Rain => (&RAIN, Rgb565::CSS_DODGER_BLUE),
        WeatherCondition::Snow => (&SNOW, Rgb565::WHITE),
        WeatherCondition::Fog => (&FOG, Rgb565::CSS_SILVER),
        WeatherCondition::Storm => (&STORM, Rgb565::CSS_ORANGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;

    #[test]
    fn rows_are_msb_leftmost() {
        // Top row of the sun is the two center pixels.
        assert!(SUN.pixel(7, 0));
        assert!(SUN.pixel(8, 0));
        assert!(!SUN.pixel(0, 0));
        assert!(!SUN.pixel(15, 0));
        // Out of range is clear, not a panic.
        assert!(!SUN.pixel(16, 0));
        assert!(!SUN.pixel(0, 16));
    }

    #[test]
    fn scaled_glyph_stays_inside_its_box() {
        let mut fb = FrameBuffer::new();
        SUN.draw_scaled(&mut fb, Point::new(20, 20), 60, Rgb565::CSS_GOLD)
            .unwrap();

        // Center of the disc is lit at the scaled position.
        assert_eq!(fb.pixel_at(20 + 30, 20 + 30), Rgb565::CSS_GOLD);
        // One pixel past the box on every side is untouched.
        for (x, y) in [(19, 50), (80, 50), (50, 19), (50, 80)] {
            assert_eq!(fb.pixel_at(x, y), Rgb565::BLACK);
        }
    }

    #[test]
    fn zero_target_draws_nothing() {
        let mut fb = FrameBuffer::new();
        SUN.draw_scaled(&mut fb, Point::zero(), 0, Rgb565::WHITE)
            .unwrap();
        assert_eq!(fb.pixel_at(0, 0), Rgb565::BLACK);
    }

    #[test]
    fn every_condition_has_a_glyph() {
        for condition in [
            WeatherCondition::Storm,
            WeatherCondition::Drizzle,
            WeatherCondition::Rain,
            WeatherCondition::Snow,
            WeatherCondition::Fog,
            WeatherCondition::Clear,
            WeatherCondition::LightClouds,
            WeatherCondition::Cloudy,
        ] {
            let (glyph, _tint) = for_condition(condition);
            let lit = (0..GLYPH_SIZE)
                .flat_map(|y| (0..GLYPH_SIZE).map(move |x| (x, y)))
                .filter(|&(x, y)| glyph.pixel(x, y))
                .count();
            assert!(lit > 0, "{:?} glyph is empty", condition);
        }
    }
}
