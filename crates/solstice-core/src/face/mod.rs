//! The watch face: time, date, and cached weather laid out on the display.
//!
//! The face is a single [`Drawable`] that repaints whole frames. Dirty
//! tracking lives here so the owner only pushes pixels when the rendered
//! state actually changed.

pub mod fonts;
pub mod icons;
pub mod layout;

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Text;

use crate::clock::CivilDateTime;
use crate::config::FaceConfig;
use crate::ui::core::{Drawable, TouchEvent};
use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};
use crate::weather::{WeatherPrefs, temperature_text};
use fonts::FaceFont;
use layout::FaceMetrics;

/// Everything a single frame depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    pub time: CivilDateTime,
    pub ambient: bool,
    pub low_bit_ambient: bool,
    pub weather: WeatherPrefs,
}

/// Face colors for the interactive mode.
#[derive(Debug, Clone, Copy)]
pub struct FacePalette {
    pub background: Rgb565,
    pub text: Rgb565,
    pub text_secondary: Rgb565,
}

impl Default for FacePalette {
    fn default() -> Self {
        Self {
            // Material light blue 500.
            background: Rgb565::new(0, 42, 30),
            text: Rgb565::WHITE,
            text_secondary: Rgb565::CSS_LIGHT_GRAY,
        }
    }
}

/// The watch face element.
pub struct WatchFace {
    bounds: Rectangle,
    metrics: FaceMetrics,
    palette: FacePalette,
    state: Option<DisplayState>,
    dirty: bool,
}

impl WatchFace {
    pub fn new(config: &FaceConfig) -> Self {
        Self {
            bounds: Rectangle::new(
                Point::zero(),
                Size::new(u32::from(DISPLAY_WIDTH_PX), u32::from(DISPLAY_HEIGHT_PX)),
            ),
            metrics: FaceMetrics::for_shape(config.shape),
            palette: FacePalette::default(),
            state: None,
            dirty: true,
        }
    }

    /// Replaces the rendered state. Marks the face dirty only when the new
    /// state differs from the last one drawn.
    pub fn set_state(&mut self, state: DisplayState) {
        if self.state != Some(state) {
            self.state = Some(state);
            self.dirty = true;
        }
    }

    pub fn state(&self) -> Option<&DisplayState> {
        self.state.as_ref()
    }

    /// A tap anywhere on the face forces a repaint.
    pub fn handle_tap(&mut self, _event: TouchEvent) {
        self.dirty = true;
    }

    fn secondary_color(&self, state: &DisplayState) -> Rgb565 {
        // Low-bit ambient displays cannot hold the dimmed shade.
        if state.ambient && state.low_bit_ambient {
            self.palette.text
        } else {
            self.palette.text_secondary
        }
    }

    fn draw_time<D>(&self, display: &mut D, state: &DisplayState) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let hour = state.time.hour_text();
        let minute = state.time.minute_text();
        let hour_w = FaceFont::HourBold.measure(&hour);
        let minute_w = FaceFont::Minute.measure(&minute);
        let (hour_x, minute_x) =
            layout::time_row_x(u32::from(DISPLAY_WIDTH_PX), hour_w, minute_w);

        let baseline = self.metrics.y_offset;
        EgDrawable::draw(
            &Text::new(
                &hour,
                Point::new(hour_x, baseline),
                MonoTextStyle::new(FaceFont::HourBold.font(), self.palette.text),
            ),
            display,
        )?;
        EgDrawable::draw(
            &Text::new(
                &minute,
                Point::new(minute_x, baseline),
                MonoTextStyle::new(FaceFont::Minute.font(), self.palette.text),
            ),
            display,
        )?;
        Ok(())
    }

    fn draw_date<D>(&self, display: &mut D, state: &DisplayState) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let date = state.time.date_text();
        let x = layout::centered_x(u32::from(DISPLAY_WIDTH_PX), FaceFont::Date.measure(&date));
        EgDrawable::draw(
            &Text::new(
                &date,
                Point::new(x, self.metrics.date_baseline()),
                MonoTextStyle::new(FaceFont::Date.font(), self.secondary_color(state)),
            ),
            display,
        )?;
        Ok(())
    }

    fn draw_weather<D>(&self, display: &mut D, state: &DisplayState) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let baseline = self.metrics.weather_baseline();
        let width = u32::from(DISPLAY_WIDTH_PX);

        let (glyph, tint) = icons::for_condition(state.weather.condition());
        let box_px = layout::icon_box(width);
        glyph.draw_scaled(
            display,
            Point::new(
                layout::icon_x(width, box_px),
                layout::icon_top(baseline, box_px),
            ),
            box_px,
            tint,
        )?;

        let high = temperature_text(state.weather.high_temp);
        let high_x = layout::centered_x(width, FaceFont::TempBold.measure(&high));
        EgDrawable::draw(
            &Text::new(
                &high,
                Point::new(high_x, baseline),
                MonoTextStyle::new(FaceFont::TempBold.font(), self.palette.text),
            ),
            display,
        )?;

        let low = temperature_text(state.weather.low_temp);
        EgDrawable::draw(
            &Text::new(
                &low,
                Point::new(layout::low_temp_x(high_x), baseline),
                MonoTextStyle::new(FaceFont::Temp.font(), self.secondary_color(state)),
            ),
            display,
        )?;
        Ok(())
    }
}

impl Drawable for WatchFace {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let Some(state) = self.state else {
            return display.clear(Rgb565::BLACK);
        };

        // Ambient frames burn as little of the panel as possible.
        let background = if state.ambient {
            Rgb565::BLACK
        } else {
            self.palette.background
        };
        display.clear(background)?;

        self.draw_time(display, &state)?;
        self.draw_date(display, &state)?;
        if !state.ambient {
            self.draw_weather(display, &state)?;
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FaceShape;
    use crate::framebuffer::FrameBuffer;
    use crate::ui::core::TouchPoint;

    fn state_at(epoch_secs: i64, ambient: bool) -> DisplayState {
        DisplayState {
            time: CivilDateTime::from_epoch(epoch_secs, 0),
            ambient,
            low_bit_ambient: false,
            weather: WeatherPrefs {
                high_temp: Some(25.0),
                low_temp: Some(16.0),
                condition_id: Some(800),
            },
        }
    }

    fn count_colored(fb: &FrameBuffer, region: Rectangle, background: Rgb565) -> usize {
        let mut n = 0;
        for y in 0..region.size.height {
            for x in 0..region.size.width {
                let px = fb.pixel_at(
                    region.top_left.x as u32 + x,
                    region.top_left.y as u32 + y,
                );
                if px != background {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn interactive_frame_has_weather_row() {
        let mut face = WatchFace::new(&FaceConfig::default());
        face.set_state(state_at(1_500_000_000, false));

        let mut fb = FrameBuffer::new();
        face.draw(&mut fb).unwrap();

        assert_eq!(fb.pixel_at(0, 0), FacePalette::default().background);

        let baseline = face.metrics.weather_baseline();
        let row = Rectangle::new(
            Point::new(0, baseline - 60),
            Size::new(u32::from(DISPLAY_WIDTH_PX), 64),
        );
        assert!(count_colored(&fb, row, FacePalette::default().background) > 0);
    }

    #[test]
    fn ambient_frame_is_black_with_no_weather() {
        let mut face = WatchFace::new(&FaceConfig::default());
        face.set_state(state_at(1_500_000_000, true));

        let mut fb = FrameBuffer::new();
        face.draw(&mut fb).unwrap();

        assert_eq!(fb.pixel_at(0, 0), Rgb565::BLACK);

        let baseline = face.metrics.weather_baseline();
        let row = Rectangle::new(
            Point::new(0, baseline - 60),
            Size::new(u32::from(DISPLAY_WIDTH_PX), 64),
        );
        assert_eq!(count_colored(&fb, row, Rgb565::BLACK), 0);
    }

    #[test]
    fn unchanged_state_does_not_mark_dirty() {
        let mut face = WatchFace::new(&FaceConfig::default());
        let state = state_at(1_500_000_000, false);

        face.set_state(state);
        face.mark_clean();
        face.set_state(state);
        assert!(!face.is_dirty());

        face.set_state(state_at(1_500_000_060, false));
        assert!(face.is_dirty());
    }

    #[test]
    fn tap_forces_a_repaint() {
        let mut face = WatchFace::new(&FaceConfig::default());
        face.set_state(state_at(1_500_000_000, false));
        face.mark_clean();

        face.handle_tap(TouchEvent::Press(TouchPoint::new(120, 120)));
        assert!(face.is_dirty());
    }

    #[test]
    fn low_bit_ambient_date_is_full_white() {
        let mut face = WatchFace::new(&FaceConfig::default());
        let mut state = state_at(1_500_000_000, true);
        state.low_bit_ambient = true;
        face.set_state(state);

        let mut fb = FrameBuffer::new();
        face.draw(&mut fb).unwrap();

        let baseline = face.metrics.date_baseline();
        let row = Rectangle::new(
            Point::new(0, baseline - 12),
            Size::new(u32::from(DISPLAY_WIDTH_PX), 16),
        );
        // Every lit date pixel is pure white in low-bit ambient.
        for y in 0..row.size.height {
            for x in 0..row.size.width {
                let px = fb.pixel_at(row.top_left.x as u32 + x, row.top_left.y as u32 + y);
                assert!(px == Rgb565::BLACK || px == Rgb565::WHITE);
            }
        }
        assert!(count_colored(&fb, row, Rgb565::BLACK) > 0);
    }

    #[test]
    fn round_face_uses_inset_metrics() {
        let square = WatchFace::new(&FaceConfig::default());
        let round = WatchFace::new(&FaceConfig {
            shape: FaceShape::Round,
            ..FaceConfig::default()
        });
        assert!(round.metrics.y_offset > square.metrics.y_offset);
    }
}
