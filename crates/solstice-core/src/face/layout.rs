//! Face layout math.
//!
//! The face is three rows hung off one baseline: time, date two line
//! heights below, and the weather row six below. Horizontal placement is
//! measured-width centering; the weather row keeps the hand-tuned ratios
//! (icon centered in the left third, low temperature at 1.6x the centered
//! high position).

use crate::config::FaceShape;

/// Per-shape vertical metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMetrics {
    /// Baseline of the time row.
    pub y_offset: i32,
    /// Vertical rhythm unit between rows.
    pub line_height: i32,
}

impl FaceMetrics {
    /// Round faces push content down and tighten the rhythm so nothing
    /// clips against the bezel.
    pub const fn for_shape(shape: FaceShape) -> Self {
        match shape {
            FaceShape::Square => Self {
                y_offset: 72,
                line_height: 18,
            },
            FaceShape::Round => Self {
                y_offset: 84,
                line_height: 16,
            },
        }
    }

    pub const fn date_baseline(&self) -> i32 {
        self.y_offset + self.line_height * 2
    }

    pub const fn weather_baseline(&self) -> i32 {
        self.y_offset + self.line_height * 6
    }
}

/// X position that centers a run of `width` pixels on the display.
pub const fn centered_x(display_width: u32, width: u32) -> i32 {
    (display_width as i32 - width as i32) / 2
}

/// X positions for the hour and minute runs: the combined string is
/// centered, the minute starts where the hour ends.
pub fn time_row_x(display_width: u32, hour_width: u32, minute_width: u32) -> (i32, i32) {
    let hour_x = centered_x(display_width, hour_width + minute_width);
    (hour_x, hour_x + hour_width as i32)
}

/// Side length of the condition icon box: one quarter of the display
/// width.
pub const fn icon_box(display_width: u32) -> u32 {
    display_width / 4
}

/// X position of the icon, centered in the left third of the row
/// (`(width / 3) / 1.5` to the icon midpoint).
pub const fn icon_x(display_width: u32, icon_width: u32) -> i32 {
    display_width as i32 * 2 / 9 - icon_width as i32 / 2
}

/// Top edge of the icon: the box hangs two thirds above the row baseline.
pub const fn icon_top(weather_baseline: i32, icon_height: u32) -> i32 {
    weather_baseline - icon_height as i32 * 2 / 3
}

/// X position of the low temperature, 1.6x the centered high position.
pub const fn low_temp_x(high_x: i32) -> i32 {
    high_x * 8 / 5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_runs_are_symmetric() {
        let (hour_x, minute_x) = time_row_x(240, 27, 18);
        assert_eq!(hour_x, (240 - 45) / 2);
        assert_eq!(minute_x, hour_x + 27);
        // Equal margins on both sides.
        assert_eq!(hour_x, 240 - (minute_x + 18));
    }

    #[test]
    fn icon_box_is_a_quarter_of_the_width() {
        assert_eq!(icon_box(240), 60);
        assert_eq!(icon_box(320), 80);
    }

    #[test]
    fn weather_row_positions_keep_the_tuned_ratios() {
        let box_px = icon_box(240);
        assert_eq!(icon_x(240, box_px), 240 * 2 / 9 - 30);
        assert_eq!(icon_top(180, box_px), 180 - 40);
        assert_eq!(low_temp_x(100), 160);
    }

    #[test]
    fn round_metrics_inset_the_content() {
        let square = FaceMetrics::for_shape(FaceShape::Square);
        let round = FaceMetrics::for_shape(FaceShape::Round);
        assert!(round.y_offset > square.y_offset);
        assert_eq!(square.date_baseline(), square.y_offset + 36);
        assert_eq!(square.weather_baseline(), square.y_offset + 108);
    }
}
