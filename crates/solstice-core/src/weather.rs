//! The cached weather snapshot and condition-id mapping.

use core::fmt::Write;

use heapless::String;
use serde::{Deserialize, Serialize};

/// Last-received weather snapshot, cached for the face.
///
/// Overwritten wholesale each time the sync receiver accepts a change
/// event; the renderer only ever reads it. Fields that were never synced
/// render as placeholders.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct WeatherPrefs {
    /// Forecast high in degrees Celsius.
    pub high_temp: Option<f32>,
    /// Forecast low in degrees Celsius.
    pub low_temp: Option<f32>,
    /// Provider condition identifier (OpenWeatherMap-style ranges).
    pub condition_id: Option<u32>,
}

impl WeatherPrefs {
    /// Condition family for icon selection. An absent id falls back to
    /// clear, which matches a face that has never received a sync.
    pub fn condition(&self) -> WeatherCondition {
        self.condition_id
            .map(WeatherCondition::from_id)
            .unwrap_or(WeatherCondition::Clear)
    }
}

/// Formats a temperature as whole degrees (`"24°"`), or `"-°"` when the
/// value has never been synced.
pub fn temperature_text(celsius: Option<f32>) -> String<8> {
    let mut out = String::new();
    match celsius {
        Some(c) => {
            write!(out, "{}\u{b0}", round_degrees(c)).ok();
        }
        None => {
            out.push_str("-\u{b0}").ok();
        }
    }
    out
}

fn round_degrees(celsius: f32) -> i32 {
    if celsius >= 0.0 {
        (celsius + 0.5) as i32
    } else {
        (celsius - 0.5) as i32
    }
}

/// Condition families the face can draw an icon for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Storm,
    Drizzle,
    Rain,
    Snow,
    Fog,
    Clear,
    LightClouds,
    Cloudy,
}

impl WeatherCondition {
    /// Maps a provider condition id to its icon family.
    ///
    /// Ranges follow the OpenWeatherMap grouping the paired handheld
    /// reports. Unknown ids fall back to clear.
    pub fn from_id(id: u32) -> Self {
        match id {
            200..=232 => Self::Storm,
            300..=321 => Self::Drizzle,
            500..=504 | 520..=531 => Self::Rain,
            511 | 600..=622 => Self::Snow,
            701..=761 => Self::Fog,
            762 | 771 | 781 => Self::Storm,
            800 => Self::Clear,
            801 => Self::LightClouds,
            802..=804 => Self::Cloudy,
            _ => Self::Clear,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Storm => "Storm",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
            Self::Clear => "Clear",
            Self::LightClouds => "Light Clouds",
            Self::Cloudy => "Cloudy",
        }
    }
}
