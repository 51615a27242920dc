/// Named color maps handed to the renderer
///
/// Sequential maps run dark to light (low contours dark); `coolwarm` is the
/// diverging map used for two-signed spectra.

use egui::Color32;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMap {
    Red,
    Blue,
    Green,
    Purple,
    Orange,
    Grey,
    LightRed,
    LightBlue,
    Coolwarm,
    #[default]
    Viridis,
}

const RED: [Color32; 5] = [
    Color32::from_rgb(0x67, 0x00, 0x0D),
    Color32::from_rgb(0xCB, 0x18, 0x1D),
    Color32::from_rgb(0xFB, 0x6A, 0x4A),
    Color32::from_rgb(0xFC, 0xBB, 0xA1),
    Color32::from_rgb(0xFF, 0xF5, 0xF0),
];

const BLUE: [Color32; 5] = [
    Color32::from_rgb(0x08, 0x30, 0x6B),
    Color32::from_rgb(0x21, 0x71, 0xB5),
    Color32::from_rgb(0x6B, 0xAE, 0xD6),
    Color32::from_rgb(0xC6, 0xDB, 0xEF),
    Color32::from_rgb(0xF7, 0xFB, 0xFF),
];

const GREEN: [Color32; 5] = [
    Color32::from_rgb(0x00, 0x44, 0x1B),
    Color32::from_rgb(0x23, 0x8B, 0x45),
    Color32::from_rgb(0x74, 0xC4, 0x76),
    Color32::from_rgb(0xC7, 0xE9, 0xC0),
    Color32::from_rgb(0xF7, 0xFC, 0xF5),
];

const PURPLE: [Color32; 5] = [
    Color32::from_rgb(0x3F, 0x00, 0x7D),
    Color32::from_rgb(0x6A, 0x51, 0xA3),
    Color32::from_rgb(0x9E, 0x9A, 0xC8),
    Color32::from_rgb(0xDA, 0xDA, 0xEB),
    Color32::from_rgb(0xFC, 0xFB, 0xFD),
];

const ORANGE: [Color32; 5] = [
    Color32::from_rgb(0x7F, 0x27, 0x04),
    Color32::from_rgb(0xD9, 0x48, 0x01),
    Color32::from_rgb(0xFD, 0x8D, 0x3C),
    Color32::from_rgb(0xFD, 0xD0, 0xA2),
    Color32::from_rgb(0xFF, 0xF5, 0xEB),
];

const GREY: [Color32; 5] = [
    Color32::from_rgb(0x00, 0x00, 0x00),
    Color32::from_rgb(0x52, 0x52, 0x52),
    Color32::from_rgb(0x96, 0x96, 0x96),
    Color32::from_rgb(0xD9, 0xD9, 0xD9),
    Color32::from_rgb(0xFF, 0xFF, 0xFF),
];

const LIGHT_RED: [Color32; 5] = [
    Color32::from_rgb(0x80, 0x00, 0x26),
    Color32::from_rgb(0xE3, 0x1A, 0x1C),
    Color32::from_rgb(0xFD, 0x8D, 0x3C),
    Color32::from_rgb(0xFE, 0xD9, 0x76),
    Color32::from_rgb(0xFF, 0xFF, 0xCC),
];

const LIGHT_BLUE: [Color32; 5] = [
    Color32::from_rgb(0x08, 0x40, 0x81),
    Color32::from_rgb(0x2B, 0x8C, 0xBE),
    Color32::from_rgb(0x7B, 0xCC, 0xC4),
    Color32::from_rgb(0xCC, 0xEB, 0xC5),
    Color32::from_rgb(0xF7, 0xFC, 0xF0),
];

const COOLWARM: [Color32; 5] = [
    Color32::from_rgb(0x3B, 0x4C, 0xC0),
    Color32::from_rgb(0x8D, 0xB0, 0xFE),
    Color32::from_rgb(0xDD, 0xDD, 0xDD),
    Color32::from_rgb(0xF4, 0x9A, 0x7B),
    Color32::from_rgb(0xB4, 0x04, 0x26),
];

const VIRIDIS: [Color32; 5] = [
    Color32::from_rgb(0x44, 0x01, 0x54),
    Color32::from_rgb(0x3B, 0x52, 0x8B),
    Color32::from_rgb(0x21, 0x91, 0x8C),
    Color32::from_rgb(0x5E, 0xC9, 0x62),
    Color32::from_rgb(0xFD, 0xE7, 0x25),
];

impl ColorMap {
    pub const ALL: [ColorMap; 10] = [
        ColorMap::Red,
        ColorMap::Blue,
        ColorMap::Green,
        ColorMap::Purple,
        ColorMap::Orange,
        ColorMap::Grey,
        ColorMap::LightRed,
        ColorMap::LightBlue,
        ColorMap::Coolwarm,
        ColorMap::Viridis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorMap::Red => "red",
            ColorMap::Blue => "blue",
            ColorMap::Green => "green",
            ColorMap::Purple => "purple",
            ColorMap::Orange => "orange",
            ColorMap::Grey => "grey",
            ColorMap::LightRed => "light_red",
            ColorMap::LightBlue => "light_blue",
            ColorMap::Coolwarm => "coolwarm",
            ColorMap::Viridis => "viridis",
        }
    }

    /// Gradient stops from the low end to the high end.
    pub fn stops(&self) -> &'static [Color32] {
        match self {
            ColorMap::Red => &RED,
            ColorMap::Blue => &BLUE,
            ColorMap::Green => &GREEN,
            ColorMap::Purple => &PURPLE,
            ColorMap::Orange => &ORANGE,
            ColorMap::Grey => &GREY,
            ColorMap::LightRed => &LIGHT_RED,
            ColorMap::LightBlue => &LIGHT_BLUE,
            ColorMap::Coolwarm => &COOLWARM,
            ColorMap::Viridis => &VIRIDIS,
        }
    }

    pub fn is_diverging(&self) -> bool {
        *self == ColorMap::Coolwarm
    }

    /// Color at `t` in `[0, 1]`, linearly interpolated between stops.
    pub fn color_at(&self, t: f64) -> Color32 {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - i as f64;
        let (a, b) = (stops[i], stops[i + 1]);
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
        Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
    }
}

impl FromStr for ColorMap {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ColorMap::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| AnalysisError::InvalidColorMap {
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for ColorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
