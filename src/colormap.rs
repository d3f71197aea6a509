//! Sequential colormaps and the annotation contrast rule.

use crate::error::PlotError;
use plotters::style::{RGBColor, BLACK, WHITE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sequential color schemes, low values light and high values dark
/// (except viridis, which runs dark to light).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Blues,
    Greens,
    Oranges,
    Reds,
    Greys,
    Purples,
    Viridis,
}

// ColorBrewer 9-class sequential stops
const BLUES: [RGBColor; 9] = [
    RGBColor(247, 251, 255),
    RGBColor(222, 235, 247),
    RGBColor(198, 219, 239),
    RGBColor(158, 202, 225),
    RGBColor(107, 174, 214),
    RGBColor(66, 146, 198),
    RGBColor(33, 113, 181),
    RGBColor(8, 81, 156),
    RGBColor(8, 48, 107),
];

const GREENS: [RGBColor; 9] = [
    RGBColor(247, 252, 245),
    RGBColor(229, 245, 224),
    RGBColor(199, 233, 192),
    RGBColor(161, 217, 155),
    RGBColor(116, 196, 118),
    RGBColor(65, 171, 93),
    RGBColor(35, 139, 69),
    RGBColor(0, 109, 44),
    RGBColor(0, 68, 27),
];

const ORANGES: [RGBColor; 9] = [
    RGBColor(255, 245, 235),
    RGBColor(254, 230, 206),
    RGBColor(253, 208, 162),
    RGBColor(253, 174, 107),
    RGBColor(253, 141, 60),
    RGBColor(241, 105, 19),
    RGBColor(217, 72, 1),
    RGBColor(166, 54, 3),
    RGBColor(127, 39, 4),
];

const REDS: [RGBColor; 9] = [
    RGBColor(255, 245, 240),
    RGBColor(254, 224, 210),
    RGBColor(252, 187, 161),
    RGBColor(252, 146, 114),
    RGBColor(251, 106, 74),
    RGBColor(239, 59, 44),
    RGBColor(203, 24, 29),
    RGBColor(165, 15, 21),
    RGBColor(103, 0, 13),
];

const GREYS: [RGBColor; 9] = [
    RGBColor(255, 255, 255),
    RGBColor(240, 240, 240),
    RGBColor(217, 217, 217),
    RGBColor(189, 189, 189),
    RGBColor(150, 150, 150),
    RGBColor(115, 115, 115),
    RGBColor(82, 82, 82),
    RGBColor(37, 37, 37),
    RGBColor(0, 0, 0),
];

const PURPLES: [RGBColor; 9] = [
    RGBColor(252, 251, 253),
    RGBColor(239, 237, 245),
    RGBColor(218, 218, 235),
    RGBColor(188, 189, 220),
    RGBColor(158, 154, 200),
    RGBColor(128, 125, 186),
    RGBColor(106, 81, 163),
    RGBColor(84, 39, 143),
    RGBColor(63, 0, 125),
];

const VIRIDIS: [RGBColor; 9] = [
    RGBColor(68, 1, 84),
    RGBColor(71, 45, 123),
    RGBColor(59, 82, 139),
    RGBColor(44, 114, 142),
    RGBColor(33, 145, 140),
    RGBColor(40, 174, 128),
    RGBColor(94, 201, 98),
    RGBColor(173, 220, 48),
    RGBColor(253, 231, 37),
];

impl Colormap {
    pub const ALL: [Colormap; 7] = [
        Colormap::Blues,
        Colormap::Greens,
        Colormap::Oranges,
        Colormap::Reds,
        Colormap::Greys,
        Colormap::Purples,
        Colormap::Viridis,
    ];

    pub const NAMES: [&'static str; 7] = [
        "blues", "greens", "oranges", "reds", "greys", "purples", "viridis",
    ];

    pub fn name(self) -> &'static str {
        match self {
            Colormap::Blues => "blues",
            Colormap::Greens => "greens",
            Colormap::Oranges => "oranges",
            Colormap::Reds => "reds",
            Colormap::Greys => "greys",
            Colormap::Purples => "purples",
            Colormap::Viridis => "viridis",
        }
    }

    fn stops(self) -> &'static [RGBColor] {
        match self {
            Colormap::Blues => &BLUES,
            Colormap::Greens => &GREENS,
            Colormap::Oranges => &ORANGES,
            Colormap::Reds => &REDS,
            Colormap::Greys => &GREYS,
            Colormap::Purples => &PURPLES,
            Colormap::Viridis => &VIRIDIS,
        }
    }

    /// Color at position `t` in `[0, 1]` (clamped), interpolated between stops
    pub fn sample(self, t: f64) -> RGBColor {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lower as f64;

        let RGBColor(r0, g0, b0) = stops[lower];
        let RGBColor(r1, g1, b1) = stops[lower + 1];
        RGBColor(lerp(r0, r1, frac), lerp(g0, g1, frac), lerp(b0, b1, frac))
    }

    /// Color for `value`, scaled linearly between `min` and `max`.
    /// A flat range maps everything to the low end.
    pub fn color_for(self, value: f64, min: f64, max: f64) -> RGBColor {
        let span = max - min;
        let t = if span > 0.0 { (value - min) / span } else { 0.0 };
        self.sample(t)
    }
}

fn lerp(a: u8, b: u8, frac: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * frac).round() as u8
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        // Accept both spellings of grey
        let wanted = if wanted == "grays" { "greys" } else { wanted.as_str() };

        Colormap::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| PlotError::UnknownColormap(s.to_string()))
    }
}

/// Annotation text color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    White,
    Black,
}

impl TextColor {
    /// White above `threshold`, black at or below it
    pub fn for_value(value: f64, threshold: f64) -> Self {
        if value > threshold {
            TextColor::White
        } else {
            TextColor::Black
        }
    }

    pub fn rgb(self) -> RGBColor {
        match self {
            TextColor::White => WHITE,
            TextColor::Black => BLACK,
        }
    }
}
