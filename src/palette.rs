// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Palettes map a value between zero and one to a color.  A palette
//! is a list of stops, each pinning a color to a position; anything
//! between two stops is blended with a smoothstep curve so that the
//! bands ease into each other rather than meeting at a visible seam.

use num::clamp;

use crate::error::{Error, Result};

/// An RGB triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Pure black, the background of the set.
    pub const BLACK: Color = Color(0, 0, 0);

    fn channels(self) -> [f64; 3] {
        [f64::from(self.0), f64::from(self.1), f64::from(self.2)]
    }

    fn from_channels(channels: [f64; 3], brightness: f64) -> Self {
        let c = |v: f64| clamp(v * brightness, 0.0, 255.0) as u8;
        Color(c(channels[0]), c(channels[1]), c(channels[2]))
    }
}

/// A color pinned to a position in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stop {
    /// Where along the palette this color sits.
    pub position: f64,
    /// The color at exactly that position.
    pub color: Color,
}

impl Stop {
    /// Convenience constructor.
    pub fn new(position: f64, color: Color) -> Self {
        Stop { position, color }
    }
}

type StopTable = &'static [(f64, u8, u8, u8)];

const BUILTINS: &[(&str, StopTable)] = &[
    (
        "electric-dreams",
        &[
            (0.0, 0, 0, 0),
            (0.15, 20, 0, 40),
            (0.33, 255, 0, 110),
            (0.55, 0, 240, 255),
            (0.78, 181, 55, 242),
            (0.95, 255, 255, 255),
            (1.0, 0, 0, 0),
        ],
    ),
    (
        "acid-trip",
        &[
            (0.0, 0, 0, 0),
            (0.2, 57, 255, 20),
            (0.45, 255, 0, 110),
            (0.65, 255, 255, 0),
            (0.85, 57, 255, 20),
            (1.0, 0, 0, 0),
        ],
    ),
    (
        "cyber-sunset",
        &[
            (0.0, 10, 0, 20),
            (0.25, 74, 20, 140),
            (0.5, 233, 30, 99),
            (0.75, 255, 111, 0),
            (0.9, 255, 200, 50),
            (1.0, 10, 0, 20),
        ],
    ),
    (
        "toxic-waste",
        &[
            (0.0, 0, 0, 0),
            (0.2, 0, 40, 0),
            (0.45, 0, 255, 65),
            (0.65, 204, 255, 0),
            (0.85, 0, 255, 65),
            (1.0, 0, 0, 0),
        ],
    ),
    (
        "laser-show",
        &[
            (0.0, 0, 0, 0),
            (0.17, 255, 0, 0),
            (0.33, 255, 255, 0),
            (0.5, 0, 255, 0),
            (0.67, 0, 255, 255),
            (0.83, 0, 0, 255),
            (1.0, 0, 0, 0),
        ],
    ),
    (
        "blacklight",
        &[
            (0.0, 0, 0, 10),
            (0.2, 30, 0, 60),
            (0.45, 191, 0, 255),
            (0.65, 0, 255, 255),
            (0.85, 255, 255, 255),
            (1.0, 0, 0, 10),
        ],
    ),
];

/// The palette used when nothing else is asked for.
pub const DEFAULT_PALETTE: &str = "electric-dreams";

/// An ordered, read-only list of stops.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    name: String,
    stops: Vec<Stop>,
}

impl Palette {
    /// Build a palette.  There must be at least one stop, every
    /// position must lie in [0, 1], and positions may repeat (a hard
    /// edge) but never go backwards.
    pub fn new<S: Into<String>>(name: S, stops: Vec<Stop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::InvalidPalette("a palette needs at least one stop".to_string()));
        }
        if let Some(stop) = stops
            .iter()
            .find(|s| !(s.position >= 0.0 && s.position <= 1.0))
        {
            return Err(Error::InvalidPalette(format!(
                "stop position {} is outside [0, 1]",
                stop.position
            )));
        }
        if stops.windows(2).any(|w| w[1].position < w[0].position) {
            return Err(Error::InvalidPalette(
                "stop positions must not decrease".to_string(),
            ));
        }
        Ok(Palette {
            name: name.into(),
            stops,
        })
    }

    /// Look up one of the built-in palettes by name.
    pub fn builtin(name: &str) -> Result<Self> {
        let (name, table) = BUILTINS
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| Error::UnknownPalette(name.to_string()))?;
        let stops = table
            .iter()
            .map(|&(p, r, g, b)| Stop::new(p, Color(r, g, b)))
            .collect();
        Palette::new(*name, stops)
    }

    /// The names of the built-in palettes, in their canonical order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        BUILTINS.iter().map(|(n, _)| *n)
    }

    /// The built-in palette after `name`, wrapping at the end.  An
    /// unknown name starts the cycle over.
    pub fn next_builtin(name: &str) -> &'static str {
        let position = Palette::names().position(|n| n == name);
        let next = position.map_or(0, |i| (i + 1) % BUILTINS.len());
        BUILTINS[next].0
    }

    /// This palette's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stops, in order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// The color at position `t`, scaled by `brightness`.
    ///
    /// `t` is clamped to [0, 1] and anything before the first stop or
    /// after the last takes that stop's color.  NaN is read as zero.
    pub fn color_at(&self, t: f64, brightness: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { clamp(t, 0.0, 1.0) };
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];

        if t <= first.position {
            return Color::from_channels(first.color.channels(), brightness);
        }
        if t >= last.position {
            return Color::from_channels(last.color.channels(), brightness);
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t < a.position || t > b.position {
                continue;
            }
            let span = b.position - a.position;
            if span <= 0.0 {
                return Color::from_channels(a.color.channels(), brightness);
            }
            let local = (t - a.position) / span;
            let eased = local * local * (3.0 - 2.0 * local);
            let (from, to) = (a.color.channels(), b.color.channels());
            let mut blended = [0.0; 3];
            for i in 0..3 {
                blended[i] = from[i] + (to[i] - from[i]) * eased;
            }
            return Color::from_channels(blended, brightness);
        }

        Color::from_channels(last.color.channels(), brightness)
    }
}

impl Default for Palette {
    fn default() -> Self {
        let (name, table) = BUILTINS[0];
        Palette {
            name: name.to_string(),
            stops: table
                .iter()
                .map(|&(p, r, g, b)| Stop::new(p, Color(r, g, b)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_gap(a: Color, b: Color) -> u8 {
        let d = |x: u8, y: u8| if x > y { x - y } else { y - x };
        d(a.0, b.0).max(d(a.1, b.1)).max(d(a.2, b.2))
    }

    #[test]
    fn every_builtin_loads() {
        for name in Palette::names() {
            let palette = Palette::builtin(name).unwrap();
            assert_eq!(palette.name(), name);
        }
        assert_eq!(Palette::default(), Palette::builtin(DEFAULT_PALETTE).unwrap());
    }

    #[test]
    fn unknown_builtin_is_an_error() {
        assert_eq!(
            Palette::builtin("mauve").unwrap_err(),
            Error::UnknownPalette("mauve".to_string())
        );
    }

    #[test]
    fn stops_are_hit_exactly() {
        for name in Palette::names() {
            let palette = Palette::builtin(name).unwrap();
            for stop in palette.stops() {
                assert_eq!(
                    palette.color_at(stop.position, 1.0),
                    stop.color,
                    "{} at {}",
                    name,
                    stop.position
                );
            }
        }
    }

    #[test]
    fn out_of_range_values_clamp_to_the_end_stops() {
        let palette = Palette::new(
            "inset",
            vec![
                Stop::new(0.2, Color(10, 20, 30)),
                Stop::new(0.8, Color(200, 100, 50)),
            ],
        )
        .unwrap();
        assert_eq!(palette.color_at(0.0, 1.0), Color(10, 20, 30));
        assert_eq!(palette.color_at(-3.0, 1.0), Color(10, 20, 30));
        assert_eq!(palette.color_at(std::f64::NAN, 1.0), Color(10, 20, 30));
        assert_eq!(palette.color_at(0.9, 1.0), Color(200, 100, 50));
        assert_eq!(palette.color_at(7.0, 1.0), Color(200, 100, 50));
    }

    #[test]
    fn midpoint_is_halfway_between_stops() {
        let palette = Palette::new(
            "ramp",
            vec![Stop::new(0.0, Color::BLACK), Stop::new(1.0, Color(200, 100, 50))],
        )
        .unwrap();
        assert_eq!(palette.color_at(0.5, 1.0), Color(100, 50, 25));
        // Smoothstep eases in: a quarter of the way is well under a quarter of the color.
        assert!(palette.color_at(0.25, 1.0).0 < 50);
    }

    #[test]
    fn colors_change_continuously() {
        for name in Palette::names() {
            let palette = Palette::builtin(name).unwrap();
            let mut previous = palette.color_at(0.0, 1.0);
            for i in 1..=100_000 {
                let color = palette.color_at(f64::from(i) / 100_000.0, 1.0);
                assert!(channel_gap(previous, color) <= 2, "{} jumps near {}", name, i);
                previous = color;
            }
        }
    }

    #[test]
    fn hard_stops_are_allowed_and_snap() {
        let palette = Palette::new(
            "split",
            vec![
                Stop::new(0.0, Color::BLACK),
                Stop::new(0.5, Color::BLACK),
                Stop::new(0.5, Color(255, 255, 255)),
                Stop::new(1.0, Color(255, 255, 255)),
            ],
        )
        .unwrap();
        assert_eq!(palette.color_at(0.4999, 1.0), Color::BLACK);
        assert_eq!(palette.color_at(0.5001, 1.0), Color(255, 255, 255));
    }

    #[test]
    fn brightness_scales_and_saturates() {
        let palette = Palette::builtin("blacklight").unwrap();
        assert_eq!(palette.color_at(0.85, 1.25), Color(255, 255, 255));
        assert_eq!(palette.color_at(0.85, 0.5), Color(127, 127, 127));
        assert_eq!(palette.color_at(0.85, 0.0), Color::BLACK);
    }

    #[test]
    fn bad_palettes_are_rejected() {
        assert!(Palette::new("empty", vec![]).is_err());
        assert!(Palette::new("high", vec![Stop::new(1.5, Color::BLACK)]).is_err());
        assert!(Palette::new("nan", vec![Stop::new(std::f64::NAN, Color::BLACK)]).is_err());
        assert!(Palette::new(
            "backwards",
            vec![Stop::new(0.6, Color::BLACK), Stop::new(0.4, Color::BLACK)]
        )
        .is_err());
    }

    #[test]
    fn next_builtin_cycles() {
        let names: Vec<_> = Palette::names().collect();
        assert_eq!(Palette::next_builtin(names[0]), names[1]);
        assert_eq!(Palette::next_builtin(names[names.len() - 1]), names[0]);
        assert_eq!(Palette::next_builtin("nonsense"), names[0]);
    }
}
