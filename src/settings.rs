// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The explorer's settings: everything a user can dial in, as one
//! plain value.  Interactions produce a new Settings; renders take a
//! snapshot of it as a RenderRequest.  Nothing here is global.
//!
//! Settings can be saved to and loaded from a JSON file.  Loading is
//! best-effort: a missing or mangled file just means defaults.

use log::{debug, warn};
use num::Complex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::palette::{Palette, DEFAULT_PALETTE};
use crate::planes::{Viewport, DEFAULT_ZOOM, MIN_ZOOM};
use crate::render::RenderRequest;

/// The most iterations a loaded settings file may ask for.
pub const MAX_ITERATIONS: u32 = 5000;

/// How far the constant travels around its circle per morph step, in radians.
pub const MORPH_STEP: f64 = 0.008;

/// Radius used by the morph when the constant is too close to zero to
/// give an interesting circle.
pub const DEFAULT_MORPH_RADIUS: f64 = 0.7885;

/// How far the color pulse advances per step, in radians.
pub const PULSE_STEP: f64 = 0.06;

/// A named Julia constant worth looking at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Preset {
    /// What it's called.
    pub name: &'static str,
    /// Real part of the constant.
    pub re: f64,
    /// Imaginary part of the constant.
    pub im: f64,
}

/// The built-in presets.
pub const PRESETS: [Preset; 8] = [
    Preset {
        name: "Spiral Vortex",
        re: -0.75,
        im: 0.11,
    },
    Preset {
        name: "Lightning Tree",
        re: -0.4,
        im: 0.6,
    },
    Preset {
        name: "Flame Fractal",
        re: 0.285,
        im: 0.01,
    },
    Preset {
        name: "Crystal Dendrite",
        re: -0.8,
        im: 0.156,
    },
    Preset {
        name: "Neon Dragon",
        re: -0.70176,
        im: -0.3842,
    },
    Preset {
        name: "Electric Wave",
        re: -0.7269,
        im: 0.1889,
    },
    Preset {
        name: "Diamond Dust",
        re: 0.3,
        im: 0.5,
    },
    Preset {
        name: "Firework",
        re: -0.54,
        im: 0.54,
    },
];

#[derive(Copy, Clone, Debug, PartialEq)]
struct Morph {
    angle: f64,
    radius: f64,
}

/// Everything that shapes a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Real part of the Julia constant.
    pub c_real: f64,
    /// Imaginary part of the Julia constant.
    pub c_imag: f64,
    /// Iteration limit per pixel.
    pub max_iterations: u32,
    /// Magnification.
    pub zoom: f64,
    /// Real coordinate at the middle of the image.
    pub center_x: f64,
    /// Imaginary coordinate at the middle of the image.
    pub center_y: f64,
    /// Name of a built-in palette.
    pub palette: String,
    /// Binary fill mode; see RenderRequest::shade.
    pub invert: bool,
    /// Whether brightness throbs with the pulse phase.
    pub color_pulse: bool,
    /// Where the pulse is in its cycle.
    pub pulse_phase: f64,
    #[serde(skip)]
    morph: Option<Morph>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            c_real: PRESETS[0].re,
            c_imag: PRESETS[0].im,
            max_iterations: 250,
            zoom: DEFAULT_ZOOM,
            center_x: 0.0,
            center_y: 0.0,
            palette: DEFAULT_PALETTE.to_string(),
            invert: false,
            color_pulse: false,
            pulse_phase: 0.0,
            morph: None,
        }
    }
}

impl Settings {
    /// Read settings from `path`.  Never fails: anything unreadable
    /// yields the defaults, and out-of-range values are pulled back
    /// in line.
    pub fn load<P: AsRef<Path>>(path: P) -> Settings {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(ref e) if e.kind() == ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", path.display());
                return Settings::default();
            }
            Err(e) => {
                warn!("could not read {}: {}; using defaults", path.display(), e);
                return Settings::default();
            }
        };
        match serde_json::from_str::<Settings>(&text) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                warn!("ignoring malformed settings in {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }

    /// Write settings to `path` as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), failure::Error> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Replace anything non-finite, out of range, or unknown with the
    /// default for that field.
    pub fn sanitized(self) -> Settings {
        let defaults = Settings::default();
        let finite_or = |v: f64, d: f64| if v.is_finite() { v } else { d };
        Settings {
            c_real: finite_or(self.c_real, defaults.c_real),
            c_imag: finite_or(self.c_imag, defaults.c_imag),
            max_iterations: num::clamp(self.max_iterations, 1, MAX_ITERATIONS),
            zoom: if self.zoom.is_finite() {
                self.zoom.max(MIN_ZOOM)
            } else {
                defaults.zoom
            },
            center_x: finite_or(self.center_x, 0.0),
            center_y: finite_or(self.center_y, 0.0),
            palette: if Palette::names().any(|n| n == self.palette) {
                self.palette
            } else {
                defaults.palette
            },
            invert: self.invert,
            color_pulse: self.color_pulse,
            pulse_phase: finite_or(self.pulse_phase, 0.0),
            morph: self.morph,
        }
    }

    /// The Julia constant.
    pub fn constant(&self) -> Complex<f64> {
        Complex::new(self.c_real, self.c_imag)
    }

    /// Set the Julia constant.
    pub fn set_constant(&mut self, c: Complex<f64>) {
        self.c_real = c.re;
        self.c_imag = c.im;
    }

    /// The current view.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(Complex::new(self.center_x, self.center_y), self.zoom)
    }

    /// Take on a view, usually one just adjusted by an interaction.
    pub fn set_viewport(&mut self, viewport: &Viewport) {
        self.center_x = viewport.center.re;
        self.center_y = viewport.center.im;
        self.zoom = viewport.zoom;
    }

    fn reset_view(&mut self) {
        self.set_viewport(&Viewport::default());
    }

    /// Jump to preset number `index` with a fresh view.
    pub fn select_preset(&mut self, index: usize) -> Result<()> {
        let preset = PRESETS
            .get(index)
            .ok_or(Error::UnknownPreset(index, PRESETS.len()))?;
        self.c_real = preset.re;
        self.c_imag = preset.im;
        self.reset_view();
        Ok(())
    }

    /// Pick a random constant in the interesting neighborhood of the
    /// origin, with a fresh view.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        let mut re: f64 = rng.gen_range(-1.2, 1.2);
        let mut im: f64 = rng.gen_range(-1.2, 1.2);
        let magnitude = (re * re + im * im).sqrt();
        if magnitude > 1.5 {
            re *= 1.2 / magnitude;
            im *= 1.2 / magnitude;
        }
        self.c_real = re;
        self.c_imag = im;
        self.morph = None;
        self.reset_view();
    }

    /// Start walking the constant around the circle it currently sits on.
    pub fn start_morph(&mut self) {
        let c = self.constant();
        let radius = c.norm();
        self.morph = Some(Morph {
            angle: c.im.atan2(c.re),
            radius: if radius < 0.1 {
                DEFAULT_MORPH_RADIUS
            } else {
                radius
            },
        });
    }

    /// Stop the walk, leaving the constant where it is.
    pub fn stop_morph(&mut self) {
        self.morph = None;
    }

    /// Whether a morph is in progress.
    pub fn is_morphing(&self) -> bool {
        self.morph.is_some()
    }

    /// Advance the walk one step.  Does nothing unless morphing.
    pub fn morph_step(&mut self) {
        if let Some(ref mut morph) = self.morph {
            morph.angle = (morph.angle + MORPH_STEP) % (2.0 * PI);
            let c = Complex::from_polar(&morph.radius, &morph.angle);
            self.c_real = c.re;
            self.c_imag = c.im;
        }
    }

    /// Advance the color pulse.  Does nothing unless pulsing.
    pub fn pulse_step(&mut self) {
        if self.color_pulse {
            self.pulse_phase = (self.pulse_phase + PULSE_STEP) % (2.0 * PI);
        }
    }

    /// The brightness multiplier for the next frame.
    pub fn brightness(&self) -> f64 {
        if self.color_pulse {
            0.75 + 0.5 * self.pulse_phase.sin()
        } else {
            1.0
        }
    }

    /// Move on to the next built-in palette.
    pub fn cycle_palette(&mut self) {
        self.palette = Palette::next_builtin(&self.palette).to_string();
    }

    /// Snapshot these settings as a request for a `width` x `height` frame.
    pub fn to_request(&self, width: usize, height: usize) -> Result<RenderRequest> {
        Ok(RenderRequest {
            width,
            height,
            constant: self.constant(),
            max_iterations: self.max_iterations,
            viewport: self.viewport(),
            palette: Palette::builtin(&self.palette)?,
            invert: self.invert,
            brightness: self.brightness(),
        })
    }
}
