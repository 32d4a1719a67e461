#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Julia set renderer
//!
//! A Julia set is the family portrait of a single complex constant
//! `c`.  Every point `z` on the plane is repeatedly squared and has
//! `c` added to it; most points fly off to infinity, and how quickly
//! they do so is the number we use to color them.  The points that
//! never leave form the set itself, which for some constants is a
//! solid blob, for others a tangle of spirals, and for most a fine
//! dust.
//!
//! The crate is split into the pieces a Julia explorer needs:
//! mapping pixels to the complex plane and moving the view around
//! (`planes`), iterating a single point (`escape`), turning the
//! result into a color (`palette`), drawing a whole frame (`render`),
//! drawing frames in the background without falling behind the user
//! (`service`), and remembering what the user had dialed in
//! (`settings`).

pub mod error;
pub mod escape;
pub mod palette;
pub mod planes;
pub mod render;
pub mod service;
pub mod settings;

pub use crate::error::{Error, Result};
pub use crate::escape::{escape_time, Escape};
pub use crate::palette::{Color, Palette, Stop};
pub use crate::planes::{Direction, Pixel, PlaneMapper, Viewport};
pub use crate::render::{render, render_threaded, PixelBuffer, RenderRequest};
pub use crate::service::{RenderHandle, RenderOutput, RenderService};
pub use crate::settings::{Preset, Settings, PRESETS};
