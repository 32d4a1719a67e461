// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised at the edges of the renderer.  The numeric kernel
//! itself never fails; these cover malformed requests, palettes, and
//! the lifecycle of queued renders.

use failure::Fail;

/// Everything that can go wrong in this crate.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// An image needs at least one row and one column.
    #[fail(display = "image dimensions must be non-zero, got {}x{}", _0, _1)]
    EmptyImage(usize, usize),

    /// A palette's stops were empty, out of range, or out of order.
    #[fail(display = "invalid palette: {}", _0)]
    InvalidPalette(String),

    /// No built-in palette goes by that name.
    #[fail(display = "no palette named '{}'", _0)]
    UnknownPalette(String),

    /// Preset indexes run from zero to the number of presets.
    #[fail(display = "no preset at index {} (there are {})", _0, _1)]
    UnknownPreset(usize, usize),

    /// A newer request replaced this one before it started.
    #[fail(display = "render request was superseded by a newer one")]
    Superseded,

    /// The render service stopped before the request could start.
    #[fail(display = "render service shut down")]
    Shutdown,

    /// The background worker went away without answering.
    #[fail(display = "render worker disconnected")]
    WorkerLost,
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
