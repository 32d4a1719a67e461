// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a window on the complex plane described by a Viewport: a
//! center point and a zoom factor.  The window is always 4/zoom units
//! tall, and as wide as the image's aspect ratio demands.
use num::Complex;

use crate::error::{Error, Result};

/// The smallest zoom factor any interaction will leave behind.
pub const MIN_ZOOM: f64 = 0.2;

/// The zoom factor of a freshly reset view.
pub const DEFAULT_ZOOM: f64 = 1.5;

/// How much a single zoom-in or zoom-out step multiplies or divides by.
pub const ZOOM_STEP: f64 = 1.5;

/// How far, in view heights times zoom, a single nudge moves the center.
pub const NUDGE_STEP: f64 = 0.2;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a pixel in an image.  Row 0 is the top row.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The four directions the view can be nudged in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Direction {
    /// Toward smaller imaginary values.
    Up,
    /// Toward larger imaginary values.
    Down,
    /// Toward smaller real values.
    Left,
    /// Toward larger real values.
    Right,
}

/// Where the camera is pointed on the complex plane, and how close.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// The complex number at the middle of the image.
    pub center: Complex<f64>,
    /// Magnification; the view is 4/zoom units tall.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            center: Complex::new(0.0, 0.0),
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Viewport {
    /// A viewport looking at `center` with magnification `zoom`.
    pub fn new(center: Complex<f64>, zoom: f64) -> Self {
        Viewport { center, zoom }
    }

    /// The width and height of the visible window on the complex plane.
    pub fn ranges(&self, aspect: f64) -> (f64, f64) {
        let range_y = 4.0 / self.zoom;
        (range_y * aspect, range_y)
    }

    /// The point on the complex plane under a cursor, where `mx` and
    /// `my` are fractions of the image width and height.
    pub fn point_at(&self, mx: f64, my: f64, aspect: f64) -> Complex<f64> {
        let (range_x, range_y) = self.ranges(aspect);
        Complex::new(
            self.center.re - range_x / 2.0 + mx * range_x,
            self.center.im - range_y / 2.0 + my * range_y,
        )
    }

    /// Multiply the zoom by `factor`, never going below MIN_ZOOM.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).max(MIN_ZOOM);
    }

    /// One step closer.
    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    /// One step further away.
    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / ZOOM_STEP);
    }

    /// Zoom by `factor` while keeping the point under the cursor at
    /// (`mx`, `my`) exactly where it is on screen.
    pub fn zoom_about(&mut self, mx: f64, my: f64, aspect: f64, factor: f64) {
        let anchor = self.point_at(mx, my, aspect);
        self.zoom_by(factor);
        let (range_x, range_y) = self.ranges(aspect);
        self.center = Complex::new(
            anchor.re - (mx - 0.5) * range_x,
            anchor.im - (my - 0.5) * range_y,
        );
    }

    /// Drag the view by a fraction of the image.  Dragging right
    /// moves the center left, so the content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64, aspect: f64) {
        let (range_x, range_y) = self.ranges(aspect);
        self.center = Complex::new(
            self.center.re - dx * range_x,
            self.center.im - dy * range_y,
        );
    }

    /// Move the center a fixed on-screen distance.
    pub fn nudge(&mut self, direction: Direction) {
        let step = NUDGE_STEP / self.zoom;
        match direction {
            Direction::Up => self.center.im -= step,
            Direction::Down => self.center.im += step,
            Direction::Left => self.center.re -= step,
            Direction::Right => self.center.re += step,
        }
    }

    /// Back to the origin at the default zoom.
    pub fn reset(&mut self) {
        *self = Viewport::default();
    }
}

/// Contains the definitions of two planes: an integral cartesian
/// plane, and the complex window a Viewport sees.  Maps points
/// from one to the other.
#[derive(Debug, Clone)]
pub struct PlaneMapper {
    /// The size of the integral cartesian plane.
    pub integral_plane: IntegralPlane,
    // The complex number under pixel 0,0.
    origin: Complex<f64>,
    // How far one pixel step moves along each axis.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the image and the viewport
    /// looking at the complex plane.  Fails on an empty image, since
    /// an empty image has no aspect ratio.
    pub fn new(width: usize, height: usize, viewport: &Viewport) -> Result<PlaneMapper> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage(width, height));
        }

        let aspect = (width as f64) / (height as f64);
        let (range_x, range_y) = viewport.ranges(aspect);

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            origin: Complex::new(
                viewport.center.re - range_x / 2.0,
                viewport.center.im - range_y / 2.0,
            ),
            steps: (range_x / (width as f64), range_y / (height as f64)),
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub fn pixel_count(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// The x coordinate of a column; used when walking a row.
    #[inline]
    pub fn column_to_re(&self, column: usize) -> f64 {
        self.origin.re + (column as f64) * self.steps.0
    }

    /// The y coordinate of a row.
    #[inline]
    pub fn row_to_im(&self, row: usize) -> f64 {
        self.origin.im + (row as f64) * self.steps.1
    }

    /// Given a pixel on the integral cartesian plane, map that to its
    /// point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }

    /// Given a complex number, find the pixel it falls in, if any.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = (point.re - self.origin.re) / self.steps.0;
        let top = (point.im - self.origin.im) / self.steps.1;
        if !(left >= 0.0
            && left < (self.integral_plane.0 as f64)
            && top >= 0.0
            && top < (self.integral_plane.1 as f64))
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }
}
