// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns a render request into an RGBA pixel buffer.
//!
//! Every pixel is independent of every other, so a multi-threaded
//! render just hands out rows.  Each worker pulls the next unclaimed
//! row off a shared iterator and owns that slice of the buffer
//! outright until it's done; nothing is ever written twice.

use log::debug;
use num::Complex;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::escape::{escape_time, Escape};
use crate::palette::{Color, Palette};
use crate::planes::{PlaneMapper, Viewport};

/// Bytes per pixel in a PixelBuffer.
pub const CHANNELS: usize = 4;

/// Everything needed to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// The Julia constant, `c` in `z^2 + c`.
    pub constant: Complex<f64>,
    /// The most iterations any pixel gets.
    pub max_iterations: u32,
    /// What part of the plane we are looking at.
    pub viewport: Viewport,
    /// Colors for escaped points.
    pub palette: Palette,
    /// Paint the set and leave the outside black, instead of the
    /// other way around.
    pub invert: bool,
    /// Multiplier applied to every palette color.
    pub brightness: f64,
}

impl RenderRequest {
    /// A request with the default view, palette, and 250 iterations.
    pub fn new(width: usize, height: usize, constant: Complex<f64>) -> Self {
        RenderRequest {
            width,
            height,
            constant,
            max_iterations: 250,
            viewport: Viewport::default(),
            palette: Palette::default(),
            invert: false,
            brightness: 1.0,
        }
    }

    /// The color of a pixel, given how its orbit went.
    ///
    /// Invert mode is a binary fill: the set gets the palette's middle
    /// color and everything else goes black.
    pub fn shade(&self, escape: &Escape) -> Color {
        match (escape.is_bounded(), self.invert) {
            (true, false) => Color::BLACK,
            (true, true) => self.palette.color_at(0.5, self.brightness),
            (false, false) => self
                .palette
                .color_at(escape.normalized(self.max_iterations), self.brightness),
            (false, true) => Color::BLACK,
        }
    }

    /// Fill one row of RGBA bytes.
    fn render_row(&self, plane: &PlaneMapper, row: usize, out: &mut [u8]) {
        let im = plane.row_to_im(row);
        for (column, pixel) in out.chunks_mut(CHANNELS).enumerate() {
            let start = Complex::new(plane.column_to_re(column), im);
            let escape = escape_time(start, self.constant, self.max_iterations);
            let Color(r, g, b) = self.shade(&escape);
            pixel[0] = r;
            pixel[1] = g;
            pixel[2] = b;
            pixel[3] = 255;
        }
    }
}

/// A rendered frame: row-major RGBA, four bytes per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Give up the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The RGBA value of one pixel, if it's in the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * CHANNELS;
        let p = &self.data[offset..offset + CHANNELS];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Write the frame to disk.  The format follows the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), failure::Error> {
        image::save_buffer(
            path,
            &self.data,
            self.width as u32,
            self.height as u32,
            image::ColorType::RGBA(8),
        )?;
        Ok(())
    }
}

/// The single-threaded renderer.
pub fn render(request: &RenderRequest) -> Result<PixelBuffer> {
    let plane = PlaneMapper::new(request.width, request.height, &request.viewport)?;
    let mut data = vec![0 as u8; plane.pixel_count() * CHANNELS];
    for (row, out) in data.chunks_mut(request.width * CHANNELS).enumerate() {
        request.render_row(&plane, row, out);
    }
    Ok(PixelBuffer {
        width: request.width,
        height: request.height,
        data,
    })
}

/// A multi-threaded version of the render function that takes a thread count.
/// The result is byte-for-byte the same as `render`.
pub fn render_threaded(request: &RenderRequest, threads: usize) -> Result<PixelBuffer> {
    let plane = PlaneMapper::new(request.width, request.height, &request.viewport)?;
    let threads = threads.max(1);
    let started = Instant::now();
    let mut data = vec![0 as u8; plane.pixel_count() * CHANNELS];
    {
        let rows = Arc::new(Mutex::new(
            data.chunks_mut(request.width * CHANNELS).enumerate(),
        ));
        let plane = &plane;
        crossbeam::scope(|spawner| {
            for _ in 0..threads {
                let rows = rows.clone();
                spawner.spawn(move |_| loop {
                    // A poisoned queue means another worker panicked;
                    // the scope reports that, so just stop.
                    let next = rows.lock().ok().and_then(|mut r| r.next());
                    match next {
                        Some((row, out)) => request.render_row(plane, row, out),
                        None => break,
                    }
                });
            }
        })
        .map_err(|_| Error::WorkerLost)?;
    }
    debug!(
        "rendered {}x{} on {} threads in {:?}",
        request.width,
        request.height,
        threads,
        started.elapsed()
    );
    Ok(PixelBuffer {
        width: request.width,
        height: request.height,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spiral() -> RenderRequest {
        RenderRequest::new(100, 100, Complex::new(-0.75, 0.11))
    }

    #[test]
    fn buffer_has_four_opaque_bytes_per_pixel() {
        let buffer = render(&spiral()).unwrap();
        assert_eq!(buffer.as_bytes().len(), 100 * 100 * 4);
        assert!(buffer.as_bytes().chunks(4).all(|p| p[3] == 255));
    }

    #[test]
    fn same_request_same_bytes() {
        let first = render(&spiral()).unwrap();
        let second = render(&spiral()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn threaded_render_matches_single() {
        let mut request = spiral();
        request.width = 73;
        request.height = 41;
        let single = render(&request).unwrap();
        for &threads in &[0, 1, 2, 3, 8] {
            assert_eq!(render_threaded(&request, threads).unwrap(), single);
        }
    }

    #[test]
    fn empty_images_are_refused() {
        let mut request = spiral();
        request.height = 0;
        assert_eq!(render(&request).unwrap_err(), Error::EmptyImage(100, 0));
        assert!(render_threaded(&request, 4).is_err());
    }

    #[test]
    fn interior_is_black_unless_inverted() {
        let mut request = RenderRequest::new(16, 16, Complex::new(0.0, 0.0));
        request.viewport.zoom = 10.0;
        let plain = render(&request).unwrap();
        assert!(plain.as_bytes().chunks(4).all(|p| p == [0, 0, 0, 255]));

        request.invert = true;
        let inverted = render(&request).unwrap();
        let Color(r, g, b) = request.palette.color_at(0.5, 1.0);
        assert!(inverted.as_bytes().chunks(4).all(|p| p == [r, g, b, 255]));
    }

    #[test]
    fn exterior_is_black_when_inverted() {
        let mut request = RenderRequest::new(16, 16, Complex::new(0.0, 0.0));
        request.viewport = Viewport::new(Complex::new(10.0, 10.0), 1.0);
        request.invert = true;
        let inverted = render(&request).unwrap();
        assert!(inverted.as_bytes().chunks(4).all(|p| p == [0, 0, 0, 255]));

        request.invert = false;
        let plain = render(&request).unwrap();
        let corner = escape_time(Complex::new(8.0, 8.0), request.constant, 250);
        let Color(r, g, b) = request.palette.color_at(corner.normalized(250), 1.0);
        assert_eq!(plain.pixel(0, 0), Some([r, g, b, 255]));
    }

    #[test]
    fn brightness_reaches_every_pixel() {
        let mut request = RenderRequest::new(16, 16, Complex::new(0.0, 0.0));
        request.viewport.zoom = 10.0;
        request.invert = true;
        request.brightness = 0.0;
        let dark = render(&request).unwrap();
        assert!(dark.as_bytes().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn pixel_lookup_is_bounds_checked() {
        let buffer = render(&RenderRequest::new(3, 2, Complex::new(0.0, 0.0))).unwrap();
        assert!(buffer.pixel(2, 1).is_some());
        assert_eq!(buffer.pixel(3, 0), None);
        assert_eq!(buffer.pixel(0, 2), None);
        assert_eq!((buffer.width(), buffer.height()), (3, 2));
        assert_eq!(buffer.into_bytes().len(), 24);
    }
}
