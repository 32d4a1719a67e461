// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.
//!
//! A Julia set is drawn by fixing a complex constant `c` and asking,
//! for every starting point `z` on the plane, how quickly repeatedly
//! squaring `z` and adding `c` flings it off to infinity.  Once the
//! magnitude of `z` reaches 2 it can never come back, so we stop
//! there and record how many steps that took.  Points that never get
//! there within the iteration limit are considered part of the set.
//!
//! The integer count produces visible bands.  For escaped points we
//! also compute the usual renormalized count, `n + 1 - log2(ln |z|)`,
//! which varies continuously across the plane.

use num::Complex;
use std::f64::consts::LN_2;

/// The squared magnitude past which an orbit has escaped.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

/// The outcome of iterating a single point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// The number of iterations performed; equal to the limit for
    /// points that never escaped.
    pub iterations: u32,
    /// The smoothed iteration count.  For bounded points this is just
    /// the limit.
    pub smooth: f64,
    bounded: bool,
}

impl Escape {
    fn escaped(iterations: u32, smooth: f64) -> Self {
        Escape {
            iterations,
            smooth,
            bounded: false,
        }
    }

    /// True if the orbit used up every iteration without escaping.
    pub fn is_bounded(&self) -> bool {
        self.bounded
    }

    /// The smoothed count as a fraction of the limit, wrapped into
    /// [0, 1) so that deep orbits cycle back around the palette.
    pub fn normalized(&self, max_iterations: u32) -> f64 {
        if max_iterations == 0 {
            return 0.0;
        }
        let t = self.smooth / f64::from(max_iterations);
        let wrapped = ((t % 1.0) + 1.0) % 1.0;
        if wrapped.is_finite() {
            wrapped
        } else {
            0.0
        }
    }
}

/// Iterate `z <- z^2 + c` from `start` until `|z|^2` reaches 4 or we
/// have done `max_iterations` steps.
///
/// Non-finite inputs are reported as escaping immediately, so a bad
/// coordinate renders as background instead of poisoning the image.
pub fn escape_time(start: Complex<f64>, c: Complex<f64>, max_iterations: u32) -> Escape {
    if !(start.re.is_finite() && start.im.is_finite() && c.re.is_finite() && c.im.is_finite()) {
        return Escape::escaped(0, 0.0);
    }

    let mut z = start;
    let mut iterations = 0;
    while z.norm_sqr() < ESCAPE_RADIUS_SQR && iterations < max_iterations {
        z = z * z + c;
        iterations += 1;
    }

    // Running out of steps counts as bounded, even on the step that escaped.
    if iterations == max_iterations {
        return Escape {
            iterations,
            smooth: f64::from(iterations),
            bounded: true,
        };
    }

    Escape::escaped(iterations, smooth_count(iterations, z))
}

/// The renormalized iteration count for an orbit that has just left
/// the escape radius at `z`.
fn smooth_count(iterations: u32, z: Complex<f64>) -> f64 {
    let smooth = f64::from(iterations) + 1.0 - z.norm().ln().ln() / LN_2;
    if smooth.is_finite() {
        smooth
    } else {
        f64::from(iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    const LIMIT: u32 = 250;

    #[test]
    fn points_outside_radius_two_escape_at_once() {
        let c = Complex::new(-0.75, 0.11);
        for &start in &[
            Complex::new(2.0, 0.0),
            Complex::new(0.0, -2.0),
            Complex::new(1.5, 1.5),
            Complex::new(-30.0, 4.0),
        ] {
            let e = escape_time(start, c, LIMIT);
            assert_eq!(e.iterations, 0, "{:?}", start);
            assert!(!e.is_bounded());
        }
    }

    #[test]
    fn iterations_never_exceed_the_limit() {
        let c = Complex::new(-0.4, 0.6);
        for (x, y) in iproduct!(-20..20, -20..20) {
            let start = Complex::new(f64::from(x) / 10.0, f64::from(y) / 10.0);
            for &limit in &[0, 1, 10, 100] {
                assert!(escape_time(start, c, limit).iterations <= limit);
            }
        }
    }

    #[test]
    fn iterations_grow_with_the_limit() {
        let c = Complex::new(0.285, 0.01);
        for (x, y) in iproduct!(-15..15, -15..15) {
            let start = Complex::new(f64::from(x) / 8.0, f64::from(y) / 8.0);
            let mut previous = 0;
            for limit in (0..300).step_by(7) {
                let count = escape_time(start, c, limit).iterations;
                assert!(count >= previous, "{:?} at {}", start, limit);
                previous = count;
            }
        }
    }

    #[test]
    fn zero_constant_keeps_the_unit_disk() {
        let c = Complex::new(0.0, 0.0);
        for (x, y) in iproduct!(-10..=10, -10..=10) {
            let start = Complex::new(f64::from(x) / 10.5, f64::from(y) / 10.5);
            if start.norm() < 0.99 {
                let e = escape_time(start, c, LIMIT);
                assert!(e.is_bounded(), "{:?}", start);
                assert_eq!(e.iterations, LIMIT);
            }
        }
    }

    #[test]
    fn zero_constant_releases_points_beyond_the_unit_circle() {
        let e = escape_time(Complex::new(1.2, 0.0), Complex::new(0.0, 0.0), LIMIT);
        assert!(!e.is_bounded());
        assert!(e.iterations > 0 && e.iterations < LIMIT);
    }

    #[test]
    fn non_finite_input_escapes_immediately() {
        let c = Complex::new(-0.75, 0.11);
        let nan = Complex::new(std::f64::NAN, 0.0);
        let inf = Complex::new(0.0, std::f64::INFINITY);
        assert_eq!(escape_time(nan, c, LIMIT).iterations, 0);
        assert_eq!(escape_time(inf, c, LIMIT).iterations, 0);
        let e = escape_time(Complex::new(0.1, 0.1), nan, LIMIT);
        assert_eq!(e.iterations, 0);
        assert_eq!(e.smooth, 0.0);
        assert!(!e.is_bounded());
    }

    #[test]
    fn smoothing_stays_near_the_integer_count() {
        let c = Complex::new(-0.75, 0.11);
        for (x, y) in iproduct!(-20..20, -20..20) {
            let start = Complex::new(f64::from(x) / 10.0, f64::from(y) / 10.0);
            let e = escape_time(start, c, LIMIT);
            if !e.is_bounded() && e.iterations > 0 {
                assert!(e.smooth.is_finite());
                assert!((e.smooth - f64::from(e.iterations)).abs() < 2.0, "{:?}", e);
            }
        }
    }

    #[test]
    fn normalized_wraps_into_unit_interval() {
        let e = Escape::escaped(3, 3.5);
        assert!((e.normalized(10) - 0.35).abs() < 1e-12);
        let negative = Escape::escaped(0, -0.25);
        assert!((negative.normalized(1) - 0.75).abs() < 1e-12);
        assert_eq!(e.normalized(0), 0.0);
    }
}
