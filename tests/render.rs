// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use juliaset::{
    escape_time, render, render_threaded, Pixel, PlaneMapper, RenderRequest, RenderService,
    Settings, Viewport,
};
use num::Complex;

fn spiral() -> RenderRequest {
    let mut request = RenderRequest::new(100, 100, Complex::new(-0.75, 0.11));
    request.viewport = Viewport::new(Complex::new(0.0, 0.0), 1.5);
    request.max_iterations = 250;
    request
}

#[test]
fn spiral_is_reproducible() {
    let reference = render(&spiral()).unwrap();
    for _ in 0..3 {
        assert_eq!(render(&spiral()).unwrap().as_bytes(), reference.as_bytes());
    }
    assert_eq!(render_threaded(&spiral(), 4).unwrap(), reference);

    let service = RenderService::new(3);
    let output = service.submit(spiral()).wait().unwrap();
    assert_eq!(output.buffer, reference);
}

#[test]
fn every_pixel_follows_its_escape_time() {
    let request = spiral();
    let buffer = render(&request).unwrap();
    let plane = PlaneMapper::new(100, 100, &request.viewport).unwrap();
    for &(x, y) in &[(0, 0), (50, 50), (99, 0), (13, 87), (70, 30)] {
        let escape = escape_time(
            plane.pixel_to_point(&Pixel(x, y)),
            request.constant,
            request.max_iterations,
        );
        let color = request.shade(&escape);
        assert_eq!(
            buffer.pixel(x, y),
            Some([color.0, color.1, color.2, 255]),
            "pixel {},{}",
            x,
            y
        );
    }
}

#[test]
fn outside_radius_two_is_never_in_the_set() {
    let request = spiral();
    let plane = PlaneMapper::new(100, 100, &request.viewport).unwrap();
    for y in 0..100 {
        for x in 0..100 {
            let start = plane.pixel_to_point(&Pixel(x, y));
            if start.norm_sqr() >= 4.0 {
                assert_eq!(escape_time(start, request.constant, 250).iterations, 0);
            }
        }
    }
}

#[test]
fn settings_drive_an_interactive_session() {
    let service = RenderService::new(2);
    let mut settings = Settings::default();

    let mut view = settings.viewport();
    view.zoom_about(0.25, 0.75, 1.0, 1.25);
    view.pan(0.1, 0.0, 1.0);
    settings.set_viewport(&view);
    settings.cycle_palette();

    let request = settings.to_request(40, 40).unwrap();
    let handle = service.submit(request.clone());
    let output = handle.wait().unwrap();
    assert!(service.is_latest(output.generation));
    assert_eq!(output.buffer, render(&request).unwrap());
}
