// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{value_t, App, Arg, ArgMatches};
use failure::{format_err, Error};
use juliaset::{Palette, RenderService, Settings, PRESETS};
use log::info;
use num::Complex;
use std::path::{Path, PathBuf};
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const CONSTANT: &str = "constant";
const CENTER: &str = "center";
const ZOOM: &str = "zoom";
const ITERATIONS: &str = "iterations";
const PALETTE: &str = "palette";
const INVERT: &str = "invert";
const BRIGHTNESS: &str = "brightness";
const PRESET: &str = "preset";
const RANDOM: &str = "random";
const PULSE: &str = "pulse";
const FRAMES: &str = "frames";
const THREADS: &str = "threads";
const SETTINGS: &str = "settings";
const SAVE: &str = "save";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();
    let palettes: Vec<&'static str> = Palette::names().collect();

    App::new("julia")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Julia set renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the extension picks the format"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x800")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("The Julia constant, as re,im"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse view center"))
                .help("The point at the middle of the image, as re,im"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0.2,
                        1e12,
                        "Could not parse zoom",
                        "Zoom must be between 0.2 and 1e12",
                    )
                })
                .help("Magnification; the view is 4/zoom units tall"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        juliaset::settings::MAX_ITERATIONS,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 5000",
                    )
                })
                .help("Iteration limit per pixel"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .long(PALETTE)
                .short("p")
                .takes_value(true)
                .possible_values(&palettes)
                .help("Color palette"),
        )
        .arg(
            Arg::with_name(INVERT)
                .long(INVERT)
                .help("Fill the set and leave the outside black"),
        )
        .arg(
            Arg::with_name(BRIGHTNESS)
                .long(BRIGHTNESS)
                .short("b")
                .takes_value(true)
                .default_value("1.0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        4.0,
                        "Could not parse brightness",
                        "Brightness must be between 0 and 4",
                    )
                })
                .help("Multiplier applied to every color"),
        )
        .arg(
            Arg::with_name(PRESET)
                .long(PRESET)
                .takes_value(true)
                .conflicts_with(RANDOM)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        PRESETS.len(),
                        "Could not parse preset number",
                        &format!("Preset must be between 1 and {}", PRESETS.len()),
                    )
                })
                .help("Start from a named constant (1-8)"),
        )
        .arg(
            Arg::with_name(RANDOM)
                .long(RANDOM)
                .help("Start from a random constant"),
        )
        .arg(
            Arg::with_name(PULSE)
                .long(PULSE)
                .help("Throb the brightness across animation frames"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Render this many frames, morphing the constant between them"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in solver"),
        )
        .arg(
            Arg::with_name(SETTINGS)
                .long(SETTINGS)
                .takes_value(true)
                .help("Settings file to start from"),
        )
        .arg(
            Arg::with_name(SAVE)
                .long(SAVE)
                .requires(SETTINGS)
                .help("Write the final settings back to the settings file"),
        )
        .get_matches()
}

/// Given `out.png` and frame 7, produce `out-0007.png`.
fn frame_path(output: &Path, frame: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{}-{:04}.{}", stem, frame, ext.to_string_lossy()),
        None => format!("{}-{:04}", stem, frame),
    };
    output.with_file_name(name)
}

/// Build the settings for this run: the settings file if there is
/// one, then presets, then anything given explicitly.
fn settings_from(matches: &ArgMatches) -> Result<Settings, Error> {
    let mut settings = match matches.value_of(SETTINGS) {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };

    if matches.is_present(PRESET) {
        settings.select_preset(value_t!(matches, PRESET, usize)? - 1)?;
    }
    if matches.is_present(RANDOM) {
        settings.randomize(&mut rand::thread_rng());
    }
    if let Some(c) = matches.value_of(CONSTANT) {
        let c = parse_complex(c).ok_or_else(|| format_err!("Error parsing Julia constant"))?;
        settings.set_constant(c);
    }
    if let Some(center) = matches.value_of(CENTER) {
        let center = parse_complex(center).ok_or_else(|| format_err!("Error parsing view center"))?;
        settings.center_x = center.re;
        settings.center_y = center.im;
    }
    if matches.is_present(ZOOM) {
        settings.zoom = value_t!(matches, ZOOM, f64)?;
    }
    if matches.is_present(ITERATIONS) {
        settings.max_iterations = value_t!(matches, ITERATIONS, u32)?;
    }
    if let Some(palette) = matches.value_of(PALETTE) {
        settings.palette = palette.to_string();
    }
    if matches.is_present(INVERT) {
        settings.invert = true;
    }
    if matches.is_present(PULSE) {
        settings.color_pulse = true;
    }
    Ok(settings)
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let threads = value_t!(matches, THREADS, usize)?;
    let frames = value_t!(matches, FRAMES, usize)?;
    let brightness = value_t!(matches, BRIGHTNESS, f64)?;
    let output = PathBuf::from(matches.value_of(OUTPUT).unwrap_or_default());

    let mut settings = settings_from(matches)?;
    let service = RenderService::new(threads);
    if frames > 1 {
        settings.start_morph();
    }

    for frame in 0..frames {
        let mut request = settings.to_request(width, height)?;
        request.brightness *= brightness;
        let rendered = service.submit(request).wait()?;
        let path = if frames == 1 {
            output.clone()
        } else {
            frame_path(&output, frame)
        };
        rendered.buffer.save(&path)?;
        info!(
            "wrote {} (c = {} {:+}i) in {:?}",
            path.display(),
            settings.c_real,
            settings.c_imag,
            rendered.elapsed
        );
        settings.morph_step();
        settings.pulse_step();
    }

    if matches.is_present(SAVE) {
        if let Some(path) = matches.value_of(SETTINGS) {
            settings.stop_morph();
            settings.save(path)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
