//! Pedal Road headless driver
//!
//! Runs a scripted ride through the frame loop into a software framebuffer
//! and writes the last frame as a PPM image.
//!
//! Usage: `pedal-road [settings.json] [out.ppm]`

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use pedal_road::renderer::{Framebuffer, Rgb, SpriteImage};
use pedal_road::settings::SpriteSet;
use pedal_road::sim::{CameraState, Controller, DriveInput};
use pedal_road::{FrameLoop, Settings};

/// Simulated ride length
const FRAMES: u32 = 900;
/// Fixed frame time for the scripted ride
const FRAME_DT: f64 = 1.0 / 60.0;
const SKY: Rgb = Rgb::new(120, 170, 230);

fn main() {
    env_logger::init();
    log::info!("Pedal Road (headless) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(PathBuf::from);
    let out_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("frame.ppm"));

    let settings = Settings::load_or_default(settings_path.as_deref());
    let terrain = settings.terrain.clone();
    let mut camera = CameraState::on_road(&terrain, 0.0, settings.start_lateral);
    let mut controller = Controller::new(settings.controller);

    let mut framebuffer = Framebuffer::new(settings.layout.width, settings.layout.height);
    register_placeholder_sprites(&mut framebuffer, &settings.sprites);

    let mut frame = FrameLoop::new(settings, camera.x)?;

    // Rider spins up to a steady cadence
    let mut elapsed = 0.0;
    let mut off_track_frames = 0;
    let mut rows = 0u64;
    for i in 0..FRAMES {
        elapsed += FRAME_DT;
        let t = elapsed;
        let mut signal = move || Some((t * 6.0).min(24.0));
        let input = DriveInput {
            steer: (i as f64 * 0.02).sin() * 0.3,
            ..DriveInput::default()
        };
        controller.update(&mut camera, &input, &mut signal, &terrain, FRAME_DT);

        framebuffer.clear(SKY);
        let report = frame.tick(&mut camera, FRAME_DT, &mut framebuffer);
        rows += report.sweep.rows_written as u64;
        if report.off_track {
            off_track_frames += 1;
        }
    }

    log::info!(
        "Rode {:.1} units in {} frames ({:.1} rows/frame, {} frames off track, \
         {} missing sprite draws)",
        camera.x,
        frame.frames(),
        rows as f64 / FRAMES as f64,
        off_track_frames,
        framebuffer.missing_draws()
    );

    let file = File::create(&out_path)?;
    framebuffer.write_ppm(BufWriter::new(file))?;
    log::info!("Wrote {}", out_path.display());
    Ok(())
}

/// Procedural stand-ins so the ride renders without external assets
fn register_placeholder_sprites(fb: &mut Framebuffer, sprites: &SpriteSet) {
    let key = Rgb::MAGENTA;

    // Asphalt with kerbs and a dashed centre line, one band per texture row
    fb.register(
        sprites.road,
        SpriteImage::from_fn(64, 360, |x, y| {
            let stripe = (y / 18) % 2 == 0;
            match x {
                0..=3 | 60..=63 if stripe => Rgb::new(200, 40, 40),
                0..=3 | 60..=63 => Rgb::WHITE,
                31..=32 if stripe => Rgb::new(230, 230, 230),
                _ => Rgb::new(90, 90, 95),
            }
        })
        .with_color_key(key),
    );

    fb.register(
        sprites.backdrop,
        SpriteImage::from_fn(450, 180, |x, y| {
            let xf = x as f64;
            let ridge = 55.0 + 12.0 * (xf / 23.0).sin() + 7.0 * (xf / 9.0).sin();
            if (y as f64) > ridge {
                Rgb::new(70, 80, 110)
            } else {
                Rgb::saturating(120.0 - y as f64 * 0.4, 170.0 - y as f64 * 0.3, 230.0)
            }
        }),
    );

    fb.register(
        sprites.tree,
        SpriteImage::from_fn(20, 30, |x, y| {
            let half = (y as i32 * 10 / 22).max(1);
            if y >= 22 {
                if (8..12).contains(&x) { Rgb::new(100, 60, 30) } else { key }
            } else if (x as i32 - 10).abs() < half {
                Rgb::new(30, 120, 40)
            } else {
                key
            }
        })
        .with_color_key(key),
    );

    fb.register(
        sprites.car,
        SpriteImage::from_fn(20, 16, |x, y| match (x, y) {
            (_, 0..=5) if (4..16).contains(&x) => Rgb::new(40, 60, 160),
            (_, 6..=13) => Rgb::new(60, 90, 200),
            (2..=5 | 14..=17, 14..=15) => Rgb::BLACK,
            _ => key,
        })
        .with_color_key(key),
    );

    fb.register(
        sprites.player,
        SpriteImage::from_fn(80, 50, |x, y| match (x, y) {
            (20..=59, 0..=19) => Rgb::new(200, 40, 40),
            (20..=59, 20..=23) => Rgb::new(60, 60, 60),
            (0..=79, 24..=41) => Rgb::new(220, 50, 50),
            (6..=19 | 60..=73, 42..=49) => Rgb::BLACK,
            _ => key,
        })
        .with_color_key(key),
    );

    fb.register(
        sprites.warning,
        SpriteImage::from_fn(6, 6, |x, y| {
            let dx = x as i32 * 2 - 5;
            let dy = y as i32 * 2 - 5;
            if dx * dx + dy * dy <= 36 { Rgb::RED } else { key }
        })
        .with_color_key(key),
    );
}
