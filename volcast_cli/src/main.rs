use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write},
};

use nalgebra::Vector2;
use volcast_lib::{
    color::RGBA,
    render::Renderer,
    volumetric::{self, GradientVolume},
    PerspectiveCamera,
};

mod args;
mod config;
mod defaults;

use config::Config;

fn main() {
    env_logger::init();

    let cmd = args::get_command();
    let matches = cmd.get_matches();

    let cfg = match Config::from_args(matches) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: Config) -> Result<(), String> {
    let volume = volumetric::from_file(&cfg.input).map_err(|e| e.to_string())?;
    log::info!(
        "Loaded volume {:?}, values {}..={}",
        volume.get_size(),
        volume.minimum(),
        volume.maximum()
    );

    let gradient = GradientVolume::from_volume(&volume);

    let (position, direction) = cfg.camera_pose(&volume);
    let camera = PerspectiveCamera::new(position, direction);

    let mut renderer = Renderer::new(&volume, &gradient, &camera, cfg.render_config(&volume));
    renderer.render();

    write_ppm(&cfg.output, cfg.resolution, renderer.frame_buffer())
        .map_err(|e| format!("Cannot write image: {e}"))?;
    log::info!("Wrote {:?}", cfg.output);
    Ok(())
}

/// Binary PPM (P6). The framebuffer's row 0 is the bottom of the image,
/// PPM rows go top to bottom.
fn write_ppm(
    path: &OsString,
    resolution: Vector2<u16>,
    buffer: &[RGBA],
) -> Result<(), std::io::Error> {
    let (width, height) = (resolution.x as usize, resolution.y as usize);
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "P6")?;
    writeln!(out, "{width} {height}")?;
    writeln!(out, "255")?;

    let mut row = Vec::with_capacity(width * 3);
    for y in (0..height).rev() {
        row.clear();
        for pixel in &buffer[y * width..(y + 1) * width] {
            // expects black background
            row.push(channel_byte(pixel.x * pixel.w));
            row.push(channel_byte(pixel.y * pixel.w));
            row.push(channel_byte(pixel.z * pixel.w));
        }
        out.write_all(&row)?;
    }
    out.flush()
}

fn channel_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0) as u8
}
