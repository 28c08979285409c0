//! Headless renderer: generate a galaxy, wait for its density field and
//! write one tone-mapped frame to disk.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use spiral_galaxy::{save_image, Camera, Galaxy, GalaxyParams, Vec3};

#[derive(Parser)]
#[command(name = "galaxy-render")]
#[command(about = "Render a procedural spiral galaxy to an image")]
struct Cli {
    /// JSON parameter file (defaults are used when omitted)
    params: Option<PathBuf>,

    /// Output image
    #[arg(default_value = "galaxy.png")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(default_value_t = 960)]
    width: u32,

    /// Image height in pixels
    #[arg(default_value_t = 540)]
    height: u32,

    /// Animation time in seconds
    #[arg(long, default_value_t = 0.0)]
    time: f32,

    /// Camera yaw in radians
    #[arg(long, default_value_t = 0.0)]
    yaw: f32,

    /// Camera pitch in radians
    #[arg(long, default_value_t = 0.6)]
    pitch: f32,

    /// Camera distance from the core (defaults to twice the galactic radius)
    #[arg(long)]
    distance: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.width > 0 && cli.height > 0, "image size must be non-zero");

    let params = match &cli.params {
        Some(path) => GalaxyParams::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => GalaxyParams::default(),
    };
    let distance = cli.distance.unwrap_or(params.galactic_radius * 2.0);

    let start = Instant::now();
    let mut galaxy = Galaxy::new(params)?;
    if galaxy.wait_for_field().is_none() {
        log::warn!("density field build failed, rendering stars only");
    }
    log::info!("generated galaxy in {:.2?}", start.elapsed());

    let camera = Camera::new()
        .with_angles(cli.yaw, cli.pitch)
        .with_distance(distance);
    let frame = camera.frame(cli.width, cli.height);

    let start = Instant::now();
    let scene = galaxy.render_scene(&frame, cli.time, Vec3::ZERO);
    let pixels = galaxy.render_frame(&frame, cli.time, &scene);
    log::info!("rendered {}x{} in {:.2?}", cli.width, cli.height, start.elapsed());

    save_image(&cli.output, cli.width, cli.height, &pixels)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("wrote {}", cli.output.display());
    Ok(())
}
