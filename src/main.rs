use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use cellbedform::export::{self, AnimationFormat};
use cellbedform::render::{self, RenderOptions};
use cellbedform::{FrameRecorder, Progress, RunConfig, StepObserver};

/// Simulate bedform formation with the Nishimori-Ouchi cell model.
#[derive(Parser)]
#[command(name = "cellbedform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON run configuration; flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid size along x (transport direction).
    #[arg(long)]
    xgrid: Option<usize>,

    /// Grid size along y.
    #[arg(long)]
    ygrid: Option<usize>,

    /// Number of steps to run.
    #[arg(short, long)]
    steps: Option<usize>,

    /// Seed for the random initial bed.
    #[arg(long)]
    seed: Option<u64>,

    /// Diffusion coefficient for rolling and sliding.
    #[arg(short = 'D', long = "diffusion")]
    d: Option<f64>,

    /// Saltation entrainment rate.
    #[arg(short = 'Q', long = "entrainment")]
    q: Option<f64>,

    /// Base saltation length.
    #[arg(long = "l0")]
    l0: Option<f64>,

    /// Saltation length gain per unit height.
    #[arg(short = 'b', long = "length-slope")]
    b: Option<f64>,

    /// Record every n-th step for export.
    #[arg(long)]
    frame_stride: Option<usize>,

    /// Output directory.
    #[arg(short, long, default_value = "artifacts")]
    output: PathBuf,

    /// Save an image sequence with this file prefix.
    #[arg(long)]
    images: Option<String>,

    /// Save an animation with this file name (format from --format).
    #[arg(long)]
    animation: Option<String>,

    /// Animation format.
    #[arg(long, default_value = "gif")]
    format: String,

    /// Lower bound of the color range.
    #[arg(long, default_value = "-5.0", allow_negative_numbers = true)]
    vmin: f64,

    /// Upper bound of the color range.
    #[arg(long, default_value = "5.0", allow_negative_numbers = true)]
    vmax: f64,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig, Box<dyn std::error::Error>> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(v) = self.xgrid { cfg.xgrid = v; }
        if let Some(v) = self.ygrid { cfg.ygrid = v; }
        if let Some(v) = self.steps { cfg.steps = v; }
        if let Some(v) = self.seed { cfg.seed = v; }
        if let Some(v) = self.frame_stride { cfg.frame_stride = v; }
        if let Some(v) = self.d { cfg.params.d = v; }
        if let Some(v) = self.q { cfg.params.q = v; }
        if let Some(v) = self.l0 { cfg.params.l0 = v; }
        if let Some(v) = self.b { cfg.params.b = v; }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = cli.run_config()?;
    let format: Option<AnimationFormat> = match &cli.animation {
        Some(_) => Some(cli.format.parse()?),
        None => None,
    };
    std::fs::create_dir_all(&cli.output)?;

    info!(
        "simulating {}x{} bed for {} steps, seed={}, D={} Q={} L0={} b={}",
        cfg.xgrid, cfg.ygrid, cfg.steps, cfg.seed, cfg.params.d, cfg.params.q, cfg.params.l0, cfg.params.b
    );

    let mut progress = Progress::default();
    let mut recorder = FrameRecorder::new(cfg.frame_stride);
    let (engine, timings) = {
        let mut observers: [&mut dyn StepObserver; 2] = [&mut progress, &mut recorder];
        cellbedform::simulate(&cfg, &mut observers)?
    };

    info!("Timings:");
    for t in &timings {
        info!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    let opts = RenderOptions {
        vmin: cli.vmin,
        vmax: cli.vmax,
        ..RenderOptions::default()
    };

    let bed = engine.elevation();
    let save = |name: &str, rgba: &[u8]| -> Result<(), Box<dyn std::error::Error>> {
        let path = cli.output.join(name);
        image::save_buffer(&path, rgba, bed.w as u32, bed.h as u32, image::ColorType::Rgba8)?;
        info!("Saved {}", path.display());
        Ok(())
    };
    save("bed.png", &render::render_bed(bed, &opts))?;
    save("heightmap.png", &render::render_heightmap(bed))?;

    if let Some(prefix) = &cli.images {
        export::save_images(recorder.frames(), &cli.output, prefix, &opts)?;
    }
    if let (Some(name), Some(format)) = (&cli.animation, format) {
        export::save_animation(recorder.frames(), &cli.output.join(name), format, 100, &opts)?;
    }

    info!("Done.");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
