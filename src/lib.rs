//! Cell model of self-organized bedform (ripple and dune) formation.
//!
//! Sand height lives on a periodic grid and evolves by short-range
//! rolling/sliding diffusion and long-range saltation along x, after
//! Nishimori & Ouchi (1993), Phys. Rev. Lett. 71(1), 197.

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod grid;
pub mod neighbors;
pub mod observer;
pub mod render;
pub mod rng;

use std::time::Instant;

pub use config::{Params, RunConfig};
pub use engine::BedformEngine;
pub use error::{ConfigurationError, ExportError};
pub use grid::Grid;
pub use observer::{FrameRecorder, Progress, StepObserver};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Build an engine from `cfg` and run it for `cfg.steps` steps.
pub fn simulate(
    cfg: &RunConfig,
    observers: &mut [&mut dyn StepObserver],
) -> Result<(BedformEngine, Vec<Timing>), ConfigurationError> {
    cfg.validate()?;
    let mut timings = Vec::new();
    let total_start = Instant::now();

    let t = Instant::now();
    let mut engine = BedformEngine::with_seed(cfg.xgrid, cfg.ygrid, cfg.params, cfg.seed)?;
    timings.push(Timing {
        name: "setup",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    let t = Instant::now();
    engine.run(cfg.steps, observers);
    timings.push(Timing {
        name: "run",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    Ok((engine, timings))
}
