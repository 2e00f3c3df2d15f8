use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use base64::Engine;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use cellbedform::export::encode_png;
use cellbedform::render::{self, RenderOptions};
use cellbedform::{FrameRecorder, Grid, Params, RunConfig, StepObserver};

/// Upper bound on cells x recorded frames per request.
const MAX_FRAME_CELLS: usize = 64_000_000;

#[derive(Deserialize)]
struct SimulateRequest {
    seed: Option<u64>,
    xgrid: Option<usize>,
    ygrid: Option<usize>,
    steps: Option<usize>,
    frame_stride: Option<usize>,
    d: Option<f64>,
    q: Option<f64>,
    l0: Option<f64>,
    b: Option<f64>,
    vmin: Option<f64>,
    vmax: Option<f64>,
}

#[derive(Serialize)]
struct SimulateResponse {
    frames: Vec<Layer>,
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    width: usize,
    height: usize,
    total_mass: f64,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

type ApiError = (StatusCode, String);

fn data_url(rgba: &[u8], bed: &Grid<f64>) -> Result<String, ApiError> {
    let png = encode_png(rgba, bed.w, bed.h)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
    Ok(format!("data:image/png;base64,{}", b64))
}

impl SimulateRequest {
    fn into_config(self) -> (RunConfig, RenderOptions) {
        let defaults = RunConfig::default();
        let p = Params::default();
        let cfg = RunConfig {
            xgrid: self.xgrid.unwrap_or(defaults.xgrid),
            ygrid: self.ygrid.unwrap_or(defaults.ygrid),
            steps: self.steps.unwrap_or(defaults.steps),
            seed: self.seed.unwrap_or(defaults.seed),
            frame_stride: self.frame_stride.unwrap_or(10),
            params: Params {
                d: self.d.unwrap_or(p.d),
                q: self.q.unwrap_or(p.q),
                l0: self.l0.unwrap_or(p.l0),
                b: self.b.unwrap_or(p.b),
            },
        };
        let r = RenderOptions::default();
        let opts = RenderOptions {
            vmin: self.vmin.unwrap_or(r.vmin),
            vmax: self.vmax.unwrap_or(r.vmax),
            ..r
        };
        (cfg, opts)
    }
}

fn simulate(cfg: RunConfig, opts: RenderOptions) -> Result<SimulateResponse, ApiError> {
    cfg.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let frame_count = if cfg.frame_stride == 0 { 0 } else { cfg.steps / cfg.frame_stride };
    if cfg.xgrid.saturating_mul(cfg.ygrid).saturating_mul(frame_count.max(1)) > MAX_FRAME_CELLS {
        return Err((StatusCode::BAD_REQUEST, "grid x frames too large".into()));
    }

    let mut recorder = FrameRecorder::new(cfg.frame_stride);
    let (engine, timings) = {
        let mut observers: [&mut dyn StepObserver; 1] = [&mut recorder];
        cellbedform::simulate(&cfg, &mut observers)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    };

    let bed = engine.elevation();
    let frames = recorder
        .frames()
        .iter()
        .enumerate()
        .map(|(i, f)| {
            Ok(Layer {
                name: format!("step{:04}", (i + 1) * cfg.frame_stride),
                data_url: data_url(&render::render_bed(f, &opts), f)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let layers = vec![
        Layer {
            name: "bed".into(),
            data_url: data_url(&render::render_bed(bed, &opts), bed)?,
        },
        Layer {
            name: "heightmap".into(),
            data_url: data_url(&render::render_heightmap(bed), bed)?,
        },
    ];

    let timing_entries = timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(SimulateResponse {
        frames,
        layers,
        timings: timing_entries,
        width: bed.w,
        height: bed.h,
        total_mass: engine.total_mass(),
    })
}

async fn simulate_handler(
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let (cfg, opts) = req.into_config();
    info!("simulate {}x{} for {} steps", cfg.xgrid, cfg.ygrid, cfg.steps);

    tokio::task::spawn_blocking(move || simulate(cfg, opts))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map(Json)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/simulate", post(simulate_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("cellbedform server at http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("bind {addr}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("server: {e}");
        std::process::exit(1);
    }
}
