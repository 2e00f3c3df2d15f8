use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rayon::prelude::*;

use crate::config::Params;
use crate::error::ConfigurationError;
use crate::grid::Grid;
use crate::neighbors::NeighborTables;
use crate::observer::StepObserver;
use crate::rng::Rng;

/// Share of a cell's height exchanged with each orthogonal neighbor.
const SIDE_WEIGHT: f64 = 1.0 / 6.0;
/// Share exchanged with each diagonal neighbor.
const DIAG_WEIGHT: f64 = 1.0 / 12.0;

/// Cell model of wind-blown bedforms (Nishimori & Ouchi, 1993).
///
/// Holds the elevation field on an `xgrid x ygrid` torus and advances it by
/// rolling/sliding diffusion followed by saltation along x. Shape and
/// neighbor tables are fixed at construction.
pub struct BedformEngine {
    params: Params,
    h: Grid<f64>,
    // Diffusion writes here, then swaps with `h`.
    next: Grid<f64>,
    length: Grid<f64>,
    dest: Grid<usize>,
    nb: NeighborTables,
    steps: u64,
}

impl BedformEngine {
    /// Random initial bed, seeded from the clock.
    pub fn new(xgrid: usize, ygrid: usize, params: Params) -> Result<Self, ConfigurationError> {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::with_seed(xgrid, ygrid, params, seed)
    }

    /// Random initial bed with independent uniform `[0, 1)` heights.
    pub fn with_seed(
        xgrid: usize,
        ygrid: usize,
        params: Params,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        check_shape(xgrid, ygrid)?;
        let mut rng = Rng::new(seed);
        let h = Grid::from_fn(xgrid, ygrid, |_, _| rng.next_f64());
        Self::from_elevation(h, params)
    }

    /// Start from a caller-supplied bed, skipping the random initializer.
    pub fn from_elevation(h: Grid<f64>, params: Params) -> Result<Self, ConfigurationError> {
        let (w, hh) = h.shape();
        check_shape(w, hh)?;
        if h.data.len() != w * hh {
            return Err(ConfigurationError::ElevationShapeMismatch {
                len: h.data.len(),
                w,
                h: hh,
            });
        }
        params.validate()?;
        debug!("bedform engine {}x{} with {:?}", w, hh, params);

        Ok(Self {
            params,
            next: Grid::new(w, hh),
            length: Grid::new(w, hh),
            dest: Grid::new(w, hh),
            nb: NeighborTables::new(w, hh),
            h,
            steps: 0,
        })
    }

    pub fn elevation(&self) -> &Grid<f64> {
        &self.h
    }

    /// Clamped saltation lengths from the last step.
    pub fn saltation_length(&self) -> &Grid<f64> {
        &self.length
    }

    /// Wrapped destination x per source cell from the last step.
    pub fn destination(&self) -> &Grid<usize> {
        &self.dest
    }

    pub fn neighbors(&self) -> &NeighborTables {
        &self.nb
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn dims(&self) -> (usize, usize) {
        self.h.shape()
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn total_mass(&self) -> f64 {
        self.h.data.iter().sum()
    }

    /// Advance one step: rolling/sliding, then saltation on the diffused bed.
    pub fn run_one_step(&mut self) {
        self.roll_and_slide();
        self.saltate();
        self.steps += 1;
    }

    /// Run `steps` steps, handing each observer the bed after every step.
    pub fn run(&mut self, steps: usize, observers: &mut [&mut dyn StepObserver]) {
        let (w, h) = self.dims();
        info!("running {} steps on {}x{} bed", steps, w, h);
        for i in 1..=steps {
            self.run_one_step();
            for obs in observers.iter_mut() {
                obs.on_step(i, steps, &self.h);
            }
        }
        for obs in observers.iter_mut() {
            obs.on_finish(steps);
        }
    }

    fn roll_and_slide(&mut self) {
        let Self { params, h, next, nb, .. } = self;
        let d = params.d;
        let w = h.w;
        let nb = &*nb;
        let src = &h.data;

        next.data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let i = y * w + x;
                let [e, wst, n, s] = nb.orthogonal(i);
                let [ne, se, nw, sw] = nb.diagonal(i);
                let hi = src[i];
                *out = hi
                    + d * (-hi
                        + SIDE_WEIGHT * (src[e] + src[wst] + src[n] + src[s])
                        + DIAG_WEIGHT * (src[ne] + src[se] + src[nw] + src[sw]));
            }
        });

        std::mem::swap(h, next);
    }

    // Transport is along x only, so every row is independent: entrain the
    // whole row, then settle each source cell's load at its destination.
    fn saltate(&mut self) {
        let Params { q, l0, b, .. } = self.params;
        let w = self.h.w;

        self.h
            .data
            .par_chunks_mut(w)
            .zip(self.length.data.par_chunks_mut(w))
            .zip(self.dest.data.par_chunks_mut(w))
            .for_each(|((row, len), dest)| {
                for x in 0..w {
                    let l = (l0 + b * row[x]).max(0.0);
                    len[x] = l;
                    dest[x] = destination_x(x, l, w);
                }
                for v in row.iter_mut() {
                    *v -= q;
                }
                for &dx in dest.iter() {
                    row[dx] += q;
                }
            });
    }
}

fn check_shape(xgrid: usize, ygrid: usize) -> Result<(), ConfigurationError> {
    if xgrid == 0 || ygrid == 0 {
        return Err(ConfigurationError::InvalidGridShape { xgrid, ygrid });
    }
    Ok(())
}

/// `round(x + l)` with ties to even, wrapped onto `[0, w)`.
#[inline]
fn destination_x(x: usize, l: f64, w: usize) -> usize {
    let r = (x as f64 + l).round_ties_even().rem_euclid(w as f64);
    // NaN/inf lengths land on column 0.
    r as usize % w
}
