use rayon::prelude::*;

use crate::grid::{wrap, Grid};

/// Color range and relief shading for [`render_bed`].
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub vmin: f64,
    pub vmax: f64,
    /// Strength of the hillshade overlay, 0 disables it.
    pub relief: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            vmin: -5.0,
            vmax: 5.0,
            relief: 0.35,
        }
    }
}

// (position, value) stops of matplotlib's `jet`
const JET_R: [(f64, f64); 5] = [(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_G: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_B: [(f64, f64); 5] = [(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

#[inline]
fn piecewise(stops: &[(f64, f64)], t: f64) -> f64 {
    for pair in stops.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if t <= t1 {
            return v0 + (v1 - v0) * (t - t0) / (t1 - t0);
        }
    }
    stops[stops.len() - 1].1
}

/// `jet` colormap lookup for `t` in `[0, 1]` (clamped).
pub fn jet(t: f64) -> [u8; 4] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let c = |stops: &[(f64, f64)]| (piecewise(stops, t) * 255.0).round() as u8;
    [c(&JET_R), c(&JET_G), c(&JET_B), 255]
}

/// Lambert shade of the periodic surface lit from the upwind (-x) side.
#[inline]
fn hillshade(bed: &Grid<f64>, x: usize, y: usize) -> f64 {
    let (w, h) = bed.shape();
    let dzdx = (bed.get(wrap(x as i64 + 1, w), y) - bed.get(wrap(x as i64 - 1, w), y)) * 0.5;
    let dzdy = (bed.get(x, wrap(y as i64 + 1, h)) - bed.get(x, wrap(y as i64 - 1, h))) * 0.5;
    // Light direction, normalized: (-1, 0.5, 1.5)
    let (lx, ly, lz) = (-0.5345, 0.2673, 0.8018);
    let (nx, ny, nz) = (-dzdx, -dzdy, 1.0);
    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    ((nx * lx + ny * ly + nz * lz) / len).clamp(0.0, 1.0)
}

/// Render the bed as RGBA, x left to right, y top to bottom.
pub fn render_bed(bed: &Grid<f64>, opts: &RenderOptions) -> Vec<u8> {
    let w = bed.w;
    let h = bed.h;
    let span = (opts.vmax - opts.vmin).max(f64::EPSILON);
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            let t = (bed.get(x, y) - opts.vmin) / span;
            let mut color = jet(t);
            if opts.relief > 0.0 {
                let s = 1.0 - opts.relief + opts.relief * hillshade(bed, x, y);
                for c in &mut color[..3] {
                    *c = (*c as f64 * s).round().clamp(0.0, 255.0) as u8;
                }
            }
            row[x * 4..x * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

/// Diagnostic: grayscale heightmap stretched to the bed's own range.
pub fn render_heightmap(bed: &Grid<f64>) -> Vec<u8> {
    let min_h = bed.data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_h = bed.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = (max_h - min_h).max(f64::EPSILON);
    let mut rgba = vec![0u8; bed.w * bed.h * 4];
    for (i, &v) in bed.data.iter().enumerate() {
        let g = ((v - min_h) / range * 255.0).clamp(0.0, 255.0) as u8;
        rgba[i * 4..i * 4 + 4].copy_from_slice(&[g, g, g, 255]);
    }
    rgba
}
