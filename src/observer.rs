//! Collaborators that watch a run.
//!
//! The engine pushes a borrowed view of the bed after every step; anything
//! that outlives the call (frames for export, statistics) must be copied.

use log::info;

use crate::grid::Grid;

pub trait StepObserver {
    /// Called after step `step` (1-based) of `total` has completed.
    fn on_step(&mut self, step: usize, total: usize, elevation: &Grid<f64>);

    fn on_finish(&mut self, _total: usize) {}
}

impl<F> StepObserver for F
where
    F: FnMut(usize, usize, &Grid<f64>),
{
    fn on_step(&mut self, step: usize, total: usize, elevation: &Grid<f64>) {
        self(step, total, elevation)
    }
}

/// Keeps an owned copy of every `stride`-th step.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    stride: usize,
    frames: Vec<Grid<f64>>,
}

impl FrameRecorder {
    /// `stride` of 0 records nothing.
    pub fn new(stride: usize) -> Self {
        Self {
            stride,
            frames: Vec::new(),
        }
    }

    pub fn frames(&self) -> &[Grid<f64>] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Grid<f64>> {
        self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl StepObserver for FrameRecorder {
    fn on_step(&mut self, step: usize, _total: usize, elevation: &Grid<f64>) {
        if self.stride > 0 && step % self.stride == 0 {
            self.frames.push(elevation.clone());
        }
    }
}

/// Logs percentage complete every `every_pct` percent.
pub struct Progress {
    every_pct: f64,
    next_pct: f64,
}

impl Progress {
    pub fn new(every_pct: f64) -> Self {
        let every_pct = if every_pct > 0.0 { every_pct } else { 10.0 };
        Self {
            every_pct,
            next_pct: every_pct,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl StepObserver for Progress {
    fn on_step(&mut self, step: usize, total: usize, _elevation: &Grid<f64>) {
        if step == total {
            return;
        }
        let pct = step as f64 / total as f64 * 100.0;
        if pct >= self.next_pct {
            info!("{:.1} % finished", pct);
            while self.next_pct <= pct {
                self.next_pct += self.every_pct;
            }
        }
    }

    fn on_finish(&mut self, _total: usize) {
        info!("100.0 % finished");
        self.next_pct = self.every_pct;
    }
}
