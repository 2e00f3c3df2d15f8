use crate::grid::{wrap, Grid};

/// Precomputed wrapped neighbor coordinates for every cell.
///
/// Each table has the grid's shape and holds a single axis coordinate:
/// `xminus`/`xplus` hold x indices, `yminus`/`yplus` hold y indices. The
/// periodic boundary lives entirely in these tables, so the step needs no
/// edge branches.
#[derive(Clone, Debug)]
pub struct NeighborTables {
    pub xminus: Grid<usize>,
    pub xplus: Grid<usize>,
    pub yminus: Grid<usize>,
    pub yplus: Grid<usize>,
}

impl NeighborTables {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            xminus: Grid::from_fn(w, h, |x, _| wrap(x as i64 - 1, w)),
            xplus: Grid::from_fn(w, h, |x, _| wrap(x as i64 + 1, w)),
            yminus: Grid::from_fn(w, h, |_, y| wrap(y as i64 - 1, h)),
            yplus: Grid::from_fn(w, h, |_, y| wrap(y as i64 + 1, h)),
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.xminus.shape()
    }

    /// Orthogonal neighbors of `i` as flat indices: `[E, W, N, S]`.
    #[inline]
    pub fn orthogonal(&self, i: usize) -> [usize; 4] {
        let w = self.xminus.w;
        let (x, y) = (i % w, i / w);
        let (xp, xm) = (self.xplus.data[i], self.xminus.data[i]);
        let (yp, ym) = (self.yplus.data[i], self.yminus.data[i]);
        [y * w + xp, y * w + xm, yp * w + x, ym * w + x]
    }

    /// Diagonal neighbors of `i` as flat indices: `[NE, SE, NW, SW]`.
    /// Each is one x table composed with one y table; all four differ
    /// whenever both extents are at least 3.
    #[inline]
    pub fn diagonal(&self, i: usize) -> [usize; 4] {
        let w = self.xminus.w;
        let (xp, xm) = (self.xplus.data[i], self.xminus.data[i]);
        let (yp, ym) = (self.yplus.data[i], self.yminus.data[i]);
        [yp * w + xp, ym * w + xp, yp * w + xm, ym * w + xm]
    }
}
