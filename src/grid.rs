/// Row-major flat grid. No per-cell objects.
/// `w` is the x extent (the saltation axis), `h` the y extent; a row is one y.
/// Both axes wrap (toroidal topology).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }
}

impl<T: Copy> Grid<T> {
    pub fn filled(w: usize, h: usize, v: T) -> Self {
        Self {
            data: vec![v; w * h],
            w,
            h,
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self { data, w, h }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.w..(y + 1) * self.w]
    }
}

/// Wrap a signed coordinate onto `[0, n)`.
#[inline]
pub fn wrap(c: i64, n: usize) -> usize {
    c.rem_euclid(n as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_is_row_major_over_x() {
        let g = Grid::<f64>::new(4, 3);
        assert_eq!(g.idx(0, 0), 0);
        assert_eq!(g.idx(3, 0), 3);
        assert_eq!(g.idx(0, 1), 4);
        assert_eq!(g.idx(3, 2), 11);
    }

    #[test]
    fn from_fn_visits_every_cell() {
        let g = Grid::from_fn(3, 2, |x, y| (x * 10 + y) as f64);
        assert_eq!(g.get(2, 1), 21.0);
        assert_eq!(g.row(1), &[1.0, 11.0, 21.0]);
    }

    #[test]
    fn wrap_handles_both_edges() {
        assert_eq!(wrap(-1, 5), 4);
        assert_eq!(wrap(5, 5), 0);
        assert_eq!(wrap(12, 5), 2);
        assert_eq!(wrap(0, 1), 0);
    }
}
