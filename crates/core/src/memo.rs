//! Memoization state: rectangle bound tables and the adaptive L-shape memo.
//!
//! All table state for one solve lives in a single [`PackContext`] threaded
//! through the recursions; there are no globals, so concurrent callers each
//! own their tables and re-entrancy is trivial.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use crate::bounds::{barnes_upper_bound, homogeneous_lower_bound};
use crate::error::{Error, Result};
use crate::piece::Piece;
use crate::raster::{conic_combinations, merged_raster_set, raster_points, NormalTable};

/// Contiguous row-major 2-D storage indexed by `(row, col)`.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            cols,
            data: vec![fill; rows * cols],
        }
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &T {
        &self.data[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        &mut self.data[r * self.cols + c]
    }
}

/// Dense step map from a coordinate value to the index of the largest raster
/// point `<= value`. Total over `0..=limit`, so lookups can never read an
/// unset slot.
#[derive(Debug, Clone)]
pub struct StepMap {
    map: Vec<usize>,
    len: usize,
}

impl StepMap {
    /// Builds the map over `0..=limit` from a sorted point set starting at 0.
    pub fn build(points: &[i32], limit: i32) -> Self {
        let mut map = vec![0usize; limit as usize + 1];
        let mut k = 0;
        for (v, slot) in map.iter_mut().enumerate() {
            while k + 1 < points.len() && points[k + 1] <= v as i32 {
                k += 1;
            }
            *slot = k;
        }
        Self { map, len: k + 1 }
    }

    /// Index of the largest raster point `<= v`.
    #[inline]
    pub fn index(&self, v: i32) -> usize {
        self.map[v as usize]
    }

    /// Number of raster points within the limit.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Solve progress of a rectangle subproblem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// The stored lower bound is proven optimal.
    Optimal,
    /// Deepest recursion level at which the subproblem was last solved.
    At(i32),
}

impl Depth {
    /// Whether the subproblem deserves another solve from level `n`.
    #[inline]
    pub fn wants_resolve(self, n: i32) -> bool {
        match self {
            Depth::Optimal => false,
            Depth::At(d) => d > n,
        }
    }
}

/// The partition that realised a rectangle's current lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cut {
    /// A single homogeneous grid.
    Homogeneous,
    /// A five-block division determined by two vertical and two horizontal
    /// cut coordinates (guillotine cuts collapse some of them).
    FiveBlock { x1: i32, x2: i32, y1: i32, y2: i32 },
}

/// All per-call solver state.
pub(crate) struct PackContext {
    pub box_l: i32,
    pub box_w: i32,
    /// Maximum five-block recursion depth.
    pub max_depth: i32,
    /// Normalization table over `0..=len`.
    pub norm: NormalTable,
    /// Merged raster point set of the pallet; the working point set for
    /// every subproblem and the row key space of the tables.
    pub points: Vec<i32>,
    /// Normalized pallet dimensions.
    pub len_n: i32,
    pub wid_n: i32,
    /// Step maps keying the tables: rows over `0..=len_n`, columns over
    /// `0..=wid_n`.
    pub row_of: StepMap,
    pub col_of: StepMap,
    pub lower: Grid<i32>,
    pub upper: Grid<i32>,
    pub depth: Grid<Depth>,
    pub reached_limit: Grid<bool>,
    pub cut: Grid<Cut>,
}

impl PackContext {
    /// Builds the whole table state for a `len × wid` pallet and
    /// `(box_l, box_w)` boxes: conic combinations, normal table, merged
    /// raster set, index maps, and the bound matrices seeded with the
    /// homogeneous lower bound and the Barnes upper bound.
    pub fn new(len: i32, wid: i32, box_l: i32, box_w: i32, max_depth: i32) -> Self {
        let conic = conic_combinations(len, box_l, box_w);
        let norm = NormalTable::build(&conic, len);
        let len_n = norm.normalize(len);
        let wid_n = norm.normalize(wid);

        let (xs, ys) = raster_points(len, wid, &norm, &conic);
        let points = merged_raster_set(len_n, wid_n, &xs, &ys);

        let row_of = StepMap::build(&points, len_n);
        let col_of = StepMap::build(&points, wid_n);
        let rows = points.len();
        let cols = col_of.len();

        let mut ctx = Self {
            box_l,
            box_w,
            max_depth,
            norm,
            points,
            len_n,
            wid_n,
            row_of,
            col_of,
            lower: Grid::new(rows, cols, 0),
            upper: Grid::new(rows, cols, 0),
            depth: Grid::new(rows, cols, Depth::At(max_depth)),
            reached_limit: Grid::new(rows, cols, true),
            cut: Grid::new(rows, cols, Cut::Homogeneous),
        };

        for r in 0..rows {
            let x = ctx.points[r];
            for c in 0..cols {
                let y = ctx.points[c];
                ctx.lower[(r, c)] = homogeneous_lower_bound(x, y, box_l, box_w);
                ctx.upper[(r, c)] = barnes_upper_bound(x, y, box_l, box_w);
            }
        }
        ctx
    }

    #[inline]
    pub fn row(&self, v: i32) -> usize {
        self.row_of.index(v)
    }

    #[inline]
    pub fn col(&self, v: i32) -> usize {
        self.col_of.index(v)
    }

    /// Barnes bound of a slot, tightened to the lower bound once the slot is
    /// proven optimal.
    #[inline]
    pub fn local_upper(&self, r: usize, c: usize) -> i32 {
        if self.depth[(r, c)] == Depth::Optimal {
            self.lower[(r, c)]
        } else {
            self.upper[(r, c)]
        }
    }

    /// Current lower bound of the `x × y` rectangle, normalized and read in
    /// canonical `x >= y` orientation (the orientation the five-block solver
    /// maintains).
    pub fn rect_lower(&self, x: i32, y: i32) -> i32 {
        let (x, y) = canonical(self.norm.normalize(x), self.norm.normalize(y));
        self.lower[(self.row(x), self.col(y))]
    }

    /// Barnes bound of the `x × y` rectangle, canonicalized like
    /// [`rect_lower`](Self::rect_lower).
    pub fn rect_upper(&self, x: i32, y: i32) -> i32 {
        let (x, y) = canonical(self.norm.normalize(x), self.norm.normalize(y));
        self.upper[(self.row(x), self.col(y))]
    }

    /// Raster-point sets of a `len × wid` subproblem, derived from the
    /// merged pallet set.
    pub fn raster(&self, len: i32, wid: i32) -> (Vec<i32>, Vec<i32>) {
        raster_points(len, wid, &self.norm, &self.points)
    }

    pub fn box_area(&self) -> i32 {
        self.box_l * self.box_w
    }
}

#[inline]
fn canonical(x: i32, y: i32) -> (i32, i32) {
    if x >= y {
        (x, y)
    } else {
        (y, x)
    }
}

/// One memoized L-shape record: the packed solution and division words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LSlot {
    pub solution: u32,
    pub division: u32,
}

/// Memo key: dense primary index plus the residual components not covered
/// by the primary index.
#[derive(Debug, Clone, Copy)]
pub struct LKey {
    pub primary: usize,
    pub residual: u64,
}

enum LStore {
    /// Memory type 4: every key component dense.
    Dense(Vec<Option<LSlot>>),
    /// Memory types 3..1: dense prefix, associative residual.
    Assoc(Vec<HashMap<u64, LSlot>>),
}

/// Adaptive memoization for L-shape subproblems.
///
/// Memory type `t` indexes a dense vector of
/// `num_x^ceil(t/2) * num_y^floor(t/2)` slots by the first `t` components of
/// the piece tuple; the remaining components become an associative lookup.
/// Allocation tries type 4 first and falls back to 3, 2, 1; if even type 1
/// cannot be allocated the solve fails.
pub struct LMemo {
    mem_type: u8,
    num_x: usize,
    num_y: usize,
    store: LStore,
}

impl LMemo {
    /// Allocates the largest backing that fits, where `num_x` and `num_y`
    /// are the raster-point counts along each axis.
    pub fn allocate(num_x: usize, num_y: usize) -> Result<Self> {
        for mem_type in (1..=4u8).rev() {
            if let Some(memo) = Self::try_allocate(mem_type, num_x, num_y) {
                if mem_type < 4 {
                    log::warn!(
                        "dense L-shape memo does not fit, falling back to memory type {mem_type}"
                    );
                }
                return Ok(memo);
            }
        }
        Err(Error::Allocation(format!(
            "no L-shape memo backing fits {num_x}x{num_y} raster points"
        )))
    }

    fn try_allocate(mem_type: u8, num_x: usize, num_y: usize) -> Option<Self> {
        let primary_len = Self::primary_len(mem_type, num_x, num_y)?;
        let store = match mem_type {
            4 => {
                let mut slots: Vec<Option<LSlot>> = Vec::new();
                slots.try_reserve_exact(primary_len).ok()?;
                slots.resize(primary_len, None);
                LStore::Dense(slots)
            }
            _ => {
                let mut maps: Vec<HashMap<u64, LSlot>> = Vec::new();
                maps.try_reserve_exact(primary_len).ok()?;
                maps.resize_with(primary_len, HashMap::new);
                LStore::Assoc(maps)
            }
        };
        Some(Self {
            mem_type,
            num_x,
            num_y,
            store,
        })
    }

    fn primary_len(mem_type: u8, num_x: usize, num_y: usize) -> Option<usize> {
        match mem_type {
            4 => num_x
                .checked_mul(num_y)?
                .checked_mul(num_x)?
                .checked_mul(num_y),
            3 => num_x.checked_mul(num_y)?.checked_mul(num_x),
            2 => num_x.checked_mul(num_y),
            _ => Some(num_x),
        }
    }

    /// Memory type in use (4 = fully dense, 1 = mostly associative).
    pub fn mem_type(&self) -> u8 {
        self.mem_type
    }

    /// Computes the key of a canonical piece under the current memory type.
    pub fn key(&self, q: &Piece, rows: &StepMap, cols: &StepMap) -> LKey {
        let a = rows.index(q.i);
        let b = cols.index(q.j);
        let c = rows.index(q.i1);
        let d = cols.index(q.j1);
        let (nx, ny) = (self.num_x, self.num_y);

        match self.mem_type {
            4 => LKey {
                primary: ((a * ny + b) * nx + c) * ny + d,
                residual: 0,
            },
            3 => LKey {
                primary: (a * ny + b) * nx + c,
                residual: q.j1 as u64,
            },
            2 => LKey {
                primary: a * ny + b,
                residual: (c * ny + d) as u64,
            },
            _ => LKey {
                primary: a,
                residual: ((b * nx + c) * ny + d) as u64,
            },
        }
    }

    pub fn get(&self, key: &LKey) -> Option<LSlot> {
        match &self.store {
            LStore::Dense(slots) => slots[key.primary],
            LStore::Assoc(maps) => maps[key.primary].get(&key.residual).copied(),
        }
    }

    pub fn insert(&mut self, key: &LKey, slot: LSlot) {
        match &mut self.store {
            LStore::Dense(slots) => slots[key.primary] = Some(slot),
            LStore::Assoc(maps) => {
                maps[key.primary].insert(key.residual, slot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_round_trip() {
        let mut g = Grid::new(3, 4, 0);
        g[(2, 3)] = 7;
        g[(0, 1)] = -2;
        assert_eq!(g[(2, 3)], 7);
        assert_eq!(g[(0, 1)], -2);
        assert_eq!(g[(1, 1)], 0);
    }

    #[test]
    fn test_step_map_rounds_down() {
        let m = StepMap::build(&[0, 3, 6, 7, 10], 10);
        assert_eq!(m.index(0), 0);
        assert_eq!(m.index(2), 0);
        assert_eq!(m.index(3), 1);
        assert_eq!(m.index(5), 1);
        assert_eq!(m.index(7), 3);
        assert_eq!(m.index(10), 4);
        assert_eq!(m.len(), 5);
    }

    #[test]
    fn test_step_map_respects_limit() {
        // Points past the limit are not counted.
        let m = StepMap::build(&[0, 3, 6, 7, 10], 6);
        assert_eq!(m.len(), 3);
        assert_eq!(m.index(6), 2);
    }

    #[test]
    fn test_depth_resolve_rules() {
        assert!(Depth::At(5).wants_resolve(3));
        assert!(!Depth::At(3).wants_resolve(3));
        assert!(!Depth::Optimal.wants_resolve(0));
    }

    #[test]
    fn test_context_seeds_bounds() {
        let ctx = PackContext::new(30, 20, 7, 3, i32::MAX);
        let (r, c) = (ctx.row(30), ctx.col(20));
        assert_eq!(ctx.lower[(r, c)], 24);
        assert_eq!(ctx.upper[(r, c)], 28);
        assert_eq!(ctx.cut[(r, c)], Cut::Homogeneous);
        assert!(ctx.reached_limit[(r, c)]);
    }

    #[test]
    fn test_context_rect_lookups_canonicalize() {
        let ctx = PackContext::new(30, 20, 7, 3, i32::MAX);
        assert_eq!(ctx.rect_lower(14, 20), ctx.rect_lower(20, 14));
        assert_eq!(ctx.rect_upper(14, 20), ctx.rect_upper(20, 14));
    }

    #[test]
    fn test_lmemo_type4_roundtrip() {
        let ctx = PackContext::new(30, 20, 7, 3, i32::MAX);
        let mut memo = LMemo::allocate(ctx.points.len(), ctx.col_of.len()).unwrap();
        assert_eq!(memo.mem_type(), 4);

        let q = Piece::new(30, 20, 14, 9);
        let key = memo.key(&q, &ctx.row_of, &ctx.col_of);
        assert!(memo.get(&key).is_none());

        let slot = LSlot {
            solution: 42,
            division: 7,
        };
        memo.insert(&key, slot);
        assert_eq!(memo.get(&key), Some(slot));

        // A different piece maps to a different slot.
        let other = memo.key(&Piece::new(30, 20, 14, 12), &ctx.row_of, &ctx.col_of);
        assert!(memo.get(&other).is_none());
    }

    #[test]
    fn test_lmemo_assoc_roundtrip() {
        let ctx = PackContext::new(30, 20, 7, 3, i32::MAX);
        let memo = LMemo::try_allocate(2, ctx.points.len(), ctx.col_of.len()).unwrap();
        let mut memo = memo;
        assert_eq!(memo.mem_type(), 2);

        let q = Piece::new(30, 20, 14, 9);
        let key = memo.key(&q, &ctx.row_of, &ctx.col_of);
        assert!(memo.get(&key).is_none());
        memo.insert(
            &key,
            LSlot {
                solution: 9,
                division: 1,
            },
        );
        assert_eq!(
            memo.get(&key),
            Some(LSlot {
                solution: 9,
                division: 1
            })
        );
    }
}
