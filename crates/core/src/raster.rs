//! Integer-set utilities: conic combinations, normalization and raster points.
//!
//! For box dimensions `(l, w)` and a limit `L`, the conic-combination set is
//!
//! ```text
//! X = { x | x = r·l + s·w, 0 <= x <= L, r, s >= 0 integers }
//! ```
//!
//! Every packing of the pallet can be converted into one whose cut
//! coordinates all lie on the *raster points*
//!
//! ```text
//! X' = { <L - x>_X | x in X } ∪ {0},    <v>_S = max { s in S | s <= v }
//! ```
//!
//! so only these finitely many coordinates have to be enumerated.

/// Builds the sorted conic-combination set of `box_l` and `box_w` up to
/// `limit`, using a linear DP over `c[0..=limit]` where members are exactly
/// the values with `c[x] = x`. `limit` itself is appended if absent.
pub fn conic_combinations(limit: i32, box_l: i32, box_w: i32) -> Vec<i32> {
    let n = limit as usize;
    let mut c = vec![0i32; n + 1];

    for side in [box_l, box_w] {
        let step = side as usize;
        if step == 0 || step > n {
            continue;
        }
        for i in step..=n {
            if c[i] < c[i - step] + side {
                c[i] = c[i - step] + side;
            }
        }
    }

    let mut set = Vec::with_capacity(n + 2);
    set.push(0);
    for i in 1..=n {
        if c[i] == i as i32 {
            set.push(i as i32);
        }
    }
    if *set.last().unwrap_or(&-1) != limit {
        set.push(limit);
    }
    set
}

/// Prefix-max projection of a sorted point set over `0..=limit`:
/// `normalize(v) = max { s in points | s <= v }`.
#[derive(Debug, Clone)]
pub struct NormalTable {
    table: Vec<i32>,
}

impl NormalTable {
    /// Builds the table in O(limit). `points` must be sorted ascending and
    /// contain 0.
    pub fn build(points: &[i32], limit: i32) -> Self {
        let mut table = vec![0i32; limit as usize + 1];
        let mut k = 0;
        for (v, slot) in table.iter_mut().enumerate() {
            while k + 1 < points.len() && points[k + 1] <= v as i32 {
                k += 1;
            }
            *slot = points[k];
        }
        Self { table }
    }

    /// Returns the largest set element `<= v`.
    #[inline]
    pub fn normalize(&self, v: i32) -> i32 {
        self.table[v as usize]
    }

    /// Largest value covered by the table.
    pub fn limit(&self) -> i32 {
        self.table.len() as i32 - 1
    }
}

/// Constructs the raster-point sets `X'` and `Y'` for a `len × wid`
/// rectangle from a sorted working point set.
///
/// Iterating the point set descending makes `norm(len - p)` ascending, so a
/// strictly-increasing filter yields the sorted, duplicate-free result.
pub fn raster_points(
    len: i32,
    wid: i32,
    norm: &NormalTable,
    points: &[i32],
) -> (Vec<i32>, Vec<i32>) {
    (
        raster_half(len, norm, points),
        raster_half(wid, norm, points),
    )
}

fn raster_half(limit: i32, norm: &NormalTable, points: &[i32]) -> Vec<i32> {
    let mut out = Vec::with_capacity(points.len() + 1);
    for &p in points.iter().filter(|&&p| p <= limit).rev() {
        let v = norm.normalize(limit - p);
        if out.last().map_or(true, |&last| v > last) {
            out.push(v);
        }
    }
    out
}

/// Merges the raster sets of the whole pallet into the working point set
/// used by every subproblem: the sorted union of `X'` (up to `len_n`) and
/// `Y'` (up to `wid_n`), with `len_n` guaranteed present.
pub fn merged_raster_set(len_n: i32, wid_n: i32, xs: &[i32], ys: &[i32]) -> Vec<i32> {
    let mut merged: Vec<i32> = xs
        .iter()
        .filter(|&&v| v <= len_n)
        .chain(ys.iter().filter(|&&v| v <= wid_n))
        .copied()
        .collect();
    merged.sort_unstable();
    merged.dedup();
    if *merged.last().unwrap_or(&-1) != len_n {
        merged.push(len_n);
    }
    merged
}
