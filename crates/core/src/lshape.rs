//! Nine-subdivision recursive solver for L-shaped pieces.
//!
//! Every L is attacked by splitting it into two smaller L's, each put back
//! into standard position and normalized, and recursing. Rectangles (the
//! degenerate case) get the two rectangle-specific subdivisions B6 and B7 on
//! top of their homogeneous seed; proper L's are seeded with the better of
//! the two rectangle splits and then run through B1, B3, B5, B2, B8, B4, B9,
//! whose free cut coordinates range over three constraint bands of the
//! raster sets.

use crate::codec::{self, Subdivision};
use crate::memo::{LKey, LMemo, LSlot, PackContext};
use crate::piece::Piece;
use crate::raster::NormalTable;

impl Subdivision {
    /// Splits `q` at the division coordinates `(a, b, c)` into the two
    /// sub-L's of this family, each in its own standard position. `c` is
    /// only meaningful for B6 (`x''`) and B7 (`y''`).
    ///
    /// All coordinate subtractions run through the normal table.
    pub(crate) fn split(self, (a, b, c): (i32, i32, i32), q: &Piece, nt: &NormalTable) -> (Piece, Piece) {
        let n = |v: i32| nt.normalize(v);
        let &Piece { i, j, i1, j1 } = q;
        match self {
            Subdivision::B1 => (
                Piece::new(i1, n(j - b), a, n(j - j1)),
                Piece::new(i, j1, n(i - a), b),
            ),
            Subdivision::B2 => (
                Piece::new(i1, n(j - j1), n(i1 - a), n(j - b)),
                Piece::new(i, b, a, j1),
            ),
            Subdivision::B3 => (
                Piece::new(i, j, a, b),
                Piece::new(n(i - a), n(j - b), n(i1 - a), n(j1 - b)),
            ),
            Subdivision::B4 => (
                Piece::new(a, j, i1, b),
                Piece::new(n(i - i1), j1, n(i - a), n(j1 - b)),
            ),
            Subdivision::B5 => (
                Piece::new(i1, j, a, n(j - b)),
                Piece::new(n(i - a), j1, n(i - i1), b),
            ),
            Subdivision::B6 => (
                Piece::new(c, j, a, n(j - b)),
                Piece::new(n(i - a), j, n(i - c), b),
            ),
            Subdivision::B7 => (
                Piece::new(i, n(j - b), a, n(j - c)),
                Piece::new(i, c, n(i - a), b),
            ),
            Subdivision::B8 => (
                Piece::new(i1, j, a, n(j - b)),
                Piece::new(n(i - a), b, n(i1 - a), j1),
            ),
            Subdivision::B9 => (
                Piece::new(a, n(j - b), i1, n(j1 - b)),
                Piece::new(i, j1, n(i - a), b),
            ),
            Subdivision::Homogeneous => unreachable!("homogeneous records are never split"),
        }
    }
}

/// The L-shape recursion over a shared context and memo.
pub(crate) struct LSolver<'a> {
    ctx: &'a mut PackContext,
    memo: &'a mut LMemo,
}

impl<'a> LSolver<'a> {
    pub fn new(ctx: &'a mut PackContext, memo: &'a mut LMemo) -> Self {
        Self { ctx, memo }
    }

    fn key(&self, q: &Piece) -> LKey {
        self.memo.key(q, &self.ctx.row_of, &self.ctx.col_of)
    }

    /// Solves a canonical piece and returns its packed solution word.
    pub fn solve(&mut self, q: Piece) -> u32 {
        let key = self.key(&q);
        if let Some(slot) = self.memo.get(&key) {
            return slot.solution;
        }
        if q.is_rect() {
            self.solve_rect(q, key)
        } else {
            self.solve_l(q, key)
        }
    }

    fn solve_l(&mut self, q: Piece, key: LKey) -> u32 {
        let upper = q.capacity(self.ctx.box_area());
        let (seed, horizontal) = self.split_seed(&q);

        // The seed splits the L into two rectangles; record it as a B1
        // division so reconstruction can replay it.
        let division = if horizontal {
            codec::pack_division(0, q.j1, 0)
        } else {
            codec::pack_division(q.i1, 0, 0)
        };
        let mut slot = LSlot {
            solution: codec::pack_solution(seed as u32, Subdivision::B1),
            division,
        };
        self.memo.insert(&key, slot);

        if seed == upper {
            return slot.solution;
        }

        let (xs, ys) = self.ctx.raster(q.i, q.j);
        let from_x = xs.iter().position(|&v| v >= q.i1).unwrap_or(xs.len());
        let from_y = ys.iter().position(|&v| v >= q.j1).unwrap_or(ys.len());
        let x_max = *xs.last().unwrap_or(&0);
        let y_max = *ys.last().unwrap_or(&0);

        // (subdivision, x range, y range): three constraint bands.
        let plan = [
            (Subdivision::B1, 0, q.i1, 0, q.j1),
            (Subdivision::B3, 0, q.i1, 0, q.j1),
            (Subdivision::B5, 0, q.i1, 0, q.j1),
            (Subdivision::B2, 0, q.i1, from_y, y_max),
            (Subdivision::B8, 0, q.i1, from_y, y_max),
            (Subdivision::B4, from_x, x_max, 0, q.j1),
            (Subdivision::B9, from_x, x_max, 0, q.j1),
        ];
        for (sub, x_from, x_cap, y_from, y_cap) in plan {
            if self.divide(&q, &key, &mut slot, sub, &xs[x_from..], x_cap, &ys[y_from..], y_cap, upper) {
                break;
            }
        }
        slot.solution
    }

    fn solve_rect(&mut self, q: Piece, key: LKey) -> u32 {
        let lower = self.ctx.rect_lower(q.i, q.j);
        let upper = self.ctx.rect_upper(q.i, q.j);
        let mut slot = LSlot {
            solution: codec::pack_solution(lower as u32, Subdivision::Homogeneous),
            division: 0,
        };
        self.memo.insert(&key, slot);

        if lower != upper {
            let (xs, ys) = self.ctx.raster(q.i, q.j);
            let optimal = self.divide_b6(&q, &key, &mut slot, &xs, &ys, upper);
            if !optimal {
                self.divide_b7(&q, &key, &mut slot, &xs, &ys, upper);
            }
            // Rectangle solutions found here sharpen the shared table.
            let cell = (self.ctx.row(q.i), self.ctx.col(q.j));
            self.ctx.lower[cell] = codec::solution_count(slot.solution) as i32;
        }
        slot.solution
    }

    /// Seed bound of a proper L: the better of cutting at `y = j1`
    /// (horizontal) or `x = i1` (vertical), both yielding two rectangles.
    ///
    /// ```text
    /// +-----+            +-----+           +-----+
    /// |     |            |     |           |  |  |
    /// |     +----+  -->  +-----+----+  or  |  +--+--+
    /// |          |       |          |      |  |     |
    /// +----------+       +----------+      +--+-----+
    /// ```
    fn split_seed(&self, q: &Piece) -> (i32, bool) {
        let n = |v: i32| self.ctx.norm.normalize(v);
        let horizontal = self.ctx.rect_lower(q.i1, n(q.j - q.j1)) + self.ctx.rect_lower(q.i, q.j1);
        let vertical = self.ctx.rect_lower(q.i1, q.j) + self.ctx.rect_lower(n(q.i - q.i1), q.j1);
        if horizontal > vertical {
            (horizontal, true)
        } else {
            (vertical, false)
        }
    }

    /// Tries every division of `q` in one subdivision family, with the free
    /// coordinates `(x', y')` limited to `x' <= x_cap`, `y' <= y_cap`.
    /// Returns `true` once the piece's upper bound is reached.
    #[allow(clippy::too_many_arguments)]
    fn divide(
        &mut self,
        q: &Piece,
        key: &LKey,
        slot: &mut LSlot,
        sub: Subdivision,
        xs: &[i32],
        x_cap: i32,
        ys: &[i32],
        y_cap: i32,
        upper: i32,
    ) -> bool {
        let box_area = self.ctx.box_area();
        for &x in xs {
            if x > x_cap {
                break;
            }
            for &y in ys {
                if y > y_cap {
                    break;
                }
                let (raw1, raw2) = sub.split((x, y, 0), q, &self.ctx.norm);
                let (Some(q1), Some(q2)) = (raw1.normalized(box_area), raw2.normalized(box_area))
                else {
                    continue;
                };

                let best = codec::solution_count(slot.solution) as i32;
                if q1.capacity(box_area) + q2.capacity(box_area) <= best {
                    continue;
                }
                let s1 = codec::solution_count(self.solve(q1)) as i32;
                let s2 = codec::solution_count(self.solve(q2)) as i32;
                if s1 + s2 > best {
                    slot.solution = codec::pack_solution((s1 + s2) as u32, sub);
                    slot.division = codec::pack_division(x, y, 0);
                    self.memo.insert(key, *slot);
                    if s1 + s2 == upper {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// B6: two vertical cuts `x' <= x''` across a rectangle, with a
    /// horizontal cut at `y'` between them.
    fn divide_b6(
        &mut self,
        q: &Piece,
        key: &LKey,
        slot: &mut LSlot,
        xs: &[i32],
        ys: &[i32],
        upper: i32,
    ) -> bool {
        let box_area = self.ctx.box_area();
        for (ix, &x) in xs.iter().enumerate() {
            for &x2 in &xs[ix..] {
                if x == 0 && x2 == 0 {
                    continue;
                }
                for &y in ys {
                    let (raw1, raw2) = Subdivision::B6.split((x, y, x2), q, &self.ctx.norm);
                    let (Some(q1), Some(q2)) =
                        (raw1.normalized(box_area), raw2.normalized(box_area))
                    else {
                        continue;
                    };

                    let best = codec::solution_count(slot.solution) as i32;
                    if q1.capacity(box_area) + q2.capacity(box_area) <= best {
                        continue;
                    }
                    let s1 = codec::solution_count(self.solve(q1)) as i32;
                    let s2 = codec::solution_count(self.solve(q2)) as i32;
                    if s1 + s2 > best {
                        slot.solution = codec::pack_solution((s1 + s2) as u32, Subdivision::B6);
                        slot.division = codec::pack_division(x, y, x2);
                        self.memo.insert(key, *slot);
                        if s1 + s2 == upper {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// B7: the transposed counterpart of B6, two horizontal cuts
    /// `y' <= y''` with a vertical cut at `x'` between them.
    fn divide_b7(
        &mut self,
        q: &Piece,
        key: &LKey,
        slot: &mut LSlot,
        xs: &[i32],
        ys: &[i32],
        upper: i32,
    ) -> bool {
        let box_area = self.ctx.box_area();
        for (iy, &y) in ys.iter().enumerate() {
            for &y2 in &ys[iy..] {
                if y == 0 && y2 == 0 {
                    continue;
                }
                for &x in xs {
                    let (raw1, raw2) = Subdivision::B7.split((x, y, y2), q, &self.ctx.norm);
                    let (Some(q1), Some(q2)) =
                        (raw1.normalized(box_area), raw2.normalized(box_area))
                    else {
                        continue;
                    };

                    let best = codec::solution_count(slot.solution) as i32;
                    if q1.capacity(box_area) + q2.capacity(box_area) <= best {
                        continue;
                    }
                    let s1 = codec::solution_count(self.solve(q1)) as i32;
                    let s2 = codec::solution_count(self.solve(q2)) as i32;
                    if s1 + s2 > best {
                        slot.solution = codec::pack_solution((s1 + s2) as u32, Subdivision::B7);
                        slot.division = codec::pack_division(x, y, y2);
                        self.memo.insert(key, *slot);
                        if s1 + s2 == upper {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }
}
