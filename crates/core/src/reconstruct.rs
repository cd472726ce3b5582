//! Placement reconstruction.
//!
//! Walks the memoized decisions after the solvers finish: rectangle
//! subproblems replay the five-block cut stored in the rectangle tables,
//! L-shaped subproblems replay their recorded subdivision with the stored
//! division coordinates. Children are materialized in their own standard
//! position and mapped back into the parent frame by one of eight rigid
//! transforms plus a translation.

use crate::codec::{self, Subdivision};
use crate::error::{Error, Result};
use crate::memo::{Cut, LMemo, PackContext};
use crate::piece::Piece;
use crate::placement::Placement;

/// An axis-aligned box as corner coordinates `[x0, y0, x1, y1]`.
pub(crate) type BoxRect = [i32; 4];

/// Rigid transforms mapping a child's standard-position frame into its
/// parent frame. P1..P4 flip within the frame, P5..P8 also transpose the
/// axes (used when canonicalization swapped the child's axes).
#[derive(Debug, Clone, Copy)]
enum Transform {
    /// Vertical flip.
    P1,
    /// Horizontal flip.
    P2,
    /// 180° rotation.
    P3,
    /// Identity.
    P4,
    /// Transpose + vertical flip.
    P5,
    /// Transpose + horizontal flip.
    P6,
    /// Transpose + 180° rotation.
    P7,
    /// Transpose.
    P8,
}

/// Which flip maps the child's standard position into the parent frame.
/// Children drawn as plain rectangles never need a flip.
#[derive(Debug, Clone, Copy)]
enum Flip {
    None,
    Vertical,
    Horizontal,
    Both,
}

pub(crate) struct Reconstructor<'a> {
    ctx: &'a PackContext,
    memo: Option<&'a LMemo>,
    boxes: Vec<BoxRect>,
}

impl<'a> Reconstructor<'a> {
    /// Materializes a solution stored purely in the rectangle tables.
    pub fn rectangles(ctx: &'a PackContext, expected: i32) -> Result<Vec<BoxRect>> {
        let mut r = Self {
            ctx,
            memo: None,
            boxes: Vec::with_capacity(expected as usize),
        };
        r.draw_rect(ctx.len_n, ctx.wid_n, 0, 0);
        r.finish(expected)
    }

    /// Materializes a solution rooted in the L-shape memo.
    pub fn l_shapes(
        ctx: &'a PackContext,
        memo: &'a LMemo,
        root: Piece,
        expected: i32,
    ) -> Result<Vec<BoxRect>> {
        let mut r = Self {
            ctx,
            memo: Some(memo),
            boxes: Vec::with_capacity(expected as usize),
        };
        r.draw_piece(root);
        r.finish(expected)
    }

    /// Table entries only ever improve, so replaying stored decisions can
    /// materialize more boxes than the count recorded when a parent adopted
    /// them, never fewer. Fewer means the replay itself is broken.
    fn finish(self, expected: i32) -> Result<Vec<BoxRect>> {
        if self.boxes.len() < expected as usize {
            return Err(Error::Internal(format!(
                "reconstruction produced {} boxes for a solution of {expected}",
                self.boxes.len()
            )));
        }
        Ok(self.boxes)
    }

    // ----- rectangles -------------------------------------------------

    /// Draws a rectangle solution at offset `(dx, dy)`, dispatching on the
    /// orientation its table entry is keyed under.
    fn draw_rect(&mut self, len: i32, wid: i32, dx: i32, dy: i32) {
        if len >= wid {
            self.draw_rect_normal(len, wid, dx, dy);
        } else {
            self.draw_rect_rotated(len, wid, dx, dy);
        }
    }

    /// The homogeneous grid in the better of the two orientations.
    fn draw_grid(&mut self, len: i32, wid: i32, dx: i32, dy: i32) {
        let (l, w) = (self.ctx.box_l, self.ctx.box_w);
        let a = (len / l) * (wid / w);
        let b = (len / w) * (wid / l);
        let (sx, sy) = if a > b { (l, w) } else { (w, l) };

        let mut x = 0;
        while x + sx <= len {
            let mut y = 0;
            while y + sy <= wid {
                self.boxes.push([x + dx, y + dy, x + sx + dx, y + sy + dy]);
                y += sy;
            }
            x += sx;
        }
    }

    /// The five parts of a stored cut, normalized like the solver produced
    /// them.
    fn parts_of(&self, len: i32, wid: i32, x1: i32, x2: i32, y1: i32, y2: i32) -> [(i32, i32); 5] {
        let n = |v: i32| self.ctx.norm.normalize(v);
        [
            (x1, n(wid - y1)),
            (n(len - x1), n(wid - y2)),
            (n(x2 - x1), n(y2 - y1)),
            (x2, y1),
            (n(len - x2), y2),
        ]
    }

    fn draw_rect_normal(&mut self, len: i32, wid: i32, dx: i32, dy: i32) {
        let slot = (self.ctx.row(len), self.ctx.col(wid));
        let Cut::FiveBlock { x1, x2, y1, y2 } = self.ctx.cut[slot] else {
            self.draw_grid(len, wid, dx, dy);
            return;
        };
        let p = self.parts_of(len, wid, x1, x2, y1, y2);
        for (k, &(pl, pw)) in p.iter().enumerate() {
            if pl == 0 || pw == 0 || (pl == len && pw == wid) || (pl == wid && pw == len) {
                continue;
            }
            let (ox, oy) = match k {
                0 => (dx, dy + p[3].1),
                1 => (dx + p[0].0, dy + p[4].1),
                2 => (dx + p[0].0, dy + p[3].1),
                3 => (dx, dy),
                _ => (dx + p[3].0, dy),
            };
            self.draw_rect(pl, pw, ox, oy);
        }
    }

    /// The queried rectangle is stored under the transposed key: replay the
    /// canonical solution rotated by 90°, which maps canonical `(x, y)` to
    /// `(y, len_c - x)`.
    fn draw_rect_rotated(&mut self, len: i32, wid: i32, dx: i32, dy: i32) {
        let (len_c, wid_c) = (wid, len);
        let slot = (self.ctx.row(len_c), self.ctx.col(wid_c));
        let Cut::FiveBlock { x1, x2, y1, y2 } = self.ctx.cut[slot] else {
            self.draw_grid(len, wid, dx, dy);
            return;
        };
        let p = self.parts_of(len_c, wid_c, x1, x2, y1, y2);
        for (k, &(pl, pw)) in p.iter().enumerate() {
            if pl == 0 || pw == 0 || (pl == len_c && pw == wid_c) || (pl == wid_c && pw == len_c) {
                continue;
            }
            let (ox, oy) = match k {
                0 => (dx + p[3].1, dy + p[1].0),
                1 => (dx + p[4].1, dy),
                2 => (dx + p[3].1, dy + p[4].0),
                3 => (dx, dy + p[4].0),
                _ => (dx, dy),
            };
            self.draw_rect(pw, pl, ox, oy);
        }
    }

    // ----- L-shapes ---------------------------------------------------

    /// Draws a memoized piece at the origin of its own frame.
    fn draw_piece(&mut self, q: Piece) {
        let slot = self.memo.and_then(|m| {
            let key = m.key(&q, &self.ctx.row_of, &self.ctx.col_of);
            m.get(&key)
        });
        match slot {
            Some(s) if codec::solution_tag(s.solution) != Subdivision::Homogeneous => {
                self.draw_subdivision(q, codec::solution_tag(s.solution), s.division);
            }
            _ => {
                // A homogeneous (or never-materialized) record: rectangles
                // fall through to the rectangle tables, proper L's split
                // into the two rectangles their bound was built from.
                if q.is_rect() {
                    self.draw_rect(q.i, q.j, 0, 0);
                } else {
                    self.draw_split(q);
                }
            }
        }
    }

    /// Splits an L into two rectangles the way its seed bound was formed.
    fn draw_split(&mut self, q: Piece) {
        let n = |v: i32| self.ctx.norm.normalize(v);
        let vertical = self.ctx.rect_lower(q.i1, q.j) + self.ctx.rect_lower(n(q.i - q.i1), q.j1)
            > self.ctx.rect_lower(q.i1, n(q.j - q.j1)) + self.ctx.rect_lower(q.i, q.j1);
        if vertical {
            self.draw_rect(q.i1, q.j, 0, 0);
            self.draw_rect(n(q.i - q.i1), q.j1, q.i1, 0);
        } else {
            self.draw_rect(q.i1, n(q.j - q.j1), 0, q.j1);
            self.draw_rect(q.i, q.j1, 0, 0);
        }
    }

    /// Replays a stored subdivision: recovers both children with the stored
    /// division coordinates, draws each in standard position, and maps it
    /// into the parent frame.
    fn draw_subdivision(&mut self, q: Piece, tag: Subdivision, division: u32) {
        let (d1, d2, d3) = codec::division_parts(division);
        let (raw1, raw2) = tag.split((d1, d2, d3), &q, &self.ctx.norm);

        match tag {
            Subdivision::B1 => {
                let dy = if d1 == 0 { q.j1 } else { d2 };
                self.emit(raw1, Flip::Vertical, false, 0, dy);
                let dx = if d2 == 0 { d1 } else { 0 };
                self.emit(raw2, Flip::Horizontal, false, dx, 0);
            }
            Subdivision::B2 => {
                let tmp = raw1.collapse_degenerate();
                let (mut dx, mut dy) = (0, q.j1);
                if d2 == q.j {
                    dx = d1;
                } else if tmp.i == tmp.i1 {
                    dy = d2;
                }
                self.emit(raw1, Flip::Both, false, dx, dy);
                self.emit(raw2, Flip::None, false, 0, 0);
            }
            Subdivision::B3 => {
                self.emit(raw1, Flip::None, false, 0, 0);
                self.emit(raw2, Flip::None, false, d1, d2);
            }
            Subdivision::B4 => {
                self.emit(raw1, Flip::None, false, 0, 0);
                let tmp = raw2.collapse_degenerate();
                let (mut dx, mut dy) = (q.i1, 0);
                if d1 == q.i {
                    dy = d2;
                } else if tmp.i == tmp.i1 {
                    dx = d1;
                }
                self.emit(raw2, Flip::Both, true, dx, dy);
            }
            Subdivision::B5 => {
                let dy = if d1 == 0 { d2 } else { 0 };
                self.emit(raw1, Flip::Vertical, false, 0, dy);
                let dx = if d2 == 0 { q.i1 } else { d1 };
                self.emit(raw2, Flip::Horizontal, false, dx, 0);
            }
            Subdivision::B6 => {
                let dy = if d1 == 0 { d2 } else { 0 };
                self.emit(raw1, Flip::Vertical, false, 0, dy);
                let dx = if d2 == 0 { d3 } else { d1 };
                self.emit(raw2, Flip::Horizontal, false, dx, 0);
            }
            Subdivision::B7 => {
                let dy = if d1 == 0 { d3 } else { d2 };
                self.emit(raw1, Flip::Vertical, false, 0, dy);
                let dx = if d2 == 0 { d1 } else { 0 };
                self.emit(raw2, Flip::Horizontal, false, dx, 0);
            }
            Subdivision::B8 => {
                let dy = if d1 == 0 { d2 } else { 0 };
                self.emit(raw1, Flip::Vertical, false, 0, dy);
                self.emit(raw2, Flip::None, false, d1, 0);
            }
            Subdivision::B9 => {
                let dy = if d1 == 0 { q.j1 } else { d2 };
                self.emit(raw1, Flip::None, false, 0, dy);
                let dx = if d2 == 0 { d1 } else { 0 };
                self.emit(raw2, Flip::Horizontal, false, dx, 0);
            }
            Subdivision::Homogeneous => unreachable!("homogeneous records are never replayed"),
        }
    }

    /// Draws one standard-position child and maps it into the parent frame.
    ///
    /// The degenerate collapse of the raw child tells which region is
    /// actually covered; the canonical form decides whether its axes were
    /// swapped relative to standard position, which selects between the
    /// plain transforms P1..P4 and their transposed counterparts P5..P8.
    fn emit(&mut self, raw: Piece, flip: Flip, strict: bool, dx: i32, dy: i32) {
        let tmp = raw.collapse_degenerate();
        let Some(frame) = raw.normalized(self.ctx.box_area()) else {
            // Too small to hold a box; contributes nothing.
            return;
        };

        let start = self.boxes.len();
        self.draw_piece(frame);

        let (w, h) = if tmp.i != tmp.j {
            (tmp.i, tmp.j)
        } else {
            (tmp.i1, tmp.j1)
        };
        let drawn_as_rect = tmp.i == tmp.i1;
        let transform = match flip {
            Flip::None => aligned_pair(w >= h),
            _ if drawn_as_rect => aligned_pair(w >= h),
            Flip::Vertical => {
                if w >= h {
                    Transform::P1
                } else {
                    Transform::P5
                }
            }
            Flip::Horizontal => {
                if w >= h {
                    Transform::P2
                } else {
                    Transform::P6
                }
            }
            Flip::Both => {
                let aligned = if strict { w > h } else { w >= h };
                if aligned {
                    Transform::P3
                } else {
                    Transform::P7
                }
            }
        };
        self.transform(start, transform, &frame, dx, dy);
    }

    /// Applies a rigid transform plus translation to every box drawn since
    /// `start`, in the `frame.i × frame.j` child frame.
    fn transform(&mut self, start: usize, tr: Transform, frame: &Piece, dx: i32, dy: i32) {
        let (fi, fj) = (frame.i, frame.j);
        for b in &mut self.boxes[start..] {
            let [x0, y0, x1, y1] = *b;
            let mut t = match tr {
                Transform::P1 => [x0, fj - y0, x1, fj - y1],
                Transform::P2 => [fi - x0, y0, fi - x1, y1],
                Transform::P3 => [fi - x0, fj - y0, fi - x1, fj - y1],
                Transform::P4 => [x0, y0, x1, y1],
                Transform::P5 => [y0, fi - x0, y1, fi - x1],
                Transform::P6 => [fj - y0, x0, fj - y1, x1],
                Transform::P7 => [fj - y0, fi - x0, fj - y1, fi - x1],
                Transform::P8 => [y0, x0, y1, x1],
            };
            if t[0] > t[2] {
                t.swap(0, 2);
            }
            if t[1] > t[3] {
                t.swap(1, 3);
            }
            *b = [t[0] + dx, t[1] + dy, t[2] + dx, t[3] + dy];
        }
    }
}

fn aligned_pair(aligned: bool) -> Transform {
    if aligned {
        Transform::P4
    } else {
        Transform::P8
    }
}

/// Converts internal box corners into center placements, mirroring the
/// coordinate swap back when the caller's pallet was given width-first.
pub(crate) fn placements_from_boxes(
    boxes: &[BoxRect],
    box_l: i32,
    box_w: i32,
    swapped: bool,
) -> Vec<Placement> {
    boxes
        .iter()
        .map(|&[x0, y0, x1, y1]| {
            let cx = (x0 + x1) as f64 / 2.0;
            let cy = (y0 + y1) as f64 / 2.0;
            let (x, y, x_extent) = if swapped {
                (cy, cx, y1 - y0)
            } else {
                (cx, cy, x1 - x0)
            };
            Placement::new(x, y, box_l != box_w && x_extent != box_l)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bd::solve_bd;

    fn boxes_for(len: i32, wid: i32, box_l: i32, box_w: i32) -> Vec<BoxRect> {
        let mut ctx = PackContext::new(len, wid, box_l, box_w, 2_000_000_000);
        let count = solve_bd(&mut ctx);
        Reconstructor::rectangles(&ctx, count).expect("count-consistent reconstruction")
    }

    fn assert_disjoint_and_contained(boxes: &[BoxRect], len: i32, wid: i32) {
        for b in boxes {
            assert!(b[0] >= 0 && b[1] >= 0 && b[2] <= len && b[3] <= wid, "{b:?} escapes");
            assert!(b[0] < b[2] && b[1] < b[3], "{b:?} is empty");
        }
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                let overlap = a[0] < b[2] && b[0] < a[2] && a[1] < b[3] && b[1] < a[3];
                assert!(!overlap, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_homogeneous_grid() {
        let boxes = boxes_for(100, 100, 10, 10);
        assert_eq!(boxes.len(), 100);
        assert_disjoint_and_contained(&boxes, 100, 100);
    }

    #[test]
    fn test_five_block_pattern() {
        let boxes = boxes_for(30, 20, 7, 3);
        assert_eq!(boxes.len(), 28);
        assert_disjoint_and_contained(&boxes, 30, 20);
    }

    #[test]
    fn test_box_dimensions_preserved() {
        for b in boxes_for(30, 20, 7, 3) {
            let dims = (b[2] - b[0], b[3] - b[1]);
            assert!(dims == (7, 3) || dims == (3, 7), "bad box {b:?}");
        }
    }

    #[test]
    fn test_placement_conversion_swaps_back() {
        let boxes = vec![[0, 0, 7, 3]];
        let direct = placements_from_boxes(&boxes, 7, 3, false);
        assert_eq!((direct[0].x, direct[0].y), (3.5, 1.5));
        assert!(!direct[0].rotated);

        let mirrored = placements_from_boxes(&boxes, 7, 3, true);
        assert_eq!((mirrored[0].x, mirrored[0].y), (1.5, 3.5));
        assert!(mirrored[0].rotated);
    }

    #[test]
    fn test_square_boxes_never_rotated() {
        let boxes = vec![[0, 0, 5, 5], [5, 0, 10, 5]];
        for p in placements_from_boxes(&boxes, 5, 5, false) {
            assert!(!p.rotated);
        }
    }
}
