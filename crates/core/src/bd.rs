//! Five-block recursive solver.
//!
//! Depth-bounded branch-and-bound over the candidate partitions of a
//! rectangle. Each node enumerates first-order non-guillotine cuts (five
//! parts) and vertical/horizontal guillotine cuts (two parts), prunes with
//! the memoized lower/upper bounds, and adopts improving candidates. A
//! subproblem solved without hitting the depth cap is final; one that
//! bottomed out keeps the level it was solved at and gets another chance
//! when reached from a shallower level.

use crate::memo::{Cut, Depth, PackContext};

/// Runs the five-block search on the normalized pallet and writes the
/// resulting count back into its table slot.
pub(crate) fn solve_bd(ctx: &mut PackContext) -> i32 {
    let (len, wid) = (ctx.len_n, ctx.wid_n);
    let count = bd(ctx, len, wid, 1);
    let slot = (ctx.row(len), ctx.col(wid));
    ctx.lower[slot] = count;
    log::debug!(
        "five-block search: {count} boxes in {len}x{wid}, upper bound {}",
        ctx.upper[slot]
    );
    count
}

/// Solves one rectangle at recursion level `n`, returning the best count
/// found. `len >= wid` is restored on entry so every subproblem is keyed in
/// canonical orientation.
pub(crate) fn bd(ctx: &mut PackContext, len: i32, wid: i32, n: i32) -> i32 {
    let (len, wid) = if wid > len { (wid, len) } else { (len, wid) };
    let slot = (ctx.row(len), ctx.col(wid));

    let mut best = ctx.lower[slot];
    let upper = ctx.local_upper(slot.0, slot.1);
    if best == 0 || best == upper {
        // Nothing fits, or the bounds already meet.
        ctx.depth[slot] = Depth::Optimal;
        ctx.reached_limit[slot] = false;
        return best;
    }

    let (xs, ys) = ctx.raster(len, wid);
    ctx.reached_limit[slot] = false;

    // First-order non-guillotine cuts: 0 < x1 < x2 < len, 0 < y1 < y2 < wid.
    //
    //      x1      x2
    //     ------------------
    //    |     |     2      |
    //    |  1  |------------|
    //    |     | 3 |        | y2
    //    |---------|    5   |
    //    |    4    |        | y1
    //     ------------------
    //
    // Symmetry restricts the loops to x1 <= len/2 and x1 + x2 <= len, and,
    // when x1 + x2 = len, to y1 + y2 <= wid.
    for (ix1, &x1) in xs.iter().enumerate().skip(1) {
        if x1 > len / 2 {
            break;
        }
        for &x2 in &xs[ix1 + 1..] {
            if x1 + x2 > len {
                break;
            }
            for (iy1, &y1) in ys.iter().enumerate().skip(1) {
                if y1 >= wid {
                    break;
                }
                for &y2 in &ys[iy1 + 1..] {
                    if y2 >= wid || (x1 + x2 == len && y1 + y2 > wid) {
                        break;
                    }
                    let parts = [
                        (x1, wid - y1),
                        (len - x1, wid - y2),
                        (x2 - x1, y2 - y1),
                        (x2, y1),
                        (len - x2, y2),
                    ];
                    if evaluate(ctx, len, wid, n, &parts, &mut best, upper, (x1, x2, y1, y2)) {
                        return best;
                    }
                }
            }
        }
    }

    // Vertical guillotine cuts, x1 = x2 <= len/2.
    for &x1 in xs.iter().skip(1) {
        if x1 > len / 2 {
            break;
        }
        let parts = [(x1, wid), (len - x1, wid)];
        if evaluate(ctx, len, wid, n, &parts, &mut best, upper, (x1, x1, 0, 0)) {
            return best;
        }
    }

    // Horizontal guillotine cuts, y1 = y2 <= wid/2.
    for &y1 in ys.iter().skip(1) {
        if y1 > wid / 2 {
            break;
        }
        let parts = [(len, wid - y1), (len, y1)];
        if evaluate(ctx, len, wid, n, &parts, &mut best, upper, (0, 0, y1, y1)) {
            return best;
        }
    }

    best
}

/// Evaluates one candidate partition of `len × wid` at level `n`.
///
/// Updates `best` (and the stored cut) when the partition improves on it.
/// Returns `true` when the candidate closed the gap to `upper`, proving the
/// rectangle optimal.
#[allow(clippy::too_many_arguments)]
fn evaluate(
    ctx: &mut PackContext,
    len: i32,
    wid: i32,
    n: i32,
    parts: &[(i32, i32)],
    best: &mut i32,
    upper: i32,
    (x1, x2, y1, y2): (i32, i32, i32, i32),
) -> bool {
    let parent = (ctx.row(len), ctx.col(wid));
    let count = parts.len();

    // Normalize each part and restore canonical orientation.
    let mut dims = [(0i32, 0i32); 5];
    let mut slots = [(0usize, 0usize); 5];
    for (k, &(pl, pw)) in parts.iter().enumerate() {
        let (mut pl, mut pw) = (ctx.norm.normalize(pl), ctx.norm.normalize(pw));
        if pl < pw {
            std::mem::swap(&mut pl, &mut pw);
        }
        dims[k] = (pl, pw);
        slots[k] = (ctx.row(pl), ctx.col(pw));
    }

    if n < ctx.max_depth {
        let mut part_lb = [0i32; 5];
        let mut part_ub = [0i32; 5];
        let mut sum_lb = 0;
        let mut sum_ub = 0;
        for k in 0..count {
            part_lb[k] = ctx.lower[slots[k]];
            part_ub[k] = ctx.local_upper(slots[k].0, slots[k].1);
            sum_lb += part_lb[k];
            sum_ub += part_ub[k];
        }
        if *best >= sum_ub {
            // The candidate cannot beat the incumbent.
            return false;
        }

        for k in 0..count {
            let z = if ctx.depth[slots[k]].wants_resolve(n) {
                // First solve, or another chance from a shallower level.
                let z = bd(ctx, dims[k].0, dims[k].1, n + 1);
                ctx.lower[slots[k]] = z;
                ctx.depth[slots[k]] = if ctx.reached_limit[slots[k]] {
                    Depth::At(n)
                } else {
                    Depth::Optimal
                };
                z
            } else {
                ctx.lower[slots[k]]
            };
            if ctx.reached_limit[slots[k]] {
                ctx.reached_limit[parent] = true;
            }

            sum_lb += z - part_lb[k];
            sum_ub += z - part_ub[k];
            if *best >= sum_ub {
                return false;
            }
            if sum_lb > *best {
                *best = sum_lb;
                ctx.cut[parent] = Cut::FiveBlock { x1, x2, y1, y2 };
                if *best == upper {
                    ctx.depth[parent] = Depth::Optimal;
                    ctx.reached_limit[parent] = false;
                    return true;
                }
            }
        }
    } else {
        // Depth cap: take the parts' current bounds without recursing.
        ctx.reached_limit[parent] = true;
        let sum: i32 = (0..count).map(|k| ctx.lower[slots[k]]).sum();
        if sum > *best {
            *best = sum;
            ctx.cut[parent] = Cut::FiveBlock { x1, x2, y1, y2 };
            if *best == upper {
                ctx.depth[parent] = Depth::Optimal;
                ctx.reached_limit[parent] = false;
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(len: i32, wid: i32, box_l: i32, box_w: i32) -> i32 {
        let mut ctx = PackContext::new(len, wid, box_l, box_w, 2_000_000_000);
        solve_bd(&mut ctx)
    }

    #[test]
    fn test_homogeneous_instance() {
        assert_eq!(run(100, 100, 10, 10), 100);
        assert_eq!(run(12, 9, 3, 3), 12);
    }

    #[test]
    fn test_infeasible_instance() {
        assert_eq!(run(1, 1, 2, 2), 0);
        assert_eq!(run(10, 2, 7, 3), 0);
    }

    #[test]
    fn test_classic_non_guillotine_instance() {
        // Needs a first-order non-guillotine pattern.
        assert_eq!(run(30, 20, 7, 3), 28);
    }

    #[test]
    fn test_small_instances() {
        // Guillotine splits suffice for both.
        assert_eq!(run(13, 7, 5, 3), 5);
        assert_eq!(run(6, 5, 3, 2), 5);
    }

    #[test]
    fn test_depth_cap_still_sound() {
        let mut ctx = PackContext::new(30, 20, 7, 3, 1);
        let capped = solve_bd(&mut ctx);
        assert!(capped <= 28);
        assert!(capped >= 24, "never worse than the homogeneous bound");
    }
}
