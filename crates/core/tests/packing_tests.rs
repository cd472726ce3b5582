//! Integration tests for rpack-core.

use rpack_core::{pack, PackConfig, Packer, Placement, SolutionStatus};

/// Integer corner coordinates doubled, so half-unit centers stay exact.
fn doubled_corners(p: &Placement, box_l: i32, box_w: i32) -> (i64, i64, i64, i64) {
    let (x0, y0, x1, y1) = p.corners(box_l, box_w);
    (
        (x0 * 2.0) as i64,
        (y0 * 2.0) as i64,
        (x1 * 2.0) as i64,
        (y1 * 2.0) as i64,
    )
}

/// Checks every quantified placement invariant for one instance.
fn assert_valid_packing(placements: &[Placement], len: i32, wid: i32, box_l: i32, box_w: i32) {
    let corners: Vec<_> = placements
        .iter()
        .map(|p| doubled_corners(p, box_l, box_w))
        .collect();

    // Containment in [0, len] x [0, wid].
    for c in &corners {
        assert!(
            c.0 >= 0 && c.1 >= 0 && c.2 <= 2 * len as i64 && c.3 <= 2 * wid as i64,
            "box {c:?} escapes the {len}x{wid} pallet"
        );
    }

    // Orientation: every box is l x w or w x l, and the flag matches.
    for (p, c) in placements.iter().zip(&corners) {
        let dims = ((c.2 - c.0) / 2, (c.3 - c.1) / 2);
        if p.rotated {
            assert_eq!(dims, (box_w as i64, box_l as i64), "rotated flag lies");
            assert_ne!(box_l, box_w, "square boxes must never be flagged rotated");
        } else {
            assert_eq!(dims, (box_l as i64, box_w as i64), "rotated flag lies");
        }
    }

    // Pairwise disjoint interiors.
    for (i, a) in corners.iter().enumerate() {
        for b in &corners[i + 1..] {
            let overlap = a.0 < b.2 && b.0 < a.2 && a.1 < b.3 && b.1 < a.3;
            assert!(!overlap, "boxes {a:?} and {b:?} overlap");
        }
    }
}

mod scenario_tests {
    use super::*;

    const SCENARIOS: &[(i32, i32, i32, i32, usize)] = &[
        (30, 20, 7, 3, 28),
        (57, 44, 12, 5, 41),
        (86, 82, 15, 11, 42),
        (100, 100, 10, 10, 100),
        (13, 7, 5, 3, 5),
        (1, 1, 2, 2, 0),
    ];

    #[test]
    fn test_reference_instances() {
        for &(len, wid, l, w, expected) in SCENARIOS {
            let placements = pack(len, wid, l, w).unwrap();
            assert_eq!(
                placements.len(),
                expected,
                "count mismatch for {len}x{wid} with {l}x{w} boxes"
            );
            assert_valid_packing(&placements, len, wid, l, w);
        }
    }

    #[test]
    fn test_l_shape_search_improves_five_block() {
        // The classic instance where five-block cuts stop at 41.
        let solution = Packer::default_config().pack_solution(86, 82, 15, 11).unwrap();
        assert_eq!(solution.five_block_count, 41);
        assert_eq!(solution.count(), 42);
        assert!(solution.is_optimal());
    }

    #[test]
    fn test_unit_boxes_fill_exactly() {
        let solution = Packer::default_config().pack_solution(9, 6, 1, 1).unwrap();
        assert_eq!(solution.count(), 54);
        assert!(solution.is_optimal());
        assert_valid_packing(&solution.placements, 9, 6, 1, 1);
    }

    #[test]
    fn test_narrow_strip_is_infeasible() {
        // The pallet is thinner than the box's short side.
        let solution = Packer::default_config().pack_solution(50, 2, 7, 3).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.placements.is_empty());
    }

    #[test]
    fn test_guillotine_only_instance() {
        let placements = pack(13, 7, 5, 3).unwrap();
        assert_eq!(placements.len(), 5);
        assert_valid_packing(&placements, 13, 7, 5, 3);
    }
}

mod bound_tests {
    use super::*;
    use rpack_core::bounds::{barnes_upper_bound, homogeneous_lower_bound};

    #[test]
    fn test_counts_respect_bounds() {
        for &(len, wid, l, w) in &[
            (30, 20, 7, 3),
            (57, 44, 12, 5),
            (22, 17, 6, 5),
            (40, 25, 7, 2),
            (19, 13, 4, 3),
        ] {
            let n = pack(len, wid, l, w).unwrap().len() as i32;
            assert!(
                n >= homogeneous_lower_bound(len, wid, l, w),
                "{len}x{wid}/{l}x{w}: worse than homogeneous"
            );
            assert!(
                n <= barnes_upper_bound(len, wid, l, w),
                "{len}x{wid}/{l}x{w}: beats the upper bound"
            );
        }
    }

    #[test]
    fn test_upper_bound_reported() {
        let solution = Packer::default_config().pack_solution(30, 20, 7, 3).unwrap();
        assert_eq!(solution.upper_bound, 28);
    }
}

mod symmetry_tests {
    use super::*;

    #[test]
    fn test_count_invariant_under_pallet_swap() {
        for &(len, wid, l, w) in &[(30, 20, 7, 3), (22, 17, 6, 5), (13, 7, 5, 3)] {
            let a = pack(len, wid, l, w).unwrap();
            let b = pack(wid, len, l, w).unwrap();
            assert_eq!(a.len(), b.len());
            assert_valid_packing(&b, wid, len, l, w);
        }
    }

    #[test]
    fn test_count_invariant_under_box_swap() {
        for &(len, wid, l, w) in &[(30, 20, 7, 3), (22, 17, 6, 5), (57, 44, 12, 5)] {
            let a = pack(len, wid, l, w).unwrap();
            let b = pack(len, wid, w, l).unwrap();
            assert_eq!(a.len(), b.len());
            assert_valid_packing(&b, len, wid, w, l);
        }
    }

    #[test]
    fn test_swapped_pallet_mirrors_placements() {
        let direct = pack(30, 20, 7, 3).unwrap();
        let swapped = pack(20, 30, 7, 3).unwrap();

        let mut a: Vec<(i64, i64)> = direct.iter().map(|p| ((p.x * 2.0) as i64, (p.y * 2.0) as i64)).collect();
        let mut b: Vec<(i64, i64)> = swapped.iter().map(|p| ((p.y * 2.0) as i64, (p.x * 2.0) as i64)).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }
}

mod normalization_tests {
    use rpack_core::raster::{conic_combinations, NormalTable};
    use rpack_core::Piece;

    #[test]
    fn test_conic_set_closure() {
        let set = conic_combinations(57, 12, 5);
        let norm = NormalTable::build(&set, 57);
        for v in 0..=57 {
            if set.contains(&v) {
                assert_eq!(norm.normalize(v), v);
            } else {
                assert!(norm.normalize(v) < v);
            }
        }
    }

    #[test]
    fn test_piece_normalization_idempotent() {
        let mut pieces = Vec::new();
        for i in 1..=12 {
            for j in 1..=12 {
                for i1 in 0..=i {
                    for j1 in 0..=j {
                        pieces.push(Piece::new(i, j, i1, j1));
                    }
                }
            }
        }
        for q in pieces {
            let Some(once) = q.normalized(2) else { continue };
            let twice = once.normalized(2).expect("canonical pieces stay usable");
            assert_eq!(once, twice, "{q:?} is not idempotent");
        }
    }

    #[test]
    fn test_axis_swapped_pieces_canonicalize_together() {
        for (a, b) in [
            (Piece::new(9, 12, 4, 7), Piece::new(12, 9, 7, 4)),
            (Piece::new(5, 8, 5, 8), Piece::new(8, 5, 8, 5)),
            (Piece::new(6, 6, 2, 4), Piece::new(6, 6, 4, 2)),
        ] {
            assert_eq!(a.normalized(1), b.normalized(1));
        }
    }
}

mod depth_tests {
    use super::*;

    #[test]
    fn test_depth_cap_stays_valid() {
        for depth in [1, 2] {
            let packer = Packer::new(PackConfig::new().with_max_depth(depth));
            let solution = packer.pack_solution(30, 20, 7, 3).unwrap();
            assert!(solution.count() >= 24 && solution.count() <= 28);
            assert_valid_packing(&solution.placements, 30, 20, 7, 3);
        }
    }
}
