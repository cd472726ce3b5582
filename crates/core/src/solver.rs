//! Solver entry points and configuration.

use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bd;
use crate::codec;
use crate::error::{Error, Result};
use crate::lshape::LSolver;
use crate::memo::{LMemo, PackContext};
use crate::piece::Piece;
use crate::placement::Placement;
use crate::reconstruct::{self, Reconstructor};

/// Depth value standing in for an unbounded search.
const UNBOUNDED_DEPTH: i32 = 2_000_000_000;

/// How good the returned solution is known to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolutionStatus {
    /// The count matches the analytic upper bound.
    Optimal,
    /// A valid packing whose optimality could not be certified.
    Feasible,
    /// No box fits the pallet in either orientation.
    Infeasible,
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "Optimal"),
            Self::Feasible => write!(f, "Feasible"),
            Self::Infeasible => write!(f, "Infeasible"),
        }
    }
}

/// Configuration for the packing solver.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackConfig {
    /// Maximum five-block recursion depth (0 = unbounded).
    ///
    /// Bounded depths trade solution quality for time: partitions below the
    /// cap are estimated by their homogeneous bounds instead of being
    /// solved recursively.
    pub max_depth: u32,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self { max_depth: 0 }
    }
}

impl PackConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum five-block recursion depth (0 = unbounded).
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Result of a pack operation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackSolution {
    /// One entry per packed box.
    pub placements: Vec<Placement>,

    /// Solution quality.
    pub status: SolutionStatus,

    /// Analytic (Barnes) upper bound for the instance.
    pub upper_bound: i32,

    /// Count found by the five-block solver alone; the L-shape recursion
    /// can only improve on it.
    pub five_block_count: i32,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl PackSolution {
    /// Number of boxes packed.
    pub fn count(&self) -> usize {
        self.placements.len()
    }

    /// Whether the count is certified optimal.
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// Pallet loading solver.
///
/// ```rust
/// use rpack_core::{PackConfig, Packer};
///
/// let packer = Packer::new(PackConfig::new());
/// let solution = packer.pack_solution(30, 20, 7, 3).unwrap();
/// assert_eq!(solution.count(), 28);
/// assert!(solution.is_optimal());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Packer {
    config: PackConfig,
}

impl Packer {
    /// Creates a packer with the given configuration.
    pub fn new(config: PackConfig) -> Self {
        Self { config }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(PackConfig::default())
    }

    /// Packs `(box_l, box_w)` boxes into a `len × wid` pallet.
    pub fn pack(&self, len: i32, wid: i32, box_l: i32, box_w: i32) -> Result<Vec<Placement>> {
        Ok(self.pack_solution(len, wid, box_l, box_w)?.placements)
    }

    /// Packs and reports the full solution.
    pub fn pack_solution(
        &self,
        len: i32,
        wid: i32,
        box_l: i32,
        box_w: i32,
    ) -> Result<PackSolution> {
        let start = Instant::now();

        if len <= 0 || wid <= 0 || box_l <= 0 || box_w <= 0 {
            return Err(Error::InvalidDimensions(format!(
                "pallet {len}x{wid}, box {box_l}x{box_w}: all dimensions must be positive"
            )));
        }

        // Canonicalize to len >= wid; output coordinates swap back.
        let swapped = len < wid;
        let (len, wid) = if swapped { (wid, len) } else { (len, wid) };

        let max_depth = if self.config.max_depth == 0 {
            UNBOUNDED_DEPTH
        } else {
            self.config.max_depth as i32
        };

        let mut ctx = PackContext::new(len, wid, box_l, box_w, max_depth);
        let root = (ctx.row(ctx.len_n), ctx.col(ctx.wid_n));
        let upper_bound = ctx.upper[root];

        let five_block_count = bd::solve_bd(&mut ctx);
        if five_block_count == 0 {
            log::debug!("no {box_l}x{box_w} box fits a {len}x{wid} pallet");
            return Ok(PackSolution {
                placements: Vec::new(),
                status: SolutionStatus::Infeasible,
                upper_bound,
                five_block_count,
                computation_time_ms: start.elapsed().as_millis() as u64,
            });
        }

        let boxes = if five_block_count == upper_bound {
            Reconstructor::rectangles(&ctx, five_block_count)?
        } else {
            // The five-block result seeds the L-shape recursion over the
            // whole pallet, so it can only be improved on.
            let mut memo = LMemo::allocate(ctx.points.len(), ctx.col_of.len())?;
            let pallet = Piece::rect(ctx.len_n, ctx.wid_n);
            let word = LSolver::new(&mut ctx, &mut memo).solve(pallet);
            let count = codec::solution_count(word) as i32;
            log::debug!(
                "L-shape search: {count} boxes (five-block found {five_block_count}, upper bound {upper_bound})"
            );
            Reconstructor::l_shapes(&ctx, &memo, pallet, count)?
        };

        let count = boxes.len() as i32;
        let status = if count == upper_bound {
            SolutionStatus::Optimal
        } else {
            SolutionStatus::Feasible
        };
        Ok(PackSolution {
            placements: reconstruct::placements_from_boxes(&boxes, box_l, box_w, swapped),
            status,
            upper_bound,
            five_block_count,
            computation_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Packs `(box_l, box_w)` boxes into a `len × wid` pallet with default
/// configuration, returning one placement per packed box.
///
/// Invalid (non-positive) dimensions are an error; a box that fits in
/// neither orientation yields an empty list.
pub fn pack(len: i32, wid: i32, box_l: i32, box_w: i32) -> Result<Vec<Placement>> {
    Packer::default_config().pack(len, wid, box_l, box_w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_rejected() {
        assert!(matches!(pack(0, 10, 2, 1), Err(Error::InvalidDimensions(_))));
        assert!(matches!(pack(10, -3, 2, 1), Err(Error::InvalidDimensions(_))));
        assert!(matches!(pack(10, 10, 0, 1), Err(Error::InvalidDimensions(_))));
        assert!(matches!(pack(10, 10, 2, -1), Err(Error::InvalidDimensions(_))));
    }

    #[test]
    fn test_infeasible_is_empty_not_error() {
        let solution = Packer::default_config().pack_solution(1, 1, 2, 2).unwrap();
        assert!(solution.placements.is_empty());
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_homogeneous_pack() {
        let solution = Packer::default_config()
            .pack_solution(100, 100, 10, 10)
            .unwrap();
        assert_eq!(solution.count(), 100);
        assert!(solution.is_optimal());
        assert_eq!(solution.five_block_count, 100);
    }

    #[test]
    fn test_config_builder() {
        let config = PackConfig::new().with_max_depth(3);
        assert_eq!(config.max_depth, 3);
        assert_eq!(PackConfig::default().max_depth, 0);
    }

    #[test]
    fn test_bounded_depth_is_sound() {
        let packer = Packer::new(PackConfig::new().with_max_depth(1));
        let solution = packer.pack_solution(30, 20, 7, 3).unwrap();
        assert!(solution.count() >= 24);
        assert!(solution.count() <= 28);
    }

    #[test]
    fn test_swapped_input_mirrors_coordinates() {
        let direct = pack(30, 20, 7, 3).unwrap();
        let swapped = pack(20, 30, 7, 3).unwrap();
        assert_eq!(direct.len(), swapped.len());

        // The same packing, reflected across the diagonal.
        let mut mirrored: Vec<(i64, i64, bool)> = swapped
            .iter()
            .map(|p| ((p.y * 2.0) as i64, (p.x * 2.0) as i64, p.rotated))
            .collect();
        let mut original: Vec<(i64, i64, bool)> = direct
            .iter()
            .map(|p| ((p.x * 2.0) as i64, (p.y * 2.0) as i64, !p.rotated))
            .collect();
        mirrored.sort_unstable();
        original.sort_unstable();
        assert_eq!(mirrored, original);
    }
}
