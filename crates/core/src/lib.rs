//! # rpack-core
//!
//! Recursive partitioning solver for the manufacturer's pallet loading
//! problem: pack the maximum number of identical, 90°-rotatable `l × w`
//! boxes into an `L × W` pallet and report where each box goes, certifying
//! optimality whenever the count meets the analytic upper bound.
//!
//! ## Algorithm
//!
//! The engine combines two recursive partitioning schemes over a
//! number-theoretically reduced search space:
//!
//! - **Raster points**: only integer conic combinations of the box sides
//!   can matter as cut coordinates, collapsing the search space to a small
//!   finite set ([`raster`]).
//! - **Five-block search**: a branch-and-bound recursion partitioning each
//!   rectangle with guillotine and first-order non-guillotine cuts into up
//!   to five sub-rectangles, memoizing lower/upper bounds per subproblem.
//! - **L-shape search**: a second recursion over L-shaped pieces using nine
//!   subdivision families, run when the five-block result is not provably
//!   optimal; it starts from that result and can only improve it.
//! - **Reconstruction**: the memoized decisions are replayed into concrete
//!   box placements, applying rigid-body transforms where subproblems were
//!   solved in a rotated or reflected frame.
//!
//! Solutions are certified optimal whenever the count matches Barnes's
//! analytic upper bound ([`bounds`]).
//!
//! ## Quick start
//!
//! ```rust
//! use rpack_core::pack;
//!
//! let placements = pack(30, 20, 7, 3).unwrap();
//! assert_eq!(placements.len(), 28);
//!
//! for p in &placements {
//!     println!("box at ({}, {}){}", p.x, p.y, if p.rotated { " rotated" } else { "" });
//! }
//! ```
//!
//! Configurable front door with solution metadata:
//!
//! ```rust
//! use rpack_core::{PackConfig, Packer};
//!
//! let solution = Packer::new(PackConfig::new())
//!     .pack_solution(100, 100, 10, 10)
//!     .unwrap();
//! assert!(solution.is_optimal());
//! assert_eq!(solution.count(), 100);
//! ```
//!
//! ## Feature flags
//!
//! - `serde`: serialization support for the public data types.

mod bd;
pub mod bounds;
pub mod codec;
pub mod error;
mod lshape;
mod memo;
pub mod piece;
pub mod placement;
pub mod raster;
mod reconstruct;
pub mod solver;

// Re-exports
pub use codec::Subdivision;
pub use error::{Error, Result};
pub use piece::Piece;
pub use placement::Placement;
pub use solver::{pack, PackConfig, PackSolution, Packer, SolutionStatus};
