//! Bit-packed memo record codec.
//!
//! Each L-shape memo slot holds two 32-bit words:
//!
//! * **solution word**: bits 0..=26 carry the box count, bits 27..=30 the
//!   subdivision tag that realised it;
//! * **division word**: bits 0..=10, 11..=21 and 22..=31 carry the up-to-three
//!   division coordinates of that subdivision.
//!
//! Every read and write of a record goes through this module; no other
//! component touches the bit layout. The field widths bound the coordinates
//! (`d1`, `d2` ≤ 2047, `d3` ≤ 1023) and the count (`< 2^27`); both are
//! debug-asserted rather than enforced, since instances within the engine's
//! documented coordinate limits cannot exceed them.

/// Mask extracting the box count from a solution word.
pub const COUNT_MASK: u32 = 0x07FF_FFFF;
/// Shift of the subdivision tag inside a solution word.
pub const TAG_SHIFT: u32 = 27;

/// Masks and shifts of the three division coordinates.
pub const DIV1_MASK: u32 = 0x0000_07FF;
pub const DIV2_MASK: u32 = 0x003F_F800;
pub const DIV3_MASK: u32 = 0xFFC0_0000;
pub const DIV2_SHIFT: u32 = 11;
pub const DIV3_SHIFT: u32 = 22;

/// How a memoized region was partitioned.
///
/// `Homogeneous` marks a region packed as a single grid (for rectangles) or
/// split into two rectangles (for L's); `B1`…`B9` are the nine L-subdivision
/// families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Subdivision {
    Homogeneous = 0,
    B1 = 1,
    B2 = 2,
    B3 = 3,
    B4 = 4,
    B5 = 5,
    B6 = 6,
    B7 = 7,
    B8 = 8,
    B9 = 9,
}

impl Subdivision {
    /// Decodes a tag value; anything out of range is treated as
    /// `Homogeneous`, the associative backing's default.
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            1 => Self::B1,
            2 => Self::B2,
            3 => Self::B3,
            4 => Self::B4,
            5 => Self::B5,
            6 => Self::B6,
            7 => Self::B7,
            8 => Self::B8,
            9 => Self::B9,
            _ => Self::Homogeneous,
        }
    }
}

/// Packs a box count and subdivision tag into a solution word.
#[inline]
pub fn pack_solution(count: u32, tag: Subdivision) -> u32 {
    debug_assert!(count <= COUNT_MASK, "box count {count} overflows 27 bits");
    count | ((tag as u32) << TAG_SHIFT)
}

/// Box count stored in a solution word.
#[inline]
pub fn solution_count(word: u32) -> u32 {
    word & COUNT_MASK
}

/// Subdivision tag stored in a solution word.
#[inline]
pub fn solution_tag(word: u32) -> Subdivision {
    Subdivision::from_tag(word >> TAG_SHIFT)
}

/// Packs up to three division coordinates into a division word.
#[inline]
pub fn pack_division(d1: i32, d2: i32, d3: i32) -> u32 {
    debug_assert!((0..=DIV1_MASK as i32).contains(&d1), "d1 {d1} overflows 11 bits");
    debug_assert!((0..=DIV1_MASK as i32).contains(&d2), "d2 {d2} overflows 11 bits");
    debug_assert!((0..=(DIV3_MASK >> DIV3_SHIFT) as i32).contains(&d3), "d3 {d3} overflows 10 bits");
    d1 as u32 | ((d2 as u32) << DIV2_SHIFT) | ((d3 as u32) << DIV3_SHIFT)
}

/// Unpacks the three division coordinates of a division word.
#[inline]
pub fn division_parts(word: u32) -> (i32, i32, i32) {
    (
        (word & DIV1_MASK) as i32,
        ((word & DIV2_MASK) >> DIV2_SHIFT) as i32,
        ((word & DIV3_MASK) >> DIV3_SHIFT) as i32,
    )
}
