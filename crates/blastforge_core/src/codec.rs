//! # Position Codec
//!
//! Packs a signed voxel offset (relative to an explosion origin) into a single
//! `u32` so the deduplicating set stays small even for explosions touching
//! millions of voxels.
//!
//! ## Layout
//!
//! ```text
//!  31 30 | 29 | 28 ........ 20 | 19 | 18 ........ 10 | 9 | 8 ......... 0
//!  unused| sx |   |dx| (9 bit) | sy |   |dy| (9 bit) | sz|   |dz| (9 bit)
//! ```
//!
//! Every axis is clamped to `±MAX_OFFSET` before encoding. This is lossy on
//! purpose: two offsets beyond the bound on the same axis map to the same key.
//! Callers that need larger craters use the unbounded [`VoxelPos`] key instead.

use std::hash::Hash;

use blastforge_shared::VoxelPos;
use bytemuck::{Pod, Zeroable};

/// Largest encodable magnitude per axis.
pub const MAX_OFFSET: i32 = 511;

const MAGNITUDE_MASK: u32 = 0x1FF;
const SIGN_BIT: u32 = 0x200;
const AXIS_BITS: u32 = 10;

/// A signed 3-D offset packed into 30 bits.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
pub struct PackedOffsetKey(pub u32);

impl PackedOffsetKey {
    /// Encodes an offset, clamping each axis to `±MAX_OFFSET`.
    #[inline]
    #[must_use]
    pub fn encode(dx: i32, dy: i32, dz: i32) -> Self {
        Self((pack_axis(dx) << (AXIS_BITS * 2)) | (pack_axis(dy) << AXIS_BITS) | pack_axis(dz))
    }

    /// Decodes back into an offset; every component is in `[-511, 511]`.
    #[inline]
    #[must_use]
    pub fn decode(self) -> (i32, i32, i32) {
        (
            unpack_axis(self.0 >> (AXIS_BITS * 2)),
            unpack_axis(self.0 >> AXIS_BITS),
            unpack_axis(self.0),
        )
    }

    /// Raw packed value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[inline]
fn pack_axis(v: i32) -> u32 {
    let magnitude = v.unsigned_abs().min(MAX_OFFSET.unsigned_abs());
    if v < 0 {
        magnitude | SIGN_BIT
    } else {
        magnitude
    }
}

#[inline]
fn unpack_axis(bits: u32) -> i32 {
    // Masked to 9 bits, always fits.
    let magnitude = (bits & MAGNITUDE_MASK) as i32;
    if bits & SIGN_BIT != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encodes `(dx, dy, dz)`; see [`PackedOffsetKey::encode`].
#[inline]
#[must_use]
pub fn encode(dx: i32, dy: i32, dz: i32) -> PackedOffsetKey {
    PackedOffsetKey::encode(dx, dy, dz)
}

/// Decodes a key; see [`PackedOffsetKey::decode`].
#[inline]
#[must_use]
pub fn decode(key: PackedOffsetKey) -> (i32, i32, i32) {
    key.decode()
}

/// Key type for the deduplicating voxel set.
///
/// Both the packed offset and the plain absolute coordinate satisfy the same
/// hash-set contract; the engine is generic over the choice.
pub trait VoxelKey: Copy + Eq + Hash {
    /// Builds the key for `pos` in an explosion centered on voxel `origin`.
    fn from_voxel(pos: VoxelPos, origin: VoxelPos) -> Self;

    /// Recovers the absolute voxel for this key.
    fn to_voxel(self, origin: VoxelPos) -> VoxelPos;
}

impl VoxelKey for PackedOffsetKey {
    #[inline]
    fn from_voxel(pos: VoxelPos, origin: VoxelPos) -> Self {
        let (dx, dy, dz) = pos.relative_to(origin);
        Self::encode(dx, dy, dz)
    }

    #[inline]
    fn to_voxel(self, origin: VoxelPos) -> VoxelPos {
        let (dx, dy, dz) = self.decode();
        origin.offset(dx, dy, dz)
    }
}

impl VoxelKey for VoxelPos {
    #[inline]
    fn from_voxel(pos: VoxelPos, _origin: VoxelPos) -> Self {
        pos
    }

    #[inline]
    fn to_voxel(self, _origin: VoxelPos) -> VoxelPos {
        self
    }
}
