//! Geometry types shared between the explosion engine and the fuse machine.
//!
//! Continuous positions are `f64` so that large worlds keep sub-voxel precision.
//! Voxel coordinates are `i32`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - position, velocity, direction
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// Creates a new Vec3
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit Y vector
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Dot product
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Length squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Distance squared (avoids sqrt)
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Unit vector in the same direction, or zero for a zero-length input.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// Voxel containing this point (floor on every axis).
    #[inline]
    #[must_use]
    pub fn voxel(self) -> VoxelPos {
        VoxelPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Voxel index with every axis truncated toward zero.
    ///
    /// Differs from [`Vec3::voxel`] for negative coordinates: `-0.3` maps to
    /// `0`, not `-1`. Explosion rays sample voxels this way.
    #[inline]
    #[must_use]
    pub fn voxel_toward_zero(self) -> VoxelPos {
        VoxelPos::new(self.x as i32, self.y as i32, self.z as i32)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Integer voxel coordinate in the host grid.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable, Serialize,
    Deserialize,
)]
pub struct VoxelPos {
    /// X coordinate
    pub x: i32,
    /// Y coordinate (vertical)
    pub y: i32,
    /// Z coordinate
    pub z: i32,
}

impl VoxelPos {
    /// Creates a new voxel coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The origin voxel.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Offsets this coordinate by a signed delta.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The voxel directly below.
    #[inline]
    #[must_use]
    pub const fn below(self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Component-wise difference `self - origin`.
    #[inline]
    #[must_use]
    pub const fn relative_to(self, origin: Self) -> (i32, i32, i32) {
        (self.x - origin.x, self.y - origin.y, self.z - origin.z)
    }

    /// Largest absolute component.
    #[inline]
    #[must_use]
    pub fn max_abs_component(self) -> i32 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }

    /// Minimum corner of the voxel as a continuous point.
    #[inline]
    #[must_use]
    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from two corners, sorting them per axis.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Creates a cube centered on `center` with the given half extent.
    #[must_use]
    pub fn around(center: Vec3, half_extent: f64) -> Self {
        let h = half_extent.abs();
        Self {
            min: Vec3::new(center.x - h, center.y - h, center.z - h),
            max: Vec3::new(center.x + h, center.y + h, center.z + h),
        }
    }

    /// Returns true if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        let sum = a + b;
        assert_eq!(sum, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!((b - a).length_squared(), 27.0);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
        let n = Vec3::new(0.0, 3.0, 4.0).normalize_or_zero();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_voxel_floors_negative_coordinates() {
        assert_eq!(Vec3::new(-0.3, 0.7, -1.0).voxel(), VoxelPos::new(-1, 0, -1));
        assert_eq!(Vec3::new(2.99, -2.01, 0.0).voxel(), VoxelPos::new(2, -3, 0));
    }

    #[test]
    fn test_voxel_toward_zero_truncates() {
        assert_eq!(Vec3::new(-0.3, 0.7, -1.0).voxel_toward_zero(), VoxelPos::new(0, 0, -1));
        assert_eq!(Vec3::new(2.99, -2.01, -0.99).voxel_toward_zero(), VoxelPos::new(2, -2, 0));
    }

    #[test]
    fn test_aabb_contains_boundary() {
        let bb = Aabb::around(Vec3::ZERO, 2.0);
        assert!(bb.contains(Vec3::new(2.0, -2.0, 0.0)));
        assert!(!bb.contains(Vec3::new(2.0001, 0.0, 0.0)));
    }

    #[test]
    fn test_vec3_bytemuck() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 24);
    }
}
