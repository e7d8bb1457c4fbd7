//! # Destruction Ray Caster
//!
//! Geometry of a detonation, independent of what the rays hit.
//!
//! 1. [`DestructionRayCaster::directions`] enumerates the integer offsets of the
//!    cube `[-R, R]³` and keeps those on the "surface" for the configured
//!    [`Accuracy`]. Each kept offset becomes one ray.
//! 2. [`ray_length`] draws a jittered length per ray.
//! 3. [`RayWalk`] steps along the ray and yields the voxel of every sample
//!    point (each axis truncated toward zero) until the remaining length runs out. The caller charges resistance
//!    between samples with [`RayWalk::absorb`].
//!
//! ## Fast mode
//!
//! An offset is a ray iff `trunc(|offset|) == R`. This shell is not a perfect
//! sphere sampling and skips some directions depending on rounding; explosion
//! shapes depend on it, so it stays exactly as is.

use blastforge_shared::{Vec3, VoxelPos};
use rand::Rng;

use crate::config::{Accuracy, EngineConfig};
use crate::explosion::BlockBlastParams;

/// Returns true if the offset `(dx, dy, dz)` is a ray direction for `radius`.
#[must_use]
pub fn is_ray_direction(dx: i32, dy: i32, dz: i32, radius: i32, accuracy: Accuracy) -> bool {
    if radius <= 0 {
        return false;
    }
    match accuracy {
        Accuracy::Fast => {
            let squared = i64::from(dx).pow(2) + i64::from(dy).pow(2) + i64::from(dz).pow(2);
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            let truncated = (squared as f64).sqrt() as i64;
            truncated == i64::from(radius)
        }
        Accuracy::Precise => dx.abs() == radius || dy.abs() == radius || dz.abs() == radius,
    }
}

/// One ray: the integer offset it was derived from and its unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayDirection {
    /// Offset in the enumeration cube.
    pub offset: (i32, i32, i32),
    /// Normalized direction.
    pub unit: Vec3,
}

impl RayDirection {
    /// Length of the integer offset, between `R` and `R + 1` in fast mode.
    #[must_use]
    pub fn offset_length(&self) -> f64 {
        let (dx, dy, dz) = self.offset;
        Vec3::new(f64::from(dx), f64::from(dy), f64::from(dz)).length()
    }

    fn new(dx: i32, dy: i32, dz: i32) -> Self {
        let raw = Vec3::new(f64::from(dx), f64::from(dy), f64::from(dz));
        Self {
            offset: (dx, dy, dz),
            unit: raw.normalize_or_zero(),
        }
    }
}

/// Enumerates ray directions for one radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestructionRayCaster {
    radius: i32,
    accuracy: Accuracy,
}

impl DestructionRayCaster {
    /// Creates a caster. A radius of zero or less yields no rays.
    #[must_use]
    pub const fn new(radius: i32, accuracy: Accuracy) -> Self {
        Self { radius, accuracy }
    }

    /// Radius in voxels.
    #[inline]
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// Ray directions in x-major, then y, then z order.
    #[must_use]
    pub fn directions(&self) -> Directions {
        let r = self.radius;
        Directions {
            radius: r,
            accuracy: self.accuracy,
            cursor: (r > 0).then_some((-r, -r, -r)),
        }
    }

    /// Number of rays.
    #[must_use]
    pub fn direction_count(&self) -> usize {
        self.directions().count()
    }
}

/// Iterator over the rays of a [`DestructionRayCaster`].
#[derive(Clone, Debug)]
pub struct Directions {
    radius: i32,
    accuracy: Accuracy,
    cursor: Option<(i32, i32, i32)>,
}

impl Directions {
    fn advance_cursor(&mut self) {
        let r = self.radius;
        self.cursor = match self.cursor {
            Some((x, y, z)) if z < r => Some((x, y, z + 1)),
            Some((x, y, _)) if y < r => Some((x, y + 1, -r)),
            Some((x, _, _)) if x < r => Some((x + 1, -r, -r)),
            _ => None,
        };
    }
}

impl Iterator for Directions {
    type Item = RayDirection;

    fn next(&mut self) -> Option<RayDirection> {
        while let Some((x, y, z)) = self.cursor {
            self.advance_cursor();
            if is_ray_direction(x, y, z, self.radius, self.accuracy) {
                return Some(RayDirection::new(x, y, z));
            }
        }
        None
    }
}

/// Draws the initial length of one ray: `R * (0.7 + u * 0.6 * jitter)`.
///
/// Always consumes one random float, even with zero jitter.
#[allow(clippy::cast_precision_loss)]
pub fn ray_length<R: Rng + ?Sized>(radius: i32, jitter: f32, rng: &mut R) -> f32 {
    let u: f32 = rng.gen();
    radius as f32 * (0.7 + u * 0.6 * jitter)
}

/// Upper bound on how far from the origin any sample point can land.
///
/// Assumes no resistance is ever charged. Add one voxel for rounding when
/// comparing against integer offsets.
#[must_use]
pub fn max_reach(radius: i32, params: &BlockBlastParams, config: &EngineConfig) -> f64 {
    if radius <= 0 {
        return 0.0;
    }
    let longest = f64::from(radius) * (0.7 + 0.6 * f64::from(params.random_vec_length.max(0.0)));
    let samples = (longest / f64::from(config.sample_advance())).ceil();
    let stride = f64::from(config.step_factor())
        * f64::from(params.xz_strength.abs().max(params.y_strength.abs()));
    samples * stride
}

/// Sampling state of one ray.
#[derive(Clone, Copy, Debug)]
pub struct RayWalk {
    position: Vec3,
    step: Vec3,
    travelled: f32,
    remaining: f32,
    advance: f32,
}

impl RayWalk {
    /// Starts a ray at `origin` heading along the unit vector `direction`.
    #[must_use]
    pub fn new(
        origin: Vec3,
        direction: Vec3,
        length: f32,
        config: &EngineConfig,
        params: &BlockBlastParams,
    ) -> Self {
        let factor = f64::from(config.step_factor());
        let xz = factor * f64::from(params.xz_strength);
        let y = factor * f64::from(params.y_strength);
        Self {
            position: origin,
            step: Vec3::new(direction.x * xz, direction.y * y, direction.z * xz),
            travelled: 0.0,
            remaining: length,
            advance: config.sample_advance(),
        }
    }

    /// Moves to the next sample point and returns its voxel, or `None` once the
    /// ray is spent.
    #[inline]
    pub fn next_voxel(&mut self) -> Option<VoxelPos> {
        if self.travelled < self.remaining {
            self.position += self.step;
            self.travelled += self.advance;
            Some(self.position.voxel_toward_zero())
        } else {
            None
        }
    }

    /// Charges penetration cost against the remaining length. Negative costs are ignored.
    #[inline]
    pub fn absorb(&mut self, cost: f32) {
        if cost > 0.0 {
            self.remaining -= cost;
        }
    }

    /// Remaining ray length.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Current sample point.
    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_direction_counts_small_radii() {
        assert_eq!(DestructionRayCaster::new(1, Accuracy::Fast).direction_count(), 26);
        assert_eq!(DestructionRayCaster::new(1, Accuracy::Precise).direction_count(), 26);
        assert_eq!(DestructionRayCaster::new(2, Accuracy::Fast).direction_count(), 66);
        assert_eq!(DestructionRayCaster::new(2, Accuracy::Precise).direction_count(), 98);
    }

    #[test]
    fn test_non_positive_radius_has_no_rays() {
        assert_eq!(DestructionRayCaster::new(0, Accuracy::Fast).direction_count(), 0);
        assert_eq!(DestructionRayCaster::new(-3, Accuracy::Precise).direction_count(), 0);
    }

    #[test]
    fn test_precise_has_at_least_as_many_rays() {
        for radius in 1..=12 {
            let fast = DestructionRayCaster::new(radius, Accuracy::Fast).direction_count();
            let precise = DestructionRayCaster::new(radius, Accuracy::Precise).direction_count();
            assert!(precise >= fast, "radius {radius}: {precise} < {fast}");
        }
    }

    #[test]
    fn test_directions_are_unit_vectors() {
        for ray in DestructionRayCaster::new(5, Accuracy::Precise).directions() {
            assert!((ray.unit.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_offset_length_of_fast_rays() {
        for ray in DestructionRayCaster::new(4, Accuracy::Fast).directions() {
            let length = ray.offset_length();
            assert!((4.0..5.0).contains(&length), "{:?}", ray.offset);
        }
    }

    #[test]
    fn test_ray_length_without_jitter() {
        let mut rng = StepRng::new(0, 0);
        assert!((ray_length(10, 0.0, &mut rng) - 7.0).abs() < 1e-5);
        assert!((ray_length(10, 1.0, &mut rng) - 7.0).abs() < 1e-5);
    }

    #[test]
    fn test_free_walk_sample_count() {
        let config = EngineConfig::default();
        let params = BlockBlastParams::default();
        let mut walk = RayWalk::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 2.1, &config, &params);
        let mut samples = 0;
        while walk.next_voxel().is_some() {
            samples += 1;
        }
        assert_eq!(samples, 10);
        assert!((walk.position().x - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_absorb_shortens_walk() {
        let config = EngineConfig::default();
        let params = BlockBlastParams::default();
        let mut walk = RayWalk::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0), 2.1, &config, &params);
        let mut last = None;
        let mut samples = 0;
        while let Some(voxel) = walk.next_voxel() {
            walk.absorb(0.09);
            last = Some(voxel);
            samples += 1;
        }
        assert_eq!(samples, 7);
        assert_eq!(last, Some(VoxelPos::new(-2, 0, 0)));
    }

    #[test]
    fn test_samples_truncate_toward_zero() {
        let config = EngineConfig::default();
        let params = BlockBlastParams::default();
        let mut walk = RayWalk::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0), 2.1, &config, &params);
        let voxels: Vec<i32> = std::iter::from_fn(|| walk.next_voxel()).take(4).map(|v| v.x).collect();
        // -0.3, -0.6 and -0.9 all stay in the center voxel
        assert_eq!(voxels, vec![0, 0, 0, -1]);
    }

    #[test]
    fn test_negative_cost_ignored() {
        let config = EngineConfig::default();
        let params = BlockBlastParams::default();
        let mut walk = RayWalk::new(Vec3::ZERO, Vec3::Y, 1.0, &config, &params);
        walk.absorb(-5.0);
        assert!((walk.remaining() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_max_reach_bounds_free_walk() {
        let config = EngineConfig::default();
        let params = BlockBlastParams {
            random_vec_length: 0.0,
            ..BlockBlastParams::default()
        };
        let mut walk = RayWalk::new(Vec3::ZERO, Vec3::Y, 2.1, &config, &params);
        while walk.next_voxel().is_some() {}
        assert!(walk.position().length() <= max_reach(3, &params, &config) + 1e-9);
    }
}
