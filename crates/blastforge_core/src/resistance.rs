//! # Resistance and Exposure
//!
//! Two host collaborators consulted by the engine:
//!
//! - [`ResistanceModel`]: per sample step, how much ray length a voxel eats and
//!   whether the voxel may be destroyed at all.
//! - [`ExposureModel`]: per entity, how much of the blast reaches it.

use blastforge_shared::{Vec3, VoxelPos};

use crate::explosion::Explosion;
use crate::world::{EntityView, FluidState, VoxelWorld};

/// Maps a sampled voxel to its penetration cost and destructibility.
pub trait ResistanceModel<W: VoxelWorld + ?Sized> {
    /// Blast resistance of the voxel, or `None` if it costs nothing.
    fn blast_resistance(
        &self,
        explosion: &Explosion,
        world: &W,
        pos: VoxelPos,
        block: &W::Block,
        fluid: FluidState,
    ) -> Option<f32>;

    /// Whether a ray with `remaining` length left may destroy the voxel.
    fn can_destroy(
        &self,
        _explosion: &Explosion,
        _world: &W,
        _pos: VoxelPos,
        _block: &W::Block,
        _remaining: f32,
    ) -> bool {
        true
    }
}

/// Every voxel has the same resistance and everything is destructible.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniformResistance(pub f32);

impl<W: VoxelWorld + ?Sized> ResistanceModel<W> for UniformResistance {
    #[inline]
    fn blast_resistance(
        &self,
        _explosion: &Explosion,
        _world: &W,
        _pos: VoxelPos,
        _block: &W::Block,
        _fluid: FluidState,
    ) -> Option<f32> {
        Some(self.0)
    }
}

/// Fraction of the blast that reaches an entity, in `[0, 1]`.
pub trait ExposureModel<W: ?Sized> {
    /// Exposure of `entity` to a blast centered on `origin`.
    fn exposure(&self, world: &W, origin: Vec3, entity: &EntityView) -> f32;
}

/// Nothing ever shields an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FullExposure;

impl<W: ?Sized> ExposureModel<W> for FullExposure {
    #[inline]
    fn exposure(&self, _world: &W, _origin: Vec3, _entity: &EntityView) -> f32 {
        1.0
    }
}

/// Constant exposure, clamped into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedExposure(pub f32);

impl<W: ?Sized> ExposureModel<W> for FixedExposure {
    #[inline]
    fn exposure(&self, _world: &W, _origin: Vec3, _entity: &EntityView) -> f32 {
        self.0.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SandboxWorld;
    use crate::world::EntityClass;
    use blastforge_shared::EntityId;

    fn view() -> EntityView {
        EntityView {
            id: EntityId::new(1),
            position: Vec3::ZERO,
            eye_height: 1.0,
            class: EntityClass::Object,
            immune: false,
        }
    }

    #[test]
    fn test_uniform_resistance() {
        let world = SandboxWorld::new();
        let explosion = Explosion::new(Vec3::ZERO, 1);
        let model = UniformResistance(2.5);
        let block = world.block_at(VoxelPos::ORIGIN);
        let res = model.blast_resistance(&explosion, &world, VoxelPos::ORIGIN, &block, FluidState::Empty);
        assert_eq!(res, Some(2.5));
        assert!(model.can_destroy(&explosion, &world, VoxelPos::ORIGIN, &block, 0.1));
    }

    #[test]
    fn test_fixed_exposure_is_clamped() {
        let world = SandboxWorld::new();
        assert!((FixedExposure(3.0).exposure(&world, Vec3::ZERO, &view()) - 1.0).abs() < f32::EPSILON);
        assert!(FixedExposure(-1.0).exposure(&world, Vec3::ZERO, &view()).abs() < f32::EPSILON);
        assert!((FullExposure.exposure(&world, Vec3::ZERO, &view()) - 1.0).abs() < f32::EPSILON);
    }
}
