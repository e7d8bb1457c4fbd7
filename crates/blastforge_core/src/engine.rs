//! # Explosion Engine
//!
//! Voxel operations. Every detonation runs in two phases:
//!
//! 1. **Gather**: cast every ray against the unmodified world and collect the
//!    affected voxels into a deduplicating set.
//! 2. **Apply**: walk the set once, in sorted key order, and mutate.
//!
//! Later rays therefore never see the effects of earlier rays in the same
//! detonation, and a given seed always produces the same result.
//!
//! Entity affection lives in [`crate::entities`].

use std::collections::HashSet;

use blastforge_shared::VoxelPos;
use rand::Rng;
use tracing::{debug, trace};

use crate::codec::{PackedOffsetKey, VoxelKey};
use crate::config::EngineConfig;
use crate::explosion::{BlockBlastParams, Explosion};
use crate::raycast::{ray_length, DestructionRayCaster, RayWalk};
use crate::resistance::ResistanceModel;
use crate::world::VoxelWorld;

/// Chance that a destroyed voxel resting on an opaque cube catches fire.
pub const FIRE_CHANCE: f32 = 0.25;

/// Drives ray casting and voxel mutation for detonations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExplosionEngine {
    config: EngineConfig,
}

impl ExplosionEngine {
    /// Creates an engine with fixed tunables.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Tunables in use.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Casts every ray and returns the affected voxels as sorted, unique keys.
    ///
    /// `condition` is asked about every destructible sample and receives the
    /// length of the integer offset its ray was cast along, so all samples of
    /// one ray see the same value. Nothing in the world is modified.
    pub fn gather<K, W, M, R, P>(
        &self,
        explosion: &Explosion,
        world: &W,
        resistance: &M,
        params: &BlockBlastParams,
        rng: &mut R,
        mut condition: P,
    ) -> Vec<K>
    where
        K: VoxelKey + Ord,
        W: VoxelWorld + ?Sized,
        M: ResistanceModel<W> + ?Sized,
        R: Rng + ?Sized,
        P: FnMut(&W, VoxelPos, &W::Block, f64) -> bool,
    {
        let origin = explosion.origin();
        let origin_voxel = explosion.origin_voxel();
        let caster = DestructionRayCaster::new(explosion.radius(), self.config.accuracy());
        let mut found: HashSet<K> = HashSet::new();
        let mut rays = 0_usize;

        for ray in caster.directions() {
            rays += 1;
            let length = ray_length(explosion.radius(), params.random_vec_length, rng);
            let mut walk = RayWalk::new(origin, ray.unit, length, &self.config, params);
            let ray_distance = ray.offset_length();

            while let Some(pos) = walk.next_voxel() {
                if !world.is_in_build_limit(pos) {
                    break;
                }
                let block = world.block_at(pos);
                let fluid = world.fluid_at(pos);

                let destructible = if params.strong && !fluid.is_empty() {
                    true
                } else {
                    if let Some(value) =
                        resistance.blast_resistance(explosion, world, pos, &block, fluid)
                    {
                        walk.absorb((value + 0.3) * 0.3 * params.resistance_impact);
                    }
                    walk.remaining() > 0.0
                        && resistance.can_destroy(explosion, world, pos, &block, walk.remaining())
                        && !world.is_air(&block)
                };

                if destructible && condition(world, pos, &block, ray_distance) {
                    found.insert(K::from_voxel(pos, origin_voxel));
                }
            }
            trace!(offset = ?ray.offset, length, left = walk.remaining(), "ray spent");
        }

        let mut keys: Vec<K> = found.into_iter().collect();
        keys.sort_unstable();
        debug!(
            origin = ?origin_voxel,
            radius = explosion.radius(),
            rays,
            voxels = keys.len(),
            "gathered explosion voxels"
        );
        keys
    }

    /// Destroys every voxel the rays reach and records them on the explosion.
    ///
    /// Offsets beyond ±511 from the origin are clamped (see [`crate::codec`]).
    /// Returns the number of voxels destroyed.
    pub fn destroy_voxels<W, M, R>(
        &self,
        explosion: &mut Explosion,
        world: &mut W,
        resistance: &M,
        params: &BlockBlastParams,
        rng: &mut R,
    ) -> usize
    where
        W: VoxelWorld + ?Sized,
        M: ResistanceModel<W> + ?Sized,
        R: Rng + ?Sized,
    {
        let keys: Vec<PackedOffsetKey> =
            self.gather(explosion, &*world, resistance, params, rng, |_, _, _, _| true);
        explosion.record_voxels(&keys);
        destroy_keys(explosion, world, &keys, params.fire, rng)
    }

    /// Like [`ExplosionEngine::destroy_voxels`] but keyed by absolute position,
    /// so craters of any size are exact. Costs more memory per voxel.
    ///
    /// With `record` set the voxels are also stored on the explosion (clamped,
    /// as for the bounded variant).
    pub fn destroy_voxels_unbounded<W, M, R>(
        &self,
        explosion: &mut Explosion,
        world: &mut W,
        resistance: &M,
        params: &BlockBlastParams,
        rng: &mut R,
        record: bool,
    ) -> usize
    where
        W: VoxelWorld + ?Sized,
        M: ResistanceModel<W> + ?Sized,
        R: Rng + ?Sized,
    {
        let keys: Vec<VoxelPos> =
            self.gather(explosion, &*world, resistance, params, rng, |_, _, _, _| true);
        if record {
            explosion.record_voxels(&keys);
        }
        destroy_keys(explosion, world, &keys, params.fire, rng)
    }

    /// Runs `effect` on every voxel the rays reach instead of destroying it.
    ///
    /// The effect receives the voxel, its block before any effect ran, and its
    /// distance from the center. `params.fire` is ignored.
    pub fn visit_voxels<W, M, R, F>(
        &self,
        explosion: &mut Explosion,
        world: &mut W,
        resistance: &M,
        params: &BlockBlastParams,
        rng: &mut R,
        effect: F,
    ) -> usize
    where
        W: VoxelWorld + ?Sized,
        M: ResistanceModel<W> + ?Sized,
        R: Rng + ?Sized,
        F: FnMut(&mut W, VoxelPos, W::Block, f64),
    {
        self.visit_voxels_where(
            explosion,
            world,
            resistance,
            params,
            rng,
            |_, _, _, _| true,
            effect,
        )
    }

    /// Like [`ExplosionEngine::visit_voxels`], but only voxels for which
    /// `condition` holds during ray casting are collected.
    ///
    /// `condition` sees the ray's offset length (see [`ExplosionEngine::gather`]);
    /// `effect` sees the voxel's distance from the center.
    #[allow(clippy::too_many_arguments)]
    pub fn visit_voxels_where<W, M, R, P, F>(
        &self,
        explosion: &mut Explosion,
        world: &mut W,
        resistance: &M,
        params: &BlockBlastParams,
        rng: &mut R,
        condition: P,
        mut effect: F,
    ) -> usize
    where
        W: VoxelWorld + ?Sized,
        M: ResistanceModel<W> + ?Sized,
        R: Rng + ?Sized,
        P: FnMut(&W, VoxelPos, &W::Block, f64) -> bool,
        F: FnMut(&mut W, VoxelPos, W::Block, f64),
    {
        let keys: Vec<PackedOffsetKey> =
            self.gather(explosion, &*world, resistance, params, rng, condition);
        explosion.record_voxels(&keys);

        let origin = explosion.origin();
        let origin_voxel = explosion.origin_voxel();
        for key in &keys {
            let pos = key.to_voxel(origin_voxel);
            let block = world.block_at(pos);
            effect(world, pos, block, pos.as_vec3().distance(origin));
        }
        keys.len()
    }
}

fn destroy_keys<K, W, R>(
    explosion: &Explosion,
    world: &mut W,
    keys: &[K],
    fire: bool,
    rng: &mut R,
) -> usize
where
    K: VoxelKey,
    W: VoxelWorld + ?Sized,
    R: Rng + ?Sized,
{
    let origin_voxel = explosion.origin_voxel();
    for key in keys {
        let pos = key.to_voxel(origin_voxel);
        world.on_destroyed_by_explosion(pos, explosion);
        let air = world.air();
        world.set_block(pos, air, true);
    }

    if fire {
        let mut ignited = 0_usize;
        for key in keys {
            let pos = key.to_voxel(origin_voxel);
            let roll: f32 = rng.gen();
            if roll < FIRE_CHANCE
                && world.is_air(&world.block_at(pos))
                && world.is_opaque_full_cube(pos.below())
            {
                let flame = world.fire();
                world.set_block(pos, flame, true);
                ignited += 1;
            }
        }
        debug!(ignited, "explosion fire placed");
    }
    keys.len()
}
