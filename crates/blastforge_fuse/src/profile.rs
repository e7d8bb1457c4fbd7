//! # Effect Profiles
//!
//! An [`EffectProfile`] is the policy shared by every actor of one kind: how
//! long the fuse is, whether impact sets it off, and what happens on
//! detonation. Profiles are immutable and shared through `Arc`.
//!
//! [`BlastEffect`] is the stock profile: a plain explosion of fixed radius
//! through the [`ExplosionEngine`]. [`DynamiteEffect`] reuses any profile for a
//! thrown charge with its own particle trail.

use blastforge_core::{
    BlockBlastParams, EntityBlastParams, EntityWorld, Explosion, ExplosionEngine, ExposureModel,
    ResistanceModel, VoxelWorld,
};
use std::sync::Arc;

use blastforge_shared::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::ExplosiveActor;
use crate::state::DEFAULT_FUSE;
use crate::world::{FuseWorld, ParticleId};

/// Behaviour of one kind of explosive actor.
///
/// Only [`EffectProfile::on_detonate`] is required.
pub trait EffectProfile<W: FuseWorld + ?Sized> {
    /// Fuse length in ticks when lit normally.
    fn default_fuse(&self, _actor: &dyn ExplosiveActor<W>) -> i32 {
        DEFAULT_FUSE
    }

    /// Hitbox and render scale.
    fn size(&self, _actor: &dyn ExplosiveActor<W>) -> f32 {
        1.0
    }

    /// Play the explosion sound on detonation.
    fn plays_sound(&self) -> bool {
        true
    }

    /// Projectiles only: touching a voxel or entity sets the fuse to zero.
    fn explodes_on_impact(&self) -> bool {
        true
    }

    /// Projectiles only: the fuse keeps burning in flight.
    fn air_fuse(&self) -> bool {
        false
    }

    /// Runs every tick the fuse burns, before it is decremented.
    fn on_tick(&self, _actor: &mut dyn ExplosiveActor<W>, _world: &mut W) {}

    /// Runs once, when the actor detonates.
    fn on_detonate(&self, actor: &mut dyn ExplosiveActor<W>, world: &mut W, rng: &mut dyn RngCore);

    /// Presentation only. Must not change the actor.
    fn spawn_particles(&self, actor: &dyn ExplosiveActor<W>, world: &mut W) {
        world.add_particle(ParticleId::SMOKE, actor.position() + Vec3::Y * 0.5, Vec3::ZERO);
    }
}

/// The data-only part of a profile, loadable from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileSettings {
    /// Fuse length in ticks.
    pub default_fuse: i32,
    /// Hitbox and render scale.
    pub size: f32,
    /// Play the explosion sound.
    pub plays_sound: bool,
    /// Projectiles detonate on contact.
    pub explodes_on_impact: bool,
    /// Projectile fuses burn in flight.
    pub air_fuse: bool,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            default_fuse: DEFAULT_FUSE,
            size: 1.0,
            plays_sound: true,
            explodes_on_impact: true,
            air_fuse: false,
        }
    }
}

/// Stock profile: destroy voxels, then hit entities, with one fixed radius.
#[derive(Clone, Debug)]
pub struct BlastEffect<M, X> {
    settings: ProfileSettings,
    radius: i32,
    engine: ExplosionEngine,
    block: BlockBlastParams,
    entity: EntityBlastParams,
    resistance: M,
    exposure: X,
}

impl<M, X> BlastEffect<M, X> {
    /// Creates a profile with default settings and parameters.
    #[must_use]
    pub fn new(engine: ExplosionEngine, radius: i32, resistance: M, exposure: X) -> Self {
        Self {
            settings: ProfileSettings::default(),
            radius,
            engine,
            block: BlockBlastParams::default(),
            entity: EntityBlastParams::default(),
            resistance,
            exposure,
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ProfileSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the voxel-phase parameters.
    #[must_use]
    pub fn with_block_params(mut self, block: BlockBlastParams) -> Self {
        self.block = block;
        self
    }

    /// Replaces the entity-phase parameters.
    #[must_use]
    pub fn with_entity_params(mut self, entity: EntityBlastParams) -> Self {
        self.entity = entity;
        self
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &ProfileSettings {
        &self.settings
    }

    /// Explosion radius.
    #[must_use]
    pub fn radius(&self) -> i32 {
        self.radius
    }
}

impl<W, M, X> EffectProfile<W> for BlastEffect<M, X>
where
    W: VoxelWorld + EntityWorld + FuseWorld,
    M: ResistanceModel<W>,
    X: ExposureModel<W>,
{
    fn default_fuse(&self, _actor: &dyn ExplosiveActor<W>) -> i32 {
        self.settings.default_fuse
    }

    fn size(&self, _actor: &dyn ExplosiveActor<W>) -> f32 {
        self.settings.size
    }

    fn plays_sound(&self) -> bool {
        self.settings.plays_sound
    }

    fn explodes_on_impact(&self) -> bool {
        self.settings.explodes_on_impact
    }

    fn air_fuse(&self) -> bool {
        self.settings.air_fuse
    }

    fn on_detonate(&self, actor: &mut dyn ExplosiveActor<W>, world: &mut W, rng: &mut dyn RngCore) {
        let mut explosion = Explosion::new(actor.position(), self.radius)
            .with_source(actor.entity_id())
            .with_owner(actor.state().owner());

        let voxels = self
            .engine
            .destroy_voxels(&mut explosion, world, &self.resistance, &self.block, rng);
        let hits = self
            .engine
            .affect_entities(&mut explosion, world, &self.exposure, &self.entity);
        world.explosion_finished(&explosion);

        debug!(
            actor = %actor.entity_id(),
            radius = self.radius,
            voxels,
            entities = hits.len(),
            "blast effect applied"
        );
    }
}

/// Wraps another profile and swaps its particle trail.
///
/// Everything except [`EffectProfile::spawn_particles`] is forwarded to the
/// inner profile. Particles are emitted at the actor's position with no
/// velocity.
pub struct DynamiteEffect<W: FuseWorld + ?Sized> {
    inner: Arc<dyn EffectProfile<W>>,
    particle: ParticleId,
}

impl<W: FuseWorld + ?Sized> DynamiteEffect<W> {
    /// Wraps `inner` with a smoke trail.
    #[must_use]
    pub fn new(inner: Arc<dyn EffectProfile<W>>) -> Self {
        Self::with_particle(inner, ParticleId::SMOKE)
    }

    /// Wraps `inner` with a custom trail.
    #[must_use]
    pub fn with_particle(inner: Arc<dyn EffectProfile<W>>, particle: ParticleId) -> Self {
        Self { inner, particle }
    }

    /// The wrapped profile.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn EffectProfile<W>> {
        &self.inner
    }
}

impl<W: FuseWorld + ?Sized> EffectProfile<W> for DynamiteEffect<W> {
    fn default_fuse(&self, actor: &dyn ExplosiveActor<W>) -> i32 {
        self.inner.default_fuse(actor)
    }

    fn size(&self, actor: &dyn ExplosiveActor<W>) -> f32 {
        self.inner.size(actor)
    }

    fn plays_sound(&self) -> bool {
        self.inner.plays_sound()
    }

    fn explodes_on_impact(&self) -> bool {
        self.inner.explodes_on_impact()
    }

    fn air_fuse(&self) -> bool {
        self.inner.air_fuse()
    }

    fn on_tick(&self, actor: &mut dyn ExplosiveActor<W>, world: &mut W) {
        self.inner.on_tick(actor, world);
    }

    fn on_detonate(&self, actor: &mut dyn ExplosiveActor<W>, world: &mut W, rng: &mut dyn RngCore) {
        self.inner.on_detonate(actor, world, rng);
    }

    fn spawn_particles(&self, actor: &dyn ExplosiveActor<W>, world: &mut W) {
        world.add_particle(self.particle, actor.position(), Vec3::ZERO);
    }
}
