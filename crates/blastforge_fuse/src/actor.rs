//! # Explosive Actors
//!
//! [`ExplosiveActor`] is the capability the fuse machine drives. Any host
//! entity can implement it; the machine only ever sees the trait.
//!
//! Three reference kinds are provided:
//!
//! | Kind | Motion | Starts |
//! |---|---|---|
//! | [`PrimedCharge`] | stationary | armed |
//! | [`ChargeMinecart`] | rolling | idle |
//! | [`ThrownCharge`] | projectile | armed |

use std::sync::Arc;

use blastforge_core::EntityView;
use blastforge_shared::{EntityId, Vec3};
use rand::RngCore;

use crate::profile::EffectProfile;
use crate::state::ActorState;
use crate::world::FuseWorld;

/// How an actor moves, which decides its tick rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    /// Sits where it was lit.
    Stationary,
    /// Rides rails; ticks like a stationary charge.
    Rolling,
    /// Thrown. Contact may set it off.
    Projectile {
        /// Came to rest against a voxel.
        in_ground: bool,
        /// Struck an eligible entity.
        hit_entity: bool,
    },
}

impl Motion {
    /// Returns true for a projectile touching a voxel or entity.
    #[inline]
    #[must_use]
    pub const fn has_contact(self) -> bool {
        match self {
            Self::Projectile {
                in_ground,
                hit_entity,
            } => in_ground || hit_entity,
            _ => false,
        }
    }
}

/// An entity that carries a fuse and an [`EffectProfile`].
pub trait ExplosiveActor<W: FuseWorld + ?Sized> {
    /// Fuse state.
    fn state(&self) -> &ActorState;

    /// Mutable fuse state.
    fn state_mut(&mut self) -> &mut ActorState;

    /// Host handle, excluded from the actor's own explosion.
    fn entity_id(&self) -> EntityId;

    /// Current position.
    fn position(&self) -> Vec3;

    /// Movement kind.
    fn motion(&self) -> Motion;

    /// Shared policy for this actor's kind.
    fn profile(&self) -> &Arc<dyn EffectProfile<W>>;

    /// Lights the fuse with the profile's default length.
    fn ignite(&mut self) -> bool
    where
        Self: Sized,
    {
        let fuse = self.profile().default_fuse(&*self);
        self.state_mut().ignite(fuse)
    }

    /// Lights the fuse so the next tick detonates.
    fn ignite_instantly(&mut self) -> bool
    where
        Self: Sized,
    {
        self.state_mut().ignite_instantly()
    }

    /// Lights a shortened, randomized fuse after being caught in another blast.
    fn ignite_from_destruction(&mut self, rng: &mut dyn RngCore) -> bool
    where
        Self: Sized,
    {
        let fuse = self.profile().default_fuse(&*self);
        self.state_mut().ignite_from_destruction(fuse, rng)
    }
}

/// A lit block of explosive. Starts armed with the profile's default fuse.
pub struct PrimedCharge<W: FuseWorld + ?Sized> {
    id: EntityId,
    position: Vec3,
    state: ActorState,
    profile: Arc<dyn EffectProfile<W>>,
}

impl<W: FuseWorld + ?Sized> PrimedCharge<W> {
    /// Spawns an armed charge, credited to `owner`.
    #[must_use]
    pub fn spawn(
        id: EntityId,
        position: Vec3,
        profile: Arc<dyn EffectProfile<W>>,
        owner: Option<EntityId>,
    ) -> Self {
        let mut charge = Self {
            id,
            position,
            state: ActorState::idle(),
            profile,
        };
        charge.state.set_owner(owner);
        let fuse = charge.profile.default_fuse(&charge);
        charge.state.set_fuse(fuse.max(0));
        charge
    }
}

impl<W: FuseWorld + ?Sized> ExplosiveActor<W> for PrimedCharge<W> {
    fn state(&self) -> &ActorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn motion(&self) -> Motion {
        Motion::Stationary
    }

    fn profile(&self) -> &Arc<dyn EffectProfile<W>> {
        &self.profile
    }
}

/// A minecart carrying explosive. Starts idle until lit.
pub struct ChargeMinecart<W: FuseWorld + ?Sized> {
    id: EntityId,
    position: Vec3,
    state: ActorState,
    profile: Arc<dyn EffectProfile<W>>,
}

impl<W: FuseWorld + ?Sized> ChargeMinecart<W> {
    /// Places an unlit cart.
    #[must_use]
    pub fn place(id: EntityId, position: Vec3, profile: Arc<dyn EffectProfile<W>>) -> Self {
        Self {
            id,
            position,
            state: ActorState::idle(),
            profile,
        }
    }

    /// Moves the cart.
    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
    }
}

impl<W: FuseWorld + ?Sized> ExplosiveActor<W> for ChargeMinecart<W> {
    fn state(&self) -> &ActorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn motion(&self) -> Motion {
        Motion::Rolling
    }

    fn profile(&self) -> &Arc<dyn EffectProfile<W>> {
        &self.profile
    }
}

/// A thrown charge. Starts armed; contact and flight rules come from the profile.
pub struct ThrownCharge<W: FuseWorld + ?Sized> {
    id: EntityId,
    position: Vec3,
    velocity: Vec3,
    in_ground: bool,
    hit_entity: bool,
    state: ActorState,
    profile: Arc<dyn EffectProfile<W>>,
}

impl<W: FuseWorld + ?Sized> ThrownCharge<W> {
    /// Launches a charge from `position` with `velocity`, credited to `thrower`.
    #[must_use]
    pub fn throw(
        id: EntityId,
        position: Vec3,
        velocity: Vec3,
        profile: Arc<dyn EffectProfile<W>>,
        thrower: Option<EntityId>,
    ) -> Self {
        let mut charge = Self {
            id,
            position,
            velocity,
            in_ground: false,
            hit_entity: false,
            state: ActorState::idle(),
            profile,
        };
        charge.state.set_owner(thrower);
        let fuse = charge.profile.default_fuse(&charge);
        charge.state.set_fuse(fuse.max(0));
        charge
    }

    /// Moves one tick along the current velocity unless stuck.
    pub fn advance(&mut self) {
        if !self.in_ground {
            self.position += self.velocity;
        }
    }

    /// The host's collision check found a voxel at `at`.
    pub fn on_block_hit(&mut self, at: Vec3) {
        self.position = at;
        self.velocity = Vec3::ZERO;
        self.in_ground = true;
    }

    /// The host's collision check touched `target`.
    ///
    /// Registers a hit only if [`FuseWorld::is_projectile_target`] accepts the
    /// target. Returns whether it did.
    pub fn on_entity_hit(&mut self, world: &W, target: &EntityView) -> bool {
        if target.id == self.id || !world.is_projectile_target(target) {
            return false;
        }
        self.hit_entity = true;
        true
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

impl<W: FuseWorld + ?Sized> ExplosiveActor<W> for ThrownCharge<W> {
    fn state(&self) -> &ActorState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ActorState {
        &mut self.state
    }

    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn motion(&self) -> Motion {
        Motion::Projectile {
            in_ground: self.in_ground,
            hit_entity: self.hit_entity,
        }
    }

    fn profile(&self) -> &Arc<dyn EffectProfile<W>> {
        &self.profile
    }
}
