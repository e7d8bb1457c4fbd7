//! # Fuse Driver
//!
//! One [`FuseDriver::tick`] call per actor per simulation step. The driver owns
//! the random source and counts detonations; actors own their fuse.
//!
//! ## Tick rules
//!
//! Stationary and rolling actors:
//!
//! ```text
//! fuse < 0   -> Idle (nothing happens)
//! fuse == 0  -> detonate, discard
//! fuse > 0   -> on_tick, fuse -= 1
//! ```
//!
//! Projectiles apply contact first: touching a voxel or entity with
//! `explodes_on_impact` forces the fuse to zero. A zero fuse detonates on
//! contact, or in flight when `air_fuse` is set. Otherwise the fuse burns
//! while in contact, or in flight with `air_fuse`.

use std::sync::Arc;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::actor::{ExplosiveActor, Motion};
use crate::profile::EffectProfile;
use crate::world::{FuseWorld, SoundId};

/// Volume of the detonation sound.
pub const EXPLOSION_VOLUME: f32 = 4.0;

/// Result of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The actor had already left the simulation.
    Removed,
    /// Not lit.
    Idle,
    /// Still burning.
    Counting {
        /// Fuse after this tick.
        fuse: i32,
    },
    /// Exploded this tick and was discarded.
    Detonated,
}

/// Advances explosive actors one tick at a time.
#[derive(Debug)]
pub struct FuseDriver<R = ChaCha8Rng> {
    rng: R,
    detonations: u64,
}

impl FuseDriver<ChaCha8Rng> {
    /// Driver with a reproducible random stream.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RngCore> FuseDriver<R> {
    /// Driver drawing from `rng`.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self {
            rng,
            detonations: 0,
        }
    }

    /// Detonations performed by this driver.
    #[inline]
    #[must_use]
    pub const fn detonations(&self) -> u64 {
        self.detonations
    }

    /// The random source, for host-side ignition rolls.
    #[inline]
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Runs one simulation step for `actor`.
    pub fn tick<W: FuseWorld + ?Sized>(
        &mut self,
        actor: &mut dyn ExplosiveActor<W>,
        world: &mut W,
    ) -> TickOutcome {
        if actor.state().is_removed() {
            return TickOutcome::Removed;
        }
        let profile = Arc::clone(actor.profile());

        match actor.motion() {
            Motion::Stationary | Motion::Rolling => {
                self.tick_stationary(actor, world, profile.as_ref())
            }
            motion @ Motion::Projectile { .. } => {
                self.tick_projectile(actor, world, profile.as_ref(), motion.has_contact())
            }
        }
    }

    fn tick_stationary<W: FuseWorld + ?Sized>(
        &mut self,
        actor: &mut dyn ExplosiveActor<W>,
        world: &mut W,
        profile: &dyn EffectProfile<W>,
    ) -> TickOutcome {
        let fuse = actor.state().fuse();
        if fuse < 0 {
            return TickOutcome::Idle;
        }
        if fuse == 0 {
            self.explode(actor, world, profile);
            return TickOutcome::Detonated;
        }

        profile.on_tick(actor, world);
        Self::after_burn(actor)
    }

    fn tick_projectile<W: FuseWorld + ?Sized>(
        &mut self,
        actor: &mut dyn ExplosiveActor<W>,
        world: &mut W,
        profile: &dyn EffectProfile<W>,
        contact: bool,
    ) -> TickOutcome {
        let air_fuse = profile.air_fuse();
        if contact && profile.explodes_on_impact() {
            actor.state_mut().set_fuse(0);
        }

        let fuse = actor.state().fuse();
        if fuse == 0 && (contact || air_fuse) {
            self.explode(actor, world, profile);
            return TickOutcome::Detonated;
        }

        if (fuse > 0 && air_fuse) || contact {
            profile.on_tick(actor, world);
            return Self::after_burn(actor);
        }

        if fuse < 0 {
            TickOutcome::Idle
        } else {
            TickOutcome::Counting { fuse }
        }
    }

    fn after_burn<W: FuseWorld + ?Sized>(actor: &mut dyn ExplosiveActor<W>) -> TickOutcome {
        // on_tick may discard the actor itself
        if actor.state().is_removed() {
            return TickOutcome::Removed;
        }
        actor.state_mut().tick_down();
        match actor.state().fuse() {
            fuse if fuse < 0 => TickOutcome::Idle,
            fuse => TickOutcome::Counting { fuse },
        }
    }

    /// Detonates `actor` now, whatever its fuse.
    ///
    /// Returns false if the actor was already removed.
    pub fn detonate<W: FuseWorld + ?Sized>(
        &mut self,
        actor: &mut dyn ExplosiveActor<W>,
        world: &mut W,
    ) -> bool {
        if actor.state().is_removed() {
            return false;
        }
        let profile = Arc::clone(actor.profile());
        self.explode(actor, world, profile.as_ref());
        true
    }

    fn explode<W: FuseWorld + ?Sized>(
        &mut self,
        actor: &mut dyn ExplosiveActor<W>,
        world: &mut W,
        profile: &dyn EffectProfile<W>,
    ) {
        let at = actor.position();
        if profile.plays_sound() {
            let r1: f32 = self.rng.gen();
            let r2: f32 = self.rng.gen();
            let pitch = (1.0 + (r1 - r2) * 0.2) * 0.7;
            world.play_sound(SoundId::EXPLODE, at, EXPLOSION_VOLUME, pitch);
        }

        profile.on_detonate(actor, world, &mut self.rng);
        actor.state_mut().discard();
        self.detonations += 1;

        debug!(
            actor = %actor.entity_id(),
            x = at.x,
            y = at.y,
            z = at.z,
            total = self.detonations,
            "actor detonated"
        );
    }

    /// Presentation pass. Reads the actor and emits particles; never touches
    /// the fuse.
    #[allow(clippy::unused_self)]
    pub fn present<W: FuseWorld + ?Sized>(&self, actor: &dyn ExplosiveActor<W>, world: &mut W) {
        if actor.state().is_removed() {
            return;
        }
        trace!(actor = %actor.entity_id(), fuse = actor.state().fuse(), "present");
        actor.profile().spawn_particles(actor, world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ChargeMinecart, PrimedCharge, ThrownCharge};
    use blastforge_core::{EntityClass, EntityView};
    use blastforge_shared::{EntityId, Vec3};
    use rand::rngs::mock::StepRng;
    use std::cell::Cell;

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<(f32, f32)>,
        particles: usize,
        blasts: usize,
    }

    impl FuseWorld for Recorder {
        fn play_sound(&mut self, _sound: SoundId, _at: Vec3, volume: f32, pitch: f32) {
            self.sounds.push((volume, pitch));
        }

        fn add_particle(&mut self, _particle: crate::world::ParticleId, _at: Vec3, _velocity: Vec3) {
            self.particles += 1;
        }
    }

    #[derive(Default)]
    struct Counting {
        fuse: i32,
        impact: bool,
        air: bool,
        ticks: Cell<u32>,
    }

    impl EffectProfile<Recorder> for Counting {
        fn default_fuse(&self, _actor: &dyn ExplosiveActor<Recorder>) -> i32 {
            self.fuse
        }

        fn explodes_on_impact(&self) -> bool {
            self.impact
        }

        fn air_fuse(&self) -> bool {
            self.air
        }

        fn on_tick(&self, _actor: &mut dyn ExplosiveActor<Recorder>, _world: &mut Recorder) {
            self.ticks.set(self.ticks.get() + 1);
        }

        fn on_detonate(
            &self,
            _actor: &mut dyn ExplosiveActor<Recorder>,
            world: &mut Recorder,
            _rng: &mut dyn RngCore,
        ) {
            world.blasts += 1;
        }
    }

    fn profile(fuse: i32, impact: bool, air: bool) -> Arc<dyn EffectProfile<Recorder>> {
        Arc::new(Counting {
            fuse,
            impact,
            air,
            ..Counting::default()
        })
    }

    fn target(class: EntityClass) -> EntityView {
        EntityView {
            id: EntityId(40),
            position: Vec3::ZERO,
            eye_height: 1.6,
            class,
            immune: false,
        }
    }

    fn driver() -> FuseDriver<StepRng> {
        FuseDriver::new(StepRng::new(0, 0))
    }

    #[test]
    fn test_stationary_counts_down_then_detonates() {
        let mut world = Recorder::default();
        let mut charge = PrimedCharge::spawn(EntityId(1), Vec3::ZERO, profile(3, true, false), None);
        let mut driver = driver();

        assert_eq!(driver.tick(&mut charge, &mut world), TickOutcome::Counting { fuse: 2 });
        assert_eq!(driver.tick(&mut charge, &mut world), TickOutcome::Counting { fuse: 1 });
        assert_eq!(driver.tick(&mut charge, &mut world), TickOutcome::Counting { fuse: 0 });
        assert_eq!(driver.tick(&mut charge, &mut world), TickOutcome::Detonated);
        assert_eq!(driver.tick(&mut charge, &mut world), TickOutcome::Removed);

        assert_eq!(world.blasts, 1);
        assert_eq!(driver.detonations(), 1);
    }

    #[test]
    fn test_sound_volume_and_pitch() {
        let mut world = Recorder::default();
        let mut charge = PrimedCharge::spawn(EntityId(1), Vec3::ZERO, profile(0, true, false), None);
        let mut driver = driver();

        assert_eq!(driver.tick(&mut charge, &mut world), TickOutcome::Detonated);
        assert_eq!(world.sounds.len(), 1);
        let (volume, pitch) = world.sounds[0];
        assert!((volume - 4.0).abs() < f32::EPSILON);
        // both rolls are 0 with this rng
        assert!((pitch - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_idle_minecart_stays_idle() {
        let mut world = Recorder::default();
        let mut cart = ChargeMinecart::place(EntityId(2), Vec3::ZERO, profile(10, true, false));
        let mut driver = driver();

        for _ in 0..100 {
            assert_eq!(driver.tick(&mut cart, &mut world), TickOutcome::Idle);
        }
        assert!(cart.ignite());
        assert_eq!(driver.tick(&mut cart, &mut world), TickOutcome::Counting { fuse: 9 });
    }

    #[test]
    fn test_projectile_impact_forces_detonation() {
        let mut world = Recorder::default();
        let mut grenade =
            ThrownCharge::throw(EntityId(3), Vec3::ZERO, Vec3::Y, profile(40, true, false), None);
        let mut driver = driver();

        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Counting { fuse: 40 });
        grenade.on_block_hit(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Detonated);
        assert_eq!(world.blasts, 1);
    }

    #[test]
    fn test_projectile_without_impact_burns_in_ground() {
        let mut world = Recorder::default();
        let mut grenade =
            ThrownCharge::throw(EntityId(3), Vec3::ZERO, Vec3::Y, profile(2, false, false), None);
        let mut driver = driver();

        assert!(grenade.on_entity_hit(&world, &target(EntityClass::Living)));
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Counting { fuse: 1 });
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Counting { fuse: 0 });
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Detonated);
    }

    #[test]
    fn test_spectators_do_not_stop_projectiles() {
        let mut world = Recorder::default();
        let mut grenade =
            ThrownCharge::throw(EntityId(3), Vec3::ZERO, Vec3::Y, profile(40, true, false), None);
        let mut driver = driver();

        let spectator = EntityClass::Player {
            spectator: true,
            creative_flying: false,
        };
        let flyer = EntityClass::Player {
            spectator: false,
            creative_flying: true,
        };
        assert!(!grenade.on_entity_hit(&world, &target(spectator)));
        assert!(!grenade.on_entity_hit(&world, &target(flyer)));
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Counting { fuse: 40 });

        let survival = EntityClass::Player {
            spectator: false,
            creative_flying: false,
        };
        assert!(grenade.on_entity_hit(&world, &target(survival)));
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Detonated);
    }

    #[test]
    fn test_air_fuse_burns_in_flight() {
        let mut world = Recorder::default();
        let mut grenade =
            ThrownCharge::throw(EntityId(4), Vec3::ZERO, Vec3::Y, profile(1, false, true), None);
        let mut driver = driver();

        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Counting { fuse: 0 });
        assert_eq!(driver.tick(&mut grenade, &mut world), TickOutcome::Detonated);
    }

    #[test]
    fn test_detonate_only_once() {
        let mut world = Recorder::default();
        let mut charge = PrimedCharge::spawn(EntityId(5), Vec3::ZERO, profile(50, true, false), None);
        let mut driver = driver();

        assert!(driver.detonate(&mut charge, &mut world));
        assert!(!driver.detonate(&mut charge, &mut world));
        assert_eq!(world.blasts, 1);
    }

    #[test]
    fn test_present_leaves_fuse_alone() {
        let mut world = Recorder::default();
        let charge = PrimedCharge::spawn(EntityId(6), Vec3::ZERO, profile(0, true, false), None);
        let driver = driver();

        for _ in 0..5 {
            driver.present(&charge, &mut world);
        }
        assert_eq!(charge.state().fuse(), 0);
        assert_eq!(world.particles, 5);
        assert_eq!(world.blasts, 0);
    }
}
