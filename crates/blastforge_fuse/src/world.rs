//! Host surface for sounds and particles emitted by explosive actors.

use blastforge_core::sandbox::{SandboxEvent, SandboxWorld};
use blastforge_core::{EntityClass, EntityView, Explosion};
use blastforge_shared::Vec3;

/// Host sound identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundId(pub &'static str);

impl SoundId {
    /// Played on detonation.
    pub const EXPLODE: Self = Self("entity.generic.explode");
}

/// Host particle identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleId(pub &'static str);

impl ParticleId {
    /// Trail emitted by lit actors.
    pub const SMOKE: Self = Self("smoke");
}

/// What the fuse machine needs from the host besides voxels and entities.
pub trait FuseWorld {
    /// Plays a sound at a point.
    fn play_sound(&mut self, sound: SoundId, at: Vec3, volume: f32, pitch: f32);

    /// Spawns a cosmetic particle.
    fn add_particle(&mut self, particle: ParticleId, at: Vec3, velocity: Vec3);

    /// Called after a profile finished applying an explosion, so the host can
    /// forward queued player knockback to clients.
    fn explosion_finished(&mut self, _explosion: &Explosion) {}

    /// Whether a thrown charge touching `target` counts as a hit.
    ///
    /// Spectators and flying creative players are skipped. Hosts that know
    /// about grounded creative players should skip those as well.
    fn is_projectile_target(&self, target: &EntityView) -> bool {
        match target.class {
            EntityClass::Player {
                spectator,
                creative_flying,
            } => !spectator && !creative_flying,
            EntityClass::Object | EntityClass::Living => true,
        }
    }
}

impl FuseWorld for SandboxWorld {
    fn play_sound(&mut self, sound: SoundId, at: Vec3, volume: f32, pitch: f32) {
        self.record(SandboxEvent::Sound {
            name: sound.0,
            at,
            volume,
            pitch,
        });
    }

    fn add_particle(&mut self, particle: ParticleId, at: Vec3, _velocity: Vec3) {
        self.record(SandboxEvent::Particle {
            name: particle.0,
            at,
        });
    }
}
