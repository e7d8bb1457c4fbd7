//! # BLASTFORGE Fuse
//!
//! Ignition state machine for explosive actors.
//!
//! Every actor carries an [`ActorState`] (fuse, owner, save payload) and shares
//! an [`EffectProfile`] with the other actors of its kind. A [`FuseDriver`] is
//! ticked once per actor per simulation step and invokes the profile's
//! detonation hook exactly once, when the fuse reaches zero.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use blastforge_fuse::{BlastEffect, FuseDriver, PrimedCharge};
//!
//! let profile = Arc::new(BlastEffect::new(engine, 4, MaterialResistance, LineOfSightExposure));
//! let mut charge = PrimedCharge::spawn(id, position, profile, Some(igniter));
//! let mut driver = FuseDriver::seeded(7);
//! while driver.tick(&mut charge, &mut world) != TickOutcome::Detonated {}
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod machine;
pub mod profile;
pub mod state;
pub mod world;

pub use actor::{ChargeMinecart, ExplosiveActor, Motion, PrimedCharge, ThrownCharge};
pub use machine::{FuseDriver, TickOutcome, EXPLOSION_VOLUME};
pub use profile::{BlastEffect, DynamiteEffect, EffectProfile, ProfileSettings};
pub use state::{ActorState, FusePhase, Payload, PayloadValue, DEFAULT_FUSE, IDLE_FUSE};
pub use world::{FuseWorld, ParticleId, SoundId};
