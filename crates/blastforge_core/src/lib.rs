//! # BLASTFORGE Core
//!
//! Raycast voxel destruction for explosions of arbitrary radius.
//!
//! ## Pipeline
//!
//! 1. [`DestructionRayCaster`] picks ray directions on the surface of the cube
//!    `[-R, R]³` (fast or precise, see [`Accuracy`]).
//! 2. Each ray is walked in small steps; a [`ResistanceModel`] charges the ray
//!    for every voxel it passes through.
//! 3. Reached voxels land in a deduplicating set keyed by [`PackedOffsetKey`]
//!    (or absolute [`VoxelPos`](blastforge_shared::VoxelPos) for unbounded craters).
//! 4. The set is applied once: destroyed, or handed to a caller-supplied effect.
//! 5. Entities within `2R` are damaged and knocked back.
//!
//! ## Example
//!
//! ```rust,ignore
//! use blastforge_core::{ExplosionEngine, EngineConfig, Explosion, BlockBlastParams};
//!
//! let engine = ExplosionEngine::new(EngineConfig::default());
//! let mut explosion = Explosion::new(origin, 12);
//! engine.destroy_voxels(&mut explosion, &mut world, &resistance, &BlockBlastParams::default(), &mut rng);
//! engine.affect_entities(&mut explosion, &mut world, &exposure, &EntityBlastParams::default());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod explosion;
pub mod raycast;
pub mod resistance;
pub mod sandbox;
pub mod world;

pub use codec::{PackedOffsetKey, VoxelKey, MAX_OFFSET};
pub use config::{Accuracy, EngineConfig};
pub use engine::ExplosionEngine;
pub use entities::EntityHit;
pub use error::{BlastError, BlastResult};
pub use explosion::{BlockBlastParams, DamageSource, EntityBlastParams, Explosion};
pub use raycast::{max_reach, DestructionRayCaster, RayWalk};
pub use resistance::{ExposureModel, FixedExposure, FullExposure, ResistanceModel, UniformResistance};
pub use world::{EntityClass, EntityView, EntityWorld, FluidState, VoxelWorld};
