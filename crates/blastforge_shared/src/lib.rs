//! # BLASTFORGE Shared
//!
//! Common geometry and identifiers used by both the explosion engine and the
//! fuse state machine.
//!
//! ## CRITICAL RULE
//!
//! This crate holds data types only. Anything that reads or mutates a host
//! world belongs in `blastforge_core` or `blastforge_fuse`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod ids;
pub mod math;

pub use ids::EntityId;
pub use math::{Aabb, Vec3, VoxelPos};
