//! # Host World Surface
//!
//! The engine never owns voxels or entities. Everything it reads or writes goes
//! through these two traits, implemented by the host (see [`crate::sandbox`] for
//! an in-memory implementation).
//!
//! Both traits are consulted from inside a single tick. The engine holds no
//! reference to the world between calls.

use blastforge_shared::{Aabb, EntityId, Vec3, VoxelPos};

use crate::explosion::{DamageSource, Explosion};

/// Fluid occupying a voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FluidState {
    /// No fluid.
    #[default]
    Empty,
    /// Water (source or flowing).
    Water,
    /// Lava (source or flowing).
    Lava,
}

impl FluidState {
    /// Blast resistance contributed by the fluid alone.
    pub const LIQUID_RESISTANCE: f32 = 100.0;

    /// Returns true if there is no fluid.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Blast resistance of the fluid.
    #[inline]
    #[must_use]
    pub const fn blast_resistance(self) -> f32 {
        match self {
            Self::Empty => 0.0,
            Self::Water | Self::Lava => Self::LIQUID_RESISTANCE,
        }
    }
}

/// Voxel grid owned by the host.
pub trait VoxelWorld {
    /// Host block state. Cloned once per sample, so keep it small.
    type Block: Clone;

    /// Block at a coordinate. Unloaded or out-of-range coordinates read as air.
    fn block_at(&self, pos: VoxelPos) -> Self::Block;

    /// Fluid at a coordinate.
    fn fluid_at(&self, pos: VoxelPos) -> FluidState;

    /// Returns true if the block is empty space.
    fn is_air(&self, block: &Self::Block) -> bool;

    /// Returns true if the coordinate may be read and written.
    fn is_in_build_limit(&self, pos: VoxelPos) -> bool;

    /// Writes a block. `notify` asks the host to propagate neighbour updates.
    fn set_block(&mut self, pos: VoxelPos, block: Self::Block, notify: bool);

    /// The empty block.
    fn air(&self) -> Self::Block;

    /// The block placed by incendiary explosions.
    fn fire(&self) -> Self::Block;

    /// Returns true if the block at `pos` is a full opaque cube (fire can rest on it).
    fn is_opaque_full_cube(&self, pos: VoxelPos) -> bool;

    /// Called once per destroyed voxel, before it is cleared.
    ///
    /// Hosts use this for drops, chain ignition and similar side effects.
    fn on_destroyed_by_explosion(&mut self, _pos: VoxelPos, _explosion: &Explosion) {}
}

/// Broad classification of an entity, as far as explosions care.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityClass {
    /// Items, projectiles, vehicles.
    Object,
    /// Mobs. Knockback goes through the host's defensive modifier.
    Living,
    /// A player. Knockback is also queued for network sync.
    Player {
        /// Spectators are never pushed by the sync queue.
        spectator: bool,
        /// Creative players in flight are never pushed by the sync queue.
        creative_flying: bool,
    },
}

impl EntityClass {
    /// Returns true for living entities, players included.
    #[inline]
    #[must_use]
    pub const fn is_living(self) -> bool {
        matches!(self, Self::Living | Self::Player { .. })
    }

    /// Returns true if knockback should be queued for this entity's client.
    #[inline]
    #[must_use]
    pub const fn receives_knockback_sync(self) -> bool {
        match self {
            Self::Player {
                spectator,
                creative_flying,
            } => !spectator && !creative_flying,
            _ => false,
        }
    }
}

/// Snapshot of an entity taken at query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityView {
    /// Host handle.
    pub id: EntityId,
    /// Feet position.
    pub position: Vec3,
    /// Eye height above the feet.
    pub eye_height: f64,
    /// Classification.
    pub class: EntityClass,
    /// Immune to this explosion (e.g. fire-proof items, invulnerable mobs).
    pub immune: bool,
}

impl EntityView {
    /// Eye position.
    #[inline]
    #[must_use]
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * self.eye_height
    }
}

/// Entity list owned by the host.
pub trait EntityWorld {
    /// All entities whose position lies in `bounds`, excluding `excluded`.
    fn entities_in(&self, bounds: &Aabb, excluded: Option<EntityId>) -> Vec<EntityView>;

    /// Adds to an entity's velocity.
    fn add_velocity(&mut self, id: EntityId, delta: Vec3);

    /// Applies damage.
    fn damage(&mut self, id: EntityId, source: &DamageSource, amount: f32);

    /// Defensive scaling of knockback for living entities (armour enchantments).
    ///
    /// Identity by default.
    fn knockback_modifier(&self, _entity: &EntityView, factor: f64) -> f64 {
        factor
    }
}
