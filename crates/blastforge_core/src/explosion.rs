//! # Explosion
//!
//! One value per detonation. It carries the geometry (origin, radius), who is
//! responsible (the detonating actor and its owner), and what got hit so the
//! host can query it after the engine returns.

use std::collections::BTreeMap;

use blastforge_shared::{EntityId, Vec3, VoxelPos};

use crate::codec::{PackedOffsetKey, VoxelKey};

/// Damage attribution for entity hits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DamageSource {
    /// Host-facing damage type name.
    pub kind: String,
    /// The entity that exploded, if any.
    pub direct: Option<EntityId>,
    /// The entity credited with the damage (usually whoever lit the fuse).
    pub attacker: Option<EntityId>,
}

impl DamageSource {
    /// Damage type used when the caller does not supply one.
    pub const EXPLOSION: &'static str = "explosion";

    /// Plain explosion damage attributed to `direct` and `attacker`.
    #[must_use]
    pub fn explosion(direct: Option<EntityId>, attacker: Option<EntityId>) -> Self {
        Self {
            kind: Self::EXPLOSION.to_owned(),
            direct,
            attacker,
        }
    }
}

/// Tunables for the voxel phase of a detonation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockBlastParams {
    /// Multiplier on horizontal step length. Above ~1.2 rays start skipping voxels.
    pub xz_strength: f32,
    /// Multiplier on vertical step length.
    pub y_strength: f32,
    /// How strongly blast resistance eats into ray length.
    pub resistance_impact: f32,
    /// Spread of per-ray length jitter. Large explosions want less than 1.
    pub random_vec_length: f32,
    /// Ignite some destroyed voxels afterwards.
    pub fire: bool,
    /// Fluids neither stop rays nor cost them anything.
    pub strong: bool,
}

impl Default for BlockBlastParams {
    fn default() -> Self {
        Self {
            xz_strength: 1.0,
            y_strength: 1.0,
            resistance_impact: 1.0,
            random_vec_length: 1.0,
            fire: false,
            strong: false,
        }
    }
}

/// Tunables for the entity phase of a detonation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityBlastParams {
    /// Multiplier on knockback velocity.
    pub knockback_strength: f32,
    /// Apply damage, not just knockback.
    pub damage_entities: bool,
}

impl Default for EntityBlastParams {
    fn default() -> Self {
        Self {
            knockback_strength: 1.0,
            damage_entities: true,
        }
    }
}

/// A single detonation.
#[derive(Clone, Debug)]
pub struct Explosion {
    origin: Vec3,
    radius: i32,
    source: Option<EntityId>,
    owner: Option<EntityId>,
    damage_source: Option<DamageSource>,
    affected: Vec<PackedOffsetKey>,
    affected_players: BTreeMap<EntityId, Vec3>,
}

impl Explosion {
    /// Creates an explosion with no responsible entity.
    #[must_use]
    pub fn new(origin: Vec3, radius: i32) -> Self {
        Self {
            origin,
            radius,
            source: None,
            owner: None,
            damage_source: None,
            affected: Vec::new(),
            affected_players: BTreeMap::new(),
        }
    }

    /// Sets the detonating entity. It is never hit by its own explosion.
    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the entity credited with the damage.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<EntityId>) -> Self {
        self.owner = owner;
        self
    }

    /// Overrides the damage source.
    #[must_use]
    pub fn with_damage_source(mut self, damage_source: DamageSource) -> Self {
        self.damage_source = Some(damage_source);
        self
    }

    /// Center of the explosion.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Voxel containing the center. Offsets are relative to this.
    #[inline]
    #[must_use]
    pub fn origin_voxel(&self) -> VoxelPos {
        self.origin.voxel()
    }

    /// Radius in voxels.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// The detonating entity, excluded from the entity phase.
    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<EntityId> {
        self.source
    }

    /// The entity that caused the explosion (for kill credit).
    #[inline]
    #[must_use]
    pub fn causing_entity(&self) -> Option<EntityId> {
        self.owner
    }

    /// Damage source applied to entities.
    #[must_use]
    pub fn damage_source(&self) -> DamageSource {
        self.damage_source
            .clone()
            .unwrap_or_else(|| DamageSource::explosion(self.source, self.owner))
    }

    /// Packed keys of every voxel recorded so far.
    #[inline]
    #[must_use]
    pub fn affected_keys(&self) -> &[PackedOffsetKey] {
        &self.affected
    }

    /// Absolute positions of every voxel recorded so far.
    ///
    /// Offsets beyond ±511 were clamped when recorded.
    #[must_use]
    pub fn affected_voxels(&self) -> Vec<VoxelPos> {
        let origin = self.origin_voxel();
        self.affected.iter().map(|key| key.to_voxel(origin)).collect()
    }

    /// Recorded keys as raw native-endian bytes, four per key.
    #[must_use]
    pub fn affected_key_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.affected)
    }

    /// Knockback queued for player clients, keyed by entity.
    #[inline]
    #[must_use]
    pub fn affected_players(&self) -> &BTreeMap<EntityId, Vec3> {
        &self.affected_players
    }

    pub(crate) fn record_voxels<K: VoxelKey>(&mut self, keys: &[K]) {
        let origin = self.origin_voxel();
        self.affected.reserve(keys.len());
        self.affected.extend(
            keys.iter()
                .map(|key| PackedOffsetKey::from_voxel(key.to_voxel(origin), origin)),
        );
    }

    pub(crate) fn queue_player_knockback(&mut self, id: EntityId, knockback: Vec3) {
        self.affected_players.insert(id, knockback);
    }
}
