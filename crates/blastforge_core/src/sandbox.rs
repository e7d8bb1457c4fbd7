//! # Sandbox Host
//!
//! A small in-memory world implementing [`VoxelWorld`] and [`EntityWorld`].
//! Tests and benchmarks run against it, and it doubles as a worked example of
//! what a host has to provide.
//!
//! Side effects the engine asks for (destroyed voxels, damage, sounds,
//! particles) are appended to an event log instead of being acted on.

use std::collections::{BTreeMap, HashMap};

use blastforge_shared::{Aabb, EntityId, Vec3, VoxelPos};

use crate::explosion::{DamageSource, Explosion};
use crate::resistance::{ExposureModel, ResistanceModel};
use crate::world::{EntityClass, EntityView, EntityWorld, FluidState, VoxelWorld};

/// Block materials known to the sandbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Material {
    /// Empty space.
    #[default]
    Air,
    /// Resistance 6.
    Stone,
    /// Resistance 0.5.
    Dirt,
    /// Resistance 0.3, not opaque.
    Glass,
    /// Resistance 1200.
    Obsidian,
    /// Cannot be destroyed.
    Bedrock,
    /// Placed by incendiary explosions.
    Fire,
    /// An unlit explosive block.
    Charge,
}

impl Material {
    /// Blast resistance.
    #[must_use]
    pub const fn blast_resistance(self) -> f32 {
        match self {
            Self::Air | Self::Fire | Self::Charge => 0.0,
            Self::Glass => 0.3,
            Self::Dirt => 0.5,
            Self::Stone => 6.0,
            Self::Obsidian => 1200.0,
            Self::Bedrock => 3_600_000.0,
        }
    }

    /// Full opaque cube.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        matches!(
            self,
            Self::Stone | Self::Dirt | Self::Obsidian | Self::Bedrock | Self::Charge
        )
    }

    /// Explosions never destroy it.
    #[must_use]
    pub const fn is_indestructible(self) -> bool {
        matches!(self, Self::Bedrock)
    }
}

/// Something that happened in the sandbox.
#[derive(Clone, Debug, PartialEq)]
pub enum SandboxEvent {
    /// A voxel was destroyed by an explosion.
    Destroyed(VoxelPos),
    /// An entity took damage.
    Damaged {
        /// Entity hit.
        id: EntityId,
        /// Damage type.
        kind: String,
        /// Amount.
        amount: f32,
    },
    /// A sound was played.
    Sound {
        /// Sound name.
        name: &'static str,
        /// Where.
        at: Vec3,
        /// Volume.
        volume: f32,
        /// Pitch.
        pitch: f32,
    },
    /// A particle was spawned.
    Particle {
        /// Particle name.
        name: &'static str,
        /// Where.
        at: Vec3,
    },
}

/// An entity living in the sandbox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SandboxEntity {
    /// Handle.
    pub id: EntityId,
    /// Feet position.
    pub position: Vec3,
    /// Eye height.
    pub eye_height: f64,
    /// Classification.
    pub class: EntityClass,
    /// Ignores explosions.
    pub immune: bool,
    /// Accumulated velocity.
    pub velocity: Vec3,
    /// Remaining health.
    pub health: f32,
}

impl SandboxEntity {
    /// Snapshot handed to the engine.
    #[must_use]
    pub fn view(&self) -> EntityView {
        EntityView {
            id: self.id,
            position: self.position,
            eye_height: self.eye_height,
            class: self.class,
            immune: self.immune,
        }
    }
}

/// In-memory voxel grid and entity list.
#[derive(Clone, Debug)]
pub struct SandboxWorld {
    voxels: HashMap<VoxelPos, Material>,
    fluids: HashMap<VoxelPos, FluidState>,
    min_y: i32,
    max_y: i32,
    entities: BTreeMap<EntityId, SandboxEntity>,
    next_entity: u64,
    events: Vec<SandboxEvent>,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxWorld {
    /// Lowest buildable y.
    pub const DEFAULT_MIN_Y: i32 = -64;
    /// One above the highest buildable y.
    pub const DEFAULT_MAX_Y: i32 = 320;
    /// Health of freshly spawned entities.
    pub const DEFAULT_HEALTH: f32 = 20.0;

    /// Empty world with default build limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_build_limits(Self::DEFAULT_MIN_Y, Self::DEFAULT_MAX_Y)
    }

    /// Empty world buildable for `min_y <= y < max_y`.
    #[must_use]
    pub fn with_build_limits(min_y: i32, max_y: i32) -> Self {
        Self {
            voxels: HashMap::new(),
            fluids: HashMap::new(),
            min_y,
            max_y,
            entities: BTreeMap::new(),
            next_entity: 1,
            events: Vec::new(),
        }
    }

    /// World with the inclusive box `min..=max` filled with `material`.
    #[must_use]
    pub fn filled(min: VoxelPos, max: VoxelPos, material: Material) -> Self {
        let mut world = Self::new();
        world.fill(min, max, material);
        world
    }

    /// Fills the inclusive box `min..=max`.
    pub fn fill(&mut self, min: VoxelPos, max: VoxelPos, material: Material) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_material(VoxelPos::new(x, y, z), material);
                }
            }
        }
    }

    /// Sets one voxel.
    pub fn set_material(&mut self, pos: VoxelPos, material: Material) {
        if material == Material::Air {
            self.voxels.remove(&pos);
        } else {
            self.voxels.insert(pos, material);
        }
    }

    /// Material at a voxel.
    #[must_use]
    pub fn material_at(&self, pos: VoxelPos) -> Material {
        self.voxels.get(&pos).copied().unwrap_or_default()
    }

    /// Sets or clears the fluid at a voxel.
    pub fn set_fluid(&mut self, pos: VoxelPos, fluid: FluidState) {
        if fluid.is_empty() {
            self.fluids.remove(&pos);
        } else {
            self.fluids.insert(pos, fluid);
        }
    }

    /// Number of non-air voxels.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.voxels.len()
    }

    /// Number of voxels holding `material`.
    #[must_use]
    pub fn count(&self, material: Material) -> usize {
        self.voxels.values().filter(|&&m| m == material).count()
    }

    /// Adds an entity and returns its handle.
    pub fn spawn_entity(&mut self, position: Vec3, eye_height: f64, class: EntityClass) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(
            id,
            SandboxEntity {
                id,
                position,
                eye_height,
                class,
                immune: false,
                velocity: Vec3::ZERO,
                health: Self::DEFAULT_HEALTH,
            },
        );
        id
    }

    /// Marks an entity as immune to explosions.
    pub fn set_immune(&mut self, id: EntityId, immune: bool) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.immune = immune;
        }
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&SandboxEntity> {
        self.entities.get(&id)
    }

    /// Removes an entity. Returns true if it existed.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    /// Appends to the event log.
    pub fn record(&mut self, event: SandboxEvent) {
        self.events.push(event);
    }

    /// Everything that happened so far.
    #[must_use]
    pub fn events(&self) -> &[SandboxEvent] {
        &self.events
    }

    /// Voxels reported destroyed, in order.
    #[must_use]
    pub fn destroyed_log(&self) -> Vec<VoxelPos> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SandboxEvent::Destroyed(pos) => Some(*pos),
                _ => None,
            })
            .collect()
    }
}

impl VoxelWorld for SandboxWorld {
    type Block = Material;

    fn block_at(&self, pos: VoxelPos) -> Material {
        self.material_at(pos)
    }

    fn fluid_at(&self, pos: VoxelPos) -> FluidState {
        self.fluids.get(&pos).copied().unwrap_or_default()
    }

    fn is_air(&self, block: &Material) -> bool {
        *block == Material::Air
    }

    fn is_in_build_limit(&self, pos: VoxelPos) -> bool {
        pos.y >= self.min_y && pos.y < self.max_y
    }

    // Writing a block displaces any fluid in the voxel.
    fn set_block(&mut self, pos: VoxelPos, block: Material, _notify: bool) {
        self.fluids.remove(&pos);
        self.set_material(pos, block);
    }

    fn air(&self) -> Material {
        Material::Air
    }

    fn fire(&self) -> Material {
        Material::Fire
    }

    fn is_opaque_full_cube(&self, pos: VoxelPos) -> bool {
        self.material_at(pos).is_opaque()
    }

    fn on_destroyed_by_explosion(&mut self, pos: VoxelPos, _explosion: &Explosion) {
        self.events.push(SandboxEvent::Destroyed(pos));
    }
}

impl EntityWorld for SandboxWorld {
    fn entities_in(&self, bounds: &Aabb, excluded: Option<EntityId>) -> Vec<EntityView> {
        self.entities
            .values()
            .filter(|entity| Some(entity.id) != excluded && bounds.contains(entity.position))
            .map(SandboxEntity::view)
            .collect()
    }

    fn add_velocity(&mut self, id: EntityId, delta: Vec3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.velocity += delta;
        }
    }

    fn damage(&mut self, id: EntityId, source: &DamageSource, amount: f32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.health -= amount;
            self.events.push(SandboxEvent::Damaged {
                id,
                kind: source.kind.clone(),
                amount,
            });
        }
    }
}

/// Resistance from [`Material::blast_resistance`] and [`FluidState::blast_resistance`].
///
/// Empty voxels cost nothing; bedrock is never destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterialResistance;

impl ResistanceModel<SandboxWorld> for MaterialResistance {
    fn blast_resistance(
        &self,
        _explosion: &Explosion,
        _world: &SandboxWorld,
        _pos: VoxelPos,
        block: &Material,
        fluid: FluidState,
    ) -> Option<f32> {
        if *block == Material::Air && fluid.is_empty() {
            None
        } else {
            Some(block.blast_resistance().max(fluid.blast_resistance()))
        }
    }

    fn can_destroy(
        &self,
        _explosion: &Explosion,
        _world: &SandboxWorld,
        _pos: VoxelPos,
        block: &Material,
        _remaining: f32,
    ) -> bool {
        !block.is_indestructible()
    }
}

/// Exposure as the fraction of three points on the entity (feet, middle, eyes)
/// with an unobstructed line to the blast center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineOfSightExposure;

impl LineOfSightExposure {
    const STEP: f64 = 0.3;

    fn clear(world: &SandboxWorld, from: Vec3, to: Vec3) -> bool {
        let delta = to - from;
        let length = delta.length();
        if length <= f64::EPSILON {
            return true;
        }
        let step = delta * (Self::STEP / length);
        let mut point = from;
        let mut travelled = 0.0;
        while travelled < length {
            if world.material_at(point.voxel()).is_opaque() {
                return false;
            }
            point += step;
            travelled += Self::STEP;
        }
        true
    }
}

impl ExposureModel<SandboxWorld> for LineOfSightExposure {
    fn exposure(&self, world: &SandboxWorld, origin: Vec3, entity: &EntityView) -> f32 {
        let targets = [
            entity.position,
            entity.position + Vec3::Y * (entity.eye_height * 0.5),
            entity.eye_position(),
        ];
        let visible = targets
            .iter()
            .filter(|&&target| Self::clear(world, origin, target))
            .count();
        match visible {
            0 => 0.0,
            1 => 1.0 / 3.0,
            2 => 2.0 / 3.0,
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_limits() {
        let world = SandboxWorld::new();
        assert!(world.is_in_build_limit(VoxelPos::new(0, -64, 0)));
        assert!(world.is_in_build_limit(VoxelPos::new(0, 319, 0)));
        assert!(!world.is_in_build_limit(VoxelPos::new(0, 320, 0)));
        assert!(!world.is_in_build_limit(VoxelPos::new(0, -65, 0)));
    }

    #[test]
    fn test_fill_and_clear() {
        let mut world = SandboxWorld::filled(VoxelPos::new(0, 0, 0), VoxelPos::new(1, 1, 1), Material::Stone);
        assert_eq!(world.solid_count(), 8);
        world.set_block(VoxelPos::ORIGIN, Material::Air, true);
        assert_eq!(world.solid_count(), 7);
        assert_eq!(world.count(Material::Stone), 7);
    }

    #[test]
    fn test_material_resistance() {
        let world = SandboxWorld::new();
        let explosion = Explosion::new(Vec3::ZERO, 1);
        let model = MaterialResistance;
        let at = VoxelPos::ORIGIN;
        assert_eq!(model.blast_resistance(&explosion, &world, at, &Material::Air, FluidState::Empty), None);
        assert_eq!(
            model.blast_resistance(&explosion, &world, at, &Material::Air, FluidState::Water),
            Some(100.0)
        );
        assert_eq!(model.blast_resistance(&explosion, &world, at, &Material::Stone, FluidState::Empty), Some(6.0));
        assert!(!model.can_destroy(&explosion, &world, at, &Material::Bedrock, 100.0));
    }

    #[test]
    fn test_line_of_sight_exposure() {
        let mut world = SandboxWorld::new();
        let view = EntityView {
            id: EntityId::new(1),
            position: Vec3::new(4.5, 0.5, 0.5),
            eye_height: 1.5,
            class: EntityClass::Living,
            immune: false,
        };
        let origin = Vec3::new(0.5, 0.5, 0.5);
        assert!((LineOfSightExposure.exposure(&world, origin, &view) - 1.0).abs() < f32::EPSILON);

        world.fill(VoxelPos::new(2, -3, -3), VoxelPos::new(2, 5, 3), Material::Stone);
        assert!(LineOfSightExposure.exposure(&world, origin, &view).abs() < f32::EPSILON);
    }

    #[test]
    fn test_entities_in_respects_exclusion() {
        let mut world = SandboxWorld::new();
        let a = world.spawn_entity(Vec3::ZERO, 1.0, EntityClass::Object);
        let b = world.spawn_entity(Vec3::new(1.0, 0.0, 0.0), 1.0, EntityClass::Object);
        world.spawn_entity(Vec3::new(50.0, 0.0, 0.0), 1.0, EntityClass::Object);
        let found = world.entities_in(&Aabb::around(Vec3::ZERO, 4.0), Some(a));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, b);
    }
}
