//! # Entity Affection
//!
//! Damage and knockback for every entity within twice the radius of a
//! detonation.
//!
//! With `d` the entity's distance from the center divided by `2R` and `e` its
//! exposure, the damage factor is `f = (1 - d) * e`:
//!
//! - damage: `(f² + f) / 2 * 7 * R + 1`
//! - knockback: unit vector from the center to the entity's eyes, scaled by
//!   `f` (through the host's defensive modifier for living entities) and the
//!   knockback strength
//!
//! Players that can be pushed also get `direction * f` queued on the
//! explosion for the host's network layer.

use blastforge_shared::{Aabb, EntityId, Vec3};
use tracing::debug;

use crate::engine::ExplosionEngine;
use crate::explosion::{EntityBlastParams, Explosion};
use crate::resistance::ExposureModel;
use crate::world::{EntityView, EntityWorld};

/// What one entity received from a detonation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityHit {
    /// Entity hit.
    pub id: EntityId,
    /// Distance from the center divided by twice the radius, in `[0, 1]`.
    pub distance: f64,
    /// Exposure reported by the host.
    pub exposure: f32,
    /// Damage applied, if damage was enabled.
    pub damage: Option<f32>,
    /// Velocity added.
    pub knockback: Vec3,
}

impl ExplosionEngine {
    /// Damages and pushes back every non-immune entity in range.
    ///
    /// The detonating entity is never affected. Returns one record per entity
    /// touched, in the order the host listed them.
    #[allow(clippy::unused_self, clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn affect_entities<W, X>(
        &self,
        explosion: &mut Explosion,
        world: &mut W,
        exposure: &X,
        params: &EntityBlastParams,
    ) -> Vec<EntityHit>
    where
        W: EntityWorld + ?Sized,
        X: ExposureModel<W> + ?Sized,
    {
        let radius = explosion.radius();
        if radius <= 0 {
            return Vec::new();
        }
        let reach = 2.0 * f64::from(radius);
        let origin = explosion.origin();
        let source = explosion.damage_source();
        let candidates = in_range(explosion, &*world, reach);
        let mut hits = Vec::with_capacity(candidates.len());

        for (entity, distance) in candidates {
            let direction = (entity.eye_position() - origin).normalize_or_zero();
            let seen = exposure.exposure(&*world, origin, &entity).clamp(0.0, 1.0);
            let factor = (1.0 - distance as f32) * seen;

            let damage = params
                .damage_entities
                .then(|| (factor * factor + factor) / 2.0 * 7.0 * radius as f32 + 1.0);
            if let Some(amount) = damage {
                world.damage(entity.id, &source, amount);
            }

            let scale = if entity.class.is_living() {
                world.knockback_modifier(&entity, f64::from(factor))
            } else {
                f64::from(factor)
            };
            let knockback = direction * (scale * f64::from(params.knockback_strength));
            world.add_velocity(entity.id, knockback);

            if entity.class.receives_knockback_sync() {
                explosion.queue_player_knockback(entity.id, direction * f64::from(factor));
            }

            hits.push(EntityHit {
                id: entity.id,
                distance,
                exposure: seen,
                damage,
                knockback,
            });
        }

        debug!(
            origin = ?origin,
            radius,
            entities = hits.len(),
            players = explosion.affected_players().len(),
            "explosion hit entities"
        );
        hits
    }

    /// Runs `effect` on every non-immune entity strictly inside the blast
    /// sphere and not exactly at its center. The effect receives the
    /// normalized distance. Returns the number of entities visited.
    #[allow(clippy::unused_self)]
    pub fn visit_entities<W, F>(&self, explosion: &Explosion, world: &mut W, mut effect: F) -> usize
    where
        W: EntityWorld + ?Sized,
        F: FnMut(&mut W, &EntityView, f64),
    {
        if explosion.radius() <= 0 {
            return 0;
        }
        let reach = 2.0 * f64::from(explosion.radius());
        let mut visited = 0;
        for (entity, distance) in in_range(explosion, &*world, reach) {
            if distance > 0.0 && distance < 1.0 {
                effect(world, &entity, distance);
                visited += 1;
            }
        }
        visited
    }
}

/// Non-immune candidates with normalized distance at most 1.
fn in_range<W: EntityWorld + ?Sized>(
    explosion: &Explosion,
    world: &W,
    reach: f64,
) -> Vec<(EntityView, f64)> {
    let origin = explosion.origin();
    let excluded = explosion.source();
    world
        .entities_in(&Aabb::around(origin, reach), excluded)
        .into_iter()
        .filter(|entity| !entity.immune && Some(entity.id) != excluded)
        .map(|entity| {
            let distance = entity.position.distance(origin) / reach;
            (entity, distance)
        })
        .filter(|&(_, distance)| distance <= 1.0)
        .collect()
}
