//! # Actor State
//!
//! The mutable part of an explosive actor: fuse counter, owner and an opaque
//! save payload.
//!
//! ```text
//!   Idle (fuse = -1) --ignite--> Armed (fuse >= 0) --fuse hits 0--> Detonated
//! ```
//!
//! The fuse only moves down while armed. Re-arming goes through the ignition
//! transitions, which refuse to touch an actor that is already armed.

use std::collections::BTreeMap;

use blastforge_shared::EntityId;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fuse value of an unarmed actor.
pub const IDLE_FUSE: i32 = -1;

/// Fuse length used when a profile does not choose one.
pub const DEFAULT_FUSE: i32 = 80;

/// Where an actor is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FusePhase {
    /// Not lit. Never detonates on its own.
    Idle,
    /// Counting down.
    Armed {
        /// Ticks left before detonation.
        remaining: i32,
    },
    /// Gone from the simulation.
    Detonated,
}

/// One value in a save payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    Text(String),
    /// Nested list.
    List(Vec<PayloadValue>),
}

/// Opaque key-value data that rides along with an actor through save/load.
///
/// The fuse machine never reads it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, PayloadValue>);

impl Payload {
    /// Empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.0.get(key)
    }

    /// Stores a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: PayloadValue) -> Option<PayloadValue> {
        self.0.insert(key.into(), value)
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<PayloadValue> {
        self.0.remove(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fuse, owner and payload of one actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    fuse: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<EntityId>,
    #[serde(default)]
    payload: Payload,
    #[serde(skip)]
    removed: bool,
}

impl Default for ActorState {
    fn default() -> Self {
        Self::idle()
    }
}

impl ActorState {
    /// An unlit actor.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            fuse: IDLE_FUSE,
            owner: None,
            payload: Payload::new(),
            removed: false,
        }
    }

    /// An actor already counting down from `fuse`.
    #[must_use]
    pub fn armed(fuse: i32) -> Self {
        Self {
            fuse: fuse.max(0),
            ..Self::idle()
        }
    }

    /// Current fuse. `-1` means idle.
    #[inline]
    #[must_use]
    pub fn fuse(&self) -> i32 {
        self.fuse
    }

    /// Overwrites the fuse (load from save, host scripting).
    ///
    /// Anything below `-1` is stored as `-1`.
    pub fn set_fuse(&mut self, fuse: i32) {
        self.fuse = fuse.max(IDLE_FUSE);
    }

    /// Returns true once the fuse is lit.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.fuse >= 0
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> FusePhase {
        if self.removed {
            FusePhase::Detonated
        } else if self.fuse < 0 {
            FusePhase::Idle
        } else {
            FusePhase::Armed {
                remaining: self.fuse,
            }
        }
    }

    /// Entity credited with the explosion.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Sets the entity credited with the explosion.
    pub fn set_owner(&mut self, owner: Option<EntityId>) {
        self.owner = owner;
    }

    /// Save payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Mutable save payload.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Returns true once the actor has left the simulation.
    #[inline]
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Takes the actor out of the simulation. Idempotent.
    pub fn discard(&mut self) {
        self.removed = true;
    }

    /// Lights the fuse with `default_fuse` ticks.
    ///
    /// Returns false (and changes nothing) if already armed or removed.
    pub fn ignite(&mut self, default_fuse: i32) -> bool {
        self.arm_with(default_fuse)
    }

    /// Lights the fuse so the next tick detonates.
    pub fn ignite_instantly(&mut self) -> bool {
        self.arm_with(0)
    }

    /// Lights the fuse after being caught in another explosion:
    /// `default/8 + rand(0..max(default/4, 1))` ticks.
    pub fn ignite_from_destruction<R: Rng + ?Sized>(&mut self, default_fuse: i32, rng: &mut R) -> bool {
        let spread = (default_fuse / 4).max(1);
        let fuse = default_fuse / 8 + rng.gen_range(0..spread);
        self.arm_with(fuse)
    }

    fn arm_with(&mut self, fuse: i32) -> bool {
        if self.removed || self.is_armed() {
            return false;
        }
        self.fuse = fuse.max(0);
        true
    }

    /// One tick of countdown. Idle and zero fuses stay where they are.
    pub(crate) fn tick_down(&mut self) {
        if self.fuse > 0 {
            self.fuse -= 1;
        }
    }
}
