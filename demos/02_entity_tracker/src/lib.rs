//! # Entity Tracker Example
//!
//! Keeps an index of the entities in the current world, written as a
//! [`Module`] so its subscriptions are owned and removed by the context.
//!
//! ## Features Demonstrated
//! - `Module` trait - Named subscriber groups with shared state
//! - `Registrar` - Module-scoped registration
//! - `ModuleConfig` - TOML settings per module
//! - `DashMap` - Concurrent state shared by the tick and network threads
//! - `Packet::entity_id` - Attributing packets to tracked entities
//!
//! ## Configuration File
//!
//! `<data_dir>/config/lucid/modules/entity_tracker.toml`
//!
//! ```toml
//! players_only = false
//! announce_players = true
//! ```
//!
//! ## Usage
//! ```ignore
//! let tracker = EntityTracker::new(TrackerConfig::load(data_dir)?);
//! let lucid = Lucid::from_data_dir(data_dir)?.with_module(tracker);
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use lucid_core::sdk::{Entity, Packet};
use lucid_core::{priority, Lucid, Module, ModuleConfig, Registrar, RegistrationError, Subscribe};

/// Tracker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Ignore everything that is not a player
    pub players_only: bool,
    /// Log players joining and leaving
    pub announce_players: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            players_only: false,
            announce_players: true,
        }
    }
}

impl ModuleConfig for TrackerConfig {
    const MODULE_NAME: &'static str = "entity_tracker";
}

/// Entity status op code for a death
const STATUS_DEAD: i8 = 3;

/// A tracked entity
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity {
    pub entity: Entity,
    /// Received packets that referred to this entity
    pub packets: u64,
    /// Set once the server reports the entity dead
    pub dead: bool,
}

impl From<&Entity> for TrackedEntity {
    fn from(entity: &Entity) -> Self {
        Self {
            entity: entity.clone(),
            packets: 0,
            dead: false,
        }
    }
}

pub struct EntityTracker {
    config: TrackerConfig,
    /// Entities keyed by network id
    entities: DashMap<i32, TrackedEntity>,
    /// Name of the current world
    world: RwLock<Option<String>>,
}

impl EntityTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            entities: DashMap::new(),
            world: RwLock::new(None),
        }
    }

    pub fn get(&self, id: i32) -> Option<TrackedEntity> {
        self.entities.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Names of living tracked players within `radius` of `origin`, nearest first
    pub fn players_near(&self, origin: &Entity, radius: f64) -> Vec<String> {
        let mut nearby: Vec<(f64, String)> = self
            .entities
            .iter()
            .filter(|entry| entry.entity.is_player() && !entry.dead)
            .filter(|entry| entry.entity.id != origin.id)
            .filter_map(|entry| {
                let dist_sq = entry.entity.distance_sq(origin);
                (dist_sq <= radius * radius).then(|| (dist_sq, entry.entity.name.clone()))
            })
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearby.into_iter().map(|(_, name)| name).collect()
    }

    /// Name of the world the tracker last saw loading
    pub fn world(&self) -> Option<String> {
        self.world.read().clone()
    }

    fn on_join(&self, entity: &Entity) {
        if self.config.players_only && !entity.is_player() {
            return;
        }
        if entity.is_player() && self.config.announce_players {
            tracing::info!("{} joined {}", entity.name, self.world().unwrap_or_default());
        }
        self.entities.insert(entity.id, TrackedEntity::from(entity));
    }

    fn on_leave(&self, entity: &Entity) {
        if let Some((_, tracked)) = self.entities.remove(&entity.id) {
            if tracked.entity.is_player() && self.config.announce_players {
                tracing::info!("{} left", tracked.entity);
            }
        }
    }

    /// Attribute a packet to the entity it refers to
    ///
    /// Runs on the network thread.
    fn on_packet(&self, packet: &Packet) {
        let Some(id) = packet.entity_id() else {
            return;
        };
        let Some(mut tracked) = self.entities.get_mut(&id) else {
            return;
        };
        tracked.packets += 1;
        if let Packet::EntityStatus {
            op_code: STATUS_DEAD,
            ..
        } = packet
        {
            tracked.dead = true;
            tracing::debug!("{} died", tracked.entity);
        }
    }
}

impl Module for EntityTracker {
    fn name(&self) -> &'static str {
        TrackerConfig::MODULE_NAME
    }

    fn subscribe(self: Arc<Self>, registrar: &Registrar<'_>) -> Result<(), RegistrationError> {
        let tracker = self.clone();
        registrar.on_entity_join(priority::NORMAL, move |event, _| {
            tracker.on_join(event.entity);
            Ok(())
        })?;

        let tracker = self.clone();
        registrar.on_entity_leave(priority::NORMAL, move |event, _| {
            tracker.on_leave(event.entity);
            Ok(())
        })?;

        // Late, so packets another subscriber dropped are not counted
        let tracker = self.clone();
        registrar.on_receive_packet(priority::LATE, move |event, info| {
            if !info.is_cancelled() {
                tracker.on_packet(event.packet);
            }
            Ok(())
        })?;

        let tracker = self.clone();
        registrar.on_world_load(priority::EARLY, move |event, _| {
            *tracker.world.write() = Some(event.world.name.clone());
            Ok(())
        })?;

        // Entity ids are only unique within one world
        let tracker = self;
        registrar.on_world_unload(priority::LATE, move |_, _| {
            let dropped = tracker.entities.len();
            tracker.entities.clear();
            *tracker.world.write() = None;
            tracing::debug!("Entity Tracker: forgot {} entities", dropped);
            Ok(())
        })?;

        Ok(())
    }

    fn late_initialize(&self, _lucid: &Lucid) {
        tracing::info!(
            "Entity Tracker ready (players_only: {})",
            self.config.players_only
        );
    }
}
