//! Entity types

use std::fmt;

/// Broad classification of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Another player or the local player
    Player,
    /// Mobs and other living entities
    Living,
    /// Dropped items and experience orbs
    Item,
    /// Arrows, snowballs, fireballs
    Projectile,
    Other,
}

/// An entity registered with a world
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Network entity id, unique within a world
    pub id: i32,
    pub kind: EntityKind,
    /// Display name
    pub name: String,
    /// Position (x, y, z)
    pub pos: [f64; 3],
}

impl Entity {
    pub fn new(id: i32, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            pos: [0.0; 3],
        }
    }

    /// Set the entity position
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.pos = [x, y, z];
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    /// Squared distance to another entity
    pub fn distance_sq(&self, other: &Entity) -> f64 {
        self.pos
            .iter()
            .zip(other.pos.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_detection() {
        let player = Entity::new(1, EntityKind::Player, "Steve");
        let zombie = Entity::new(2, EntityKind::Living, "Zombie");
        assert!(player.is_player());
        assert!(!zombie.is_player());
    }

    #[test]
    fn test_distance() {
        let a = Entity::new(1, EntityKind::Player, "a").at(0.0, 0.0, 0.0);
        let b = Entity::new(2, EntityKind::Player, "b").at(3.0, 4.0, 0.0);
        assert_eq!(a.distance_sq(&b), 25.0);
    }
}
