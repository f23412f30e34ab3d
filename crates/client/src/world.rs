//! World entity hooks

use tracing::trace;

use lucid_core::{Event, PostResult};
use lucid_sdk::Entity;

use crate::ClientHooks;

impl ClientHooks {
    /// Called when an entity is added to the client world
    pub fn entity_added(&self, entity: &Entity) -> PostResult {
        trace!("Entity joined: {}", entity);
        self.lucid.bus().post(&Event::entity_join(entity))
    }

    /// Called when an entity is removed from the client world
    pub fn entity_removed(&self, entity: &Entity) -> PostResult {
        trace!("Entity left: {}", entity);
        self.lucid.bus().post(&Event::entity_leave(entity))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use lucid_core::{priority, EventKind, Lucid, Subscribe};
    use lucid_sdk::EntityKind;

    use super::*;

    #[test]
    fn test_add_and_remove_map_to_join_and_leave() {
        let hooks = ClientHooks::new(Arc::new(Lucid::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        hooks
            .lucid()
            .bus()
            .on_entity_join(priority::NORMAL, move |event, _| {
                sink.lock().push(format!("join:{}", event.entity.name));
                Ok(())
            })
            .unwrap();
        let sink = seen.clone();
        hooks
            .lucid()
            .bus()
            .on_entity_leave(priority::NORMAL, move |event, _| {
                sink.lock().push(format!("leave:{}", event.entity.name));
                Ok(())
            })
            .unwrap();

        let steve = Entity::new(1, EntityKind::Player, "Steve").at(0.5, 64.0, 0.5);
        let arrow = Entity::new(2, EntityKind::Projectile, "Arrow");

        assert_eq!(hooks.entity_added(&steve).kind, EventKind::EntityJoin);
        hooks.entity_added(&arrow);
        assert_eq!(hooks.entity_removed(&arrow).kind, EventKind::EntityLeave);

        assert_eq!(
            *seen.lock(),
            vec!["join:Steve", "join:Arrow", "leave:Arrow"]
        );
    }

    #[test]
    fn test_entity_events_are_not_cancellable() {
        let hooks = ClientHooks::new(Arc::new(Lucid::default()));
        hooks
            .lucid()
            .bus()
            .on_entity_join(priority::NORMAL, |_, info| {
                assert!(!info.cancel());
                Ok(())
            })
            .unwrap();

        let pig = Entity::new(7, EntityKind::Living, "Pig");
        let result = hooks.entity_added(&pig);
        assert!(!result.is_cancelled());
        assert!(!result.has_failures());
    }
}
