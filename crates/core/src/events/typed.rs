//! Typed subscription helpers
//!
//! Each `on_*` method wraps a callback over one concrete event struct into
//! an untyped [`EventCallback`](super::EventCallback) registered for the
//! matching [`EventKind`].

use super::kind::{EventKind, EventPhase};
use super::types::{
    EntityJoinEvent, EntityLeaveEvent, Event, EventInfo, HandlerResult, ReceivePacketEvent,
    TickEvent, WorldLoadEvent, WorldUnloadEvent,
};
use crate::bus::SubscriptionKey;
use crate::error::RegistrationError;

/// Anything subscribers can be registered with
///
/// Implemented by [`EventBus`](crate::bus::EventBus) for direct use and by
/// [`Registrar`](crate::module::Registrar) for module-scoped registration.
pub trait Subscribe {
    /// Register an untyped callback for `kind`
    ///
    /// # Arguments
    /// * `kind` - Event kind to receive
    /// * `priority` - Lower values run first; equal values run in registration order
    /// * `phase` - Only receive events of this phase (bracketing kinds only)
    /// * `callback` - Called synchronously on the posting thread
    fn register<F>(
        &self,
        kind: EventKind,
        priority: i32,
        phase: Option<EventPhase>,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&Event<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static;

    /// Register a callback for tick events
    fn on_tick<F>(
        &self,
        priority: i32,
        phase: Option<EventPhase>,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&TickEvent, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(EventKind::Tick, priority, phase, move |event, info| match event {
            Event::Tick(tick) => callback(tick, info),
            _ => Ok(()),
        })
    }

    /// Register a callback for world loads
    fn on_world_load<F>(
        &self,
        priority: i32,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&WorldLoadEvent<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(EventKind::WorldLoad, priority, None, move |event, info| match event {
            Event::WorldLoad(load) => callback(load, info),
            _ => Ok(()),
        })
    }

    /// Register a callback for world unloads
    fn on_world_unload<F>(
        &self,
        priority: i32,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&WorldUnloadEvent, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(EventKind::WorldUnload, priority, None, move |event, info| match event {
            Event::WorldUnload(unload) => callback(unload, info),
            _ => Ok(()),
        })
    }

    /// Register a callback for received packets
    ///
    /// Runs on the network thread. Call [`EventInfo::cancel`] to keep the
    /// packet away from the host's own handling.
    fn on_receive_packet<F>(
        &self,
        priority: i32,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&ReceivePacketEvent<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(EventKind::ReceivePacket, priority, None, move |event, info| match event {
            Event::ReceivePacket(packet) => callback(packet, info),
            _ => Ok(()),
        })
    }

    /// Register a callback for entities joining the world
    fn on_entity_join<F>(
        &self,
        priority: i32,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&EntityJoinEvent<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(EventKind::EntityJoin, priority, None, move |event, info| match event {
            Event::EntityJoin(join) => callback(join, info),
            _ => Ok(()),
        })
    }

    /// Register a callback for entities leaving the world
    fn on_entity_leave<F>(
        &self,
        priority: i32,
        callback: F,
    ) -> Result<SubscriptionKey, RegistrationError>
    where
        F: Fn(&EntityLeaveEvent<'_>, &mut EventInfo) -> HandlerResult + Send + Sync + 'static,
    {
        self.register(EventKind::EntityLeave, priority, None, move |event, info| match event {
            Event::EntityLeave(leave) => callback(leave, info),
            _ => Ok(()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use lucid_sdk::{Dimension, Entity, EntityKind, Packet, World};

    use super::*;
    use crate::bus::{priority, EventBus};

    #[test]
    fn test_typed_callbacks_receive_their_payload() {
        let bus = EventBus::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let log = seen.clone();
        bus.on_world_load(priority::NORMAL, move |event, _| {
            log.lock().push(format!("load:{}", event.world.name));
            Ok(())
        })
        .unwrap();

        let log = seen.clone();
        bus.on_entity_leave(priority::NORMAL, move |event, _| {
            log.lock().push(format!("leave:{}", event.entity.id));
            Ok(())
        })
        .unwrap();

        let log = seen.clone();
        bus.on_receive_packet(priority::NORMAL, move |event, _| {
            log.lock().push(format!("packet:{}", event.packet.name()));
            Ok(())
        })
        .unwrap();

        let world = World::new("hub", Dimension::Overworld);
        let zombie = Entity::new(12, EntityKind::Living, "Zombie");
        let packet = Packet::KeepAlive { id: 1 };

        bus.post(&Event::world_load(&world));
        bus.post(&Event::entity_leave(&zombie));
        bus.post(&Event::receive_packet(&packet));
        bus.post(&Event::entity_join(&zombie));

        assert_eq!(
            *seen.lock(),
            vec!["load:hub", "leave:12", "packet:keep_alive"]
        );
    }

    #[test]
    fn test_tick_phase_filter() {
        let bus = EventBus::new();
        let pre = Arc::new(AtomicUsize::new(0));
        let any = Arc::new(AtomicUsize::new(0));

        let counter = pre.clone();
        bus.on_tick(priority::NORMAL, Some(EventPhase::Pre), move |tick, _| {
            assert_eq!(tick.phase, EventPhase::Pre);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        let counter = any.clone();
        bus.on_tick(priority::NORMAL, None, move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        bus.post(&Event::tick(EventPhase::Pre));
        bus.post(&Event::tick(EventPhase::Post));

        assert_eq!(pre.load(Ordering::SeqCst), 1);
        assert_eq!(any.load(Ordering::SeqCst), 2);
    }
}
