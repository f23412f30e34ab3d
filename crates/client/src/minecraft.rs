//! Game lifecycle hooks: startup, ticks and world changes

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;

use tracing::{debug, info, instrument};

use lucid_core::{Event, EventPhase, LucidError, PostResult};
use lucid_sdk::World;

use crate::{init_logging, ClientHooks};

/// Startup string the host logs once its own initialization is done
pub const POST_STARTUP_MARKER: &str = "Post startup";

impl ClientHooks {
    /// Called at the start of game startup
    ///
    /// Installs logging, then subscribes the scheduler and every module.
    #[instrument(skip_all)]
    pub fn start_game(&self) -> Result<(), LucidError> {
        init_logging(self.lucid.config().debug);

        info!("Lucid loading...");
        self.lucid.initialize()?;
        info!("Main thread ID: {:?}", std::thread::current().id());
        Ok(())
    }

    /// Called for each startup stage the host reports
    ///
    /// Runs late initialization when the post-startup marker is seen.
    ///
    /// # Returns
    /// `true` if `marker` triggered late initialization
    pub fn startup_marker(&self, marker: &str) -> Result<bool, LucidError> {
        if marker != POST_STARTUP_MARKER {
            return Ok(false);
        }
        self.lucid.late_initialize()?;
        Ok(true)
    }

    /// Wrap one host tick in PRE and POST tick events
    ///
    /// POST is posted even when `host_tick` panics; the panic then resumes.
    pub fn run_tick<T>(&self, host_tick: impl FnOnce() -> T) -> T {
        let bus = self.lucid.bus();
        bus.post(&Event::tick(EventPhase::Pre));

        let outcome = panic::catch_unwind(AssertUnwindSafe(host_tick));

        bus.post(&Event::tick(EventPhase::Post));
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        match outcome {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Ticks run since creation
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    /// Called before the host switches worlds
    ///
    /// `None` means the client is leaving its current world.
    pub fn load_world(&self, world: Option<&World>) -> PostResult {
        match world {
            Some(world) => {
                debug!("Loading world '{}' ({:?})", world.name, world.dimension);
                self.lucid.bus().post(&Event::world_load(world))
            }
            None => {
                debug!("Unloading world");
                self.lucid.bus().post(&Event::world_unload())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use lucid_core::{
        priority, EventKind, LifecycleState, Lucid, Module, RegistrationError, Registrar, Subscribe,
    };
    use lucid_sdk::Dimension;

    use super::*;

    fn phase_log(hooks: &ClientHooks) -> Arc<Mutex<Vec<EventPhase>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        hooks
            .lucid()
            .bus()
            .on_tick(priority::NORMAL, None, move |tick, _| {
                sink.lock().push(tick.phase);
                Ok(())
            })
            .unwrap();
        log
    }

    #[test]
    fn test_tick_is_bracketed() {
        let hooks = ClientHooks::new(Arc::new(Lucid::default()));
        let log = phase_log(&hooks);

        let value = hooks.run_tick(|| 7);
        assert_eq!(value, 7);
        assert_eq!(*log.lock(), vec![EventPhase::Pre, EventPhase::Post]);
        assert_eq!(hooks.tick_count(), 1);
    }

    #[test]
    fn test_post_tick_survives_host_panic() {
        let hooks = ClientHooks::new(Arc::new(Lucid::default()));
        let log = phase_log(&hooks);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            hooks.run_tick(|| panic!("host crashed"));
        }));

        assert!(result.is_err());
        assert_eq!(*log.lock(), vec![EventPhase::Pre, EventPhase::Post]);
    }

    #[test]
    fn test_post_tick_survives_host_error() {
        let hooks = ClientHooks::new(Arc::new(Lucid::default()));
        let log = phase_log(&hooks);

        let result: Result<(), &str> = hooks.run_tick(|| Err("lost connection"));

        assert!(result.is_err());
        assert_eq!(*log.lock(), vec![EventPhase::Pre, EventPhase::Post]);
    }

    #[test]
    fn test_load_world_translation() {
        let hooks = ClientHooks::new(Arc::new(Lucid::default()));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        hooks
            .lucid()
            .bus()
            .on_world_load(priority::NORMAL, move |event, _| {
                sink.lock().push(format!("load:{}", event.world.name));
                Ok(())
            })
            .unwrap();
        let sink = seen.clone();
        hooks
            .lucid()
            .bus()
            .on_world_unload(priority::NORMAL, move |_, _| {
                sink.lock().push("unload".to_string());
                Ok(())
            })
            .unwrap();

        let nether = World::new("survival", Dimension::Nether);
        assert_eq!(hooks.load_world(Some(&nether)).kind, EventKind::WorldLoad);
        assert_eq!(hooks.load_world(None).kind, EventKind::WorldUnload);
        assert_eq!(*seen.lock(), vec!["load:survival", "unload"]);
    }

    struct LateFlag(Arc<Mutex<bool>>);

    impl Module for LateFlag {
        fn name(&self) -> &'static str {
            "late_flag"
        }

        fn subscribe(self: Arc<Self>, _registrar: &Registrar<'_>) -> Result<(), RegistrationError> {
            Ok(())
        }

        fn late_initialize(&self, _lucid: &Lucid) {
            *self.0.lock() = true;
        }
    }

    #[test]
    fn test_startup_sequence() {
        let late = Arc::new(Mutex::new(false));
        let lucid = Lucid::default().with_module(LateFlag(late.clone()));
        let hooks = ClientHooks::new(Arc::new(lucid));

        hooks.start_game().unwrap();
        assert_eq!(hooks.lucid().state(), LifecycleState::Initialized);

        assert!(!hooks.startup_marker("Pre startup").unwrap());
        assert!(!*late.lock());

        assert!(hooks.startup_marker(POST_STARTUP_MARKER).unwrap());
        assert!(*late.lock());
        assert_eq!(hooks.lucid().state(), LifecycleState::Ready);

        assert!(matches!(hooks.start_game(), Err(LucidError::AlreadyInitialized)));
    }
}
