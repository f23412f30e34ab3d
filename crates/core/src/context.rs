//! The Lucid context
//!
//! Owns the event bus, the task scheduler, configuration and the registered
//! modules. Hosts create one context at startup and hand it to the
//! producers; there is no global instance.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::bus::{EventBus, SubscriptionKey};
use crate::config::{ConfigError, ConfigResult, CoreConfig};
use crate::error::LucidError;
use crate::module::{Module, Registrar};
use crate::tasks::TaskScheduler;

/// Where the context is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built, nothing subscribed yet
    Created,
    /// Scheduler and modules subscribed
    Initialized,
    /// Late initialization done, game fully started
    Ready,
    /// Subscriptions removed and bus closed
    ShutDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Ready => "ready",
            Self::ShutDown => "shut down",
        };
        f.write_str(name)
    }
}

/// Name the task scheduler's subscription is reported under
const SCHEDULER_OWNER: &str = "tasks";

pub struct Lucid {
    bus: Arc<EventBus>,
    tasks: Arc<TaskScheduler>,
    config: CoreConfig,
    data_dir: Option<PathBuf>,
    modules: Vec<Arc<dyn Module>>,
    state: RwLock<LifecycleState>,
    /// Every subscription made during initialization
    keys: Mutex<Vec<SubscriptionKey>>,
}

impl Lucid {
    /// Create a context without a data directory
    pub fn new(config: CoreConfig) -> Self {
        Self {
            bus: Arc::new(EventBus::with_config(&config.bus)),
            tasks: Arc::new(TaskScheduler::new(&config.tasks)),
            config,
            data_dir: None,
            modules: Vec::new(),
            state: RwLock::new(LifecycleState::Created),
            keys: Mutex::new(Vec::new()),
        }
    }

    /// Create a context rooted at the client data directory
    ///
    /// Loads `config/lucid.toml`, writing the defaults if it does not exist.
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, LucidError> {
        let data_dir = data_dir.into();
        let config = CoreConfig::load(&data_dir)?;
        let mut lucid = Self::new(config);
        lucid.data_dir = Some(data_dir);
        Ok(lucid)
    }

    /// Add a module. Modules subscribe in the order they were added.
    pub fn with_module<M: Module>(mut self, module: M) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn tasks(&self) -> &Arc<TaskScheduler> {
        &self.tasks
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Client data directory, for module config files
    pub fn data_dir(&self) -> ConfigResult<&Path> {
        self.data_dir
            .as_deref()
            .ok_or(ConfigError::NoConfigDirectory)
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read()
    }

    /// Names of the registered modules, in subscription order
    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    /// Subscribe the task scheduler, then every module
    ///
    /// Stops at the first module that fails to subscribe. Every subscription
    /// made by that attempt is removed again and the context stays
    /// [`Created`](LifecycleState::Created), so `initialize` can be retried.
    pub fn initialize(&self) -> Result<(), LucidError> {
        let mut state = self.state.write();
        match *state {
            LifecycleState::Created => {}
            LifecycleState::ShutDown => return Err(LucidError::ShutDown),
            _ => return Err(LucidError::AlreadyInitialized),
        }

        let start = Instant::now();
        let mut attempt = Vec::new();

        if let Err(err) = self.subscribe_all(&mut attempt) {
            let removed = attempt
                .into_iter()
                .filter(|key| self.bus.unregister(*key))
                .count();
            tracing::warn!("Lucid initialization failed, rolled back {} subscriptions", removed);
            return Err(err);
        }

        self.keys.lock().extend(attempt);
        *state = LifecycleState::Initialized;
        info!(
            "Lucid initialized in {}ms ({} modules)",
            start.elapsed().as_millis(),
            self.modules.len()
        );
        Ok(())
    }

    /// Subscribe the scheduler and the modules, recording every key in `keys`
    fn subscribe_all(&self, keys: &mut Vec<SubscriptionKey>) -> Result<(), LucidError> {
        let key = self
            .tasks
            .subscribe(self.bus.as_ref())
            .map_err(|source| LucidError::Registration {
                module: SCHEDULER_OWNER,
                source,
            })?;
        keys.push(key);

        for module in &self.modules {
            let registrar = Registrar::new(&self.bus, module.name());
            let outcome = Arc::clone(module).subscribe(&registrar);
            let registered = registrar.into_keys();
            tracing::debug!(
                "Module '{}' registered {} subscribers",
                module.name(),
                registered.len()
            );
            keys.extend(registered);

            outcome.map_err(|source| LucidError::Registration {
                module: module.name(),
                source,
            })?;
        }
        Ok(())
    }

    /// Run each module's late initialization
    ///
    /// Called once the game reports its startup is complete.
    pub fn late_initialize(&self) -> Result<(), LucidError> {
        {
            let mut state = self.state.write();
            match *state {
                LifecycleState::Initialized => *state = LifecycleState::Ready,
                LifecycleState::Created => return Err(LucidError::NotInitialized),
                LifecycleState::Ready => return Err(LucidError::AlreadyInitialized),
                LifecycleState::ShutDown => return Err(LucidError::ShutDown),
            }
        }

        // Lock released so modules can inspect the context
        for module in &self.modules {
            module.late_initialize(self);
        }
        info!("Lucid ready");
        Ok(())
    }

    /// Remove every subscription, drop queued tasks and close the bus
    ///
    /// Calling it again is a no-op.
    pub fn shutdown(&self) {
        let mut state = self.state.write();
        if *state == LifecycleState::ShutDown {
            return;
        }

        let keys = std::mem::take(&mut *self.keys.lock());
        let removed = keys.into_iter().filter(|key| self.bus.unregister(*key)).count();
        let dropped = self.tasks.clear();
        self.bus.close();

        *state = LifecycleState::ShutDown;
        info!(
            "Lucid shut down ({} subscriptions removed, {} queued tasks dropped)",
            removed, dropped
        );
    }
}

impl Default for Lucid {
    fn default() -> Self {
        Self::new(CoreConfig::default())
    }
}

impl fmt::Debug for Lucid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lucid")
            .field("state", &self.state())
            .field("modules", &self.module_names())
            .field("data_dir", &self.data_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::bus::priority;
    use crate::error::RegistrationError;
    use crate::events::{Event, EventKind, EventPhase, Subscribe};

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Module for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn subscribe(self: Arc<Self>, registrar: &Registrar<'_>) -> Result<(), RegistrationError> {
            let this = self.clone();
            registrar.on_tick(priority::NORMAL, Some(EventPhase::Pre), move |_, _| {
                this.log.lock().push(format!("{}:tick", this.name));
                Ok(())
            })?;
            Ok(())
        }

        fn late_initialize(&self, lucid: &Lucid) {
            assert_eq!(lucid.state(), LifecycleState::Ready);
            self.log.lock().push(format!("{}:late", self.name));
        }
    }

    struct Broken;

    impl Module for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn subscribe(self: Arc<Self>, registrar: &Registrar<'_>) -> Result<(), RegistrationError> {
            registrar.on_world_unload(priority::NORMAL, |_, _| Ok(()))?;
            registrar.register(EventKind::WorldUnload, 0, Some(EventPhase::Pre), |_, _| Ok(()))?;
            Ok(())
        }
    }

    fn recorder(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Recorder {
        Recorder {
            name,
            log: log.clone(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lucid = Lucid::default()
            .with_module(recorder("first", &log))
            .with_module(recorder("second", &log));
        assert_eq!(lucid.state(), LifecycleState::Created);

        lucid.initialize().unwrap();
        assert_eq!(lucid.state(), LifecycleState::Initialized);
        // Scheduler plus one subscription per module
        assert_eq!(lucid.bus().registry().len(EventKind::Tick), 3);

        lucid.late_initialize().unwrap();
        assert_eq!(lucid.state(), LifecycleState::Ready);

        lucid.bus().post(&Event::tick(EventPhase::Pre));
        assert_eq!(
            *log.lock(),
            vec!["first:late", "second:late", "first:tick", "second:tick"]
        );

        lucid.shutdown();
        assert_eq!(lucid.state(), LifecycleState::ShutDown);
        assert!(lucid.bus().registry().is_empty());
        assert!(lucid.bus().is_closed());

        // Idempotent
        lucid.shutdown();
    }

    #[test]
    fn test_double_initialize() {
        let lucid = Lucid::default();
        lucid.initialize().unwrap();
        assert!(matches!(lucid.initialize(), Err(LucidError::AlreadyInitialized)));
    }

    #[test]
    fn test_late_initialize_requires_initialize() {
        let lucid = Lucid::default();
        assert!(matches!(lucid.late_initialize(), Err(LucidError::NotInitialized)));

        lucid.initialize().unwrap();
        lucid.late_initialize().unwrap();
        assert!(matches!(lucid.late_initialize(), Err(LucidError::AlreadyInitialized)));
    }

    #[test]
    fn test_initialize_after_shutdown() {
        let lucid = Lucid::default();
        lucid.shutdown();
        assert!(matches!(lucid.initialize(), Err(LucidError::ShutDown)));
    }

    #[test]
    fn test_module_failure_names_module() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let lucid = Lucid::default()
            .with_module(Broken)
            .with_module(recorder("never", &log));

        match lucid.initialize() {
            Err(LucidError::Registration { module, source }) => {
                assert_eq!(module, "broken");
                assert_eq!(source, RegistrationError::PhaseNotSupported(EventKind::WorldUnload));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(lucid.state(), LifecycleState::Created);
        // The scheduler and the partial module subscriptions are rolled back
        assert!(lucid.bus().registry().is_empty());

        lucid.shutdown();
        assert!(lucid.bus().registry().is_empty());
    }

    /// Fails its first subscription attempt, succeeds afterwards
    struct FlakyOnce {
        failed: AtomicBool,
        calls: Arc<AtomicUsize>,
    }

    impl Module for FlakyOnce {
        fn name(&self) -> &'static str {
            "flaky_once"
        }

        fn subscribe(self: Arc<Self>, registrar: &Registrar<'_>) -> Result<(), RegistrationError> {
            let calls = self.calls.clone();
            registrar.on_world_unload(priority::NORMAL, move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })?;
            if !self.failed.swap(true, Ordering::SeqCst) {
                registrar.register(EventKind::WorldUnload, 0, Some(EventPhase::Pre), |_, _| {
                    Ok(())
                })?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_initialize_retry_after_module_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let lucid = Lucid::default()
            .with_module(recorder("steady", &log))
            .with_module(FlakyOnce {
                failed: AtomicBool::new(false),
                calls: calls.clone(),
            });

        assert!(matches!(
            lucid.initialize(),
            Err(LucidError::Registration { module: "flaky_once", .. })
        ));
        lucid.initialize().unwrap();
        assert_eq!(lucid.state(), LifecycleState::Initialized);

        // Scheduler plus the steady module, each once
        assert_eq!(lucid.bus().registry().len(EventKind::Tick), 2);
        assert_eq!(lucid.bus().registry().len(EventKind::WorldUnload), 1);

        lucid.bus().post(&Event::world_unload());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        lucid
            .tasks()
            .schedule(1, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        lucid.bus().post(&Event::tick(EventPhase::Pre));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        lucid.bus().post(&Event::tick(EventPhase::Pre));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(*log.lock(), vec!["steady:tick", "steady:tick"]);
    }

    #[test]
    fn test_scheduler_runs_on_pre_tick() {
        let lucid = Lucid::default();
        lucid.initialize().unwrap();

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        lucid
            .tasks()
            .schedule(0, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        lucid.bus().post(&Event::tick(EventPhase::Post));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        lucid.bus().post(&Event::tick(EventPhase::Pre));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_data_dir() {
        let lucid = Lucid::default();
        assert!(matches!(lucid.data_dir(), Err(ConfigError::NoConfigDirectory)));

        let dir = std::env::temp_dir().join(format!("lucid-context-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let lucid = Lucid::from_data_dir(&dir).unwrap();
        assert_eq!(lucid.data_dir().unwrap(), dir.as_path());
        assert_eq!(lucid.config(), &CoreConfig::default());
        assert!(crate::config::core_config_path(&dir).exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
