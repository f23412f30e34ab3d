//! Lucid Client - Producer Layer
//!
//! The host game calls into [`ClientHooks`] at its injection points: game
//! startup, every tick, world (un)load, packet receipt and entity
//! add/remove. Each call translates host state into a Lucid event and posts
//! it on the calling thread.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lucid_client::ClientHooks;
//! use lucid_core::Lucid;
//!
//! let lucid = Lucid::from_data_dir(game_dir)?.with_module(MyModule::default());
//! let hooks = ClientHooks::new(Arc::new(lucid));
//!
//! hooks.start_game()?;
//! hooks.run_tick(|| game.tick());
//! ```

mod logging;
mod minecraft;
mod network;
mod world;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use lucid_core::Lucid;

pub use logging::init_logging;
pub use minecraft::POST_STARTUP_MARKER;
pub use network::PacketVerdict;

/// Host-facing entry points
///
/// Cheap to share between the tick thread and the network thread.
pub struct ClientHooks {
    lucid: Arc<Lucid>,
    /// Ticks run since creation
    tick_count: AtomicU64,
}

impl ClientHooks {
    pub fn new(lucid: Arc<Lucid>) -> Self {
        Self {
            lucid,
            tick_count: AtomicU64::new(0),
        }
    }

    pub fn lucid(&self) -> &Arc<Lucid> {
        &self.lucid
    }
}
