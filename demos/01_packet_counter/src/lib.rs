//! # Packet Counter Example
//!
//! Counts inbound packets by type and reports the busiest ones every
//! minute of game time.
//!
//! ## Features Demonstrated
//! - `#[event_handler]` - Typed handlers with generated registration functions
//! - `EventInfo::cancel` - Dropping packets before the game handles them
//! - Tick phase filters (`phase = "post"`)
//! - Static state shared between the network and tick threads
//!
//! ## Usage
//! ```ignore
//! packet_counter::init(lucid.bus().as_ref())?;
//! packet_counter::set_mute_sounds(true);
//!
//! // Later, query counts
//! let keep_alives = packet_counter::count("keep_alive");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::LazyLock;

use parking_lot::Mutex;

use lucid_core::sdk::Packet;
use lucid_core::{
    event_handler, priority, EventInfo, HandlerResult, ReceivePacketEvent, RegistrationError,
    Subscribe, TickEvent, WorldUnloadEvent,
};

/// Ticks between reports (one minute at 20 ticks per second)
const REPORT_INTERVAL_TICKS: u64 = 1200;

/// Delivered packets per packet name
static COUNTS: LazyLock<Mutex<HashMap<&'static str, u64>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

static MUTE_SOUNDS: AtomicBool = AtomicBool::new(false);

static TICKS: AtomicU64 = AtomicU64::new(0);

/// Initialize the Packet Counter.
///
/// Registers all handlers with `subscriber` (an event bus or a module registrar).
pub fn init<S: Subscribe>(subscriber: &S) -> Result<(), RegistrationError> {
    mute_sounds_register(subscriber)?;
    count_packet_register(subscriber)?;
    report_register(subscriber)?;
    reset_register(subscriber)?;

    tracing::info!("Packet Counter initialized!");
    Ok(())
}

/// Drop sound effect packets before the game plays them
pub fn set_mute_sounds(mute: bool) {
    MUTE_SOUNDS.store(mute, Ordering::Relaxed);
}

/// Delivered packets of the given type since the last world change
pub fn count(name: &str) -> u64 {
    COUNTS.lock().get(name).copied().unwrap_or(0)
}

/// All counts, busiest first
pub fn snapshot() -> Vec<(&'static str, u64)> {
    let mut counts: Vec<_> = COUNTS.lock().iter().map(|(k, v)| (*k, *v)).collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    counts
}

#[event_handler(event = "receive_packet", priority = priority::EARLY)]
fn mute_sounds(event: &ReceivePacketEvent<'_>, info: &mut EventInfo) -> HandlerResult {
    if MUTE_SOUNDS.load(Ordering::Relaxed) && matches!(event.packet, Packet::SoundEffect { .. }) {
        info.cancel();
    }
    Ok(())
}

// Runs late so it only counts packets nobody dropped
#[event_handler(event = "receive_packet", priority = priority::LATE)]
fn count_packet(event: &ReceivePacketEvent<'_>, info: &mut EventInfo) -> HandlerResult {
    if !info.is_cancelled() {
        *COUNTS.lock().entry(event.packet.name()).or_default() += 1;
    }
    Ok(())
}

#[event_handler(event = "tick", phase = "post")]
fn report(_event: &TickEvent, _info: &mut EventInfo) -> HandlerResult {
    let ticks = TICKS.fetch_add(1, Ordering::Relaxed) + 1;
    if ticks % REPORT_INTERVAL_TICKS == 0 {
        for (name, count) in snapshot().into_iter().take(3) {
            tracing::info!("Packet Counter: {} x{}", name, count);
        }
    }
    Ok(())
}

#[event_handler(event = "world_unload")]
fn reset(_event: &WorldUnloadEvent, _info: &mut EventInfo) -> HandlerResult {
    COUNTS.lock().clear();
    tracing::debug!("Packet Counter: counts cleared");
    Ok(())
}
