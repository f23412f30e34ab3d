//! Attribute parsing for the event_handler macro

use darling::FromMeta;
use proc_macro2::Span;
use syn::{Expr, Ident};

/// Parsed `#[event_handler(...)]` arguments
#[derive(Debug, FromMeta)]
pub struct EventHandlerArgs {
    /// Event name (e.g., "tick", "receive_packet")
    pub event: String,

    /// Subscriber priority; any expression evaluating to `i32`
    #[darling(default)]
    pub priority: Option<Expr>,

    /// Phase filter, "pre" or "post" (tick only)
    #[darling(default)]
    pub phase: Option<String>,
}

/// An event name resolved to its typed registration method
pub struct HandlerTarget {
    /// `Subscribe` method to call (e.g., `on_tick`)
    pub method: Ident,
    /// Whether the method takes a phase filter
    pub bracketing: bool,
}

/// Map an event name to the `Subscribe::on_*` method for it
///
/// Names are the `EventKind::name` strings from lucid-core, which this
/// crate cannot depend on. lucid-core tests a handler for every kind.
pub fn resolve_event(name: &str) -> Option<HandlerTarget> {
    let (method, bracketing) = match name {
        "tick" => ("on_tick", true),
        "world_load" => ("on_world_load", false),
        "world_unload" => ("on_world_unload", false),
        "receive_packet" => ("on_receive_packet", false),
        "entity_join" => ("on_entity_join", false),
        "entity_leave" => ("on_entity_leave", false),
        _ => return None,
    };
    Some(HandlerTarget {
        method: Ident::new(method, Span::call_site()),
        bracketing,
    })
}

/// Phase names accepted by the `phase` argument
pub fn resolve_phase(name: &str) -> Option<Ident> {
    let variant = match name {
        "pre" => "Pre",
        "post" => "Post",
        _ => return None,
    };
    Some(Ident::new(variant, Span::call_site()))
}
