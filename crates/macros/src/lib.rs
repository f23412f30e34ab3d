//! Lucid Proc Macros
//!
//! This crate provides proc macros for the Lucid framework:
//!
//! - `#[event_handler]` - Generate a typed registration function for a subscriber
//!
//! # Example
//!
//! ```ignore
//! use lucid_core::{event_handler, EventInfo, HandlerResult, ReceivePacketEvent};
//!
//! #[event_handler(event = "receive_packet", priority = -10)]
//! fn drop_sounds(event: &ReceivePacketEvent<'_>, info: &mut EventInfo) -> HandlerResult {
//!     if event.packet.name() == "sound_effect" {
//!         info.cancel();
//!     }
//!     Ok(())
//! }
//!
//! // Generated:
//! // - drop_sounds() - The handler, unchanged
//! // - drop_sounds_register(&bus) - Register it with a bus or module registrar
//! ```

mod event_handler;
mod parse;

use darling::ast::NestedMeta;
use darling::FromMeta;
use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemFn};

use crate::parse::EventHandlerArgs;

/// Attribute macro for subscriber registration
///
/// Leaves the function untouched and generates `{name}_register`, which
/// registers it through any `Subscribe` implementation (the event bus or a
/// module's registrar) and returns the subscription key.
///
/// # Arguments
///
/// - `event = "name"` - **Required.** One of `tick`, `world_load`,
///   `world_unload`, `receive_packet`, `entity_join`, `entity_leave`.
/// - `priority = expr` - Optional. Lower runs first (default: `priority::NORMAL`).
/// - `phase = "pre" | "post"` - Optional, `tick` only. Filter by phase.
///
/// The function must have the typed handler signature for its event, e.g.
/// `fn(&TickEvent, &mut EventInfo) -> HandlerResult`.
///
/// # Example
///
/// ```ignore
/// #[event_handler(event = "tick", phase = "pre")]
/// fn on_tick(tick: &TickEvent, info: &mut EventInfo) -> HandlerResult {
///     Ok(())
/// }
///
/// let key = on_tick_register(&bus)?;
/// ```
#[proc_macro_attribute]
pub fn event_handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr_args = match NestedMeta::parse_meta_list(attr.into()) {
        Ok(args) => args,
        Err(e) => return darling::Error::from(e).write_errors().into(),
    };
    let args = match EventHandlerArgs::from_list(&attr_args) {
        Ok(args) => args,
        Err(e) => return e.write_errors().into(),
    };
    let func = parse_macro_input!(item as ItemFn);

    event_handler::generate_event_handler(args, func)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
