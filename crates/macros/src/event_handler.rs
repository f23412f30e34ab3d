//! Event handler attribute macro implementation
//!
//! Provides the `#[event_handler]` attribute for typed subscriber registration.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, ItemFn};

use crate::parse::{resolve_event, resolve_phase, EventHandlerArgs};

/// Generate the event_handler implementation
pub fn generate_event_handler(args: EventHandlerArgs, func: ItemFn) -> syn::Result<TokenStream> {
    let fn_name = &func.sig.ident;
    let fn_vis = &func.vis;

    if let Some(asyncness) = &func.sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            "event handlers run synchronously and cannot be async",
        ));
    }

    let target = resolve_event(&args.event).ok_or_else(|| {
        syn::Error::new(
            fn_name.span(),
            format!(
                "unknown event `{}`, expected one of: tick, world_load, world_unload, \
                 receive_packet, entity_join, entity_leave",
                args.event
            ),
        )
    })?;

    let priority = match &args.priority {
        Some(expr) => quote! { #expr },
        None => quote! { ::lucid_core::bus::priority::NORMAL },
    };

    let phase = match &args.phase {
        Some(name) => {
            if !target.bracketing {
                return Err(syn::Error::new(
                    fn_name.span(),
                    format!("event `{}` has no phases, remove `phase`", args.event),
                ));
            }
            let variant = resolve_phase(name).ok_or_else(|| {
                syn::Error::new(
                    fn_name.span(),
                    format!("unknown phase `{}`, expected \"pre\" or \"post\"", name),
                )
            })?;
            Some(quote! { Some(::lucid_core::events::EventPhase::#variant) })
        }
        None => None,
    };

    // Only bracketing events take the phase argument
    let phase_arg = if target.bracketing {
        let phase = phase.unwrap_or_else(|| quote! { None });
        quote! { #phase, }
    } else {
        quote! {}
    };

    let method = &target.method;
    let register_fn_name = Ident::new(&format!("{}_register", fn_name), fn_name.span());

    Ok(quote! {
        #func

        /// Register this handler
        #fn_vis fn #register_fn_name<S>(
            subscriber: &S,
        ) -> ::std::result::Result<
            ::lucid_core::bus::SubscriptionKey,
            ::lucid_core::error::RegistrationError,
        >
        where
            S: ::lucid_core::events::Subscribe,
        {
            ::lucid_core::events::Subscribe::#method(subscriber, #priority, #phase_arg #fn_name)
        }
    })
}
