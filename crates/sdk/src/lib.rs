//! Lucid SDK - Host Type Definitions
//!
//! Plain data types describing the host game state that producers hand to
//! the event core. Events borrow these values for the duration of a single
//! dispatch; nothing in the core ever stores them.
//!
//! # Modules
//!
//! - [`world`] - Client worlds and their dimensions
//! - [`entity`] - Entities tracked by a world
//! - [`packet`] - Decoded inbound (clientbound) packets

pub mod entity;
pub mod packet;
pub mod world;

pub use entity::{Entity, EntityKind};
pub use packet::Packet;
pub use world::{Dimension, World};
