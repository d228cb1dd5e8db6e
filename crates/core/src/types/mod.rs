//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod delivery;
pub mod id;
pub mod role;

pub use delivery::{DELIVERY_METHODS, DELIVERY_PRICE, DELIVERY_PROVIDERS};
pub use id::*;
pub use role::{Role, UnknownRole};
