//! Bazaar Core - Shared types and marketplace rules.
//!
//! This crate provides the domain vocabulary used across all Bazaar components:
//! - `server` - JSON API for buyers, sellers and admins
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rule functions - no I/O, no
//! database access. Services in the server crate read and lock rows, hand
//! them to these functions, and persist whatever they return.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, roles, delivery lookups
//! - [`cart`] - Cart line stock and overflow rules
//! - [`order`] - Order planning (per-seller grouping, totals)
//! - [`statistics`] - Per-product sales rollups
//! - [`error`] - Domain rule violations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod error;
pub mod order;
pub mod statistics;
pub mod types;

pub use error::DomainError;
pub use types::*;
