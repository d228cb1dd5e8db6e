//! Domain and wire types for the API.
//!
//! Row types derive `sqlx::FromRow` where the columns map one-to-one; all
//! response types serialize with camelCase field names.

pub mod cart;
pub mod catalog;
pub mod identity;
pub mod order;
pub mod user;

pub use identity::CurrentUser;
