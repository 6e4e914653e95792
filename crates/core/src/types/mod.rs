//! Core domain types for Bramble.
//!
//! Type-safe wrappers for common concepts, so that a raw `i32` or `String`
//! never crosses a module boundary where an entity ID or email is meant.

pub mod email;
pub mod id;
pub mod money;
