//! Domain layer types and invariants.

pub mod catalog;
pub mod entities;
pub mod overlay;
pub mod security;
pub mod types;
