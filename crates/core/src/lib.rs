//! Domain logic for the atelier portfolio backend.
//!
//! Everything in this crate is framework-free: no axum or sqlx types appear
//! here, so the API and database crates (and any future CLI tooling) can
//! build on the same primitives.

pub mod error;
pub mod ids;
pub mod imaging;
pub mod pagination;
pub mod slug;
pub mod storage;
pub mod types;
pub mod validation;
