//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (optional fields) for edits

pub mod category;
pub mod contact_message;
pub mod project;
pub mod sponsor;
