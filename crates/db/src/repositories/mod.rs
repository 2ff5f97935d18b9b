//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod contact_message_repo;
pub mod project_repo;
pub mod sponsor_repo;

pub use category_repo::CategoryRepo;
pub use contact_message_repo::ContactMessageRepo;
pub use project_repo::ProjectRepo;
pub use sponsor_repo::SponsorRepo;
