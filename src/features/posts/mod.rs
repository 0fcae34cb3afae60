//! Blog posts, as seen by the category subsystem.
//!
//! Post CRUD lives outside this service; categories only need to know how
//! many live posts reference them (for read-side counts and delete checks).

pub mod repositories;

pub use repositories::{PgPostCounter, PostCounter};
