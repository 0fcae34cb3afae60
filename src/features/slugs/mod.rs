//! URL slug helpers.
//!
//! Categories, posts and tags each have their own slug namespace. These
//! endpoints let editors preview a generated slug or check one by hand before
//! saving.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/slugs/generate` | Unused slug for a name in a namespace |
//! | GET | `/api/slugs/available` | Whether a slug is free in a namespace |

pub mod dtos;
pub mod handlers;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::SlugService;
