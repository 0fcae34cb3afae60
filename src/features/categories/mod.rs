//! Blog categories feature.
//!
//! Categories form a forest: every category has at most one parent and no
//! category is its own ancestor. Slugs are unique among live categories;
//! deletes are soft and only allowed for categories without children or posts.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | Paged list with keyword/parent/active filters |
//! | POST | `/api/categories` | Create a category |
//! | GET | `/api/categories/active` | All active categories |
//! | GET | `/api/categories/tree` | Category forest |
//! | GET | `/api/categories/root` | Root categories |
//! | GET | `/api/categories/statistics` | Counts and top categories by posts |
//! | GET | `/api/categories/slug-available` | Check a slug |
//! | GET | `/api/categories/generate-slug` | Unused slug for a name |
//! | GET | `/api/categories/by-slug/{slug}` | Get category by slug |
//! | GET | `/api/categories/{id}` | Get category by ID |
//! | PUT | `/api/categories/{id}` | Update a category |
//! | DELETE | `/api/categories/{id}` | Soft-delete a category |
//! | GET | `/api/categories/{id}/children` | Direct children |
//! | GET | `/api/categories/{id}/path` | Ancestor path, root first |
//! | POST | `/api/categories/{id}/move` | Change parent |
//! | POST | `/api/categories/{id}/activate` | Activate |
//! | POST | `/api/categories/{id}/deactivate` | Deactivate |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::CategoryService;
