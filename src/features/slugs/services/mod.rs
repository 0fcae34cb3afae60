pub mod slug_service;

pub use slug_service::SlugService;
