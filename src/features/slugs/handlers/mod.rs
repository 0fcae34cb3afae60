pub mod slug_handler;

pub use slug_handler::*;
