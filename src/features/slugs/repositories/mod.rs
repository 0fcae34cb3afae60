#[cfg(test)]
mod memory;
mod slug_lookup;

#[cfg(test)]
pub use memory::InMemorySlugLookup;
pub use slug_lookup::{PgSlugLookup, SlugLookup};
