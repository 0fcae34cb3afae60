mod post_counter;

pub use post_counter::{PgPostCounter, PostCounter};
