pub mod cache;
pub mod sqlite;

pub use cache::{Cache, MemoryCache, NoCache};
pub use sqlite::SqliteCache;
