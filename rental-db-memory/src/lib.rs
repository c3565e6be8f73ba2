pub mod repository;

pub use repository::{InMemoryRepository, MEMORY_LOCATION};
