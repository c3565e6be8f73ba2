pub mod repository;

pub use repository::{PropertyRepository, RepositoryError};
