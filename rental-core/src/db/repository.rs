use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewProperty, Property, PropertyUpdate, PropertyValidationError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Invalid property: {0}")]
    Invalid(#[from] PropertyValidationError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage of rental listings.
///
/// Calculations never hold a repository; callers take a snapshot with
/// [`list_properties`](PropertyRepository::list_properties) and pass the slice
/// to the pure functions in [`crate::calculations`].
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Every listing, in insertion order.
    async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError>;

    async fn get_property(&self, id: i64) -> Result<Property, RepositoryError>;

    /// Validates and stores a listing, assigning its id, yield and creation
    /// date.
    async fn add_property(&self, property: NewProperty) -> Result<Property, RepositoryError>;

    /// Applies a partial edit. Unknown ids return [`RepositoryError::NotFound`].
    async fn update_property(
        &self,
        id: i64,
        update: PropertyUpdate,
    ) -> Result<Property, RepositoryError>;

    /// Removes a listing. Returns `false` when no listing had that id.
    async fn delete_property(&self, id: i64) -> Result<bool, RepositoryError>;

    async fn count_properties(&self) -> Result<usize, RepositoryError> {
        Ok(self.list_properties().await?.len())
    }
}
