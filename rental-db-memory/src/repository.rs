use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use rental_core::{NewProperty, Property, PropertyRepository, PropertyUpdate, RepositoryError};

/// The only store location this backend understands.
pub const MEMORY_LOCATION: &str = ":memory:";

/// Listings kept in process memory, in insertion order.
///
/// Ids are assigned sequentially starting at 1 and are never reused, even
/// after a delete.
pub struct InMemoryRepository {
    state: RwLock<State>,
}

struct State {
    properties: Vec<Property>,
    next_id: i64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                properties: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Opens an empty store for a configured `location`.
    ///
    /// Only [`MEMORY_LOCATION`] and the empty string are accepted. Anything
    /// else is most likely a database path, and listings written there would
    /// silently vanish at exit.
    pub fn open(location: &str) -> Result<Self, RepositoryError> {
        match location.trim() {
            "" | MEMORY_LOCATION => {
                debug!("opened in-memory property store");
                Ok(Self::new())
            }
            other => Err(RepositoryError::Configuration(format!(
                "the property store lives in memory; expected '{MEMORY_LOCATION}', got '{other}'"
            ))),
        }
    }

    /// Stores `property` with an explicit creation date. Used by loaders that
    /// replay historic data; [`PropertyRepository::add_property`] stamps today.
    pub async fn add_property_dated(
        &self,
        property: NewProperty,
        created_at: NaiveDate,
    ) -> Result<Property, RepositoryError> {
        property.validate()?;

        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;

        let stored = Property::from_new(id, property, created_at);
        state.properties.push(stored.clone());

        info!(
            id,
            neighborhood = %stored.neighborhood,
            gross_yield = %stored.gross_yield,
            "added property"
        );
        Ok(stored)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PropertyRepository for InMemoryRepository {
    async fn list_properties(&self) -> Result<Vec<Property>, RepositoryError> {
        let state = self.state.read().await;
        debug!(count = state.properties.len(), "listing properties");
        Ok(state.properties.clone())
    }

    async fn get_property(
        &self,
        id: i64,
    ) -> Result<Property, RepositoryError> {
        let state = self.state.read().await;
        state
            .properties
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn add_property(
        &self,
        property: NewProperty,
    ) -> Result<Property, RepositoryError> {
        self.add_property_dated(property, Utc::now().date_naive())
            .await
    }

    async fn update_property(
        &self,
        id: i64,
        update: PropertyUpdate,
    ) -> Result<Property, RepositoryError> {
        let mut state = self.state.write().await;
        let property = state
            .properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;

        update.apply_to(property)?;

        info!(id, gross_yield = %property.gross_yield, "updated property");
        Ok(property.clone())
    }

    async fn delete_property(
        &self,
        id: i64,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.properties.len();
        state.properties.retain(|p| p.id != id);
        let removed = state.properties.len() < before;

        if removed {
            info!(id, "deleted property");
        } else {
            debug!(id, "delete ignored, no such property");
        }
        Ok(removed)
    }

    async fn count_properties(&self) -> Result<usize, RepositoryError> {
        Ok(self.state.read().await.properties.len())
    }
}
