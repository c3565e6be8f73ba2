//! Listing portals and the simulated refresh that pulls new listings from
//! them.
//!
//! No network I/O happens here. A refresh waits for the configured delay,
//! then stores up to [`RefreshConfig::new_records`] of the candidate listings
//! it was handed and stamps every enabled source as freshly scraped.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rental_core::{
    DataSource, NewProperty, PropertyRepository, RepositoryError, ScraperStats, ScraperStatus,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Simulated scrape latency.
    pub delay: Duration,
    /// Upper bound on listings stored per refresh.
    pub new_records: usize,
}

impl RefreshConfig {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            new_records: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub success: bool,
    pub total_added: usize,
    /// Set only when the cancel signal won the race against the delay.
    pub cancelled: bool,
}

impl RefreshOutcome {
    pub fn finished(total_added: usize) -> Self {
        Self {
            success: true,
            total_added,
            cancelled: false,
        }
    }

    pub fn failed(total_added: usize) -> Self {
        Self {
            success: false,
            total_added,
            cancelled: false,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            success: false,
            total_added: 0,
            cancelled: true,
        }
    }
}

fn scraped_at(
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2026, 1, 21, hour, minute, 0).single()
}

/// The three portals the dashboard ships with, as last seen on 2026-01-21.
pub fn mock_sources() -> Vec<DataSource> {
    let source = |id: &str, name: &str, url: &str, minute: u32, count: usize| DataSource {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
        enabled: true,
        last_scraped: scraped_at(10, minute),
        property_count: count,
        status: ScraperStatus::Success,
        error_message: None,
    };

    vec![
        source("idealista", "Idealista", "https://www.idealista.com", 30, 6),
        source("fotocasa", "Fotocasa", "https://www.fotocasa.es", 25, 5),
        source("habitaclia", "Habitaclia", "https://www.habitaclia.com", 20, 4),
    ]
}

/// Owns the data sources and runs refreshes against a repository.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    sources: Vec<DataSource>,
    config: RefreshConfig,
}

impl SourceCatalog {
    pub fn new(
        sources: Vec<DataSource>,
        config: RefreshConfig,
    ) -> Self {
        Self { sources, config }
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Enables or disables a source by id. Returns `false` for unknown ids.
    ///
    /// A disabled source goes [`ScraperStatus::Idle`] and drops any error
    /// message; it stays idle after re-enabling until the next refresh.
    pub fn set_enabled(
        &mut self,
        id: &str,
        enabled: bool,
    ) -> bool {
        match self.sources.iter_mut().find(|s| s.id == id) {
            Some(source) => {
                source.enabled = enabled;
                if !enabled {
                    source.status = ScraperStatus::Idle;
                    source.error_message = None;
                }
                true
            }
            None => false,
        }
    }

    /// Summary counters for the store snapshot; `last_updated` is now.
    pub fn stats(
        &self,
        total_properties: usize,
    ) -> ScraperStats {
        ScraperStats {
            total_properties,
            last_updated: Utc::now(),
            active_sources: self.sources.iter().filter(|s| s.enabled).count(),
            total_sources: self.sources.len(),
        }
    }

    /// Runs a refresh to completion. See [`SourceCatalog::refresh_until`].
    pub async fn refresh<R: PropertyRepository + ?Sized>(
        &mut self,
        repo: &R,
        candidates: Vec<NewProperty>,
    ) -> RefreshOutcome {
        self.refresh_until(repo, candidates, std::future::pending::<()>())
            .await
    }

    /// Runs a refresh unless `cancel` resolves during the simulated delay.
    ///
    /// A cancelled refresh stores nothing and leaves every source as it was.
    /// Once the delay has elapsed the refresh runs to the end. A repository
    /// failure marks the enabled sources [`ScraperStatus::Error`] and is
    /// reported as an unsuccessful outcome carrying the listings stored
    /// before the failure.
    pub async fn refresh_until<R, F>(
        &mut self,
        repo: &R,
        candidates: Vec<NewProperty>,
        cancel: F,
    ) -> RefreshOutcome
    where
        R: PropertyRepository + ?Sized,
        F: Future<Output = ()>,
    {
        info!(
            delay_ms = self.config.delay.as_millis() as u64,
            candidates = candidates.len(),
            "refresh started"
        );

        tokio::select! {
            _ = tokio::time::sleep(self.config.delay) => {}
            _ = cancel => {
                warn!("refresh cancelled");
                return RefreshOutcome::cancelled();
            }
        }

        let mut total_added = 0;
        let result = self
            .store(repo, candidates, &mut total_added)
            .await;

        match result {
            Ok(()) => {
                info!(total_added, "refresh finished");
                RefreshOutcome::finished(total_added)
            }
            Err(err) => {
                warn!(error = %err, total_added, "refresh failed");
                for source in self.sources.iter_mut().filter(|s| s.enabled) {
                    source.status = ScraperStatus::Error;
                    source.error_message = Some(err.to_string());
                }
                RefreshOutcome::failed(total_added)
            }
        }
    }

    async fn store<R: PropertyRepository + ?Sized>(
        &mut self,
        repo: &R,
        candidates: Vec<NewProperty>,
        total_added: &mut usize,
    ) -> Result<(), RepositoryError> {
        for candidate in candidates.into_iter().take(self.config.new_records) {
            repo.add_property(candidate).await?;
            *total_added += 1;
        }

        let properties = repo.list_properties().await?;
        let now = Utc::now();

        for source in self.sources.iter_mut().filter(|s| s.enabled) {
            source.property_count = properties
                .iter()
                .filter(|p| p.source == source.name)
                .count();
            source.last_scraped = Some(now);
            source.status = ScraperStatus::Success;
            source.error_message = None;
        }
        Ok(())
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::new(mock_sources(), RefreshConfig::default())
    }
}
