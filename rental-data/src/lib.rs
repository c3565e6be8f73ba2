pub mod loader;
pub mod sources;

pub use loader::{PropertyLoader, PropertyLoaderError};
pub use sources::{RefreshConfig, RefreshOutcome, SourceCatalog, mock_sources};
