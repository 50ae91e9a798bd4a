//! # League Store
//!
//! Row sources for the league analytics engine. The engine itself never reads
//! data; callers hold a [`LeagueRepository`] and hand the fetched rows over.
//!
//! ## Architecture
//!
//! - **LeagueRepository**: Abstract trait for row sources
//! - **LocalRepository**: JSON row files, one directory per league
//! - **InMemoryRepository**: Process-local maps for tests and embedding callers
//!
//! Rows are validated through `league_analytics::ingestion` on the way in, so
//! everything a repository returns is already in the strict record types.
//!
//! ## Usage
//!
//! ```rust
//! use league_store::{create_local_repository, LeagueRepository, RowQuery};
//! use tempfile::TempDir;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     std::fs::create_dir_all(temp_dir.path().join("abc"))?;
//!
//!     let mut repository = create_local_repository(temp_dir.path())?;
//!     repository.initialize().await?;
//!
//!     let rows = repository.weekly_scores(&RowQuery::league("abc")).await?;
//!     assert!(rows.is_empty());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod local;

pub use backend::{InMemoryRepository, LeagueData, LeagueRepository, LocalRepository, RowQuery};
pub use config::{BackendKind, StoreConfig};
pub use error::{Result, StoreError};
pub use local::{create_local_repository, create_local_repository_with_config};
