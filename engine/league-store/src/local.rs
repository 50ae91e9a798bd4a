//! Local file-based repository construction

use crate::backend::LocalRepository;
use crate::config::StoreConfig;
use crate::error::Result;

/// Create a new local repository with default configuration
pub fn create_local_repository(data_dir: impl Into<std::path::PathBuf>) -> Result<LocalRepository> {
    LocalRepository::with_default_config(data_dir)
}

/// Create a new local repository with custom configuration
pub fn create_local_repository_with_config(config: StoreConfig) -> Result<LocalRepository> {
    LocalRepository::new(config)
}
