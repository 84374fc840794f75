//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use mathvid_pipeline::VideoPipeline;

use crate::catalog::CatalogStore;
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub pipeline: Arc<dyn VideoPipeline>,
    pub catalog: Arc<CatalogStore>,
    /// Directory finished videos are served from
    pub video_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        pipeline: Arc<dyn VideoPipeline>,
        video_dir: impl Into<PathBuf>,
    ) -> Self {
        let catalog = CatalogStore::new(config.catalog_path.clone());

        Self {
            config: Arc::new(config),
            pipeline,
            catalog: Arc::new(catalog),
            video_dir: Arc::new(video_dir.into()),
        }
    }
}
