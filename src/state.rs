use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::media::MediaStore;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub media: Arc<dyn MediaStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<dyn MediaStore>, config: AppConfig) -> Self {
        Self {
            store,
            media,
            config: Arc::new(config),
        }
    }
}
