use std::sync::Arc;

use skyfinder_core::repository::SearchSessionRepository;
use skyfinder_store::app_config::SearchConfig;

use crate::client::SearchService;

#[derive(Clone, Debug)]
pub struct SearchSettings {
    pub user_age: u32,
    pub fallback_to_examples: bool,
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            user_age: config.user_age,
            fallback_to_examples: config.fallback_to_examples,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<dyn SearchService>,
    pub sessions: Arc<dyn SearchSessionRepository>,
    pub settings: SearchSettings,
}
