use std::sync::Arc;

use crate::application::services::LaneDispatcher;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<LaneDispatcher>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(dispatcher: LaneDispatcher, settings: Settings) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            settings: Arc::new(settings),
        }
    }
}
