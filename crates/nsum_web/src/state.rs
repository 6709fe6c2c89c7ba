use crate::service::NewsService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
}

impl AppState {
    pub fn new(service: NewsService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
