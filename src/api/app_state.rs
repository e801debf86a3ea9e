use crate::observability::AppMetrics;
use crate::services::pipeline::AnswerService;
use std::sync::Arc;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Retrieval-augmented answering service
    pub answer_service: Arc<dyn AnswerService>,
    /// Request metrics shared with the observability router
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("answer_service", &"Arc<dyn AnswerService>")
            .field("knowledge_loaded", &self.answer_service.knowledge_loaded())
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(answer_service: Box<dyn AnswerService>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            answer_service: Arc::from(answer_service),
            metrics,
        }
    }
}
