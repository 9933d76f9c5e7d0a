use std::sync::Arc;
use tasklens_core::{
    ContextStore, MemoryContextStore, MemoryTaskStore, Settings, SuggestionEngine, TaskStore,
};

#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskStore>,
    pub contexts: Arc<dyn ContextStore>,
    pub engine: Arc<SuggestionEngine>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// In-memory state; everything is lost when the process exits.
    pub fn new(settings: Settings) -> Self {
        Self::with_stores(
            settings,
            Arc::new(MemoryTaskStore::new()),
            Arc::new(MemoryContextStore::new()),
        )
    }

    pub fn with_stores(
        settings: Settings,
        tasks: Arc<dyn TaskStore>,
        contexts: Arc<dyn ContextStore>,
    ) -> Self {
        let engine = Arc::new(SuggestionEngine::new(settings.suggestions.clone()));
        Self {
            tasks,
            contexts,
            engine,
            settings: Arc::new(settings),
        }
    }
}
