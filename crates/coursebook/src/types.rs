use std::sync::Arc;

use crate::sheets::SheetStore;

/// State shared by every handler. Built once in `main` and injected into the router.
pub struct AppState {
    pub store: Arc<dyn SheetStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SheetStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}
