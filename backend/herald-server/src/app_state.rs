use herald_broadcast::{BroadcasterManager, ShutdownCoordinator};

use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<BroadcasterManager>,
    pub shutdown: ShutdownCoordinator,
}

impl AppState {
    pub fn new(manager: Arc<BroadcasterManager>) -> Self {
        Self {
            manager,
            shutdown: ShutdownCoordinator::new(),
        }
    }
}
