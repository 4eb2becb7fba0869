//! Application state
//!
//! Shared state for the Axum application: the room hub, the user
//! registry and the configuration. Passed explicitly so tests can build
//! their own instances instead of patching globals.

use std::sync::Arc;

use chatroom_common::AppConfig;
use chatroom_core::UserRegistry;
use chatroom_gateway::Hub;

#[derive(Clone)]
pub struct AppState {
    hub: Arc<Hub>,
    users: Arc<UserRegistry>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(hub: Arc<Hub>, users: Arc<UserRegistry>, config: AppConfig) -> Self {
        Self {
            hub,
            users,
            config: Arc::new(config),
        }
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hub", &"Hub")
            .field("users", &"UserRegistry")
            .finish()
    }
}
