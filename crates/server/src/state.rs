use std::sync::Arc;

use service::identity::IdentityProvider;
use service::Services;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(services: Services, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { services, identity }
    }
}
