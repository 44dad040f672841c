use std::sync::Arc;

use crate::services::credentials::CredentialService;

#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub fn new(credentials: Arc<CredentialService>) -> Self {
        Self { credentials }
    }
}
