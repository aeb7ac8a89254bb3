/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 *   - token service, collaborators (users / objects / mail), metrics, bucket settings
 * - Cheap to clone (everything behind Arc)
 */
use std::sync::Arc;

use crate::repos::UserStore;
use crate::services::auth::TokenService;
use crate::services::mail::MailSender;
use crate::services::metrics::HttpMetrics;
use crate::services::storage::ObjectStore;

/// Where uploads go and how their public URL is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
}

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub mailer: Arc<dyn MailSender>,
    pub metrics: Arc<HttpMetrics>,
    pub storage: StorageSettings,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("objects", &self.objects.backend_name())
            .field("mailer", &self.mailer.backend_name())
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
