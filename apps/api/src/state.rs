use std::sync::Arc;

use crate::applications::ledger::ApplicationLedger;
use crate::store::{ApplicationStore, IdentityStore, JobCatalog, ProfileStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub ledger: ApplicationLedger,
    pub users: Arc<dyn IdentityStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub jobs: Arc<dyn JobCatalog>,
}

impl AppState {
    /// Wires every collaborator to one backing store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: IdentityStore + ProfileStore + JobCatalog + ApplicationStore + 'static,
    {
        Self {
            ledger: ApplicationLedger::new(store.clone(), store.clone()),
            users: store.clone(),
            profiles: store.clone(),
            jobs: store,
        }
    }
}
