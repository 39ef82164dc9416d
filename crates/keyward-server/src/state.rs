use std::sync::Arc;

use keyward_core::config::KeywardConfig;
use keyward_core::traits::*;

#[derive(Clone)]
pub struct AppState<C, A, S>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    pub code_store: Arc<C>,
    pub admin_store: Arc<A>,
    pub session_store: Arc<S>,
    pub config: Arc<KeywardConfig>,
}

impl<C, A, S> AppState<C, A, S>
where
    C: CodeStore,
    A: AdminStore,
    S: SessionStore,
{
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.config.admin.session_ttl_hours)
    }
}
