use std::sync::Arc;

use crate::{db::DbPool, notify::NotificationGateway};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub notifier: Arc<dyn NotificationGateway>,
    /// Static admin secret; `None` leaves the admin surface open.
    pub admin_secret: Option<String>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        notifier: Arc<dyn NotificationGateway>,
        admin_secret: Option<String>,
    ) -> Self {
        Self {
            pool,
            notifier,
            admin_secret,
        }
    }
}
