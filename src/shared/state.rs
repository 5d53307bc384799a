use crate::shared::config::AppConfig;
use crate::shared::utils::DbPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub conn: DbPool,
    pub config: Arc<AppConfig>,
}
