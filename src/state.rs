use std::sync::Arc;

use crate::{api::ApiClient, config::Config, error::AppError, session::Session, ui::Alerts};

/// Everything a screen needs, cloned into each one on mount.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub api: ApiClient,
    pub session: Session,
    pub alerts: Arc<dyn Alerts>,
}

impl AppState {
    pub fn new(config: Config, session: Session, alerts: Arc<dyn Alerts>) -> Result<Self, AppError> {
        let api = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            config,
            api,
            session,
            alerts,
        })
    }
}
