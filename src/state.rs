//! Shared application state for all routes.

use crate::config::Settings;
use crate::service::HeroService;
use crate::uow::UnitOfWorkProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub uow: Arc<dyn UnitOfWorkProvider>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(uow: impl UnitOfWorkProvider + 'static, settings: Settings) -> Self {
        AppState {
            uow: Arc::new(uow),
            settings: Arc::new(settings),
        }
    }

    /// A hero service over a fresh unit of work.
    pub fn heroes(&self) -> HeroService {
        HeroService::new(self.uow.begin())
    }
}
