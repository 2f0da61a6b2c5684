use std::sync::Arc;

use mth_db::SrsStore;
use mth_srs::{SessionLimits, SrsParams};

use crate::{
    clock::{Clock, SystemClock},
    config::{ApiConfig, Environment},
    learning::LearningService,
};

#[derive(Clone)]
pub struct ApiState<S> {
    pub learning: LearningService<S>,
    pub clock: Arc<dyn Clock>,
    pub environment: Environment,
}

impl<S: SrsStore> ApiState<S> {
    /// State backed by `store`, reading time from the system clock
    pub fn new(config: &ApiConfig, store: S) -> Self {
        Self::with_clock(
            store,
            config.srs_params,
            config.session_limits,
            config.env,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        store: S,
        params: SrsParams,
        limits: SessionLimits,
        environment: Environment,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            learning: LearningService::new(store, params, limits),
            clock,
            environment,
        }
    }
}

impl<S> std::fmt::Debug for ApiState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}
