use std::sync::Arc;

use crate::codec::TemporalCodec;
use crate::config::PlannerConfig;
use crate::error::PlannerError;
use crate::notify::NotificationBus;
use crate::services::{MutationCoordinator, QueryCache};
use crate::store::{HttpTaskStore, TaskStore};

/// Everything a client session needs: the store, its cache and the
/// mutation path that keeps the two consistent.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub cache: Arc<QueryCache>,
    pub mutations: Arc<MutationCoordinator>,
    pub codec: TemporalCodec,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TaskStore>,
        bus: Arc<dyn NotificationBus>,
        config: &PlannerConfig,
    ) -> Self {
        let codec = config.codec();
        let cache = Arc::new(QueryCache::new(Arc::clone(&store), config.stale_time));
        let mutations = Arc::new(MutationCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            bus,
            codec,
        ));

        Self {
            store,
            cache,
            mutations,
            codec,
        }
    }

    /// Client state talking to the remote store over HTTP.
    pub fn connect(config: &PlannerConfig, bus: Arc<dyn NotificationBus>) -> Result<Self, PlannerError> {
        let store: Arc<dyn TaskStore> = Arc::new(HttpTaskStore::new(config.store.clone())?);
        Ok(Self::new(store, bus, config))
    }
}
