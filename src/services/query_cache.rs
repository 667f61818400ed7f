use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::PlannerError;
use crate::models::{Task, TaskId, display_order};
use crate::store::TaskStore;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

type PendingFetch = Shared<BoxFuture<'static, Result<Arc<Vec<Task>>, PlannerError>>>;

/// Snapshot of the cached task collection.
#[derive(Debug, Clone)]
pub struct CacheView {
    pub tasks: Arc<Vec<Task>>,
    pub is_stale: bool,
}

impl CacheView {
    pub fn sorted(&self) -> Vec<Task> {
        display_order(&self.tasks)
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }
}

struct CacheEntry {
    tasks: Arc<Vec<Task>>,
    fetched_at: Instant,
}

struct InFlight {
    id: u64,
    // Invalidation epoch the fetch was started in.
    epoch: u64,
    fetch: PendingFetch,
}

#[derive(Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    invalidated: bool,
    epoch: u64,
    next_fetch_id: u64,
    in_flight: Option<InFlight>,
}

/// Last fetched task collection with a staleness window.
///
/// At most one list fetch runs at a time; concurrent readers await the same
/// fetch. A reader that arrives after an invalidation never settles for a
/// fetch that started before it.
pub struct QueryCache {
    store: Arc<dyn TaskStore>,
    stale_time: Duration,
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new(store: Arc<dyn TaskStore>, stale_time: Duration) -> Self {
        Self {
            store,
            stale_time,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_fresh(&self, state: &CacheState) -> bool {
        match &state.entry {
            Some(entry) => !state.invalidated && entry.fetched_at.elapsed() < self.stale_time,
            None => false,
        }
    }

    /// Cached collection without triggering a fetch.
    pub fn peek(&self) -> Option<CacheView> {
        let state = self.lock();
        let is_stale = !self.is_fresh(&state);
        state.entry.as_ref().map(|entry| CacheView {
            tasks: Arc::clone(&entry.tasks),
            is_stale,
        })
    }

    /// Marks the cached collection stale; the next [`get`](Self::get) refetches.
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.invalidated = true;
        state.epoch += 1;
        info!("task cache invalidated (epoch {})", state.epoch);
    }

    pub async fn get(&self) -> Result<CacheView, PlannerError> {
        let wanted_epoch = self.lock().epoch;

        loop {
            let (fetch_id, fetch_epoch, fetch) = {
                let mut state = self.lock();
                if self.is_fresh(&state) {
                    if let Some(entry) = &state.entry {
                        return Ok(CacheView {
                            tasks: Arc::clone(&entry.tasks),
                            is_stale: false,
                        });
                    }
                }

                match &state.in_flight {
                    Some(in_flight) => {
                        debug!("joining in-flight task fetch {}", in_flight.id);
                        (in_flight.id, in_flight.epoch, in_flight.fetch.clone())
                    }
                    None => {
                        let in_flight = InFlight {
                            id: state.next_fetch_id,
                            epoch: state.epoch,
                            fetch: self.start_fetch(),
                        };
                        state.next_fetch_id += 1;
                        debug!("starting task fetch {}", in_flight.id);
                        let handle = (in_flight.id, in_flight.epoch, in_flight.fetch.clone());
                        state.in_flight = Some(in_flight);
                        handle
                    }
                }
            };

            let result = fetch.await;
            let mut state = self.lock();

            if state.in_flight.as_ref().map(|f| f.id) == Some(fetch_id) {
                state.in_flight = None;
                if let Ok(tasks) = &result {
                    state.entry = Some(CacheEntry {
                        tasks: Arc::clone(tasks),
                        fetched_at: Instant::now(),
                    });
                    state.invalidated = state.epoch != fetch_epoch;
                    info!("task cache refreshed with {} tasks", tasks.len());
                }
            }

            match result {
                Ok(_) if fetch_epoch < wanted_epoch => {
                    debug!("fetch {} predates invalidation, refetching", fetch_id);
                    continue;
                }
                Ok(tasks) => {
                    return Ok(CacheView {
                        tasks,
                        is_stale: false,
                    });
                }
                Err(err) => {
                    return match &state.entry {
                        Some(entry) => {
                            warn!("task fetch failed, serving stale data: {}", err);
                            Ok(CacheView {
                                tasks: Arc::clone(&entry.tasks),
                                is_stale: true,
                            })
                        }
                        None => {
                            warn!("task fetch failed with nothing cached: {}", err);
                            Err(err)
                        }
                    };
                }
            }
        }
    }

    fn start_fetch(&self) -> PendingFetch {
        let store = Arc::clone(&self.store);
        async move { store.list_tasks().await.map(Arc::new) }
            .boxed()
            .shared()
    }
}
