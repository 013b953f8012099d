use std::{
    collections::HashSet,
    sync::{Arc, Mutex as StdMutex, PoisonError},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{SortField, UserId, UserRecord},
    protocol::DirectoryOperation,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

pub mod classification;
pub mod config;
pub mod error;
pub mod roster;
pub mod transport;
pub mod view;

pub use classification::ClassificationSet;
pub use config::{EngineSettings, PageOverflow};
pub use error::{SettingsError, TransportError, TransportFailure};
pub use roster::RosterStore;
pub use transport::HttpUserDirectory;
pub use view::{ViewFilterState, ViewPage};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The remote user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserRecord>, TransportError>;
    async fn like_user(&self, user_id: &UserId) -> Result<(), TransportError>;
    async fn dislike_user(&self, user_id: &UserId) -> Result<(), TransportError>;
}

pub struct MissingUserDirectory;

#[async_trait]
impl UserDirectory for MissingUserDirectory {
    async fn list_users(&self) -> Result<Vec<UserRecord>, TransportError> {
        Err(TransportError::unavailable(DirectoryOperation::ListUsers))
    }

    async fn like_user(&self, user_id: &UserId) -> Result<(), TransportError> {
        Err(TransportError::unavailable(DirectoryOperation::LikeUser {
            user_id: user_id.clone(),
        }))
    }

    async fn dislike_user(&self, user_id: &UserId) -> Result<(), TransportError> {
        Err(TransportError::unavailable(DirectoryOperation::DislikeUser {
            user_id: user_id.clone(),
        }))
    }
}

/// Published after every state mutation; subscribers call
/// [`RosterEngine::view`] to recompute what they display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RosterRefreshed {
        user_count: usize,
        pruned: Vec<UserId>,
    },
    ClassificationChanged {
        user_id: UserId,
        liked: bool,
    },
    FilterChanged,
    RequestFailed {
        operation: DirectoryOperation,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// The identifier is not in the current roster.
    UnknownUser,
    /// Another like/dislike for the same identifier has not resolved yet.
    InFlight,
    /// The remote call succeeded but the user vanished from the roster meanwhile.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub page: ViewPage,
    pub liked: Vec<UserRecord>,
    pub filter: ViewFilterState,
    pub refreshed_at: Option<DateTime<Utc>>,
}

struct EngineState {
    roster: RosterStore,
    liked: ClassificationSet,
    filter: ViewFilterState,
    issued_fetches: u64,
}

/// Owns the roster, the liked set and the view filter, and is the only writer
/// of the first two.
pub struct RosterEngine {
    directory: Arc<dyn UserDirectory>,
    settings: EngineSettings,
    inner: Mutex<EngineState>,
    inflight: Arc<StdMutex<HashSet<UserId>>>,
    events: broadcast::Sender<EngineEvent>,
}

/// Holds an identifier in the in-flight set until dropped.
struct InFlightGuard {
    set: Arc<StdMutex<HashSet<UserId>>>,
    user_id: UserId,
}

impl InFlightGuard {
    fn acquire(set: &Arc<StdMutex<HashSet<UserId>>>, user_id: &UserId) -> Option<Self> {
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(user_id.clone()) {
            return None;
        }
        Some(Self {
            set: Arc::clone(set),
            user_id: user_id.clone(),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

impl RosterEngine {
    pub fn new(directory: Arc<dyn UserDirectory>, settings: EngineSettings) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            directory,
            settings,
            inner: Mutex::new(EngineState {
                roster: RosterStore::default(),
                liked: ClassificationSet::default(),
                filter: ViewFilterState::default(),
                issued_fetches: 0,
            }),
            inflight: Arc::new(StdMutex::new(HashSet::new())),
            events,
        })
    }

    pub fn from_settings(settings: EngineSettings) -> Result<Arc<Self>, SettingsError> {
        let directory = HttpUserDirectory::from_settings(&settings)?;
        Ok(Self::new(Arc::new(directory), settings))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    fn report_failure(&self, err: &TransportError) {
        self.emit(EngineEvent::RequestFailed {
            operation: err.operation.clone(),
            message: err.failure.to_string(),
        });
    }

    /// Replaces the roster with the directory's current list. On failure the
    /// previous roster is kept. Returns the number of users now held.
    pub async fn fetch_all(&self) -> Result<usize, TransportError> {
        let fetch_seq = {
            let mut guard = self.inner.lock().await;
            guard.issued_fetches += 1;
            guard.issued_fetches
        };
        debug!("roster: fetching users seq={fetch_seq}");

        let records = match self.directory.list_users().await {
            Ok(records) => records,
            Err(err) => {
                warn!("roster: fetch failed seq={fetch_seq} error={err}");
                self.report_failure(&err);
                return Err(err);
            }
        };

        let (user_count, pruned) = {
            let mut guard = self.inner.lock().await;
            if !guard.roster.replace(fetch_seq, records) {
                debug!("roster: discarding stale fetch seq={fetch_seq}");
                return Ok(guard.roster.len());
            }
            let pruned = if self.settings.prune_stale_likes {
                let state = &mut *guard;
                state.liked.retain_present(&state.roster)
            } else {
                Vec::new()
            };
            (guard.roster.len(), pruned)
        };

        if !pruned.is_empty() {
            info!("classification: pruned {} stale liked users", pruned.len());
        }
        info!("roster: refreshed users={user_count} seq={fetch_seq}");
        self.emit(EngineEvent::RosterRefreshed { user_count, pruned });
        Ok(user_count)
    }

    /// Likes a user present in the current roster, then refreshes the roster.
    pub async fn like(&self, user_id: &UserId) -> Result<ActionOutcome, TransportError> {
        if !self.inner.lock().await.roster.contains(user_id) {
            debug!("action: like ignored for unknown user id={user_id}");
            return Ok(ActionOutcome::UnknownUser);
        }
        let Some(_inflight) = InFlightGuard::acquire(&self.inflight, user_id) else {
            debug!("action: like ignored, request in flight id={user_id}");
            return Ok(ActionOutcome::InFlight);
        };

        info!("action: like id={user_id}");
        if let Err(err) = self.directory.like_user(user_id).await {
            warn!("action: like failed id={user_id} error={err}");
            self.report_failure(&err);
            return Err(err);
        }

        // The roster may have been refreshed while the request was pending.
        let outcome = {
            let mut guard = self.inner.lock().await;
            match guard.roster.get(user_id).cloned() {
                Some(record) => {
                    guard.liked.add(record);
                    ActionOutcome::Applied
                }
                None => ActionOutcome::Discarded,
            }
        };
        if outcome == ActionOutcome::Applied {
            self.emit(EngineEvent::ClassificationChanged {
                user_id: user_id.clone(),
                liked: true,
            });
        } else {
            debug!("action: like for vanished user discarded id={user_id}");
        }

        self.fetch_all().await?;
        Ok(outcome)
    }

    /// Dislikes a user, then refreshes the roster.
    pub async fn dislike(&self, user_id: &UserId) -> Result<ActionOutcome, TransportError> {
        let Some(_inflight) = InFlightGuard::acquire(&self.inflight, user_id) else {
            debug!("action: dislike ignored, request in flight id={user_id}");
            return Ok(ActionOutcome::InFlight);
        };

        info!("action: dislike id={user_id}");
        if let Err(err) = self.directory.dislike_user(user_id).await {
            warn!("action: dislike failed id={user_id} error={err}");
            self.report_failure(&err);
            return Err(err);
        }

        let removed = self.inner.lock().await.liked.remove(user_id);
        if removed {
            self.emit(EngineEvent::ClassificationChanged {
                user_id: user_id.clone(),
                liked: false,
            });
        }

        self.fetch_all().await?;
        Ok(ActionOutcome::Applied)
    }

    pub async fn set_query(&self, query: impl Into<String>) {
        {
            let mut guard = self.inner.lock().await;
            guard.filter.set_query(query);
            if self.settings.reset_page_on_change {
                guard.filter.set_page(1);
            }
        }
        self.emit(EngineEvent::FilterChanged);
    }

    pub async fn toggle_sort(&self, field: SortField) {
        {
            let mut guard = self.inner.lock().await;
            guard.filter.toggle_sort(field);
            if self.settings.reset_page_on_change {
                guard.filter.set_page(1);
            }
        }
        self.emit(EngineEvent::FilterChanged);
    }

    pub async fn set_page(&self, page: usize) {
        self.inner.lock().await.filter.set_page(page);
        self.emit(EngineEvent::FilterChanged);
    }

    pub async fn filter_state(&self) -> ViewFilterState {
        self.inner.lock().await.filter.clone()
    }

    pub async fn is_liked(&self, user_id: &UserId) -> bool {
        self.inner.lock().await.liked.contains(user_id)
    }

    pub async fn liked_users(&self) -> Vec<UserRecord> {
        self.inner.lock().await.liked.records().cloned().collect()
    }

    pub async fn roster(&self) -> Vec<UserRecord> {
        self.inner.lock().await.roster.records().to_vec()
    }

    /// Recomputes the displayed page and liked list from current state.
    pub async fn view(&self) -> DashboardView {
        let guard = self.inner.lock().await;
        let page = view::derive_page(
            guard.roster.records(),
            &guard.liked,
            &guard.filter,
            self.settings.page_size,
            self.settings.page_overflow,
        );
        DashboardView {
            page,
            liked: guard.liked.records().cloned().collect(),
            filter: guard.filter.clone(),
            refreshed_at: guard.roster.refreshed_at(),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
