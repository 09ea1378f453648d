// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::types::{PatientProfile, Panel};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Single profile slot. Empty until the first save; each save replaces the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStore {
    saved: Option<PatientProfile>,
}

impl ProfileStore {
    pub fn save(&mut self, profile: PatientProfile) {
        self.saved = Some(profile);
    }

    /// The saved profile, or the form defaults if nothing was saved yet.
    pub fn get(&self) -> PatientProfile {
        self.saved.clone().unwrap_or_default()
    }

    pub fn saved(&self) -> Option<&PatientProfile> {
        self.saved.as_ref()
    }

    pub fn is_populated(&self) -> bool {
        self.saved.is_some()
    }
}

/// Everything remembered for one browser between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub profile: ProfileStore,
    pub panel: Panel,
    /// Metric last picked on the analytics panel
    pub metric: Option<String>,
    /// Last text entered on the active panel, so the form can be re-filled
    pub input: String,
}

/// Idle time after which a session is forgotten.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

struct Entry {
    session: Arc<Mutex<Session>>,
    last_seen: Instant,
}

/// A session opened for one request.
///
/// Holding its lock serializes the events of one browser; other sessions are
/// unaffected. A fresh handle is not in the store until [`SessionStore::keep`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: Uuid,
    session: Arc<Mutex<Session>>,
    known: bool,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the store holds this session, i.e. its cookie is worth sending.
    pub fn is_known(&self) -> bool {
        self.known
    }

    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}

/// In-memory sessions keyed by the session cookie.
///
/// Sessions are only registered once they hold something, and are dropped
/// after `idle` without a request.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_IDLE)
    }
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle,
        }
    }

    /// Open the session for `id`, or a fresh unregistered one under a new id.
    pub async fn open(&self, id: Option<Uuid>) -> SessionHandle {
        if let Some(id) = id {
            let mut sessions = self.sessions.write().await;
            let live = sessions
                .get(&id)
                .map(|entry| entry.last_seen.elapsed() < self.idle);
            match live {
                Some(true) => {
                    if let Some(entry) = sessions.get_mut(&id) {
                        entry.last_seen = Instant::now();
                        debug!("Resuming session {id}");
                        return SessionHandle {
                            id,
                            session: entry.session.clone(),
                            known: true,
                        };
                    }
                }
                Some(false) => {
                    sessions.remove(&id);
                    info!("Session {id} expired");
                }
                None => {}
            }
        }
        SessionHandle {
            id: Uuid::new_v4(),
            session: Arc::new(Mutex::new(Session::default())),
            known: false,
        }
    }

    /// Register a fresh session so later requests find it. Idle sessions are
    /// pruned on the way.
    pub async fn keep(&self, handle: &mut SessionHandle) {
        if handle.known {
            return;
        }
        let mut sessions = self.sessions.write().await;
        let idle = self.idle;
        sessions.retain(|_, entry| entry.last_seen.elapsed() < idle);
        sessions.insert(
            handle.id,
            Entry {
                session: handle.session.clone(),
                last_seen: Instant::now(),
            },
        );
        handle.known = true;
        info!("Starting session {}", handle.id);
    }

    /// Drop a session and everything it holds. Returns whether it existed.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Ended session {id}");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::app::Gender;

    fn alex() -> PatientProfile {
        PatientProfile {
            name: "Alex".into(),
            age: 45,
            gender: Gender::Male,
            history: "diabetes".into(),
            medications: "metformin".into(),
            allergies: "none".into(),
        }
    }

    #[test]
    fn empty_store_returns_defaults() {
        let store = ProfileStore::default();
        assert!(!store.is_populated());
        assert_eq!(store.get(), PatientProfile::default());
        assert!(store.saved().is_none());
    }

    #[test]
    fn save_then_get_round_trips() {
        let mut store = ProfileStore::default();
        for age in [0, 1, 64, 119, 120] {
            for gender in Gender::ALL {
                let profile = PatientProfile {
                    age,
                    gender,
                    ..alex()
                };
                store.save(profile.clone());
                assert_eq!(store.get(), profile);
            }
        }
    }

    #[test]
    fn save_replaces_instead_of_merging() {
        let mut store = ProfileStore::default();
        store.save(alex());
        store.save(PatientProfile {
            name: "Sam".into(),
            ..PatientProfile::default()
        });
        let profile = store.get();
        assert_eq!(profile.name, "Sam");
        assert!(profile.history.is_empty());
        assert_eq!(profile.age, 30);
    }

    async fn saved(store: &SessionStore, profile: PatientProfile) -> SessionHandle {
        let mut handle = store.open(None).await;
        handle.lock().await.profile.save(profile);
        store.keep(&mut handle).await;
        handle
    }

    #[tokio::test]
    async fn unknown_session_id_starts_fresh() {
        let store = SessionStore::default();
        let stale = Uuid::new_v4();
        let handle = store.open(Some(stale)).await;
        assert_ne!(handle.id(), stale);
        assert!(!handle.is_known());
        assert_eq!(*handle.lock().await, Session::default());
    }

    #[tokio::test]
    async fn opening_does_not_register() {
        let store = SessionStore::default();
        for _ in 0..50 {
            store.open(None).await;
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::default();
        let a = saved(&store, alex()).await;
        let b = saved(&store, PatientProfile::default()).await;

        let reopened = store.open(Some(a.id())).await;
        assert!(reopened.is_known());
        assert_eq!(reopened.lock().await.profile.get(), alex());
        assert_eq!(store.open(Some(b.id())).await.lock().await.profile.get().name, "");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn handles_share_one_session() {
        let store = SessionStore::default();
        let first = saved(&store, PatientProfile::default()).await;
        let second = store.open(Some(first.id())).await;

        second.lock().await.profile.save(alex());
        assert_eq!(first.lock().await.profile.get(), alex());
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new(Duration::from_millis(20));
        let old = saved(&store, alex()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;

        let reopened = store.open(Some(old.id())).await;
        assert_ne!(reopened.id(), old.id());
        assert!(store.is_empty().await);

        let stale = saved(&store, alex()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        saved(&store, alex()).await;
        assert_eq!(store.len().await, 1);
        assert!(!store.open(Some(stale.id())).await.is_known());
    }

    #[tokio::test]
    async fn ending_a_session_forgets_the_profile() {
        let store = SessionStore::default();
        let handle = saved(&store, alex()).await;

        assert!(store.end(handle.id()).await);
        assert!(!store.end(handle.id()).await);
        assert!(store.is_empty().await);
        let fresh = store.open(Some(handle.id())).await;
        assert!(!fresh.lock().await.profile.is_populated());
    }
}
