use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::{Duration, Instant};

use crate::error::SessionError;
use crate::types::{ActorId, OnTerminal, Presentation, SessionKind, SessionState, SurfaceId, TerminalReason};

/// Mutable part of a session, guarded by the per-session lock.
pub(crate) struct SessionCell<T> {
    pub state: SessionState,
    pub terminal: Option<TerminalReason>,
    pub on_terminal: Option<OnTerminal<T>>,
    pub timer: Option<AbortHandle>,
    /// Bumped on every state change; views are published in this order.
    pub revision: u64,
}

/// One live interaction bound to a surface.
///
/// Everything except the cell is fixed at creation, including the item
/// snapshot, the owner and the deadline.
pub struct Session<T> {
    surface: SurfaceId,
    owner: ActorId,
    kind: SessionKind,
    items: Arc<[T]>,
    presentation: Presentation,
    created_at: Instant,
    deadline: Instant,
    pub(crate) cell: tokio::sync::Mutex<SessionCell<T>>,
    /// Revision of the last view handed to the transport.
    pub(crate) rendered: tokio::sync::Mutex<u64>,
    closed: watch::Sender<bool>,
}

impl<T> Session<T> {
    pub(crate) fn new(
        surface: SurfaceId,
        owner: ActorId,
        kind: SessionKind,
        items: Arc<[T]>,
        ttl: Duration,
        presentation: Presentation,
        state: SessionState,
    ) -> Self {
        let created_at = Instant::now();
        Self {
            surface,
            owner,
            kind,
            items,
            presentation,
            created_at,
            deadline: created_at + ttl,
            cell: tokio::sync::Mutex::new(SessionCell {
                state,
                terminal: None,
                on_terminal: None,
                timer: None,
                revision: 0,
            }),
            rendered: tokio::sync::Mutex::new(0),
            closed: watch::channel(false).0,
        }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn owner(&self) -> &ActorId {
        &self.owner
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub async fn state(&self) -> SessionState {
        self.cell.lock().await.state
    }

    /// Why the session ended, or `None` while it is still live.
    pub async fn terminal_reason(&self) -> Option<TerminalReason> {
        self.cell.lock().await.terminal
    }

    /// Resolves once the session has ended and its final view was published.
    pub async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        // The sender lives as long as self, so this cannot fail.
        let _ = rx.wait_for(|closed| *closed).await;
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.send_replace(true);
    }
}

/// Initial state for a new session over `len` items.
pub(crate) fn initial_state(kind: SessionKind, len: usize) -> SessionState {
    match kind {
        SessionKind::PaginatedList => SessionState::Page(0),
        SessionKind::SingleChoice => SessionState::Pending,
        SessionKind::RerollPick => SessionState::Current(if len == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..len)
        }),
    }
}

/// Process-wide registry of live sessions, one per surface.
pub struct SessionStore<T> {
    sessions: Mutex<HashMap<SurfaceId, Arc<Session<T>>>>,
}

impl<T> Default for SessionStore<T> {
    fn default() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> SessionStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SurfaceId, Arc<Session<T>>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new session on `surface` with the kind's initial state.
    pub fn create(
        &self,
        surface: SurfaceId,
        owner: ActorId,
        kind: SessionKind,
        items: Vec<T>,
        ttl: Duration,
    ) -> Result<Arc<Session<T>>, SessionError> {
        let state = initial_state(kind, items.len());
        self.insert(Session::new(
            surface,
            owner,
            kind,
            items.into(),
            ttl,
            Presentation::default(),
            state,
        ))
    }

    pub(crate) fn insert(&self, session: Session<T>) -> Result<Arc<Session<T>>, SessionError> {
        let mut sessions = self.sessions();
        if sessions.contains_key(&session.surface) {
            return Err(SessionError::DuplicateSession(session.surface));
        }
        let session = Arc::new(session);
        sessions.insert(session.surface, Arc::clone(&session));
        Ok(session)
    }

    pub fn get(&self, surface: SurfaceId) -> Option<Arc<Session<T>>> {
        self.sessions().get(&surface).cloned()
    }

    /// Drop the session on `surface`, if any.
    pub fn remove(&self, surface: SurfaceId) -> Option<Arc<Session<T>>> {
        self.sessions().remove(&surface)
    }

    /// Remove `session` only if it is still the live entry for `surface`.
    pub(crate) fn remove_if_same(&self, surface: SurfaceId, session: &Arc<Session<T>>) -> bool {
        let mut sessions = self.sessions();
        match sessions.get(&surface) {
            Some(live) if Arc::ptr_eq(live, session) => {
                sessions.remove(&surface);
                true
            }
            _ => false,
        }
    }

    /// Whether `session` is still the live entry for `surface`.
    pub fn is_live(&self, surface: SurfaceId, session: &Arc<Session<T>>) -> bool {
        self.sessions()
            .get(&surface)
            .is_some_and(|live| Arc::ptr_eq(live, session))
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();
        let session = store
            .create(SurfaceId(1), ActorId::new("alice"), SessionKind::PaginatedList, items(), Duration::from_secs(60))
            .unwrap();

        let fetched = store.get(SurfaceId(1)).unwrap();
        assert!(Arc::ptr_eq(&session, &fetched));
        assert_eq!(fetched.owner().as_str(), "alice");
        assert_eq!(fetched.items().len(), 3);
        assert_eq!(fetched.state().await, SessionState::Page(0));
        assert_eq!(fetched.deadline() - fetched.created_at(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_duplicate_surface_is_rejected() {
        let store = SessionStore::new();
        store
            .create(SurfaceId(7), ActorId::new("alice"), SessionKind::SingleChoice, items(), Duration::from_secs(60))
            .unwrap();

        let err = store
            .create(SurfaceId(7), ActorId::new("bob"), SessionKind::SingleChoice, items(), Duration::from_secs(60))
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::DuplicateSession(SurfaceId(7))));
        assert_eq!(store.get(SurfaceId(7)).unwrap().owner().as_str(), "alice");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        store
            .create(SurfaceId(3), ActorId::new("alice"), SessionKind::PaginatedList, items(), Duration::from_secs(1))
            .unwrap();

        assert!(store.remove(SurfaceId(3)).is_some());
        assert!(store.remove(SurfaceId(3)).is_none());
        assert!(store.remove(SurfaceId(99)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_if_same_ignores_replacement() {
        let store = SessionStore::new();
        let first = store
            .create(SurfaceId(5), ActorId::new("alice"), SessionKind::PaginatedList, items(), Duration::from_secs(1))
            .unwrap();
        store.remove(SurfaceId(5));
        let second = store
            .create(SurfaceId(5), ActorId::new("alice"), SessionKind::PaginatedList, items(), Duration::from_secs(1))
            .unwrap();

        assert!(!store.is_live(SurfaceId(5), &first));
        assert!(!store.remove_if_same(SurfaceId(5), &first));
        assert!(store.is_live(SurfaceId(5), &second));
        assert!(store.remove_if_same(SurfaceId(5), &second));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reroll_initial_pick_is_in_range() {
        for _ in 0..20 {
            match initial_state(SessionKind::RerollPick, 4) {
                SessionState::Current(i) => assert!(i < 4),
                other => panic!("unexpected state {other:?}"),
            }
        }
        assert_eq!(initial_state(SessionKind::RerollPick, 1), SessionState::Current(0));
    }
}
