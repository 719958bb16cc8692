//! Session management
//!
//! Sessions correlate a client across successive carrier-level connections
//! (the HTTP carrier keys them off the `Mcp-Session-Id` header). The
//! manager owns the live set behind a readers/writer lock: lookups take
//! shared access, membership changes take exclusive access, and per-session
//! mutable fields sit behind a per-session mutex so they are never touched
//! while the live-set lock is held in shared mode.
//!
//! Handles are `Arc<Session>`: the manager holds one count on every entry
//! it owns and `find` hands out another, so an entry removed from the live
//! set survives until the last outside holder drops it. Unlinking happens
//! under the write lock, destruction never does.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clock::SharedClock;
use crate::config::SessionConfig;
use crate::error::{ServerError, ServerResult};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Freshly created, no handshake seen
    Created,
    /// Initialize in flight
    Initializing,
    /// Handshake complete, serving traffic
    Active,
    /// Parked by the embedder
    Inactive,
    /// Passed its expiry time
    Expired,
    /// Removed; terminal
    Terminated,
}

impl SessionState {
    /// Human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initializing => "initializing",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    last_activity_ms: u64,
    expires_at_ms: u64,
    protocol_version: Option<String>,
    client_name: Option<String>,
    client_version: Option<String>,
}

/// One client session.
///
/// Immutable identity plus a mutex-guarded mutable record. All timestamps
/// are milliseconds since the Unix epoch as read from the injected clock.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at_ms: u64,
    timeout_ms: u64,
    inner: Mutex<SessionInner>,
}

impl Session {
    fn new(id: String, now_ms: u64, timeout_ms: u64) -> Self {
        Self {
            id,
            created_at_ms: now_ms,
            timeout_ms,
            inner: Mutex::new(SessionInner {
                state: SessionState::Created,
                last_activity_ms: now_ms,
                expires_at_ms: now_ms + timeout_ms,
                protocol_version: None,
                client_name: None,
                client_version: None,
            }),
        }
    }

    /// The session id (canonical dashed UUID-4 form)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation timestamp in epoch milliseconds
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Whether the session is actively serving traffic
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Whether the session has passed its expiry
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.inner.lock().expires_at_ms
    }

    /// Last-activity timestamp in epoch milliseconds
    pub fn last_activity_ms(&self) -> u64 {
        self.inner.lock().last_activity_ms
    }

    /// Expiry timestamp in epoch milliseconds
    pub fn expires_at_ms(&self) -> u64 {
        self.inner.lock().expires_at_ms
    }

    /// Negotiated protocol version, once initialized
    pub fn protocol_version(&self) -> Option<String> {
        self.inner.lock().protocol_version.clone()
    }

    /// Client name, once initialized
    pub fn client_name(&self) -> Option<String> {
        self.inner.lock().client_name.clone()
    }

    /// Client version, once initialized
    pub fn client_version(&self) -> Option<String> {
        self.inner.lock().client_version.clone()
    }

    /// Record activity: last-activity never moves backwards, and expiry is
    /// pushed out to `last_activity + timeout`.
    pub fn touch(&self, now_ms: u64) {
        let mut inner = self.inner.lock();
        if now_ms > inner.last_activity_ms {
            inner.last_activity_ms = now_ms;
        }
        inner.expires_at_ms = inner.last_activity_ms + self.timeout_ms;
    }

    /// Complete the handshake: record the negotiated version and client
    /// identity and move to the active state.
    pub fn initialize(
        &self,
        protocol_version: &str,
        client_name: Option<&str>,
        client_version: Option<&str>,
        now_ms: u64,
    ) -> ServerResult<()> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Created {
            return Err(ServerError::Internal(format!(
                "session {} initialized twice",
                self.id
            )));
        }
        inner.state = SessionState::Initializing;
        inner.protocol_version = Some(protocol_version.to_string());
        inner.client_name = client_name.map(str::to_string);
        inner.client_version = client_version.map(str::to_string);
        inner.state = SessionState::Active;
        if now_ms > inner.last_activity_ms {
            inner.last_activity_ms = now_ms;
        }
        inner.expires_at_ms = inner.last_activity_ms + self.timeout_ms;
        Ok(())
    }

    /// Park the session
    pub fn deactivate(&self) {
        self.inner.lock().state = SessionState::Inactive;
    }

    fn mark(&self, state: SessionState) {
        self.inner.lock().state = state;
    }
}

/// Generate a fresh session id in canonical dashed UUID-4 form
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Validate the `8-4-4-4-12` dashed-hex session id shape
pub fn validate_session_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if *b != b'-' {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    true
}

struct Reaper {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owner of the session live set.
///
/// Bounded capacity, refcounted handles, and a periodic reaper task that
/// removes expired entries.
pub struct SessionManager {
    config: SessionConfig,
    clock: SharedClock,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    created_total: AtomicU64,
    expired_total: AtomicU64,
    terminated_total: AtomicU64,
    reaper: Mutex<Option<Reaper>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("live", &self.sessions.read().len())
            .finish()
    }
}

impl SessionManager {
    /// Create a manager with the given settings and clock
    pub fn new(config: SessionConfig, clock: SharedClock) -> Arc<Self> {
        info!(max_sessions = config.max_sessions, "session manager created");
        Arc::new(Self {
            config,
            clock,
            sessions: RwLock::new(HashMap::new()),
            created_total: AtomicU64::new(0),
            expired_total: AtomicU64::new(0),
            terminated_total: AtomicU64::new(0),
            reaper: Mutex::new(None),
        })
    }

    /// Create a session, minting a fresh id unless one is suggested.
    ///
    /// A suggested id must be a valid UUID-4 string and must not collide
    /// with a live session. Fails with `SessionLimit` at capacity.
    pub fn create(&self, suggested_id: Option<&str>) -> ServerResult<Arc<Session>> {
        let id = match suggested_id {
            Some(id) => {
                if !validate_session_id(id) {
                    return Err(ServerError::InvalidSessionId(format!(
                        "'{id}' is not a canonical UUID"
                    )));
                }
                id.to_string()
            }
            None => generate_session_id(),
        };

        let now_ms = self.clock.now_millis();
        let session = Arc::new(Session::new(
            id.clone(),
            now_ms,
            self.config.session_timeout_secs * 1_000,
        ));

        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            return Err(ServerError::InvalidSessionId(format!(
                "session '{id}' already exists"
            )));
        }
        if sessions.len() >= self.config.max_sessions {
            warn!(limit = self.config.max_sessions, "session limit reached");
            return Err(ServerError::SessionLimit(sessions.len()));
        }
        sessions.insert(id.clone(), Arc::clone(&session));
        drop(sessions);

        self.created_total.fetch_add(1, Ordering::Relaxed);
        info!(session_id = %id, "session created");
        Ok(session)
    }

    /// Look up a live session, returning a counted handle
    pub fn find(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session, terminating it outside the live-set lock
    pub fn remove(&self, id: &str) -> ServerResult<()> {
        let removed = self.sessions.write().remove(id);
        match removed {
            Some(session) => {
                session.mark(SessionState::Terminated);
                self.terminated_total.fetch_add(1, Ordering::Relaxed);
                info!(session_id = %id, "session removed");
                Ok(())
            }
            None => Err(ServerError::SessionNotFound(id.to_string())),
        }
    }

    /// Remove every session whose expiry has passed. Returns the number of
    /// sessions reaped.
    pub fn cleanup_expired(&self) -> usize {
        let now_ms = self.clock.now_millis();

        let mut sessions = self.sessions.write();
        let expired: Vec<Arc<Session>> = {
            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| s.is_expired(now_ms))
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id))
                .collect()
        };
        drop(sessions);

        // Terminate after unlinking, never under the lock.
        for session in &expired {
            session.mark(SessionState::Expired);
            session.mark(SessionState::Terminated);
            self.expired_total.fetch_add(1, Ordering::Relaxed);
            info!(session_id = %session.id(), "session expired and cleaned");
        }
        expired.len()
    }

    /// Number of live sessions in the active state
    pub fn active_count(&self) -> usize {
        self.sessions.read().values().filter(|s| s.is_active()).count()
    }

    /// Number of live sessions
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Sessions created since startup
    pub fn created_total(&self) -> u64 {
        self.created_total.load(Ordering::Relaxed)
    }

    /// Sessions reaped as expired since startup
    pub fn expired_total(&self) -> u64 {
        self.expired_total.load(Ordering::Relaxed)
    }

    /// Sessions explicitly removed since startup
    pub fn terminated_total(&self) -> u64 {
        self.terminated_total.load(Ordering::Relaxed)
    }

    /// Start the reaper task if auto-cleanup is enabled. Idempotent.
    pub fn start(self: &Arc<Self>) {
        if !self.config.auto_cleanup {
            return;
        }
        let mut slot = self.reaper.lock();
        if slot.is_some() {
            return;
        }

        let (stop, mut stopped) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = Duration::from_secs(self.config.cleanup_interval_secs);
        let task = tokio::spawn(async move {
            debug!("session reaper started");
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    _ = tokio::time::sleep(interval) => {
                        let cleaned = manager.cleanup_expired();
                        if cleaned > 0 {
                            info!(cleaned, "reaper removed expired sessions");
                        }
                    }
                }
            }
            debug!("session reaper stopped");
        });
        *slot = Some(Reaper { stop, task });
    }

    /// Stop the reaper task and wait for it to exit. Idempotent.
    pub async fn stop(&self) {
        let reaper = self.reaper.lock().take();
        if let Some(reaper) = reaper {
            let _ = reaper.stop.send(true);
            let _ = reaper.task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};

    fn manager_with(
        max_sessions: usize,
        timeout_secs: u64,
    ) -> (Arc<SessionManager>, Arc<ManualClock>) {
        let clock = ManualClock::starting_at_millis(10_000);
        let config = SessionConfig {
            max_sessions,
            session_timeout_secs: timeout_secs,
            cleanup_interval_secs: 1,
            auto_cleanup: false,
        };
        (
            SessionManager::new(config, clock.clone() as SharedClock),
            clock,
        )
    }

    #[test]
    fn id_generation_and_validation() {
        let id = generate_session_id();
        assert_eq!(id.len(), 36);
        assert!(validate_session_id(&id));

        assert!(validate_session_id("123e4567-e89b-42d3-a456-426614174000"));
        assert!(validate_session_id("123E4567-E89B-42D3-A456-426614174000"));
        assert!(!validate_session_id("123e4567e89b42d3a456426614174000"));
        assert!(!validate_session_id("123e4567-e89b-42d3-a456-42661417400g"));
        assert!(!validate_session_id("short"));
    }

    #[test]
    fn create_find_remove() {
        let (manager, _clock) = manager_with(4, 60);
        let session = manager.create(None).unwrap();
        assert_eq!(session.state(), SessionState::Created);
        assert_eq!(manager.count(), 1);

        let found = manager.find(session.id()).unwrap();
        assert_eq!(found.id(), session.id());
        assert!(manager.find("123e4567-e89b-42d3-a456-426614174000").is_none());

        manager.remove(session.id()).unwrap();
        assert_eq!(manager.count(), 0);
        assert!(matches!(
            manager.remove(session.id()),
            Err(ServerError::SessionNotFound(_))
        ));
        // The outside handle is still usable after removal.
        assert_eq!(found.state(), SessionState::Terminated);
        assert_eq!(manager.terminated_total(), 1);
    }

    #[test]
    fn suggested_ids_are_validated_and_deduplicated() {
        let (manager, _clock) = manager_with(4, 60);
        let id = "123e4567-e89b-42d3-a456-426614174000";
        manager.create(Some(id)).unwrap();
        assert!(matches!(
            manager.create(Some(id)),
            Err(ServerError::InvalidSessionId(_))
        ));
        assert!(matches!(
            manager.create(Some("not-a-uuid")),
            Err(ServerError::InvalidSessionId(_))
        ));
    }

    #[test]
    fn capacity_is_enforced() {
        let (manager, _clock) = manager_with(2, 60);
        manager.create(None).unwrap();
        manager.create(None).unwrap();
        assert!(matches!(
            manager.create(None),
            Err(ServerError::SessionLimit(2))
        ));
        assert_eq!(manager.count(), 2);
    }

    #[test]
    fn touch_extends_expiry_and_never_regresses_activity() {
        let (manager, clock) = manager_with(4, 1);
        let session = manager.create(None).unwrap();
        assert_eq!(session.expires_at_ms(), 11_000);

        clock.advance_millis(500);
        session.touch(clock.now_millis());
        assert_eq!(session.last_activity_ms(), 10_500);
        assert_eq!(session.expires_at_ms(), 11_500);

        // A stale timestamp cannot move activity backwards.
        session.touch(10_000);
        assert_eq!(session.last_activity_ms(), 10_500);
    }

    #[test]
    fn lifecycle_touch_then_expire() {
        // Create with a 1 s timeout, touch at t+0.5 s, wait until t+2.5 s:
        // the session must be reaped and the active count must drop to zero.
        let (manager, clock) = manager_with(4, 1);
        let session = manager.create(None).unwrap();
        session
            .initialize("2025-03-26", Some("t"), Some("0"), clock.now_millis())
            .unwrap();
        assert_eq!(manager.active_count(), 1);

        clock.advance_millis(500);
        session.touch(clock.now_millis());
        clock.advance_millis(2_000);

        let cleaned = manager.cleanup_expired();
        assert_eq!(cleaned, 1);
        assert_eq!(manager.count(), 0);
        assert_eq!(manager.active_count(), 0);
        assert_eq!(manager.expired_total(), 1);

        // Invariant: nothing live expired before the cleanup pass began.
        let now = clock.now_millis();
        assert!(
            manager.find(session.id()).is_none()
                || session.expires_at_ms() >= now
        );
    }

    #[test]
    fn cleanup_leaves_fresh_sessions_alone() {
        let (manager, clock) = manager_with(4, 10);
        let stale = manager.create(None).unwrap();
        clock.advance_millis(11_000);
        let fresh = manager.create(None).unwrap();

        assert_eq!(manager.cleanup_expired(), 1);
        assert!(manager.find(stale.id()).is_none());
        assert!(manager.find(fresh.id()).is_some());
    }

    #[test]
    fn initialize_records_client_identity() {
        let (manager, clock) = manager_with(4, 60);
        let session = manager.create(None).unwrap();
        session
            .initialize("2025-03-26", Some("t"), Some("0.1"), clock.now_millis())
            .unwrap();
        assert!(session.is_active());
        assert_eq!(session.protocol_version().as_deref(), Some("2025-03-26"));
        assert_eq!(session.client_name().as_deref(), Some("t"));
        assert_eq!(session.client_version().as_deref(), Some("0.1"));
        assert!(session.initialize("2025-03-26", None, None, 0).is_err());
    }

    #[tokio::test]
    async fn reaper_runs_and_stops() {
        let clock = ManualClock::starting_at_millis(0);
        let config = SessionConfig {
            max_sessions: 4,
            session_timeout_secs: 0,
            cleanup_interval_secs: 0, // fire as fast as possible
            auto_cleanup: true,
        };
        let manager = SessionManager::new(config, clock.clone() as SharedClock);
        manager.create(None).unwrap();
        clock.advance_millis(1);

        manager.start();
        manager.start(); // idempotent
        for _ in 0..100 {
            if manager.count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(manager.count(), 0);
        manager.stop().await;
        manager.stop().await; // idempotent
    }
}
