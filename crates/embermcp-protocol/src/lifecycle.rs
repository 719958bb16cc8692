//! Protocol lifecycle state machine
//!
//! Tracks which phase of the MCP handshake the connection is in and which
//! inbound messages are admissible. The transition table is closed: both
//! states and events are exhaustive enums, and [`transition`] is a total
//! function over them, so an unhandled combination is a compile error rather
//! than a runtime surprise.
//!
//! Ordinary traffic is admitted only in [`ProtocolState::Ready`]. The
//! built-in `initialize` and `ping` requests bypass the gate because they
//! establish or probe the state.

use std::time::Instant;

/// Protocol lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    /// No initialize request seen yet
    Uninitialized,
    /// Initialize request received, response not yet sent
    Initializing,
    /// Initialize response sent, awaiting the initialized notification
    Initialized,
    /// Fully operational
    Ready,
    /// A fatal protocol error occurred; only re-initialization or shutdown
    Error,
    /// Terminal
    Shutdown,
}

impl ProtocolState {
    /// Human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Ready => "ready",
            Self::Error => "error",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Events that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolEvent {
    /// An `initialize` request arrived
    InitRequest,
    /// The initialize response was emitted
    InitResponse,
    /// The `notifications/initialized` notification arrived
    InitializedNotification,
    /// An ordinary request arrived
    Request,
    /// An ordinary response arrived
    Response,
    /// An ordinary notification arrived
    Notification,
    /// A fatal error occurred
    Error,
    /// Graceful shutdown was requested
    Shutdown,
}

/// The next state for `(state, event)`, or `None` when the transition is
/// illegal (the state is left unchanged and the caller gets a rejection).
pub fn transition(state: ProtocolState, event: ProtocolEvent) -> Option<ProtocolState> {
    use ProtocolEvent as E;
    use ProtocolState as S;

    match (state, event) {
        (S::Uninitialized, E::InitRequest) => Some(S::Initializing),
        (S::Uninitialized, _) => None,

        (S::Initializing, E::InitResponse) => Some(S::Initialized),
        (S::Initializing, E::Error) => Some(S::Error),
        (S::Initializing, _) => None,

        (S::Initialized, E::InitializedNotification) => Some(S::Ready),
        (S::Initialized, E::Error) => Some(S::Error),
        (S::Initialized, _) => None,

        (S::Ready, E::Request | E::Response | E::Notification) => Some(S::Ready),
        (S::Ready, E::Error) => Some(S::Error),
        (S::Ready, E::Shutdown) => Some(S::Shutdown),
        (S::Ready, _) => None,

        (S::Error, E::InitRequest) => Some(S::Initializing),
        (S::Error, E::Shutdown) => Some(S::Shutdown),
        (S::Error, _) => None,

        (S::Shutdown, _) => None,
    }
}

/// A rejected transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event {event:?} is not legal in state {state:?}")]
pub struct TransitionRejected {
    /// The state the machine was in
    pub state: ProtocolState,
    /// The rejected event
    pub event: ProtocolEvent,
}

/// Stateful wrapper around the transition table.
///
/// Records the previous state, when the current state was entered, how many
/// transitions have occurred, and the last error observed.
#[derive(Debug)]
pub struct StateMachine {
    current: ProtocolState,
    previous: ProtocolState,
    entered_at: Instant,
    transitions: u64,
    last_error: Option<(i32, String)>,
}

impl StateMachine {
    /// Create a machine in the uninitialized state
    pub fn new() -> Self {
        Self {
            current: ProtocolState::Uninitialized,
            previous: ProtocolState::Uninitialized,
            entered_at: Instant::now(),
            transitions: 0,
            last_error: None,
        }
    }

    /// Current state
    pub fn state(&self) -> ProtocolState {
        self.current
    }

    /// State before the last transition
    pub fn previous_state(&self) -> ProtocolState {
        self.previous
    }

    /// When the current state was entered
    pub fn entered_at(&self) -> Instant {
        self.entered_at
    }

    /// Number of transitions performed
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    /// Last recorded error, if any
    pub fn last_error(&self) -> Option<&(i32, String)> {
        self.last_error.as_ref()
    }

    /// Whether the given event would be accepted
    pub fn can_apply(&self, event: ProtocolEvent) -> bool {
        transition(self.current, event).is_some()
    }

    /// Apply an event, moving to the next state.
    ///
    /// Illegal transitions leave the state untouched and return
    /// [`TransitionRejected`].
    pub fn apply(&mut self, event: ProtocolEvent) -> Result<ProtocolState, TransitionRejected> {
        match transition(self.current, event) {
            Some(next) => {
                if next != self.current {
                    tracing::debug!(
                        from = self.current.as_str(),
                        to = next.as_str(),
                        event = ?event,
                        "protocol state transition"
                    );
                }
                self.previous = self.current;
                self.current = next;
                self.entered_at = Instant::now();
                self.transitions += 1;
                Ok(next)
            }
            None => Err(TransitionRejected {
                state: self.current,
                event,
            }),
        }
    }

    /// Record an error and drive the machine into the error state when the
    /// current state permits it.
    pub fn record_error(&mut self, code: i32, message: impl Into<String>) {
        self.last_error = Some((code, message.into()));
        let _ = self.apply(ProtocolEvent::Error);
    }

    /// Whether ordinary (non-built-in) traffic is admissible
    pub fn can_handle_requests(&self) -> bool {
        self.current == ProtocolState::Ready
    }

    /// Whether initialization has completed (response sent)
    pub fn is_initialized(&self) -> bool {
        matches!(
            self.current,
            ProtocolState::Initialized | ProtocolState::Ready
        )
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
