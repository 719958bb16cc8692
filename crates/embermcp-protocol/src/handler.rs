//! The carrier-facing dispatch seam
//!
//! Carriers deliver raw message bytes to a [`MessageHandler`] and emit
//! whatever reply it produces. The handler always yields a
//! [`DispatchOutcome`]; the carrier decides how to put it on the wire (a
//! stdio carrier writes the reply line, an HTTP carrier turns a missing
//! reply into `202 Accepted`). There is no sentinel for "reply later".

use async_trait::async_trait;

/// Per-message context handed from the carrier to the dispatcher
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Carrier-assigned connection identifier
    pub connection_id: Option<String>,
    /// Session identifier recovered from the carrier (HTTP header)
    pub session_id: Option<String>,
}

impl RequestContext {
    /// Context for a named connection
    pub fn for_connection(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: Some(connection_id.into()),
            session_id: None,
        }
    }

    /// Attach a session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// The result of dispatching one inbound message
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Serialized reply to put on the wire, absent for notifications
    pub reply: Option<String>,
    /// Session the message was attributed to, for carriers that surface
    /// session identifiers to the client
    pub session_id: Option<String>,
}

impl DispatchOutcome {
    /// An outcome with a reply
    pub fn reply(reply: String) -> Self {
        Self {
            reply: Some(reply),
            session_id: None,
        }
    }

    /// An outcome with no reply (notification)
    pub fn none() -> Self {
        Self::default()
    }

    /// Attach a session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Something that consumes raw inbound messages and produces replies.
///
/// Implemented by the server's request dispatcher; consumed by carriers.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle one raw wire message.
    ///
    /// Never fails: protocol and application errors become error responses
    /// inside the outcome, carrier-level errors are the carrier's problem.
    async fn handle_message(&self, raw: &str, ctx: RequestContext) -> DispatchOutcome;
}
