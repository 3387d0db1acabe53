use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::mandate::PaymentMandate;
use crate::domain::message::Message;
use crate::domain::response::AgentResponse;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The specialists a turn can be dispatched to. The router only ever selects
/// the first four; retention is reachable through explicit dispatch only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialist {
    Concierge,
    Support,
    Researcher,
    Transactional,
    Retention,
}

impl Specialist {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concierge => "concierge",
            Self::Support => "support",
            Self::Researcher => "researcher",
            Self::Transactional => "transactional",
            Self::Retention => "retention",
        }
    }
}

/// Per-turn routing output. Never persisted past the turn that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub next_node: Specialist,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionKind {
    ConfirmationRequest,
}

/// A handler-raised pause: the run halts, the payload goes back to the caller,
/// and the next inbound message resumes the raising specialist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuspensionRequest {
    pub kind: SuspensionKind,
    pub raised_by: Specialist,
    pub mandate: PaymentMandate,
    pub query: String,
}

/// The conversation record threaded through every step of a run, and the unit
/// the checkpoint store persists between runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: SessionId,
    messages: Vec<Message>,
    pub pending_route: Option<Specialist>,
    pub final_response: Option<AgentResponse>,
    suspension: Option<SuspensionRequest>,
}

impl SessionState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
            pending_route: None,
            final_response: None,
            suspension: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn latest_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The log is append-only; nothing outside [`SessionState::clear`] can
    /// shrink it.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn suspension(&self) -> Option<&SuspensionRequest> {
        self.suspension.as_ref()
    }

    /// Record a handler-raised pause. A session carries at most one
    /// outstanding suspension at a time.
    pub fn begin_suspension(&mut self, request: SuspensionRequest) -> Result<(), DomainError> {
        if self.suspension.is_some() {
            return Err(DomainError::SuspensionAlreadyPending {
                session_id: self.session_id.0.clone(),
            });
        }
        self.suspension = Some(request);
        Ok(())
    }

    /// Consume the pending suspension for resume; the caller becomes
    /// responsible for finishing the paused handler.
    pub fn take_suspension(&mut self) -> Option<SuspensionRequest> {
        self.suspension.take()
    }

    /// Reset the conversation while keeping the session id. Idempotent.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.pending_route = None;
        self.final_response = None;
        self.suspension = None;
    }
}
