//! Session registry mediating between callers and editors.
//!
//! Callers (the HTTP surface, tests, an embedding form host) open editing
//! sessions by id and push single field edits through them. The registry
//! also implements the guard the legacy contract left to its callers: on
//! encode failure the last good canonical value is kept instead of being
//! overwritten with an empty string.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::codec;
use crate::editor::{Edit, Editor, Outcome};
use crate::error::{RecurrenceError, Result};
use crate::rule::{RuleParts, SessionLimits, TerminationMode};

/// Opaque session identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Snapshot of a session after an operation.
#[derive(Debug, Clone, Serialize)]
pub struct EditReply {
    pub id: SessionId,
    /// The current canonical value ("" when no rule has been produced yet).
    pub rule: String,
    pub description: String,
    pub parts: RuleParts,
    pub mode: TerminationMode,
    /// Whether this operation changed the canonical value.
    pub changed: bool,
}

struct Session {
    editor: Editor,
    value: String,
}

/// Registry managing editing session lifecycles.
pub struct SessionRegistry {
    next_id: Mutex<u64>,
    sessions: Mutex<HashMap<u64, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn allocate_id(&self) -> Result<SessionId> {
        let mut next_id = self
            .next_id
            .lock()
            .map_err(|e| RecurrenceError::Lock(e.to_string()))?;
        *next_id += 1;
        Ok(SessionId(*next_id))
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<u64, Session>>> {
        self.sessions
            .lock()
            .map_err(|e| RecurrenceError::Lock(e.to_string()))
    }

    fn reply(id: SessionId, session: &Session, changed: bool) -> EditReply {
        EditReply {
            id,
            rule: session.value.clone(),
            description: codec::describe_or(&session.value, codec::DEFAULT_PLACEHOLDER),
            parts: session.editor.parts().clone(),
            mode: session.editor.mode(),
            changed,
        }
    }

    /// Open an editing session for a canonical value ("" for no rule yet).
    pub fn open(&self, value: &str, limits: SessionLimits) -> Result<EditReply> {
        let id = self.allocate_id()?;
        let session = Session {
            editor: Editor::new(value, limits),
            value: value.trim().to_string(),
        };
        let reply = Self::reply(id, &session, false);
        self.sessions()?.insert(id.0, session);
        info!(id = id.0, "session opened");
        Ok(reply)
    }

    /// Apply one field edit to a session. Encode failures keep the last
    /// good canonical value and report `changed = false`.
    pub fn edit(&self, id: SessionId, edit: Edit) -> Result<EditReply> {
        let mut sessions = self.sessions()?;
        let session = sessions
            .get_mut(&id.0)
            .ok_or(RecurrenceError::UnknownSession(id.0))?;
        match session.editor.apply(edit) {
            Outcome::Emitted { rule } => {
                session.value = rule;
                Ok(Self::reply(id, session, true))
            }
            Outcome::Unchanged => Ok(Self::reply(id, session, false)),
            Outcome::Failed(error) => {
                warn!(id = id.0, %error, "edit rejected, keeping last good value");
                Ok(Self::reply(id, session, false))
            }
        }
    }

    /// External value change: re-derive the session from scratch. Any
    /// in-progress edit is discarded even when the value is unchanged.
    pub fn reset(&self, id: SessionId, value: &str) -> Result<EditReply> {
        let mut sessions = self.sessions()?;
        let session = sessions
            .get_mut(&id.0)
            .ok_or(RecurrenceError::UnknownSession(id.0))?;
        let value = value.trim();
        let changed = session.value != value;
        session.editor.load(value);
        session.value = value.to_string();
        Ok(Self::reply(id, session, changed))
    }

    /// Close a session. Returns whether it existed.
    pub fn close(&self, id: SessionId) -> Result<bool> {
        let existed = self.sessions()?.remove(&id.0).is_some();
        if existed {
            info!(id = id.0, "session closed");
        }
        Ok(existed)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
