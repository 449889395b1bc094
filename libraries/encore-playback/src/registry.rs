//! Destination to session registry
//!
//! Explicit owner of the destination-to-session mapping, injected into
//! whatever composes sessions instead of living as ambient global state.
//! The binding is 1:1 and released exactly once: sessions deregister
//! themselves through a weak handle when they are destroyed.

use crate::error::{Result, SessionError};
use crate::events::EventReceiver;
use crate::session::Session;
use crate::types::SessionConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Registry of active sessions, one per destination
pub struct SessionRegistry {
    config: SessionConfig,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Create and bind a session for a destination
    ///
    /// Fails with [`SessionError::DestinationTaken`] if the destination
    /// already has an active session. The returned receiver is the only
    /// handle to the session's event stream.
    pub fn open(
        self: &Arc<Self>,
        destination: impl Into<String>,
    ) -> Result<(Arc<Session>, EventReceiver)> {
        let id = destination.into();
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&id) {
            return Err(SessionError::DestinationTaken);
        }

        let (session, receiver) =
            Session::build(id.clone(), self.config.clone(), Arc::downgrade(self));
        sessions.insert(id.clone(), Arc::clone(&session));
        debug!(session = %id, active = sessions.len(), "session opened");
        Ok((session, receiver))
    }

    /// Look up the session bound to a destination
    pub fn get(&self, destination: &str) -> Option<Arc<Session>> {
        self.sessions.lock().unwrap().get(destination).cloned()
    }

    /// Release a destination's binding
    ///
    /// Called by sessions on destroy; removing an unknown destination is a
    /// no-op, which keeps double-destroy safe.
    pub fn remove(&self, destination: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.remove(destination).is_some() {
            debug!(session = %destination, active = sessions.len(), "session removed");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().unwrap().is_empty()
    }
}
