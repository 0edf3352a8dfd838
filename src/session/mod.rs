//! Signed-in identity and its lifecycle.
//!
//! A [`Session`] is created once at startup and handed to every screen.
//! It is populated by [`Session::login`] and emptied by [`Session::logout`];
//! nothing else writes it. When backed by a [`SessionStore`] the identity
//! survives between runs as a small JSON file.

mod store;

pub use store::SessionStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::api::types::string_or_number;

/// Fields returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub email: String,
    #[serde(deserialize_with = "string_or_number")]
    pub userid: String,
}

/// Errors from session storage.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error on session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt session file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Not logged in")]
    MissingIdentity,
}

/// Explicit session context passed to screens.
#[derive(Debug, Default)]
pub struct Session {
    identity: Option<Identity>,
    store: Option<SessionStore>,
}

impl Session {
    /// A session that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a session backed by `store`, loading any saved identity.
    pub fn open(store: SessionStore) -> Result<Self, SessionError> {
        let identity = store.load()?;
        if let Some(ref id) = identity {
            tracing::debug!(userid = %id.userid, "Restored session");
        }
        Ok(Self {
            identity,
            store: Some(store),
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The identity, or `MissingIdentity` when nobody is logged in.
    pub fn require_identity(&self) -> Result<&Identity, SessionError> {
        self.identity.as_ref().ok_or(SessionError::MissingIdentity)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Record a successful login, persisting it when a store is attached.
    pub fn login(&mut self, identity: Identity) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            store.save(&identity)?;
        }
        self.identity = Some(identity);
        Ok(())
    }

    /// Forget the identity. Returns the identity that was cleared, if any.
    pub fn logout(&mut self) -> Result<Option<Identity>, SessionError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(self.identity.take())
    }
}
