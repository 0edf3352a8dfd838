//! Shared state for commands that talk to the server.

use std::sync::Arc;

use crate::api::{HttpMonitorClient, MonitorApi};
use crate::config::WatchtowerConfig;
use crate::screens::{Navigation, ScreenError};
use crate::session::{Session, SessionStore};

pub struct AppContext {
    pub config: WatchtowerConfig,
    pub api: Arc<dyn MonitorApi>,
    pub session: Session,
}

impl AppContext {
    /// Build the HTTP client and restore the session file.
    pub fn from_config(config: WatchtowerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let api: Arc<dyn MonitorApi> = Arc::new(HttpMonitorClient::new(&config.api)?);
        let session = Session::open(SessionStore::new(&config.session.path))?;
        Ok(Self {
            config,
            api,
            session,
        })
    }
}

/// Turn a screen error into a CLI error, spelling out the login redirect.
pub fn screen_error(err: ScreenError) -> Box<dyn std::error::Error> {
    match err.redirect() {
        Some(Navigation::Login) => "not logged in, run `watchtower login` first".into(),
        _ => Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionError;

    #[test]
    fn test_unauthenticated_error_names_login() {
        let err = screen_error(ScreenError::from(SessionError::MissingIdentity));
        assert!(err.to_string().contains("watchtower login"));
    }

    #[test]
    fn test_context_with_missing_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WatchtowerConfig::default();
        config.session.path = dir.path().join("session.json");

        let ctx = AppContext::from_config(config).unwrap();
        assert!(!ctx.session.is_authenticated());
    }
}
