use thiserror::Error;

use super::Navigation;
use crate::api::ApiError;
use crate::session::SessionError;

/// Client-side validation failures. No request is sent when these occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("'{0}' is not a valid port (1-65535)")]
    InvalidPort(String),

    #[error("select at least one metric")]
    NoMetrics,
}

#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("invalid form: {0}")]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(SessionError),

    /// The screen needs a signed-in user.
    #[error("not logged in")]
    Unauthenticated,
}

impl From<SessionError> for ScreenError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::MissingIdentity => ScreenError::Unauthenticated,
            other => ScreenError::Session(other),
        }
    }
}

impl ScreenError {
    /// Navigation the caller should perform instead of showing the error.
    pub fn redirect(&self) -> Option<Navigation> {
        match self {
            ScreenError::Unauthenticated => Some(Navigation::Login),
            _ => None,
        }
    }
}
