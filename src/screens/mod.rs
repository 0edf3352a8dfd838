//! Screen controllers: auth, service list and service detail.
//!
//! Each screen receives the [`Session`](crate::session::Session) and a
//! [`MonitorApi`](crate::api::MonitorApi) explicitly. Screens never render;
//! they expose state for the CLI to print and return a [`Navigation`] when
//! the user should move elsewhere.

pub mod auth;
pub mod detail;
mod error;
pub mod services;

pub use auth::{LoginForm, SignupForm};
pub use detail::{resolve_service, DetailUpdate, ServiceDetailScreen};
pub use error::{FormError, ScreenError};
pub use services::{AddServiceForm, ServiceListScreen};

use crate::api::ServiceRecord;

/// Where to go next.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Signup,
    Login,
    ServiceList,
    /// Detail view with the record passed along as navigation state
    ServiceDetail { id: String, service: Option<ServiceRecord> },
}
