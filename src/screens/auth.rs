//! Signup and login.

use super::{FormError, Navigation, ScreenError};
use crate::api::{LoginRequest, MonitorApi, SignupRequest};
use crate::session::{Identity, Session};

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<SignupRequest, FormError> {
        let username = required("username", &self.username)?;
        let email = valid_email(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Required("password"));
        }
        Ok(SignupRequest {
            username,
            email,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FormError> {
        let email = valid_email(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::Required("password"));
        }
        Ok(LoginRequest {
            email,
            password: self.password.clone(),
        })
    }
}

/// Create an account, then send the user to the login screen.
pub async fn submit_signup(
    api: &dyn MonitorApi,
    form: &SignupForm,
) -> Result<Navigation, ScreenError> {
    let request = form.validate()?;
    api.signup(&request).await.inspect_err(|e| {
        tracing::error!(error = %e, "Signup failed");
    })?;
    Ok(Navigation::Login)
}

/// Log in, store the identity in `session`, then go to the service list.
pub async fn submit_login(
    api: &dyn MonitorApi,
    session: &mut Session,
    form: &LoginForm,
) -> Result<(Identity, Navigation), ScreenError> {
    let request = form.validate()?;
    let identity = api.login(&request).await.inspect_err(|e| {
        tracing::error!(error = %e, "Login failed");
    })?;
    session.login(identity.clone())?;
    Ok((identity, Navigation::ServiceList))
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    Ok(trimmed.to_string())
}

fn valid_email(value: &str) -> Result<String, FormError> {
    let email = required("email", value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(FormError::InvalidEmail(email)),
    }
}
