//! Account commands: signup, login, logout, whoami

use super::context::{screen_error, AppContext};
use super::output::format_identity;
use super::{LoginArgs, SignupArgs, WhoamiArgs};
use crate::screens::{auth, LoginForm, SignupForm};

/// Handle `watchtower signup` command
pub async fn handle_signup(
    args: &SignupArgs,
    ctx: &AppContext,
) -> Result<String, Box<dyn std::error::Error>> {
    let form = SignupForm {
        username: args.username.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
    };
    auth::submit_signup(ctx.api.as_ref(), &form)
        .await
        .map_err(screen_error)?;

    Ok(format!(
        "✓ Account created for {}\n  Run `watchtower login --email {}` to sign in.",
        form.username.trim(),
        form.email.trim()
    ))
}

/// Handle `watchtower login` command
pub async fn handle_login(
    args: &LoginArgs,
    ctx: &mut AppContext,
) -> Result<String, Box<dyn std::error::Error>> {
    let form = LoginForm {
        email: args.email.clone(),
        password: args.password.clone(),
    };
    let (identity, _next) = auth::submit_login(ctx.api.as_ref(), &mut ctx.session, &form)
        .await
        .map_err(screen_error)?;

    tracing::info!(userid = %identity.userid, "Logged in");
    Ok(format!("✓ Logged in as {}", format_identity(&identity)))
}

/// Handle `watchtower logout` command
pub fn handle_logout(ctx: &mut AppContext) -> Result<String, Box<dyn std::error::Error>> {
    match ctx.session.logout()? {
        Some(identity) => Ok(format!("✓ Logged out {}", identity.username)),
        None => Ok("Not logged in".to_string()),
    }
}

/// Handle `watchtower whoami` command
pub fn handle_whoami(
    args: &WhoamiArgs,
    ctx: &AppContext,
) -> Result<String, Box<dyn std::error::Error>> {
    let identity = ctx
        .session
        .require_identity()
        .map_err(|e| screen_error(e.into()))?;

    if args.json {
        Ok(serde_json::to_string_pretty(identity)?)
    } else {
        Ok(format_identity(identity))
    }
}
