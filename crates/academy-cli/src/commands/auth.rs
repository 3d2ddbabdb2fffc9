//! Account commands

use super::{or_prompt, prompt_optional, prompt_password, reported_auth};
use crate::console::{CliConsole, Reported};
use academy_core::{Academy, SessionState};
use anyhow::Result;

pub async fn login(
    academy: &Academy,
    console: CliConsole,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let email = or_prompt(email, "Email")?;
    let password = match password {
        Some(password) => password,
        None => prompt_password(false)?,
    };

    let identity = academy
        .session
        .sign_in_with_credentials(email.trim(), &password)
        .await
        .map_err(|e| reported_auth(console, e))?;
    console.success("Welcome back!");
    console.info(&format!("Signed in as {}", identity.label()));
    Ok(())
}

pub async fn register(
    academy: &Academy,
    console: CliConsole,
    name: Option<String>,
    photo_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let interactive = email.is_none();
    let name = match name {
        Some(name) => Some(name),
        None if interactive => prompt_optional("Full name")?,
        None => None,
    };
    if let Some(name) = &name {
        if name.trim().chars().count() < 2 {
            console.error("Name must be at least 2 characters");
            return Err(Reported.into());
        }
    }
    let photo_url = match photo_url {
        Some(url) => Some(url),
        None if interactive => prompt_optional("Photo URL")?,
        None => None,
    };
    let email = or_prompt(email, "Email")?;
    let password = match password {
        Some(password) => password,
        None => prompt_password(true)?,
    };
    if !is_strong_password(&password) {
        console.error("Password must be 6+ chars with uppercase and lowercase");
        return Err(Reported.into());
    }

    let identity = academy
        .session
        .register_with_credentials(
            name.as_deref(),
            photo_url.as_deref(),
            email.trim(),
            &password,
        )
        .await
        .map_err(|e| reported_auth(console, e))?;
    console.success("Account created successfully!");
    console.info(&format!("Signed in as {}", identity.label()));
    Ok(())
}

pub async fn logout(academy: &Academy) -> Result<()> {
    // The session store reports the outcome itself
    academy.session.sign_out().await.map_err(|_| Reported)?;
    Ok(())
}

pub async fn reset_password(
    academy: &Academy,
    console: CliConsole,
    email: Option<String>,
) -> Result<()> {
    let email = or_prompt(email, "Email")?;
    match academy.session.request_password_reset(email.trim()).await {
        Ok(()) => {
            console.success("Password reset email sent. Check your inbox.");
            Ok(())
        }
        Err(error) if error.is_cancellation() => Err(Reported.into()),
        Err(error) => {
            tracing::debug!(kind = %error.kind(), "Password reset failed");
            console.error("Failed to send reset email. Please try again.");
            Err(Reported.into())
        }
    }
}

pub fn whoami(academy: &Academy, console: CliConsole) -> Result<()> {
    match academy.session.state() {
        SessionState::Authenticated(identity) => {
            console.print_header(identity.label());
            console.field("id", &identity.id);
            if let Some(email) = &identity.email {
                console.field("email", email);
            }
            if let Some(photo) = &identity.photo_url {
                console.field("photo", photo);
            }
        }
        SessionState::Anonymous | SessionState::Unknown => {
            console.warn("Not signed in. Run `academy login`.");
        }
    }
    Ok(())
}

/// Uppercase, lowercase and at least six characters
fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(char::is_uppercase)
        && password.chars().any(char::is_lowercase)
}
