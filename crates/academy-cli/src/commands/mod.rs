//! Command handlers

pub mod auth;
pub mod courses;
pub mod manage;

use crate::console::{CliConsole, Reported};
use academy_core::{ApiError, AuthError, QueryResult};
use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};

/// Unwrap a read for display
///
/// API failures were already shown through the notifier, so they surface
/// as [`Reported`].
pub(crate) fn settle<T>(console: CliConsole, result: QueryResult<T>) -> anyhow::Result<T> {
    if result.is_disabled() {
        console.warn("Please login to continue");
        return Err(Reported.into());
    }
    match result.into_result() {
        Ok(Some(data)) => Ok(data),
        Ok(None) => Err(anyhow::anyhow!("Nothing was returned")),
        Err(error) => Err(reported_api(error)),
    }
}

/// API errors are notified where they happen
pub(crate) fn reported_api(error: ApiError) -> anyhow::Error {
    tracing::debug!(kind = %error.kind(), "Request failed: {}", error);
    Reported.into()
}

/// Show an auth failure unless the user backed out themselves
pub(crate) fn reported_auth(console: CliConsole, error: AuthError) -> anyhow::Error {
    if !error.is_cancellation() {
        console.error(&error.user_message());
    }
    Reported.into()
}

/// Prompts need someone at the keyboard
pub(crate) fn ensure_attended(label: &str) -> anyhow::Result<()> {
    if Term::stderr().features().is_attended() {
        Ok(())
    } else {
        anyhow::bail!("{} is required when not running in a terminal", label)
    }
}

pub(crate) fn prompt_text(label: &str, initial: Option<String>) -> anyhow::Result<String> {
    ensure_attended(label)?;
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme).with_prompt(label);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    Ok(input.interact_text()?)
}

pub(crate) fn prompt_optional(label: &str) -> anyhow::Result<Option<String>> {
    ensure_attended(label)?;
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

pub(crate) fn prompt_password(confirm: bool) -> anyhow::Result<String> {
    ensure_attended("Password")?;
    let theme = ColorfulTheme::default();
    let mut password = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        password = password.with_confirmation("Confirm password", "Passwords do not match");
    }
    Ok(password.interact()?)
}

/// Use the flag value or ask for it
pub(crate) fn or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt_text(label, None),
    }
}
