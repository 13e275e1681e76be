use caloscope_core::{application::CaloscopeClient, domain::common::entities::app_errors::CoreError};
use thiserror::Error;

use crate::args::Command;

pub mod auth;
pub mod history;
pub mod logging;
pub mod profile;
pub mod prompt;
pub mod render;

/// A failure that may go away on its own, such as an unreachable server.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TemporaryFailure(String);

pub async fn dispatch(client: &CaloscopeClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Auth { command } => auth::run(client, command).await,
        Command::History { command } => history::run(client, command).await,
        Command::Profile { command } => profile::run(client, command).await,
    }
}

/// Turns a core error into the message shown to the user, pointing at
/// sign-in when the session is gone.
pub fn user_error(error: CoreError) -> anyhow::Error {
    match error {
        CoreError::Unauthorized => anyhow::anyhow!(
            "{} Run `caloscope auth sign-in` to continue.",
            error.user_message()
        ),
        error if error.is_retryable() => TemporaryFailure(error.user_message()).into(),
        other => anyhow::anyhow!(other.user_message()),
    }
}
