use caloscope_core::{
    application::CaloscopeClient,
    domain::{
        authentication::{
            entities::SessionStatus,
            value_objects::{
                ChangePasswordInput, SetPasswordInput, SignInInput, SignUpInput, VerifyOtpInput,
            },
        },
        refresh::RefreshReason,
    },
};
use tracing::info;

use super::{prompt, user_error};
use crate::args::AuthCommand;

/// Prompts twice unless the password came from a flag or the environment.
fn new_password(provided: Option<String>) -> anyhow::Result<(String, String)> {
    match provided {
        Some(password) => Ok((password.clone(), password)),
        None => {
            let password = prompt::ask("New password")?;
            let confirm = prompt::ask("Repeat password")?;
            Ok((password, confirm))
        }
    }
}

pub async fn run(client: &CaloscopeClient, command: AuthCommand) -> anyhow::Result<()> {
    let auth = &client.auth;

    match command {
        AuthCommand::SignIn { email, password } => {
            let password = prompt::value_or_ask(password, "Password")?;
            let session = auth
                .sign_in(SignInInput { email, password })
                .await
                .map_err(user_error)?;
            client.notify_history_changed(RefreshReason::SessionChanged);
            println!("Signed in as {}.", session.email);
        }
        AuthCommand::SignUp { email, password } => {
            let (password, confirm_password) = new_password(password)?;
            auth.sign_up(SignUpInput {
                email: email.clone(),
                password,
                confirm_password,
            })
            .await
            .map_err(user_error)?;
            println!("Account created. Enter the code sent to {email} with `caloscope auth verify-otp`.");
        }
        AuthCommand::VerifyOtp { email, otp } => {
            let session = auth
                .verify_otp(VerifyOtpInput { email, otp })
                .await
                .map_err(user_error)?;
            client.notify_history_changed(RefreshReason::SessionChanged);
            println!("Verified. Signed in as {}.", session.email);
        }
        AuthCommand::ResendOtp { email } => {
            auth.resend_otp(&email).await.map_err(user_error)?;
            println!("A new code was sent to {email}.");
        }
        AuthCommand::ResetPassword { email } => {
            auth.request_password_reset(&email)
                .await
                .map_err(user_error)?;
            println!("A reset code was sent to {email}. Finish with `caloscope auth set-password`.");
        }
        AuthCommand::SetPassword {
            email,
            otp,
            password,
        } => {
            let (password, confirm_password) = new_password(password)?;
            auth.set_password(SetPasswordInput {
                email,
                otp,
                password,
                confirm_password,
            })
            .await
            .map_err(user_error)?;
            println!("Password updated. You can sign in now.");
        }
        AuthCommand::ChangePassword => {
            let old_password = prompt::ask("Current password")?;
            let (new_password, confirm_password) = new_password(None)?;
            auth.change_password(ChangePasswordInput {
                old_password,
                new_password,
                confirm_password,
            })
            .await
            .map_err(user_error)?;
            println!("Password changed.");
        }
        AuthCommand::SignOut => {
            auth.sign_out().map_err(user_error)?;
            client.notify_history_changed(RefreshReason::SessionChanged);
            println!("Signed out.");
        }
        AuthCommand::Status => match auth.restore_session().await.map_err(user_error)? {
            SessionStatus::SignedIn { email } => {
                info!(%email, "session restored");
                println!("Signed in as {email}.");
            }
            SessionStatus::SignedOut => println!("Not signed in."),
        },
    }

    Ok(())
}
