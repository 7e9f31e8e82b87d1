//! Login, logout and status handlers.
//!
//! These run against the session gate only; nothing here fetches a panel.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;
use secrecy::SecretString;
use serde::Serialize;

use sdnboard_core::{ConfiguredAuthenticator, Route, SessionGate};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Resolved;
use crate::error::{CliError, ErrorContext};
use crate::output;

pub type Gate = SessionGate<ConfiguredAuthenticator>;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn read_username(args: &LoginArgs) -> Result<String, CliError> {
    if let Some(ref name) = args.username {
        return Ok(name.trim().to_owned());
    }
    if args.password_stdin || !io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "username".into(),
            reason: "pass --username when stdin is not a terminal".into(),
        });
    }
    Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)
}

fn read_password(args: &LoginArgs) -> Result<SecretString, CliError> {
    let raw = if args.password_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password("Password: ").map_err(prompt_err)?
    };
    Ok(SecretString::from(raw))
}

// ── Login ───────────────────────────────────────────────────────────

pub async fn login(
    gate: &Gate,
    args: &LoginArgs,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
) -> Result<(), CliError> {
    let core = |e| CliError::from_core(e, ctx);

    if gate.enter_login().map_err(core)? == Some(Route::Dashboard) {
        if !global.quiet {
            eprintln!(
                "Already logged in to profile '{}'. Run: sdnboard logout",
                ctx.profile
            );
        }
        return Ok(());
    }

    let username = read_username(args)?;
    let password = read_password(args)?;

    let route = output::with_spinner(
        "Logging in",
        global.quiet,
        gate.login(&username, &password),
    )
    .await
    .map_err(core)?;

    match route {
        Route::Dashboard => {
            if !global.quiet {
                eprintln!("✓ Logged in to profile '{}' as {username}", ctx.profile);
            }
            Ok(())
        }
        Route::Login => Err(CliError::AuthFailed {
            profile: ctx.profile.into(),
            message: gate
                .login_error()
                .unwrap_or_else(|| "Invalid credentials".into()),
        }),
    }
}

// ── Logout ──────────────────────────────────────────────────────────

pub fn logout(gate: &Gate, global: &GlobalOpts, ctx: &ErrorContext<'_>) -> Result<(), CliError> {
    gate.logout().map_err(|e| CliError::from_core(e, ctx))?;
    if !global.quiet {
        eprintln!("✓ Logged out of profile '{}'", ctx.profile);
    }
    Ok(())
}

// ── Status ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    profile: String,
    controller: String,
    layout: String,
    logged_in: bool,
}

fn detail(s: &StatusView) -> String {
    [
        format!("Profile:     {}", s.profile),
        format!("Controller:  {}", s.controller),
        format!("Layout:      {}", s.layout),
        format!(
            "Session:     {}",
            if s.logged_in {
                "logged in"
            } else {
                "not logged in"
            }
        ),
    ]
    .join("\n")
}

pub fn status(
    gate: &Gate,
    resolved: &Resolved,
    global: &GlobalOpts,
    ctx: &ErrorContext<'_>,
) -> Result<(), CliError> {
    let route = gate.root().map_err(|e| CliError::from_core(e, ctx))?;
    let view = StatusView {
        profile: resolved.profile_name.clone(),
        controller: resolved.controller.url.to_string(),
        layout: resolved.controller.layout.to_string(),
        logged_in: route == Route::Dashboard,
    };
    let out = output::render_single(&global.output, &view, detail, |s| {
        if s.logged_in {
            "logged-in".into()
        } else {
            "logged-out".into()
        }
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
