//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sdnboard_config::ConfigError;
use sdnboard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(sdnboard::connection_failed),
        help(
            "Check that the controller is running and its REST API is reachable.\n\
             URL: {url}\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(sdnboard::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Not logged in to profile '{profile}'")]
    #[diagnostic(
        code(sdnboard::not_logged_in),
        help("Run: sdnboard login --profile {profile}")
    )]
    NotLoggedIn { profile: String },

    #[error("{message}")]
    #[diagnostic(
        code(sdnboard::auth_failed),
        help(
            "Check the username and password for profile '{profile}'.\n\
             Local profiles default to admin/admin; change them with: \
             sdnboard config set-password"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("Session storage error: {message}")]
    #[diagnostic(code(sdnboard::session))]
    Session { message: String },

    // ── Controller ───────────────────────────────────────────────────
    #[error("'{identifier}' not found on the controller")]
    #[diagnostic(
        code(sdnboard::not_found),
        help("Run: sdnboard {list_command} to see what the controller knows about")
    )]
    NotFound {
        identifier: String,
        list_command: String,
    },

    #[error("Controller refused the change: {message}")]
    #[diagnostic(code(sdnboard::rejected))]
    Rejected { message: String },

    #[error("API error: {message}")]
    #[diagnostic(code(sdnboard::api_error))]
    ApiError { message: String },

    #[error("Topology could not be loaded")]
    #[diagnostic(
        code(sdnboard::topology),
        help("Re-run with -v to see the underlying fetch or graph error.")
    )]
    TopologyUnavailable,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sdnboard::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sdnboard::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sdnboard config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(sdnboard::no_config),
        help(
            "Create a profile with: sdnboard config init\n\
             Or pass --controller <URL>. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(sdnboard::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(sdnboard::render))]
    Render(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotLoggedIn { .. } | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// Context the CLI knows but `CoreError` doesn't.
pub struct ErrorContext<'a> {
    pub profile: &'a str,
    pub timeout_secs: u64,
}

impl CliError {
    pub fn from_core(err: CoreError, ctx: &ErrorContext<'_>) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::Timeout => Self::Timeout {
                seconds: ctx.timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                profile: ctx.profile.into(),
                message,
            },

            CoreError::NotLoggedIn => Self::NotLoggedIn {
                profile: ctx.profile.into(),
            },

            CoreError::Session { message } => Self::Session { message },

            CoreError::NotFound { identifier } => Self::NotFound {
                identifier,
                list_command: "hosts blocked".into(),
            },

            CoreError::Rejected { message } => Self::Rejected { message },

            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => Self::ApiError {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message,
                },
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::ApiError { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ErrorContext<'static> {
        ErrorContext {
            profile: "lab",
            timeout_secs: 12,
        }
    }

    #[test]
    fn session_errors_exit_with_auth_code() {
        let err = CliError::from_core(CoreError::NotLoggedIn, &ctx());
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert!(err.to_string().contains("lab"));
    }

    #[test]
    fn timeout_carries_configured_seconds() {
        let err = CliError::from_core(CoreError::Timeout, &ctx());
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(err.to_string(), "Request timed out after 12s");
    }

    #[test]
    fn validation_is_a_usage_error() {
        let err = CliError::from_core(
            CoreError::ValidationFailed {
                message: "Invalid number".into(),
            },
            &ctx(),
        );
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn config_validation_keeps_field() {
        let err = CliError::from(ConfigError::Validation {
            field: "layout".into(),
            reason: "bad".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert_eq!(err.to_string(), "Invalid value for layout: bad");
    }
}
