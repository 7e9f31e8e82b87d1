// ── Core error types ──
//
// User-facing errors from sdnboard-core. Consumers never see reqwest
// errors or JSON parse failures directly; the `From<sdnboard_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session storage error: {message}")]
    Session { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by controller: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sdnboard_api::Error> for CoreError {
    fn from(err: sdnboard_api::Error) -> Self {
        match err {
            sdnboard_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            sdnboard_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            sdnboard_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sdnboard_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            sdnboard_api::Error::Api {
                status: 401 | 403,
                message,
            } => CoreError::AuthenticationFailed { message },
            sdnboard_api::Error::Api {
                status: 404,
                message,
            } => CoreError::NotFound {
                identifier: message,
            },
            sdnboard_api::Error::Api {
                status: 400,
                message,
            } => CoreError::Rejected { message },
            sdnboard_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            sdnboard_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
