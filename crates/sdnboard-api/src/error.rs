use thiserror::Error;

/// Top-level error type for the `sdnboard-api` crate.
///
/// Covers every failure mode of the controller REST surface: transport,
/// non-2xx responses, bodies that don't match the expected shape, and the
/// optional token login. `sdnboard-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected or session token no longer accepted.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller ──────────────────────────────────────────────────
    /// The controller answered with a non-success status.
    ///
    /// `message` is a preview of the response body; the controller sends
    /// plain text ("IP already blocked.") or `{"status":"error",...}`.
    #[error("Controller error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the session token is no
    /// longer valid and logging in again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Api { status: 401, .. })
    }

    /// Returns `true` if the request never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status, when the controller answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
