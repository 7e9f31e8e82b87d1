// HTTP transport settings for the controller client.
//
// Request timeout, a capped connection-setup timeout and TLS trust.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Error;

/// Upper bound on TCP/TLS connection setup, independent of the request
/// timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the controller's certificate is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// System certificate store.
    System,
    /// Additional root from a PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Connection setup timeout; never longer than `timeout`.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(TlsMode::System, Duration::from_secs(30))
    }
}

impl TransportConfig {
    pub fn new(tls: TlsMode, timeout: Duration) -> Self {
        Self {
            tls,
            timeout,
            connect_timeout: timeout.min(MAX_CONNECT_TIMEOUT),
        }
    }

    /// Build the `reqwest::Client` every controller request goes through.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .default_headers(headers)
            .user_agent(concat!("sdnboard/", env!("CARGO_PKG_VERSION")));

        builder = match &self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem)
        .map_err(|e| Error::Tls(format!("invalid CA cert {}: {e}", path.display())))
}
