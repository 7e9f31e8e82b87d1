// ── Runtime connection configuration ──
//
// These types describe *how* to reach a controller and how the session
// gate authenticates. They carry credential data and connection tuning
// but never touch disk: the CLI builds a `ControllerConfig` and hands it in.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use strum::{Display, EnumString};
use url::Url;

use sdnboard_api::transport::{TlsMode, TransportConfig};
use sdnboard_api::ControllerClient;

use crate::error::CoreError;

/// How the session gate checks credentials.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Compare against a fixed pair; the issued token is a random UUID.
    Local {
        username: String,
        password: SecretString,
    },
    /// Post credentials to the controller and keep the token it returns.
    Remote {
        login_path: String,
        /// When set, stored tokens are re-checked on every protected entry.
        verify_path: Option<String>,
    },
}

impl AuthMode {
    /// The pair the stock dashboard ships with.
    pub fn local_default() -> Self {
        Self::Local {
            username: "admin".into(),
            password: SecretString::from("admin".to_string()),
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Which REST shape the controller serves.
///
/// Stock Ryu apps serve plain IP lists and a per-switch `/ports` map;
/// service-port builds serve rich host rows and a flat port list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DashboardLayout {
    #[default]
    Switches,
    Services,
}

/// Configuration for talking to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller base URL (e.g., `http://127.0.0.1:8080`).
    pub url: Url,
    pub auth: AuthMode,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    pub layout: DashboardLayout,
}

impl ControllerConfig {
    /// Config for `url` with local auth, system TLS and a 30s timeout.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            auth: AuthMode::local_default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            layout: DashboardLayout::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::new(tls_to_transport(&self.tls), self.timeout)
    }

    /// Build the shared HTTP client for this controller.
    pub fn build_client(&self) -> Result<Arc<ControllerClient>, CoreError> {
        let client = ControllerClient::new(self.url.clone(), &self.transport())?;
        Ok(Arc::new(client))
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn layout_parses_case_insensitively() {
        assert_eq!(
            "Services".parse::<DashboardLayout>().unwrap(),
            DashboardLayout::Services
        );
        assert_eq!(DashboardLayout::Switches.to_string(), "switches");
        assert!("graph".parse::<DashboardLayout>().is_err());
    }

    #[test]
    fn insecure_maps_to_danger_accept() {
        let mut cfg = ControllerConfig::new(Url::parse("https://ctl.lab").unwrap());
        cfg.tls = TlsVerification::DangerAcceptInvalid;
        assert!(matches!(cfg.transport().tls, TlsMode::DangerAcceptInvalid));
    }
}
