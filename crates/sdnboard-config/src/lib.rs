//! Shared configuration for the sdnboard CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! session storage location, and translation to
//! `sdnboard_core::ControllerConfig`. The CLI adds `GlobalOpts`-aware
//! overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sdnboard_core::{AuthMode, ControllerConfig, DashboardLayout, TlsVerification};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "sdnboard";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named controller profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "http://127.0.0.1:8080").
    pub controller: String,

    /// REST shape served by the controller: "switches" or "services".
    #[serde(default = "default_layout")]
    pub layout: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    #[serde(default)]
    pub auth: AuthProfile,
}

impl Profile {
    /// Profile for `controller` with local auth and default layout.
    pub fn new(controller: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            layout: default_layout(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            auth: AuthProfile::default(),
        }
    }
}

fn default_layout() -> String {
    DashboardLayout::default().to_string()
}

/// `[profiles.<name>.auth]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthProfile {
    /// "local" (fixed pair checked client-side) or "remote" (controller login).
    #[serde(default = "default_auth_mode")]
    pub mode: String,

    /// Expected username for local mode.
    pub username: Option<String>,

    /// Expected password for local mode (plaintext; prefer keyring).
    pub password: Option<String>,

    /// Environment variable holding the local-mode password.
    pub password_env: Option<String>,

    /// Controller login endpoint for remote mode.
    pub login_path: Option<String>,

    /// Controller token check endpoint for remote mode.
    pub verify_path: Option<String>,
}

impl Default for AuthProfile {
    fn default() -> Self {
        Self {
            mode: default_auth_mode(),
            username: None,
            password: None,
            password_env: None,
            login_path: None,
            verify_path: None,
        }
    }
}

fn default_auth_mode() -> String {
    "local".into()
}

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_LOGIN_PATH: &str = "/login";

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sdnboard", "sdnboard")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding the session token for `profile_name`.
pub fn session_dir(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    base.join("sessions").join(profile_name)
}

fn dirs_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("sdnboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layering `SDNBOARD_*` env vars on top.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SDNBOARD_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store the local-mode password for a profile in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the expected local-mode pair.
///
/// Password chain: `password_env` → keyring → plaintext → `admin`.
pub fn resolve_local_credentials(
    auth: &AuthProfile,
    profile_name: &str,
) -> (String, SecretString) {
    let username = auth
        .username
        .clone()
        .unwrap_or_else(|| DEFAULT_USERNAME.into());

    // 1. Env var
    if let Some(ref env_name) = auth.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return (username, SecretString::from(pw));
        }
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return (username, SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    let pw = auth
        .password
        .clone()
        .unwrap_or_else(|| DEFAULT_PASSWORD.into());
    (username, SecretString::from(pw))
}

/// Resolve the session gate's `AuthMode` from a profile's auth block.
pub fn resolve_auth(auth: &AuthProfile, profile_name: &str) -> Result<AuthMode, ConfigError> {
    match auth.mode.as_str() {
        "local" => {
            let (username, password) = resolve_local_credentials(auth, profile_name);
            Ok(AuthMode::Local { username, password })
        }
        "remote" => Ok(AuthMode::Remote {
            login_path: auth
                .login_path
                .clone()
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.into()),
            verify_path: auth.verify_path.clone(),
        }),
        other => Err(ConfigError::Validation {
            field: "auth.mode".into(),
            reason: format!("expected 'local' or 'remote', got '{other}'"),
        }),
    }
}

/// Parse a layout name.
pub fn parse_layout(value: &str) -> Result<DashboardLayout, ConfigError> {
    value.parse().map_err(|_| ConfigError::Validation {
        field: "layout".into(),
        reason: format!("expected 'switches' or 'services', got '{value}'"),
    })
}

/// Build a `ControllerConfig` from a profile, with no CLI overrides.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let auth = resolve_auth(&profile.auth, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    let layout = parse_layout(&profile.layout)?;

    Ok(ControllerConfig {
        url,
        auth,
        tls,
        timeout,
        layout,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "json"

[profiles.lab]
controller = "http://10.0.0.10:8080"
layout = "services"
timeout = 5

[profiles.lab.auth]
mode = "remote"
login_path = "/api/login"
verify_path = "/api/session"

[profiles.edge]
controller = "https://edge.example:8443"
insecure = true
"#;

    #[test]
    fn loads_profiles_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);

        let lab = &cfg.profiles["lab"];
        assert_eq!(lab.layout, "services");
        assert_eq!(lab.auth.mode, "remote");

        let edge = &cfg.profiles["edge"];
        assert_eq!(edge.layout, "switches");
        assert_eq!(edge.auth.mode, "local");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://127.0.0.1:8080"));
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profiles["default"].controller,
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn remote_profile_translates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        let cfg = load_config_from(&path).unwrap();

        let cc = profile_to_controller_config(&cfg.profiles["lab"], "lab").unwrap();
        assert_eq!(cc.url.as_str(), "http://10.0.0.10:8080/");
        assert_eq!(cc.layout, DashboardLayout::Services);
        assert_eq!(cc.timeout, Duration::from_secs(5));
        assert_eq!(cc.tls, TlsVerification::SystemDefaults);
        match cc.auth {
            AuthMode::Remote {
                login_path,
                verify_path,
            } => {
                assert_eq!(login_path, "/api/login");
                assert_eq!(verify_path.as_deref(), Some("/api/session"));
            }
            AuthMode::Local { .. } => panic!("expected remote auth"),
        }

        let edge = profile_to_controller_config(&cfg.profiles["edge"], "edge").unwrap();
        assert_eq!(edge.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn local_auth_uses_configured_pair() {
        let auth = AuthProfile {
            username: Some("ops".into()),
            password: Some("hunter2".into()),
            ..AuthProfile::default()
        };
        match resolve_auth(&auth, "sdnboard-test-no-such-profile").unwrap() {
            AuthMode::Local { username, password } => {
                assert_eq!(username, "ops");
                assert_eq!(password.expose_secret(), "hunter2");
            }
            AuthMode::Remote { .. } => panic!("expected local auth"),
        }
    }

    #[test]
    fn rejects_unknown_values() {
        let auth = AuthProfile {
            mode: "oauth".into(),
            ..AuthProfile::default()
        };
        assert!(matches!(
            resolve_auth(&auth, "x"),
            Err(ConfigError::Validation { .. })
        ));

        let mut profile = Profile::new("http://127.0.0.1:8080");
        profile.layout = "mesh".into();
        assert!(profile_to_controller_config(&profile, "x").is_err());

        let profile = Profile::new("not a url");
        assert!(profile_to_controller_config(&profile, "x").is_err());
    }

    #[test]
    fn session_dir_is_per_profile() {
        let a = session_dir("lab");
        let b = session_dir("edge");
        assert_ne!(a, b);
        assert!(a.ends_with("sessions/lab"));
    }
}
