//! CLI configuration: thin wrapper around `sdnboard_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--controller, --layout, --insecure, --timeout).

use std::time::Duration;

use sdnboard_core::{ControllerConfig, DashboardLayout, TlsVerification};

use crate::cli::{GlobalOpts, LayoutArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sdnboard_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, session_dir,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

impl From<LayoutArg> for DashboardLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Switches => Self::Switches,
            LayoutArg::Services => Self::Services,
        }
    }
}

/// Everything a controller-bound command needs to get started.
pub struct Resolved {
    pub profile_name: String,
    pub controller: ControllerConfig,
}

/// Build a `ControllerConfig` from the config file, profile, and CLI overrides.
///
/// Without a matching profile, `--controller` alone is enough: the
/// profile defaults (local `admin`/`admin` auth, switches layout) apply.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None => match global.controller.as_deref() {
            Some(url) => Profile::new(url),
            None if global.profile.is_some() && !cfg.profiles.is_empty() => {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available.join(", "),
                });
            }
            None => {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
        },
    };

    let controller = resolve_profile(&profile, &profile_name, &cfg.defaults, global)?;
    Ok(Resolved {
        profile_name,
        controller,
    })
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values, which take
/// priority over `[defaults]`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    // 1. Controller URL (flag > env > profile)
    let mut profile = profile.clone();
    if let Some(url_str) = global.controller.as_deref() {
        url_str.clone_into(&mut profile.controller);
    }
    let mut resolved = sdnboard_config::profile_to_controller_config(&profile, profile_name)?;

    // 2. TLS verification
    if global.insecure || (profile.insecure.is_none() && defaults.insecure) {
        resolved.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 3. Layout
    if let Some(layout) = global.layout {
        resolved.layout = layout.into();
    }

    // 4. Timeout
    let secs = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);
    resolved.timeout = Duration::from_secs(secs);

    Ok(resolved)
}
