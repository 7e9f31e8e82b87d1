//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

const SETTABLE_KEYS: &str = "controller, layout, insecure, timeout, ca_cert, auth.mode, \
     auth.username, auth.password_env, auth.login_path, auth.verify_path";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "controller = \"{}\"", p.controller);
        let _ = writeln!(out, "layout = \"{}\"", p.layout);
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }

        let a = &p.auth;
        let _ = writeln!(out, "auth.mode = \"{}\"", a.mode);
        if let Some(ref u) = a.username {
            let _ = writeln!(out, "auth.username = \"{u}\"");
        }
        if a.password.is_some() {
            let _ = writeln!(out, "auth.password = \"****\"");
        }
        if let Some(ref env) = a.password_env {
            let _ = writeln!(out, "auth.password_env = \"{env}\"");
        }
        if let Some(ref path) = a.login_path {
            let _ = writeln!(out, "auth.login_path = \"{path}\"");
        }
        if let Some(ref path) = a.verify_path {
            let _ = writeln!(out, "auth.verify_path = \"{path}\"");
        }
    }

    out
}

/// Structured copy of the config with plaintext passwords masked.
fn redacted_value(cfg: &Config) -> Result<serde_json::Value, CliError> {
    let mut value = serde_json::to_value(cfg).map_err(|e| CliError::Render(e.to_string()))?;
    if let Some(profiles) = value
        .get_mut("profiles")
        .and_then(serde_json::Value::as_object_mut)
    {
        for profile in profiles.values_mut() {
            if let Some(pw) = profile.pointer_mut("/auth/password") {
                if !pw.is_null() {
                    *pw = "****".into();
                }
            }
        }
    }
    Ok(value)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(cfg: &Config, name: &str) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Offer to store the local-mode password in the keyring or return it
/// for plaintext config.
///
/// Returns `Some(password)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_password_storage(profile_name: &str, password: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        sdnboard_config::store_password(profile_name, password)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.to_owned()))
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

/// Apply `key = value` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "controller" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "controller".into(),
                reason: format!("invalid URL: {e}"),
            })?;
            profile.controller = value;
        }
        "layout" => {
            sdnboard_config::parse_layout(&value)?;
            profile.layout = value.to_ascii_lowercase();
        }
        "insecure" => profile.insecure = Some(parse_bool("insecure", &value)?),
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "auth.mode" | "auth-mode" => {
            if !matches!(value.as_str(), "local" | "remote") {
                return Err(CliError::Validation {
                    field: "auth.mode".into(),
                    reason: "must be 'local' or 'remote'".into(),
                });
            }
            profile.auth.mode = value;
        }
        "auth.username" | "username" => profile.auth.username = Some(value),
        "auth.password_env" | "password-env" => profile.auth.password_env = Some(value),
        "auth.login_path" | "login-path" => profile.auth.login_path = Some(value),
        "auth.verify_path" | "verify-path" => profile.auth.verify_path = Some(value),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("sdnboard configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            if config_path.exists()
                && !util::confirm("A config file already exists. Overwrite it?", global.yes)?
            {
                return Ok(());
            }

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Controller URL
            let controller: String = Input::new()
                .with_prompt("Controller URL")
                .default("http://127.0.0.1:8080".into())
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::new(String::new());
            set_key(&mut profile, "controller", controller)?;

            // 3. REST layout
            let layouts = &[
                "switches (stock Ryu apps: IP lists, per-switch ports, thresholds)",
                "services (service-port builds: rich host rows, flat port list)",
            ];
            let layout = Select::new()
                .with_prompt("Controller REST layout")
                .items(layouts)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            profile.layout = if layout == 0 { "switches" } else { "services" }.into();

            // 4. Auth mode
            let modes = &[
                "Local (fixed username/password checked by the CLI)",
                "Remote (controller issues a session token)",
            ];
            let mode = Select::new()
                .with_prompt("Authentication method")
                .items(modes)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            if mode == 0 {
                let username: String = Input::new()
                    .with_prompt("Username")
                    .default("admin".into())
                    .interact_text()
                    .map_err(prompt_err)?;
                let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
                if password.is_empty() {
                    return Err(CliError::Validation {
                        field: "password".into(),
                        reason: "password cannot be empty".into(),
                    });
                }
                profile.auth.username = Some(username);
                profile.auth.password = prompt_password_storage(&profile_name, &password)?;
            } else {
                let login_path: String = Input::new()
                    .with_prompt("Login endpoint")
                    .default("/login".into())
                    .interact_text()
                    .map_err(prompt_err)?;
                let verify_path: String = Input::new()
                    .with_prompt("Token check endpoint (blank for none)")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?;
                profile.auth.mode = "remote".into();
                profile.auth.login_path = Some(login_path);
                profile.auth.verify_path = (!verify_path.is_empty()).then_some(verify_path);
            }

            // 5. Write config
            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);
            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: sdnboard login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let value = redacted_value(&cfg)?;
            let out = output::render_single(
                &global.output,
                &value,
                |_| format_config_redacted(&cfg),
                |_| "config".into(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, &profile_name));
            }

            let password = rpassword::prompt_password("New password: ").map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            sdnboard_config::store_password(&profile_name, &password)?;
            if !global.quiet {
                eprintln!("✓ Password for '{profile_name}' stored in system keyring");
            }
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_key_validates_layout_and_mode() {
        let mut p = Profile::new("http://127.0.0.1:8080");
        set_key(&mut p, "layout", "Services".into()).unwrap();
        assert_eq!(p.layout, "services");

        assert!(set_key(&mut p, "layout", "mesh".into()).is_err());
        assert!(set_key(&mut p, "auth.mode", "oauth".into()).is_err());
        assert!(set_key(&mut p, "site", "x".into()).is_err());
    }

    #[test]
    fn set_key_nested_auth_fields() {
        let mut p = Profile::new("http://127.0.0.1:8080");
        set_key(&mut p, "auth.mode", "remote".into()).unwrap();
        set_key(&mut p, "auth.login_path", "/api/login".into()).unwrap();
        assert_eq!(p.auth.mode, "remote");
        assert_eq!(p.auth.login_path.as_deref(), Some("/api/login"));
    }

    #[test]
    fn passwords_are_masked_in_structured_output() {
        let mut p = Profile::new("http://127.0.0.1:8080");
        p.auth.password = Some("hunter2".into());
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), p);

        let value = redacted_value(&cfg).unwrap();
        assert_eq!(value["profiles"]["lab"]["auth"]["password"], "****");
        assert!(!format_config_redacted(&cfg).contains("hunter2"));
    }
}
