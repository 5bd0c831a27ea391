//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Password, Select};
use secrecy::SecretString;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut out = cfg.clone();
    for profile in out.profiles.values_mut() {
        if profile.session_token.is_some() {
            profile.session_token = Some(MASK.into());
        }
    }
    out
}

/// Format config for display. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
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
    let _ = writeln!(
        out,
        "refresh_interval_secs = {}",
        cfg.defaults.refresh_interval_secs
    );

    let mut names: Vec<_> = cfg.profiles.iter().collect();
    names.sort_by(|a, b| a.0.cmp(b.0));
    for (name, p) in names {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref token) = p.session_token {
            let _ = writeln!(out, "session_token = \"{token}\"");
        }
        if let Some(ref env) = p.session_token_env {
            let _ = writeln!(out, "session_token_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(secs) = p.refresh_interval_secs {
            let _ = writeln!(out, "refresh_interval_secs = {secs}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply one `config set` key to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "server" => {
            parse_value::<url::Url>("server", &value, "a valid URL")?;
            profile.server = value;
        }
        "session_token" | "session-token" => profile.session_token = Some(value),
        "session_token_env" | "session-token-env" => profile.session_token_env = Some(value),
        "refresh_interval_secs" | "refresh-interval-secs" | "refresh_interval" => {
            profile.refresh_interval_secs =
                Some(parse_value(key, &value, "a number (seconds, 0 disables polling)")?);
        }
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: server, session_token, \
                     session_token_env, refresh_interval_secs, timeout, insecure, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("lodgely configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Listing server URL")
                .default("http://localhost:3000".into())
                .validate_with(|s: &String| {
                    s.parse::<url::Url>()
                        .map(|_| ())
                        .map_err(|e| format!("invalid URL: {e}"))
                })
                .interact_text()
                .map_err(prompt_err)?;

            let token = Password::new()
                .with_prompt("Session token (leave empty for read-only)")
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_err)?;

            let session_token = if token.is_empty() {
                None
            } else {
                let choices = &[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ];
                let selection = Select::new()
                    .with_prompt("Where to store the session token?")
                    .items(choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;
                if selection == 0 {
                    config::store_session_token(&profile_name, &SecretString::from(token))?;
                    eprintln!("   ✓ Session token stored in system keyring");
                    None
                } else {
                    Some(token)
                }
            };

            let refresh_interval_secs: u64 = Input::new()
                .with_prompt("Refresh interval (seconds)")
                .default(5)
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                server,
                session_token,
                refresh_interval_secs: Some(refresh_interval_secs),
                ..Profile::default()
            };

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
            eprintln!("\n  Test it: lodgely listings list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            let token = Password::new()
                .with_prompt("Session token")
                .interact()
                .map_err(prompt_err)?;
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "session_token".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            config::store_session_token(&profile_name, &SecretString::from(token))?;

            eprintln!("✓ Session token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "local".into(),
            Profile {
                server: "http://localhost:3000".into(),
                session_token: Some("secret-token".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn show_masks_plaintext_tokens() {
        let text = format_config(&redacted(&sample()));
        assert!(text.contains("[profiles.local]"));
        assert!(text.contains("session_token = \"****\""));
        assert!(!text.contains("secret-token"));
    }

    #[test]
    fn json_show_is_redacted_too() {
        let json = serde_json::to_string(&redacted(&sample())).unwrap();
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn set_key_parses_typed_values() {
        let mut profile = Profile::default();
        set_key(&mut profile, "refresh_interval_secs", "10".into()).unwrap();
        set_key(&mut profile, "insecure", "true".into()).unwrap();
        set_key(&mut profile, "server", "http://localhost:3000".into()).unwrap();
        assert_eq!(profile.refresh_interval_secs, Some(10));
        assert_eq!(profile.insecure, Some(true));
        assert_eq!(profile.server, "http://localhost:3000");
    }

    #[test]
    fn set_key_rejects_bad_input() {
        let mut profile = Profile::default();
        assert!(matches!(
            set_key(&mut profile, "timeout", "soon".into()),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(
            set_key(&mut profile, "colour", "red".into()),
            Err(CliError::Validation { ref field, .. }) if field == "colour"
        ));
        assert!(profile.timeout.is_none());
    }
}
