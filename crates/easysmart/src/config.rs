//! CLI configuration: thin wrapper around `easysmart_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--host,
//! --username, --timeout, --profile).

use easysmart_core::SwitchConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use easysmart_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `SwitchConfig` from the config file, active profile and flags.
///
/// Flags win over the profile. Without any profile, `--host` alone is
/// enough as long as a password can be found in the environment or keyring.
pub fn resolve_switch_config(global: &GlobalOpts) -> Result<SwitchConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    resolve_with(global, &cfg, &profile_name)
}

fn resolve_with(
    global: &GlobalOpts,
    cfg: &Config,
    profile_name: &str,
) -> Result<SwitchConfig, CliError> {
    let mut profile = match cfg.profiles.get(profile_name) {
        Some(profile) => profile.clone(),
        None if global.host.is_none() && global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name.into(),
                available: available_profiles(cfg),
            });
        }
        None => Profile::new(global.host.clone().ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?),
    };

    // Flags (and their env vars) win over the profile
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }

    Ok(easysmart_config::profile_to_switch_config(
        &profile,
        profile_name,
        &cfg.defaults,
    )?)
}
