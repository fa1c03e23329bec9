//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Select};
use secrecy::SecretString;

use easysmart_core::{DEFAULT_SCAN_INTERVAL, DEFAULT_TIMEOUT, DEFAULT_USERNAME, Switch, SwitchConfig};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with every plaintext password masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// Render config as TOML-ish text. Expects an already redacted config.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = write!(out, "scan_interval = {}", cfg.defaults.scan_interval);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out, "\n");
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "host = \"{}\"", p.host);
        let _ = write!(out, "username = \"{}\"", p.username);
        if let Some(ref password) = p.password {
            let _ = write!(out, "\npassword = \"{password}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = write!(out, "\npassword_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = write!(out, "\ntimeout = {timeout}");
        }
        if let Some(interval) = p.scan_interval {
            let _ = write!(out, "\nscan_interval = {interval}");
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

fn prompt_password(prompt: &str) -> Result<String, CliError> {
    let password = rpassword::prompt_password(prompt).map_err(prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(password)
}

fn profile_missing(name: &str, cfg: &Config) -> CliError {
    CliError::ProfileNotFound {
        name: name.into(),
        available: config::available_profiles(cfg),
    }
}

/// Log in and read one round of port data with the new credentials.
async fn check_switch(host: &str, username: &str, password: &str) -> Result<usize, CliError> {
    let switch_config = SwitchConfig {
        host: host.into(),
        username: username.into(),
        password: SecretString::from(password),
        timeout: DEFAULT_TIMEOUT,
        scan_interval: DEFAULT_SCAN_INTERVAL,
    };
    let switch = Switch::new(switch_config)?;
    let poll = switch.verify().await;
    switch.close();
    Ok(poll?.port_count())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global).await,

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: easysmart config init");
            } else {
                for (name, profile) in &cfg.profiles {
                    let marker = if *name == active { " *" } else { "" };
                    println!("{name}{marker}\t{}", profile.host);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_missing(&name, &cfg));
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_missing(&profile_name, &cfg));
            }

            let password = prompt_password("Password: ")?;
            config::store_password(&profile_name, &SecretString::from(password))?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Interactive wizard: prompt, verify against the switch, merge into
/// the existing config file.
async fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("easysmart configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut cfg = config::load_config_or_default();

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Switch address
    let host: String = Input::new()
        .with_prompt("Switch address")
        .default(global.host.clone().unwrap_or_else(|| "192.168.0.1".into()))
        .interact_text()
        .map_err(prompt_err)?;
    let host = easysmart_config::validate_host(&host)?;

    // 3. Credentials
    let username: String = Input::new()
        .with_prompt("Username")
        .default(DEFAULT_USERNAME.into())
        .interact_text()
        .map_err(prompt_err)?;
    let password = prompt_password("Password: ")?;

    // 4. Try them
    eprintln!("\n   Checking {host} ...");
    match check_switch(&host, &username, &password).await {
        Ok(ports) => eprintln!("   ✓ Logged in, {ports} ports found\n"),
        Err(e) => {
            eprintln!("   ✗ {e}\n");
            let keep = Confirm::new()
                .with_prompt("Save this profile anyway?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;
            if !keep {
                return Err(e);
            }
        }
    }

    // 5. Password storage
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

    let mut profile = Profile::new(host);
    profile.username = username;
    if selection == 0 {
        config::store_password(&profile_name, &SecretString::from(password))?;
        eprintln!("   ✓ Password stored in system keyring");
    } else {
        profile.password = Some(password);
    }

    // 6. Merge and write
    cfg.profiles.insert(profile_name.clone(), profile);
    let default_exists = cfg
        .default_profile
        .as_ref()
        .is_some_and(|name| cfg.profiles.contains_key(name));
    if !default_exists {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: easysmart -p {profile_name} ports");
    Ok(())
}
