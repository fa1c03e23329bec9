//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use easysmart_config::ConfigError;
use easysmart_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the switch: {reason}")]
    #[diagnostic(
        code(easysmart::connection_failed),
        help(
            "Check that the switch is powered on and its web UI answers over HTTP.\n\
             Try: easysmart --host <address> --timeout 20 info"
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(easysmart::auth_failed),
        help(
            "The switch rejected the session. Verify the username and password,\n\
             and make sure nobody else is logged in to the web UI.\n\
             Run: easysmart config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(easysmart::no_credentials),
        help(
            "Configure one with: easysmart config init\n\
             Or set the EASYSMART_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Switch data ──────────────────────────────────────────────────
    #[error("Unrecognized switch response: {message}")]
    #[diagnostic(
        code(easysmart::unsupported_firmware),
        help(
            "The switch answered, but its pages are not in a known layout.\n\
             Run with -vvv and include the firmware version from `easysmart info`\n\
             when reporting this."
        )
    )]
    UnsupportedFirmware { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(easysmart::not_found),
        help("Run: easysmart {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(easysmart::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(easysmart::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: easysmart config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No switch configured")]
    #[diagnostic(
        code(easysmart::no_config),
        help(
            "Create a profile with: easysmart config init\n\
             Or pass --host (EASYSMART_HOST) directly.\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(easysmart::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::UnsupportedFirmware { .. } => exit_code::UNSUPPORTED,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::NoConfig { .. } | Self::Config { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CannotConnect { reason } => CliError::ConnectionFailed { reason },
            CoreError::InvalidAuth { message } => CliError::AuthFailed { message },
            CoreError::MalformedResponse { message } => CliError::UnsupportedFirmware { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(see: easysmart config profiles)".into(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_)
            | ConfigError::Figment(_)
            | ConfigError::Keyring(_)) => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_distinct_exit_codes() {
        let connect: CliError = CoreError::CannotConnect {
            reason: "timed out".into(),
        }
        .into();
        let auth: CliError = CoreError::InvalidAuth {
            message: "HTTP 401".into(),
        }
        .into();
        let malformed: CliError = CoreError::MalformedResponse {
            message: "no max_port_num".into(),
        }
        .into();

        assert_eq!(connect.exit_code(), exit_code::CONNECTION);
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(malformed.exit_code(), exit_code::UNSUPPORTED);
    }

    #[test]
    fn config_errors_keep_their_meaning() {
        let missing: CliError = ConfigError::NoCredentials {
            profile: "lab".into(),
        }
        .into();
        assert!(matches!(missing, CliError::NoCredentials { ref profile } if profile == "lab"));
        assert_eq!(missing.exit_code(), exit_code::AUTH);

        let invalid: CliError = ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        }
        .into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
    }
}
