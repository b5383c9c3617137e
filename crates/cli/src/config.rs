//! Command-line configuration.
//!
//! Every option can also be supplied through the environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BUREAU_CATALOG` | (required) | Path to the access catalog JSON |
//! | `BUREAU_SESSION` | (required) | Path to the session JSON |
//! | `BUREAU_LOG_LEVEL` | info | Log level |
//! | `BUREAU_PRETTY_OUTPUT` | false | Pretty-print JSON output |

use std::path::PathBuf;

use bureau_access::permission::Action;
use clap::{Parser, Subcommand};

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Configuration for the `bureau` command.
#[derive(Debug, Clone, Parser)]
#[command(name = "bureau")]
#[command(about = "Inspect access decisions for a bureau console session")]
#[command(version)]
pub struct CliConfig {
    /// Path to the access catalog (tenants, modules, roles, menu).
    #[arg(long, env = "BUREAU_CATALOG")]
    pub catalog: PathBuf,

    /// Path to the session document issued by the login layer.
    #[arg(long, env = "BUREAU_SESSION")]
    pub session: PathBuf,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "BUREAU_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Pretty-print JSON output.
    #[arg(long, env = "BUREAU_PRETTY_OUTPUT")]
    pub pretty: bool,

    /// What to inspect.
    #[command(subcommand)]
    pub command: Command,
}

/// Inspection commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the session's effective permissions.
    Permissions,

    /// Check a single permission.
    Check {
        /// Module name.
        module: String,
        /// Action (view, create, edit, delete, approve, export, import, manage).
        action: Action,
        /// Restrict the check to one resource type.
        #[arg(long)]
        resource_type: Option<String>,
    },

    /// List the roles a role may provision.
    ManagedRoles {
        /// Role to inspect; defaults to every role the session holds.
        role: Option<String>,
    },

    /// Print the navigation menu visible to the session.
    Menu,

    /// Filter a record file to the session's effective scope.
    Scope {
        /// Drill down to a zone.
        #[arg(long)]
        zone: Option<String>,
        /// Drill down to a woreda.
        #[arg(long)]
        woreda: Option<String>,
        /// Drill down to a school.
        #[arg(long)]
        school: Option<String>,
        /// JSON array of records carrying a `tenantId` field.
        #[arg(long)]
        records: PathBuf,
        /// Module whose grant decides the scope.
        #[arg(long)]
        module: String,
        /// Action whose grant decides the scope.
        #[arg(long, default_value = "view")]
        action: Action,
    },
}

impl CliConfig {
    /// Validates the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !self.catalog.is_file() {
            errors.push(format!("Catalog file not found: {}", self.catalog.display()));
        }

        if !self.session.is_file() {
            errors.push(format!("Session file not found: {}", self.session.display()));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            errors.push(format!("Unknown log level: {}", self.log_level));
        }

        if let Command::Scope { records, .. } = &self.command {
            if !records.is_file() {
                errors.push(format!("Records file not found: {}", records.display()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
