use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, EndpointMode, FreshnessMode};
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "ssu")]
#[command(about = "Renew TLS certificates over DNS-01 and store them in a secret store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML); `ssu.toml` is read when present
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Exit status for a failed parse: help and version requests succeed, every
/// other argument problem is a usage error.
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => AppError::Usage(err.to_string()).exit_code(),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// issue or renew a certificate and upload it to the secret store
    Renew(RenewArgs),
    /// show the certificate currently stored in a secret
    Check(CheckArgs),
    /// Show tool version
    Version,
}

#[derive(Args, Debug)]
pub struct RenewArgs {
    /// Domain to certify, `*.example.com` for a wildcard certificate
    pub domain: String,
    /// Contact email for the ACME account
    pub email: String,
    /// Cloud credentials profile
    pub profile: String,
    /// Cloud region
    pub region: String,
    /// Name of the secret that receives the certificate
    pub secret_name: String,
    /// Extra arguments appended to the ACME client invocation
    #[arg(allow_hyphen_values = true)]
    pub extra_args: Option<String>,

    /// Skip issuance while the stored certificate is fresh, or always reissue
    #[arg(long, value_enum)]
    pub freshness: Option<FreshnessMode>,
    /// Where single-name orders are sent
    #[arg(long, value_enum)]
    pub endpoint_mode: Option<EndpointMode>,
    /// Directory the ACME client writes into
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
    /// Keep local certificate files after upload
    #[arg(long)]
    pub keep_artifacts: bool,
    /// File listing the local paths removed after upload
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,
    /// Renew when fewer days than this remain
    #[arg(long)]
    pub renew_before_days: Option<i64>,
}

impl RenewArgs {
    /// Flags given on the command line win over the configuration file.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(freshness) = self.freshness {
            config.freshness = freshness;
        }
        if let Some(endpoint_mode) = self.endpoint_mode {
            config.endpoint_mode = endpoint_mode;
        }
        if let Some(work_dir) = &self.work_dir {
            config.work_dir = work_dir.clone();
        }
        if self.keep_artifacts {
            config.cleanup = false;
        }
        if let Some(ignore_file) = &self.ignore_file {
            config.ignore_file = Some(ignore_file.clone());
        }
        if let Some(days) = self.renew_before_days {
            config.renew_before_days = days;
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Cloud credentials profile
    pub profile: String,
    /// Cloud region
    pub region: String,
    /// Name of the secret to inspect
    pub secret_name: String,
    /// Days of validity a certificate needs to count as fresh
    #[arg(long)]
    pub renew_before_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_renew() {
        let cli = Cli::try_parse_from([
            "ssu",
            "renew",
            "*.example.com",
            "ops@example.com",
            "prod",
            "us-east-1",
            "example-tls",
            "--freshness",
            "always",
            "--keep-artifacts",
            "--",
            "--dry-run --key-type ecdsa",
        ])
        .unwrap();
        let Commands::Renew(args) = cli.command else {
            panic!("expected renew");
        };
        assert_eq!(args.domain, "*.example.com");
        assert_eq!(args.extra_args.as_deref(), Some("--dry-run --key-type ecdsa"));

        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.freshness, FreshnessMode::Always);
        assert_eq!(config.endpoint_mode, EndpointMode::Unified);
        assert!(!config.cleanup);
    }

    #[test]
    fn test_missing_positionals_is_usage_error() {
        let err = Cli::try_parse_from(["ssu", "renew", "example.com", "ops@example.com"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_error_exit_codes() {
        let too_few = Cli::try_parse_from(["ssu", "renew", "a", "b"]).unwrap_err();
        assert_eq!(parse_error_exit_code(&too_few), 1);

        let bad_mode = Cli::try_parse_from([
            "ssu", "renew", "example.com", "ops@example.com", "prod", "us-east-1", "tls",
            "--freshness", "sometimes",
        ])
        .unwrap_err();
        assert_eq!(parse_error_exit_code(&bad_mode), 1);

        let no_command = Cli::try_parse_from(["ssu"]).unwrap_err();
        assert_eq!(parse_error_exit_code(&no_command), 1);

        let help = Cli::try_parse_from(["ssu", "--help"]).unwrap_err();
        assert_eq!(parse_error_exit_code(&help), 0);
        let version = Cli::try_parse_from(["ssu", "--version"]).unwrap_err();
        assert_eq!(parse_error_exit_code(&version), 0);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["ssu", "-c", "ssu.toml", "check", "prod", "eu-west-1", "tls"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some("ssu.toml"));
        assert!(matches!(cli.command, Commands::Check(CheckArgs { ref secret_name, .. }) if secret_name == "tls"));
    }
}
