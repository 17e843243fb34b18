use std::path::PathBuf;

use clap::ValueEnum;
use config::{Config, Environment, File};
use serde::Deserialize;

/// What to do when the secret already holds a certificate.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessMode {
    /// Skip issuance while the stored certificate is still fresh.
    Check,
    /// Reissue on every run.
    Always,
}

/// Which ACME directory single-name orders go to.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EndpointMode {
    /// Every order uses the default directory.
    Unified,
    /// Single-name orders explicitly target the alternate directory.
    Split,
}

pub const DEFAULT_ACME_SERVER: &str = "https://acme-v02.api.letsencrypt.org/directory";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub acme_client: String,
    pub aws_cli: String,
    pub dns_provider: String,
    pub secret_provider: String,
    pub dns_plugin: String,
    pub work_dir: PathBuf,
    pub freshness: FreshnessMode,
    pub endpoint_mode: EndpointMode,
    #[serde(default)]
    pub acme_server: Option<String>,
    pub alternate_acme_server: String,
    pub renew_before_days: i64,
    pub cleanup: bool,
    #[serde(default)]
    pub ignore_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            acme_client: "certbot".to_string(),
            aws_cli: "aws".to_string(),
            dns_provider: "route53".to_string(),
            secret_provider: "secretsmanager".to_string(),
            dns_plugin: "dns-route53".to_string(),
            work_dir: PathBuf::from("."),
            freshness: FreshnessMode::Check,
            endpoint_mode: EndpointMode::Unified,
            acme_server: None,
            alternate_acme_server: DEFAULT_ACME_SERVER.to_string(),
            renew_before_days: 30,
            cleanup: true,
            ignore_file: None,
        }
    }
}

impl AppConfig {
    /// Ignore file listing what cleanup removes.
    pub fn ignore_file_path(&self) -> PathBuf {
        match &self.ignore_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.work_dir.join(path),
            None => self.work_dir.join(".gitignore"),
        }
    }
}

/// Load defaults, then the TOML file (explicit path, or `ssu.toml` when
/// present), then `SSU_*` environment variables.
pub fn get_all_config(config_path: Option<&str>) -> crate::Result<AppConfig> {
    get_config_with_env(config_path, "SSU")
}

fn get_config_with_env(config_path: Option<&str>, env_prefix: &str) -> crate::Result<AppConfig> {
    let defaults = AppConfig::default();
    let file = match config_path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name("ssu").required(false),
    };
    let config_builder = Config::builder()
        .set_default("acme_client", defaults.acme_client)?
        .set_default("aws_cli", defaults.aws_cli)?
        .set_default("dns_provider", defaults.dns_provider)?
        .set_default("secret_provider", defaults.secret_provider)?
        .set_default("dns_plugin", defaults.dns_plugin)?
        .set_default("work_dir", defaults.work_dir.display().to_string())?
        .set_default("freshness", "check")?
        .set_default("endpoint_mode", "unified")?
        .set_default("alternate_acme_server", defaults.alternate_acme_server)?
        .set_default("renew_before_days", defaults.renew_before_days)?
        .set_default("cleanup", defaults.cleanup)?
        .add_source(file)
        .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
        .build()?;

    let config: AppConfig = config_builder.try_deserialize()?;
    if config.renew_before_days < 0 {
        return Err(crate::error::AppError::ConfigError(
            "renew_before_days must not be negative".to_string(),
        ));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File as StdFile;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_get_all_config() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test_config.toml");

        let config_content = r#"
            work_dir = "/var/lib/ssu"
            freshness = "always"
            endpoint_mode = "split"
            renew_before_days = 14
            cleanup = false
            ignore_file = "artifacts.ignore"
        "#;

        let mut file = StdFile::create(&file_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config =
            get_config_with_env(Some(file_path.to_str().unwrap()), "SSU_TEST_UNSET").unwrap();

        assert_eq!(config.work_dir, PathBuf::from("/var/lib/ssu"));
        assert_eq!(config.freshness, FreshnessMode::Always);
        assert_eq!(config.endpoint_mode, EndpointMode::Split);
        assert_eq!(config.renew_before_days, 14);
        assert!(!config.cleanup);
        assert_eq!(config.acme_client, "certbot");
        assert_eq!(
            config.ignore_file_path(),
            PathBuf::from("/var/lib/ssu/artifacts.ignore")
        );
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nothing-here");
        let config = get_config_with_env(None, "SSU_TEST_UNSET").unwrap();
        assert_eq!(config.freshness, FreshnessMode::Check);
        assert_eq!(config.endpoint_mode, EndpointMode::Unified);
        assert_eq!(config.renew_before_days, 30);
        assert!(config.cleanup);
        assert_eq!(config.ignore_file_path(), PathBuf::from("./.gitignore"));

        assert!(get_config_with_env(Some(missing.to_str().unwrap()), "SSU_TEST_UNSET").is_err());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        std::fs::write(&file_path, "freshness = \"sometimes\"\n").unwrap();
        assert!(get_config_with_env(Some(file_path.to_str().unwrap()), "SSU_TEST_UNSET").is_err());
    }
}
