pub mod acme;
pub mod aws;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod dns;
pub mod domain;
pub mod error;
pub mod process;
pub mod secret;
pub mod ssl;

pub type Result<T> = std::result::Result<T, error::AppError>;

use crate::acme::Certbot;
use crate::aws::AwsCli;
use crate::config::AppConfig;
use crate::dns::{DNS, Route53};
use crate::error::AppError;
use crate::secret::{SecretStore, SecretsManager};
use std::sync::Arc;

pub fn aws_cli(config: &AppConfig, profile: &str, region: &str) -> AwsCli {
    AwsCli::new(&config.aws_cli, profile, region)
}

pub fn dns_client(provider: &str, cli: AwsCli) -> Result<Arc<dyn DNS>> {
    match provider {
        "route53" => Ok(Arc::new(Route53::new(cli))),
        _ => Err(AppError::ConfigError(format!(
            "invalid dns provider: {}",
            provider
        ))),
    }
}

pub fn secret_store(provider: &str, cli: AwsCli) -> Result<Arc<dyn SecretStore>> {
    match provider {
        "secretsmanager" => Ok(Arc::new(SecretsManager::new(cli))),
        _ => Err(AppError::ConfigError(format!(
            "invalid secret store provider: {}",
            provider
        ))),
    }
}

/// The ACME client shares the DNS provider's credentials so its plugin can
/// publish challenge records in the same account.
pub fn acme_client(config: &AppConfig, cli: AwsCli) -> Certbot {
    Certbot::new(
        &config.acme_client,
        &config.dns_plugin,
        config.work_dir.clone(),
        cli,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_providers_are_config_errors() {
        let cli = AwsCli::new("aws", "default", "us-east-1");
        assert!(dns_client("route53", cli.clone()).is_ok());
        assert!(matches!(
            dns_client("cloudflare", cli.clone()),
            Err(AppError::ConfigError(_))
        ));
        assert!(secret_store("secretsmanager", cli.clone()).is_ok());
        assert!(matches!(
            secret_store("vault", cli),
            Err(AppError::ConfigError(_))
        ));
    }
}
