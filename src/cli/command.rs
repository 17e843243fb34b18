use chrono::Utc;
use tracing::info;

use crate::cli::args::{CheckArgs, RenewArgs};
use crate::config::AppConfig;
use crate::domain::{RenewOutcome, RenewRequest, auto_renew_certificate};
use crate::error::AppError;
use crate::process::require_executables;
use crate::secret::{CertificateSecret, SecretStore};
use crate::ssl::{CertificateInfo, parse_certificate};
use crate::{acme_client, aws_cli, dns_client, secret_store};

/// `ssu renew`: validate, then run the renewal pipeline against the real
/// collaborators.
pub async fn renew_certificate(args: &RenewArgs, config: &AppConfig) -> crate::Result<RenewOutcome> {
    let request = RenewRequest::new(
        &args.domain,
        &args.email,
        &args.secret_name,
        args.extra_args.as_deref(),
    )?;
    require_executables(&[config.acme_client.as_str(), config.aws_cli.as_str()])?;

    let aws = aws_cli(config, &args.profile, &args.region);
    let dns = dns_client(&config.dns_provider, aws.clone())?;
    let secrets = secret_store(&config.secret_provider, aws.clone())?;
    let acme = acme_client(config, aws);

    info!(
        "Renewing certificate for {} into secret {}",
        request.domain.name(),
        request.secret_name
    );
    auto_renew_certificate(&request, config, &*dns, &*secrets, &acme).await
}

/// Read a stored certificate. `None` when the secret holds placeholders.
pub async fn check_stored_certificate<Store: SecretStore + ?Sized>(
    secret_store: &Store,
    secret_name: &str,
    renew_before_days: i64,
) -> crate::Result<Option<CertificateInfo>> {
    if !secret_store.exists(secret_name).await? {
        return Err(AppError::SecretNotFound(secret_name.to_string()));
    }
    let secret = CertificateSecret::from_secret_string(&secret_store.get(secret_name).await?)?;
    if !secret.has_certificate() {
        return Ok(None);
    }
    Ok(Some(parse_certificate(
        &secret.certificate,
        renew_before_days,
        Utc::now(),
    )?))
}

/// `ssu check`
pub async fn check_certificate(
    args: &CheckArgs,
    config: &AppConfig,
) -> crate::Result<Option<CertificateInfo>> {
    require_executables(&[config.aws_cli.as_str()])?;
    let aws = aws_cli(config, &args.profile, &args.region);
    let secrets = secret_store(&config.secret_provider, aws)?;
    let renew_before_days = args.renew_before_days.unwrap_or(config.renew_before_days);
    info!("Checking certificate stored in {}", args.secret_name);
    check_stored_certificate(&*secrets, &args.secret_name, renew_before_days).await
}
