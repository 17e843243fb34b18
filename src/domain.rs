use chrono::Utc;
use tracing::{debug, info, warn};

use crate::acme::{AcmeClient, IssueRequest};
use crate::cleanup::remove_ignored_paths;
use crate::config::{AppConfig, FreshnessMode};
use crate::dns::{DNS, extract_base_domain, resolve_zone};
use crate::error::AppError;
use crate::secret::{CertificateSecret, SecretStore};
use crate::ssl::parse_certificate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    bare_name: String,
}

impl Domain {
    /// Normalise and validate a domain argument.
    ///
    /// A single leading `*.` label marks a wildcard; `*` anywhere else is
    /// rejected.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let name = input.trim().trim_end_matches('.').to_ascii_lowercase();
        let bare_name = name.strip_prefix("*.").unwrap_or(&name).to_string();
        if bare_name.is_empty() || !bare_name.contains('.') {
            return Err(AppError::Usage(format!(
                "invalid domain {:?}: expected a dotted name such as example.com",
                input
            )));
        }
        if bare_name.contains('*')
            || bare_name.split('.').any(|label| label.is_empty())
            || bare_name.chars().any(char::is_whitespace)
        {
            return Err(AppError::Usage(format!(
                "invalid domain {:?}: only a single leading *. label is allowed",
                input
            )));
        }
        Ok(Domain { name, bare_name })
    }

    pub fn name(&self) -> String {
        self.name.clone()
    }

    /// The domain without its wildcard label.
    pub fn bare_name(&self) -> String {
        self.bare_name.clone()
    }

    pub fn base_domain(&self) -> String {
        extract_base_domain(&self.bare_name)
    }

    pub fn is_wildcard(&self) -> bool {
        self.name.starts_with("*.")
    }

    /// Subject alternative names to request.
    pub fn certificate_names(&self) -> Vec<String> {
        if self.is_wildcard() {
            vec![self.bare_name.clone(), format!("*.{}", self.bare_name)]
        } else {
            vec![self.name.clone()]
        }
    }
}

/// Everything a single renewal run needs besides the collaborators.
#[derive(Debug, Clone)]
pub struct RenewRequest {
    pub domain: Domain,
    pub email: String,
    pub secret_name: String,
    pub extra_args: Vec<String>,
}

impl RenewRequest {
    pub fn new(
        domain: &str,
        email: &str,
        secret_name: &str,
        extra_args: Option<&str>,
    ) -> crate::Result<Self> {
        let domain = Domain::parse(domain)?;
        let email = email.trim();
        if !email.contains('@') {
            return Err(AppError::Usage(format!("invalid contact email {:?}", email)));
        }
        let secret_name = secret_name.trim();
        if secret_name.is_empty() {
            return Err(AppError::Usage("secret name must not be empty".to_string()));
        }
        Ok(RenewRequest {
            domain,
            email: email.to_string(),
            secret_name: secret_name.to_string(),
            extra_args: extra_args
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewOutcome {
    /// The stored certificate has enough validity left; nothing was issued.
    StillFresh { days_remaining: i64 },
    /// A new certificate was issued and uploaded.
    Renewed { names: Vec<String> },
}

/// Make sure the secret exists. Returns `true` when it was already there.
pub async fn ensure_secret<Store: SecretStore + ?Sized>(
    secret_store: &Store,
    secret_name: &str,
    domain: &Domain,
) -> crate::Result<bool> {
    if secret_store.exists(secret_name).await? {
        info!("Secret {} exists", secret_name);
        return Ok(true);
    }
    info!("Secret {} not found, creating it with placeholder values", secret_name);
    let description = format!("SSL certificate for {}", domain.name());
    let placeholder = CertificateSecret::placeholder().to_secret_string()?;
    secret_store
        .create(secret_name, &description, &placeholder)
        .await?;
    Ok(false)
}

/// Remaining days of the stored certificate when it is still fresh.
pub async fn stored_certificate_days<Store: SecretStore + ?Sized>(
    secret_store: &Store,
    secret_name: &str,
    renew_before_days: i64,
) -> crate::Result<Option<i64>> {
    let value = match secret_store.get(secret_name).await {
        Ok(value) => value,
        Err(AppError::SecretNotFound(reason)) => {
            warn!("Secret {} has no readable value: {}", secret_name, reason);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let secret = match CertificateSecret::from_secret_string(&value) {
        Ok(secret) => secret,
        Err(e) => {
            warn!("Secret {} does not hold certificate JSON: {}", secret_name, e);
            return Ok(None);
        }
    };
    if !secret.has_certificate() {
        info!("Secret {} holds no certificate yet", secret_name);
        return Ok(None);
    }
    match parse_certificate(&secret.certificate, renew_before_days, Utc::now()) {
        Ok(info) => {
            info!(
                "Stored certificate for {} expires {} ({} days remaining)",
                info.subject(),
                info.valid_to().format("%Y-%m-%d %H:%M"),
                info.days_remaining()
            );
            Ok((!info.need_update()).then_some(info.days_remaining()))
        }
        Err(e) => {
            warn!("Stored certificate in {} is unreadable: {}", secret_name, e);
            Ok(None)
        }
    }
}

/// Run one renewal: zone check, secret bootstrap, freshness check, issuance,
/// upload and cleanup. Stops at the first failure.
pub async fn auto_renew_certificate<Dns, Store, Acme>(
    request: &RenewRequest,
    config: &AppConfig,
    dns_client: &Dns,
    secret_store: &Store,
    acme_client: &Acme,
) -> crate::Result<RenewOutcome>
where
    Dns: DNS + ?Sized,
    Store: SecretStore + ?Sized,
    Acme: AcmeClient + ?Sized,
{
    let domain = &request.domain;

    info!("Checking hosted zone for {}", domain.name());
    let zone = resolve_zone(dns_client, &domain.name()).await?;
    info!("Using hosted zone {} ({})", zone.name, zone.id);

    info!("Checking secret {}", request.secret_name);
    let existed = ensure_secret(secret_store, &request.secret_name, domain).await?;

    if existed && config.freshness == FreshnessMode::Check {
        if let Some(days_remaining) =
            stored_certificate_days(secret_store, &request.secret_name, config.renew_before_days)
                .await?
        {
            info!(
                "Certificate in {} is valid for {} more days, skipping renewal",
                request.secret_name, days_remaining
            );
            return Ok(RenewOutcome::StillFresh { days_remaining });
        }
    }

    let issue_request = IssueRequest::new(domain, &request.email, &request.extra_args, config);
    info!("Issuing certificate for {}", issue_request.names.join(", "));
    let artifacts = acme_client.issue(&issue_request).await?;
    debug!("Certificate artifacts: {:?}", artifacts);

    info!("Uploading certificate to secret {}", request.secret_name);
    let secret = artifacts.read().await?;
    secret_store
        .put(&request.secret_name, &secret.to_secret_string()?)
        .await?;

    if config.cleanup {
        let ignore_file = config.ignore_file_path();
        info!("Removing local artifacts listed in {}", ignore_file.display());
        let removed = remove_ignored_paths(&config.work_dir, &ignore_file).await?;
        debug!("Removed {:?}", removed);
    }

    Ok(RenewOutcome::Renewed {
        names: issue_request.names,
    })
}
