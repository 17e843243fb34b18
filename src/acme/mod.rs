mod certbot;

pub use certbot::Certbot;

use std::path::{Path, PathBuf};

use crate::Result;
use crate::config::{AppConfig, EndpointMode};
use crate::domain::Domain;
use crate::error::AppError;
use crate::secret::CertificateSecret;

/// One certificate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Names to put on the certificate; the first one names the lineage.
    pub names: Vec<String>,
    pub email: String,
    /// Explicit ACME directory URL, `None` leaves the client on its default.
    pub server: Option<String>,
    pub extra_args: Vec<String>,
}

impl IssueRequest {
    pub fn new(domain: &Domain, email: &str, extra_args: &[String], config: &AppConfig) -> Self {
        IssueRequest {
            names: domain.certificate_names(),
            email: email.to_string(),
            server: select_server(domain, config),
            extra_args: extra_args.to_vec(),
        }
    }

    pub fn lineage(&self) -> &str {
        self.names
            .first()
            .map(|name| name.trim_start_matches("*."))
            .unwrap_or_default()
    }
}

/// Pick the ACME directory for `domain`.
///
/// Wildcard orders always go to the default endpoint. Single-name orders go
/// to the alternate endpoint only in split mode.
pub fn select_server(domain: &Domain, config: &AppConfig) -> Option<String> {
    if !domain.is_wildcard() && config.endpoint_mode == EndpointMode::Split {
        return Some(config.alternate_acme_server.clone());
    }
    config.acme_server.clone()
}

/// Paths of the PEM files an issuance leaves on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
    pub chain: PathBuf,
    pub full_chain: PathBuf,
}

impl ArtifactSet {
    pub fn in_dir(dir: &Path) -> Self {
        ArtifactSet {
            certificate: dir.join("cert.pem"),
            private_key: dir.join("privkey.pem"),
            chain: dir.join("chain.pem"),
            full_chain: dir.join("fullchain.pem"),
        }
    }

    fn paths(&self) -> [&Path; 4] {
        [
            &self.certificate,
            &self.private_key,
            &self.chain,
            &self.full_chain,
        ]
    }

    pub fn missing(&self) -> Vec<PathBuf> {
        self.paths()
            .into_iter()
            .filter(|path| !path.is_file())
            .map(Path::to_path_buf)
            .collect()
    }

    /// Read all four files into the secret document.
    pub async fn read(&self) -> Result<CertificateSecret> {
        let missing = self.missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            return Err(AppError::Artifact(format!(
                "certificate files not found: {}",
                names.join(", ")
            )));
        }
        Ok(CertificateSecret {
            certificate: tokio::fs::read_to_string(&self.certificate).await?,
            private_key: tokio::fs::read_to_string(&self.private_key).await?,
            chain: Some(tokio::fs::read_to_string(&self.chain).await?),
            full_chain: Some(tokio::fs::read_to_string(&self.full_chain).await?),
        })
    }
}

#[async_trait::async_trait]
pub trait AcmeClient: Send + Sync {
    /// Run a DNS-01 order and return where the results were written.
    async fn issue(&self, request: &IssueRequest) -> Result<ArtifactSet>;
}
