mod route53;

pub use route53::Route53;

use serde::Deserialize;

use crate::Result;
use crate::error::AppError;

/// A hosted zone as reported by the DNS provider.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

impl HostedZone {
    /// Zone name without the trailing root dot, lower-cased.
    pub fn normalized_name(&self) -> String {
        self.name.trim_end_matches('.').to_ascii_lowercase()
    }
}

#[async_trait::async_trait]
pub trait DNS: Send + Sync {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>>;
}

/// Extract the base domain (last two labels).
/// Examples:
/// - "example.com" -> "example.com"
/// - "www.example.com" -> "example.com"
/// - "*.api.example.com" -> "example.com"
pub fn extract_base_domain(domain: &str) -> String {
    let parts: Vec<&str> = domain.split('.').collect();

    if parts.len() >= 2 {
        format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1])
    } else {
        domain.to_string()
    }
}

/// Find the zone named exactly `domain`, falling back to its base domain.
pub fn find_zone<'a>(zones: &'a [HostedZone], domain: &str) -> Option<&'a HostedZone> {
    let domain = domain.trim_start_matches("*.").trim_end_matches('.').to_ascii_lowercase();
    let base_domain = extract_base_domain(&domain);
    zones
        .iter()
        .find(|zone| zone.normalized_name() == domain)
        .or_else(|| zones.iter().find(|zone| zone.normalized_name() == base_domain))
}

/// List the provider's zones and resolve the one that will carry the
/// challenge records for `domain`.
pub async fn resolve_zone<Client: DNS + ?Sized>(
    dns_client: &Client,
    domain: &str,
) -> Result<HostedZone> {
    let zones = dns_client.list_hosted_zones().await?;
    match find_zone(&zones, domain) {
        Some(zone) => Ok(zone.clone()),
        None => {
            let bare = domain.trim_start_matches("*.").to_string();
            Err(AppError::ZoneNotFound {
                base_domain: extract_base_domain(&bare),
                domain: bare,
            })
        }
    }
}
