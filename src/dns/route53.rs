use serde::Deserialize;

use super::{DNS, HostedZone};
use crate::Result;
use crate::aws::AwsCli;

pub struct Route53 {
    pub cli: AwsCli,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListHostedZonesResponse {
    #[serde(default)]
    hosted_zones: Vec<HostedZoneRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HostedZoneRecord {
    id: String,
    name: String,
}

impl Route53 {
    pub fn new(cli: AwsCli) -> Self {
        Route53 { cli }
    }
}

fn parse_hosted_zones(output: &str) -> Result<Vec<HostedZone>> {
    let response: ListHostedZonesResponse = serde_json::from_str(output)?;
    Ok(response
        .hosted_zones
        .into_iter()
        .map(|zone| HostedZone {
            id: zone.id.trim_start_matches("/hostedzone/").to_string(),
            name: zone.name,
        })
        .collect())
}

#[async_trait::async_trait]
impl DNS for Route53 {
    async fn list_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        // The aws client follows pagination markers on its own.
        let output = self.cli.call("route53", "list-hosted-zones", &[]).await?;
        parse_hosted_zones(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hosted_zones() {
        let output = r#"{
            "HostedZones": [
                {
                    "Id": "/hostedzone/Z0123456789ABC",
                    "Name": "example.com.",
                    "CallerReference": "ref-1",
                    "Config": {"PrivateZone": false},
                    "ResourceRecordSetCount": 4
                }
            ]
        }"#;
        let zones = parse_hosted_zones(output).unwrap();
        assert_eq!(
            zones,
            vec![HostedZone {
                id: "Z0123456789ABC".to_string(),
                name: "example.com.".to_string()
            }]
        );
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_hosted_zones("{}").unwrap().is_empty());
        assert!(parse_hosted_zones("not json").is_err());
    }
}
