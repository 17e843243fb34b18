mod secrets_manager;

pub use secrets_manager::SecretsManager;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Value written into a fresh secret until the first certificate is issued.
pub const PLACEHOLDER: &str = "NotGenerated";

/// JSON document stored as the secret value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CertificateSecret {
    #[serde(default)]
    pub certificate: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_chain: Option<String>,
}

impl CertificateSecret {
    pub fn placeholder() -> Self {
        CertificateSecret {
            certificate: PLACEHOLDER.to_string(),
            private_key: PLACEHOLDER.to_string(),
            chain: None,
            full_chain: None,
        }
    }

    /// Both the certificate and its key carry real content.
    pub fn has_certificate(&self) -> bool {
        let present = |value: &str| !value.trim().is_empty() && value.trim() != PLACEHOLDER;
        present(&self.certificate) && present(&self.private_key)
    }

    /// Single-line JSON; newlines inside PEM blocks are written as `\n`
    /// escapes and decode back unchanged.
    pub fn to_secret_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_secret_string(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }
}

#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    async fn exists(&self, name: &str) -> Result<bool>;
    async fn create(&self, name: &str, description: &str, value: &str) -> Result<()>;
    async fn get(&self, name: &str) -> Result<String>;
    async fn put(&self, name: &str, value: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEM: &str = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIU\nAbCdEf==\n-----END CERTIFICATE-----\n";

    #[test]
    fn test_placeholder_has_no_certificate() {
        let secret = CertificateSecret::placeholder();
        assert!(!secret.has_certificate());
        assert_eq!(
            secret.to_secret_string().unwrap(),
            r#"{"certificate":"NotGenerated","private_key":"NotGenerated"}"#
        );
    }

    #[test]
    fn test_secret_string_is_single_line_and_lossless() {
        let secret = CertificateSecret {
            certificate: PEM.to_string(),
            private_key: PEM.replace("CERTIFICATE", "PRIVATE KEY"),
            chain: Some(PEM.to_string()),
            full_chain: Some(format!("{PEM}{PEM}")),
        };
        let encoded = secret.to_secret_string().unwrap();
        assert!(!encoded.contains('\n'));
        assert!(encoded.contains(r"-----\nMIIB"));

        let decoded = CertificateSecret::from_secret_string(&encoded).unwrap();
        assert_eq!(decoded.certificate.as_bytes(), PEM.as_bytes());
        assert_eq!(decoded, secret);
    }

    #[test]
    fn test_space_collapsed_encoding_is_lossy() {
        let collapsed = PEM.replace('\n', " ");
        let secret = CertificateSecret {
            certificate: collapsed,
            private_key: "k".to_string(),
            chain: None,
            full_chain: None,
        };
        let decoded =
            CertificateSecret::from_secret_string(&secret.to_secret_string().unwrap()).unwrap();
        assert_ne!(decoded.certificate, PEM);
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let decoded = CertificateSecret::from_secret_string(r#"{"certificate":"x"}"#).unwrap();
        assert_eq!(decoded.private_key, "");
        assert!(!decoded.has_certificate());
        assert!(CertificateSecret::from_secret_string(r#""plain string""#).is_err());
    }
}
