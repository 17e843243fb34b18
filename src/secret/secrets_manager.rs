use std::io::Write;

use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::debug;

use super::SecretStore;
use crate::Result;
use crate::aws::AwsCli;
use crate::error::AppError;

/// AWS Secrets Manager driven through the `aws` command line client.
pub struct SecretsManager {
    pub cli: AwsCli,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeSecretResponse {
    name: String,
    #[serde(default)]
    deleted_date: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueResponse {
    secret_string: Option<String>,
}

impl SecretsManager {
    pub fn new(cli: AwsCli) -> Self {
        SecretsManager { cli }
    }

    /// Write `value` to a private temporary file and hand the CLI a
    /// `file://` reference, keeping key material out of the process list.
    fn secret_file(value: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(value.as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    fn file_arg(file: &NamedTempFile) -> String {
        format!("file://{}", file.path().display())
    }
}

/// Interpret the outcome of `describe-secret`.
///
/// A missing secret is `false`; a secret scheduled for deletion still blocks
/// its name and is reported as an error.
fn secret_exists(result: Result<String>, name: &str) -> Result<bool> {
    let output = match result {
        Ok(output) => output,
        Err(AppError::Command { message, .. }) if message.contains("ResourceNotFoundException") => {
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    let response: DescribeSecretResponse = serde_json::from_str(&output)?;
    if response.deleted_date.is_some() {
        return Err(AppError::Other(format!(
            "secret {} is scheduled for deletion; restore it or pick another name",
            response.name
        )));
    }
    debug!("Secret {} described as {}", name, response.name);
    Ok(true)
}

fn secret_string(output: &str, name: &str) -> Result<String> {
    let response: GetSecretValueResponse = serde_json::from_str(output)?;
    response.secret_string.ok_or_else(|| {
        AppError::SecretNotFound(format!("secret {} has no string value", name))
    })
}

#[async_trait::async_trait]
impl SecretStore for SecretsManager {
    async fn exists(&self, name: &str) -> Result<bool> {
        let args = vec!["--secret-id".to_string(), name.to_string()];
        let result = self.cli.call("secretsmanager", "describe-secret", &args).await;
        secret_exists(result, name)
    }

    async fn create(&self, name: &str, description: &str, value: &str) -> Result<()> {
        let file = Self::secret_file(value)?;
        let args = vec![
            "--name".to_string(),
            name.to_string(),
            "--description".to_string(),
            description.to_string(),
            "--secret-string".to_string(),
            Self::file_arg(&file),
        ];
        let output = self.cli.call("secretsmanager", "create-secret", &args).await?;
        debug!("create-secret response: {}", output);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<String> {
        let args = vec!["--secret-id".to_string(), name.to_string()];
        let output = self
            .cli
            .call("secretsmanager", "get-secret-value", &args)
            .await?;
        secret_string(&output, name)
    }

    async fn put(&self, name: &str, value: &str) -> Result<()> {
        let file = Self::secret_file(value)?;
        let args = vec![
            "--secret-id".to_string(),
            name.to_string(),
            "--secret-string".to_string(),
            Self::file_arg(&file),
        ];
        let output = self
            .cli
            .call("secretsmanager", "put-secret-value", &args)
            .await?;
        debug!("put-secret-value response: {}", output);
        Ok(())
    }
}
