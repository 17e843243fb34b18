use std::path::PathBuf;

use tracing::info;

use super::{AcmeClient, ArtifactSet, IssueRequest};
use crate::Result;
use crate::aws::AwsCli;
use crate::error::AppError;
use crate::process::run_command_env;

/// certbot with a DNS plugin, confined to `work_dir`.
pub struct Certbot {
    pub program: String,
    pub dns_plugin: String,
    pub work_dir: PathBuf,
    pub aws: AwsCli,
}

impl Certbot {
    pub fn new(program: &str, dns_plugin: &str, work_dir: PathBuf, aws: AwsCli) -> Self {
        Certbot {
            program: program.to_string(),
            dns_plugin: dns_plugin.to_string(),
            work_dir,
            aws,
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.work_dir.join("config")
    }

    pub fn live_dir(&self, lineage: &str) -> PathBuf {
        self.config_dir().join("live").join(lineage)
    }

    pub fn build_args(&self, request: &IssueRequest) -> Vec<String> {
        let mut args = vec![
            "certonly".to_string(),
            format!("--{}", self.dns_plugin),
            "--non-interactive".to_string(),
            "--agree-tos".to_string(),
            "--email".to_string(),
            request.email.clone(),
            "--cert-name".to_string(),
            request.lineage().to_string(),
            // Issuance was already decided; an existing lineage must not be
            // kept because certbot's own renewal window says so.
            "--force-renewal".to_string(),
            "--config-dir".to_string(),
            self.config_dir().display().to_string(),
            "--work-dir".to_string(),
            self.work_dir.join("work").display().to_string(),
            "--logs-dir".to_string(),
            self.work_dir.join("logs").display().to_string(),
        ];
        if let Some(server) = &request.server {
            args.push("--server".to_string());
            args.push(server.clone());
        }
        for name in &request.names {
            args.push("-d".to_string());
            args.push(name.clone());
        }
        args.extend(request.extra_args.iter().cloned());
        args
    }
}

#[async_trait::async_trait]
impl AcmeClient for Certbot {
    async fn issue(&self, request: &IssueRequest) -> Result<ArtifactSet> {
        if request.names.is_empty() {
            return Err(AppError::Usage("no names to issue a certificate for".to_string()));
        }
        tokio::fs::create_dir_all(&self.work_dir).await?;
        info!(
            "Requesting certificate for {} via {}",
            request.names.join(", "),
            request.server.as_deref().unwrap_or("the default ACME server")
        );
        let args = self.build_args(request);
        let env = self.aws.env();
        run_command_env(&self.program, &args, &env).await?;

        let artifacts = ArtifactSet::in_dir(&self.live_dir(request.lineage()));
        let missing = artifacts.missing();
        if !missing.is_empty() {
            return Err(AppError::Artifact(format!(
                "{} exited successfully but {} is missing",
                self.program,
                missing[0].display()
            )));
        }
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn request(names: &[&str], server: Option<&str>) -> IssueRequest {
        IssueRequest {
            names: names.iter().map(|n| n.to_string()).collect(),
            email: "ops@example.com".to_string(),
            server: server.map(str::to_string),
            extra_args: vec!["--dry-run".to_string()],
        }
    }

    fn certbot(program: &str, work_dir: PathBuf) -> Certbot {
        Certbot::new(
            program,
            "dns-route53",
            work_dir,
            AwsCli::new("aws", "prod", "us-east-1"),
        )
    }

    #[test]
    fn test_build_args_wildcard() {
        let client = certbot("certbot", PathBuf::from("/tmp/ssu"));
        let args = client.build_args(&request(&["example.com", "*.example.com"], None));
        assert_eq!(&args[..4], ["certonly", "--dns-route53", "--non-interactive", "--agree-tos"]);
        assert!(args.windows(2).any(|w| w == ["--cert-name", "example.com"]));
        assert!(args.windows(2).any(|w| w == ["-d", "example.com"]));
        assert!(args.windows(2).any(|w| w == ["-d", "*.example.com"]));
        assert!(args.windows(2).any(|w| w == ["--config-dir", "/tmp/ssu/config"]));
        assert!(!args.contains(&"--server".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--dry-run"));
    }

    #[test]
    fn test_build_args_forces_renewal_of_kept_lineage() {
        let dir = tempdir().unwrap();
        let client = certbot("certbot", dir.path().to_path_buf());
        std::fs::create_dir_all(client.live_dir("example.com")).unwrap();
        let args = client.build_args(&request(&["example.com"], None));
        assert!(args.contains(&"--force-renewal".to_string()));
        assert!(args.windows(2).any(|w| w == ["--cert-name", "example.com"]));
    }

    #[test]
    fn test_build_args_explicit_server() {
        let client = certbot("certbot", PathBuf::from("/tmp/ssu"));
        let args = client.build_args(&request(&["example.com"], Some("https://acme.test/dir")));
        assert!(args.windows(2).any(|w| w == ["--server", "https://acme.test/dir"]));
        assert_eq!(args.iter().filter(|a| *a == "-d").count(), 1);
    }

    fn fake_certbot(dir: &std::path::Path, body: &str) -> String {
        let script = dir.join("fake-certbot");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.display().to_string()
    }

    #[tokio::test]
    async fn test_issue_returns_live_artifacts() {
        let dir = tempdir().unwrap();
        let work_dir = dir.path().join("work");
        let live = work_dir.join("config/live/example.com");
        let program = fake_certbot(
            dir.path(),
            &format!(
                "test \"$AWS_PROFILE\" = prod || exit 3\nmkdir -p {0}\nfor f in cert privkey chain fullchain; do echo $f > {0}/$f.pem; done",
                live.display()
            ),
        );
        let client = certbot(&program, work_dir);
        let artifacts = client.issue(&request(&["example.com"], None)).await.unwrap();
        assert_eq!(artifacts, ArtifactSet::in_dir(&live));
    }

    #[tokio::test]
    async fn test_issue_failure_is_command_error() {
        let dir = tempdir().unwrap();
        let program = fake_certbot(dir.path(), "echo 'challenge failed' >&2\nexit 1");
        let client = certbot(&program, dir.path().join("work"));
        let err = client.issue(&request(&["example.com"], None)).await.unwrap_err();
        match err {
            AppError::Command { message, .. } => assert!(message.contains("challenge failed")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_issue_without_output_is_artifact_error() {
        let dir = tempdir().unwrap();
        let program = fake_certbot(dir.path(), "exit 0");
        let client = certbot(&program, dir.path().join("work"));
        let err = client.issue(&request(&["example.com"], None)).await.unwrap_err();
        assert!(matches!(err, AppError::Artifact(_)));
    }
}
