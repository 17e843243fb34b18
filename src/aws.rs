use crate::Result;
use crate::process::run_command;

/// Invocation context for the `aws` command line client.
#[derive(Debug, Clone)]
pub struct AwsCli {
    pub program: String,
    pub profile: String,
    pub region: String,
}

impl AwsCli {
    pub fn new(program: &str, profile: &str, region: &str) -> Self {
        AwsCli {
            program: program.to_string(),
            profile: profile.to_string(),
            region: region.to_string(),
        }
    }

    /// Arguments appended to every call: credentials profile, region and JSON
    /// output.
    pub fn common_args(&self) -> Vec<String> {
        vec![
            "--profile".to_string(),
            self.profile.clone(),
            "--region".to_string(),
            self.region.clone(),
            "--output".to_string(),
            "json".to_string(),
        ]
    }

    /// Run `aws <service> <operation> <args..>` and return stdout.
    pub async fn call(&self, service: &str, operation: &str, args: &[String]) -> Result<String> {
        let mut full_args = vec![service.to_string(), operation.to_string()];
        full_args.extend(args.iter().cloned());
        full_args.extend(self.common_args());
        run_command(&self.program, &full_args).await
    }

    /// Environment that points other AWS-aware tools at the same account.
    pub fn env(&self) -> Vec<(&str, &str)> {
        vec![
            ("AWS_PROFILE", self.profile.as_str()),
            ("AWS_REGION", self.region.as_str()),
            ("AWS_DEFAULT_REGION", self.region.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_args() {
        let cli = AwsCli::new("aws", "prod", "eu-west-1");
        assert_eq!(
            cli.common_args(),
            vec!["--profile", "prod", "--region", "eu-west-1", "--output", "json"]
        );
        assert!(cli.env().contains(&("AWS_DEFAULT_REGION", "eu-west-1")));
    }

    #[tokio::test]
    async fn test_call_builds_command_line() {
        // `echo` stands in for the aws binary so the argument order is visible.
        let cli = AwsCli::new("echo", "prod", "eu-west-1");
        let output = cli
            .call("route53", "list-hosted-zones", &[])
            .await
            .unwrap();
        assert_eq!(
            output,
            "route53 list-hosted-zones --profile prod --region eu-west-1 --output json"
        );
    }
}
