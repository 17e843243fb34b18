use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Usage Error: {0}")]
    Usage(String),

    #[error("Missing Dependency: {program} is not installed or not on PATH")]
    MissingDependency { program: String },

    #[error("Zone Not Found: no hosted zone matches {domain} or {base_domain}")]
    ZoneNotFound { domain: String, base_domain: String },

    #[error("Secret Not Found: {0}")]
    SecretNotFound(String),

    #[error("Command Error: {program} failed: {message}")]
    Command { program: String, message: String },

    #[error("Certificate Error: {0}")]
    Certificate(String),

    #[error("Artifact Error: {0}")]
    Artifact(String),

    #[error("Config Error: {0}")]
    ConfigError(String),

    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other Error: {0}")]
    Other(String),
}

impl AppError {
    /// Process exit status reported by the binary.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// True for failures that happened before anything was read from or
    /// written to the remote services.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AppError::Usage(_) | AppError::MissingDependency { .. } | AppError::ZoneNotFound { .. }
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::string::String> for AppError {
    fn from(err: std::string::String) -> Self {
        AppError::Other(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<x509_parser::nom::Err<x509_parser::error::PEMError>> for AppError {
    fn from(err: x509_parser::nom::Err<x509_parser::error::PEMError>) -> Self {
        AppError::Certificate(format!("invalid PEM: {}", err))
    }
}

impl From<x509_parser::nom::Err<x509_parser::error::X509Error>> for AppError {
    fn from(err: x509_parser::nom::Err<x509_parser::error::X509Error>) -> Self {
        AppError::Certificate(format!("invalid X.509 certificate: {}", err))
    }
}
