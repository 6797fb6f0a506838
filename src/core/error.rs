//! Error handling for the reporting pipeline
//!
//! One error enum per pipeline stage, plus [`ReportError`] which wraps them
//! for callers that want a single type with recovery guidance.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or using a credential
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid credential: {0}")]
    Invalid(String),

    #[error("access token exchange failed: {0}")]
    Exchange(String),
}

/// Errors raised while binding a client handle
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("required configuration field is missing: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Errors raised while executing a search query
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("query rejected: {0}")]
    InvalidQuery(String),

    #[error("not authorized for account {account_id}: {message}")]
    AccountUnauthorized { account_id: String, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<CredentialError> for QueryError {
    fn from(err: CredentialError) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("environment variable {0} referenced in config is not set")]
    MissingEnvVar(String),
}

/// Umbrella error for the whole pipeline
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ReportError {
    /// Check if retrying the same call later could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Query(QueryError::Transport(_))
                | Self::Credential(CredentialError::Exchange(_))
                | Self::Client(ClientError::Credential(CredentialError::Exchange(_)))
        )
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(ConfigError::Read { .. }) => "CONFIG_READ",
            Self::Config(ConfigError::Parse(_)) => "CONFIG_PARSE",
            Self::Config(ConfigError::MissingEnvVar(_)) => "CONFIG_MISSING_ENV_VAR",
            Self::Credential(err) | Self::Client(ClientError::Credential(err)) => match err {
                CredentialError::NotFound(_) => "CREDENTIAL_NOT_FOUND",
                CredentialError::Invalid(_) => "CREDENTIAL_INVALID",
                CredentialError::Exchange(_) => "CREDENTIAL_EXCHANGE",
            },
            Self::Client(ClientError::MissingField(_)) => "MISSING_FIELD",
            Self::Client(ClientError::InvalidField { .. }) => "INVALID_FIELD",
            Self::Query(QueryError::Transport(_)) => "TRANSPORT",
            Self::Query(QueryError::InvalidQuery(_)) => "INVALID_QUERY",
            Self::Query(QueryError::AccountUnauthorized { .. }) => "ACCOUNT_UNAUTHORIZED",
            Self::Query(QueryError::MalformedResponse(_)) => "MALFORMED_RESPONSE",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::Config(ConfigError::Read { .. }) => {
                vec!["Check the config path exists and is readable"]
            }
            Self::Config(ConfigError::Parse(_)) => vec!["Check the YAML syntax of the config file"],
            Self::Config(ConfigError::MissingEnvVar(_)) => {
                vec!["Export the referenced environment variable"]
            }
            Self::Credential(err) | Self::Client(ClientError::Credential(err)) => match err {
                CredentialError::NotFound(_) => vec![
                    "Download the service account JSON key from Google Cloud Console",
                    "Point service_account_file (or ADS_SERVICE_ACCOUNT_FILE) at it",
                ],
                CredentialError::Invalid(_) => vec![
                    "Verify the service account JSON file is correct",
                    "Make sure the key has not been revoked",
                ],
                CredentialError::Exchange(_) => vec![
                    "Check network access to the token endpoint",
                    "Make sure the key has not been revoked",
                ],
            },
            Self::Client(ClientError::MissingField(_) | ClientError::InvalidField { .. }) => {
                vec!["Check developer_token and the 10-digit account ids in the config"]
            }
            Self::Query(QueryError::Transport(_)) => {
                vec!["Check your internet connection and try again later"]
            }
            Self::Query(QueryError::InvalidQuery(_)) => {
                vec!["Check the query against the GAQL reference"]
            }
            Self::Query(QueryError::AccountUnauthorized { .. }) => vec![
                "Ensure the service account has Google Ads API access",
                "Check that the service account is linked to the Google Ads account",
            ],
            Self::Query(QueryError::MalformedResponse(_)) => vec![
                "Check api_version is supported",
                "Re-run with --verbose for details",
            ],
        }
    }
}
