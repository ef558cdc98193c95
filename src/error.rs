// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KubeConfigError {
    #[error("unknown version: {found}")]
    UnsupportedVersion { found: String },

    #[error("{kind} not found: {name:?}")]
    Reference { kind: &'static str, name: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token for user {user:?} is expired and no cmd-path is configured")]
    ExpiredCredential { user: String },

    #[error("failed to refresh token: `{command}` exited with {status}: {output}")]
    RefreshCommand {
        command: String,
        status: String,
        output: String,
    },

    #[error("malformed refresh output: {reason}")]
    MalformedRefreshOutput { reason: String },

    #[error("invalid base64 in {field}: {source}")]
    InvalidMaterial {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("invalid certificate: {reason}")]
    InvalidCertificate { reason: String },

    #[error("failed to parse kubeconfig: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("environment variable {key} is not set")]
    MissingEnvironment { key: &'static str },

    #[error("invalid server url {server:?}: {source}")]
    InvalidServer {
        server: String,
        #[source]
        source: url::ParseError,
    },

    #[error("TLS setup failed: {0}")]
    Tls(#[from] openssl::error::ErrorStack),
}

impl KubeConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn reference(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Reference {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedRefreshOutput {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KubeConfigError>;
