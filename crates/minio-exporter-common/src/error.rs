use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("invalid MinIO URI: {0}")]
    InvalidEndpoint(String),
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("{operation} request failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} returned status {status}: {code}: {message}")]
    UpstreamStatus {
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("metric already registered: {0}")]
    AlreadyRegistered(String),
    #[error("metric {name} expects {expected} label values, got {actual}")]
    LabelCardinality {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("internal error: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExporterError {
    /// Name of the upstream call that produced this error, if any.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Transport { operation, .. }
            | Self::UpstreamStatus { operation, .. }
            | Self::Decode { operation, .. } => Some(operation),
            _ => None,
        }
    }

    pub fn is_upstream(&self) -> bool {
        self.operation().is_some()
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
