use std::fmt;

use minio_exporter_common::error::{ExporterError, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Builds static credentials from a configured key pair.
    ///
    /// An empty pair yields `None` and requests go out unsigned. Setting only one
    /// half of the pair is a configuration error.
    pub fn from_pair(access_key: &str, secret_key: &str) -> Result<Option<Self>> {
        match (access_key.is_empty(), secret_key.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => Ok(Some(Self::new(access_key, secret_key))),
            (true, false) => Err(ExporterError::InvalidCredentials(
                "access secret is set but access key is empty".to_string(),
            )),
            (false, true) => Err(ExporterError::InvalidCredentials(
                "access key is set but access secret is empty".to_string(),
            )),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
