use std::fmt;

use minio_exporter_common::error::{ExporterError, Result};
use url::Url;

/// A validated MinIO server address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: Url,
    host: String,
    secure: bool,
}

impl Endpoint {
    /// Parses a server URI, assuming `http://` when no scheme is given.
    ///
    /// Only `http` and `https` are accepted and the host must be non-empty.
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let normalized = if uri.contains("://") {
            uri.to_string()
        } else {
            format!("http://{uri}")
        };

        let url = Url::parse(&normalized).map_err(|err| {
            ExporterError::InvalidEndpoint(format!("{normalized} with error <{err}>"))
        })?;

        let secure = match url.scheme() {
            "http" => false,
            "https" => true,
            other => {
                return Err(ExporterError::InvalidEndpoint(format!(
                    "invalid scheme for MinIO: {other}"
                )));
            }
        };

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => {
                return Err(ExporterError::InvalidEndpoint(format!(
                    "empty host is not a valid host: {normalized}"
                )));
            }
        };
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let mut base_url = url;
        base_url.set_path("/");
        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self {
            base_url,
            host,
            secure,
        })
    }

    /// `host[:port]` of the server.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds a URL for the given path segments under the server root.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ExporterError::InvalidEndpoint(format!("{} cannot be a base URL", self.base_url))
            })?;
            path.clear();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.secure { "https" } else { "http" };
        write!(f, "{scheme}://{}", self.host)
    }
}
