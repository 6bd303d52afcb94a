pub mod admin;
pub mod endpoint;
pub mod s3;
pub mod traits;
pub mod types;

mod transport;

use std::{sync::Arc, time::Duration};

use minio_exporter_auth::Credentials;
use minio_exporter_common::error::{ExporterError, Result};
use tracing::debug;

pub use admin::AdminClient;
pub use endpoint::Endpoint;
pub use s3::{S3Client, INCOMPLETE_UPLOADS_LIMIT};
pub use traits::{AdminApi, DataPlaneApi};
pub use types::{BucketInfo, BucketUsageInfo, DataUsageInfo, Disk, ServerInfo, ServerProperties, StorageInfo};

use crate::transport::Transport;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub region: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The admin and data-plane handles for one MinIO deployment.
#[derive(Clone)]
pub struct UpstreamClients {
    pub endpoint: Endpoint,
    pub admin: AdminClient,
    pub s3: S3Client,
}

impl UpstreamClients {
    /// Validates `uri` and builds both clients. Performs no network I/O.
    pub fn connect(
        uri: &str,
        credentials: Option<Credentials>,
        options: ClientOptions,
    ) -> Result<Self> {
        let endpoint = Endpoint::parse(uri)?;
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|err| {
                ExporterError::InternalError(format!("failed to build http client: {err}"))
            })?;

        debug!(
            host = %endpoint.host(),
            secure = endpoint.is_secure(),
            anonymous = credentials.is_none(),
            "configured MinIO clients"
        );

        let transport = Arc::new(Transport::new(
            http,
            endpoint.clone(),
            credentials,
            options.region,
        ));

        Ok(Self {
            endpoint,
            admin: AdminClient::new(Arc::clone(&transport)),
            s3: S3Client::new(transport),
        })
    }
}
