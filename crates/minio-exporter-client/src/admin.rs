use std::sync::Arc;

use async_trait::async_trait;
use minio_exporter_common::error::Result;

use crate::{
    endpoint::Endpoint,
    traits::AdminApi,
    transport::Transport,
    types::{DataUsageInfo, ServerInfo, StorageInfo},
};

#[derive(Clone)]
pub struct AdminClient {
    transport: Arc<Transport>,
}

impl AdminClient {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.transport.endpoint()
    }

    pub async fn server_info(&self) -> Result<ServerInfo> {
        let url = self.admin_url("info")?;
        self.transport.get_json("server_info", url).await
    }

    pub async fn storage_info(&self) -> Result<StorageInfo> {
        let url = self.admin_url("storageinfo")?;
        self.transport.get_json("storage_info", url).await
    }

    pub async fn data_usage_info(&self) -> Result<DataUsageInfo> {
        let url = self.admin_url("datausageinfo")?;
        self.transport.get_json("data_usage_info", url).await
    }

    fn admin_url(&self, call: &str) -> Result<url::Url> {
        self.endpoint().url_for(&["minio", "admin", "v3", call])
    }
}

#[async_trait]
impl AdminApi for AdminClient {
    async fn server_info(&self) -> Result<ServerInfo> {
        Self::server_info(self).await
    }

    async fn storage_info(&self) -> Result<StorageInfo> {
        Self::storage_info(self).await
    }

    async fn data_usage_info(&self) -> Result<DataUsageInfo> {
        Self::data_usage_info(self).await
    }
}
