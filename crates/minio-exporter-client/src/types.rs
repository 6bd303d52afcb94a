use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

/// Reply of the admin `info` call. Only the fields the exporter reads are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub mode: String,
    #[serde(rename = "deploymentID", default)]
    pub deployment_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub servers: Vec<ServerProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerProperties {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub endpoint: String,
    /// Seconds since the node started; zero when the node does not report it.
    #[serde(default)]
    pub uptime: i64,
    #[serde(default)]
    pub version: String,
}

impl ServerProperties {
    pub fn is_online(&self) -> bool {
        self.state == "online"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageInfo {
    #[serde(rename = "Disks", default, deserialize_with = "null_as_default")]
    pub disks: Vec<Disk>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Disk {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub state: String,
    #[serde(rename = "totalspace", default)]
    pub total_space: u64,
    #[serde(rename = "usedspace", default)]
    pub used_space: u64,
    #[serde(rename = "availspace", default)]
    pub available_space: u64,
}

impl Disk {
    pub fn is_online(&self) -> bool {
        matches!(self.state.as_str(), "ok" | "online")
    }
}

/// Reply of the admin `datausageinfo` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataUsageInfo {
    #[serde(rename = "objectsCount", default)]
    pub objects_count: u64,
    #[serde(rename = "objectsTotalSize", default)]
    pub objects_total_size: u64,
    #[serde(rename = "bucketsCount", default)]
    pub buckets_count: u64,
    #[serde(rename = "bucketsUsageInfo", default, deserialize_with = "null_as_default")]
    pub buckets_usage: BTreeMap<String, BucketUsageInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BucketUsageInfo {
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "objectsCount", default)]
    pub objects_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<String>,
}

// MinIO encodes empty slices and maps as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
