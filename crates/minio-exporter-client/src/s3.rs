use std::sync::Arc;

use async_trait::async_trait;
use minio_exporter_common::error::Result;
use serde::Deserialize;
use url::Url;

use crate::{endpoint::Endpoint, traits::DataPlaneApi, transport::Transport, types::BucketInfo};

/// Per-bucket ceiling for incomplete upload counting.
pub const INCOMPLETE_UPLOADS_LIMIT: u64 = 100;

// Region MinIO reports through an empty `LocationConstraint`.
const DEFAULT_LOCATION: &str = "us-east-1";
const MAX_UPLOADS_PER_PAGE: u64 = 1000;

#[derive(Debug, Deserialize)]
struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets", default)]
    buckets: BucketsXml,
}

#[derive(Debug, Default, Deserialize)]
struct BucketsXml {
    #[serde(rename = "Bucket", default)]
    bucket: Vec<BucketXml>,
}

#[derive(Debug, Deserialize)]
struct BucketXml {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CreationDate", default)]
    creation_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationConstraint {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ListMultipartUploadsResult {
    #[serde(rename = "IsTruncated", default)]
    is_truncated: bool,
    #[serde(rename = "NextKeyMarker", default)]
    next_key_marker: Option<String>,
    #[serde(rename = "NextUploadIdMarker", default)]
    next_upload_id_marker: Option<String>,
    #[serde(rename = "Upload", default)]
    uploads: Vec<UploadXml>,
}

// Only the number of uploads matters.
#[derive(Debug, Deserialize)]
struct UploadXml {}

#[derive(Clone)]
pub struct S3Client {
    transport: Arc<Transport>,
}

impl S3Client {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.transport.endpoint()
    }

    pub async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        let url = self.endpoint().url_for(&[])?;
        let result: ListAllMyBucketsResult = self.transport.get_xml("list_buckets", url).await?;

        Ok(result
            .buckets
            .bucket
            .into_iter()
            .map(|bucket| BucketInfo {
                name: bucket.name,
                creation_date: bucket.creation_date,
            })
            .collect())
    }

    pub async fn get_bucket_location(&self, bucket: &str) -> Result<String> {
        let mut url = self.endpoint().url_for(&[bucket])?;
        url.query_pairs_mut().append_key_only("location");

        let constraint: LocationConstraint =
            self.transport.get_xml("get_bucket_location", url).await?;
        let location = constraint.value.trim();
        if location.is_empty() {
            Ok(DEFAULT_LOCATION.to_string())
        } else {
            Ok(location.to_string())
        }
    }

    pub async fn count_incomplete_uploads(&self, bucket: &str, limit: u64) -> Result<u64> {
        let mut count = 0_u64;
        let mut key_marker: Option<String> = None;
        let mut upload_id_marker: Option<String> = None;

        while count < limit {
            let page_size = (limit - count).min(MAX_UPLOADS_PER_PAGE);
            let url = self.uploads_url(
                bucket,
                page_size,
                key_marker.as_deref(),
                upload_id_marker.as_deref(),
            )?;
            let page: ListMultipartUploadsResult =
                self.transport.get_xml("list_incomplete_uploads", url).await?;

            count = count.saturating_add(page.uploads.len() as u64);
            if !page.is_truncated {
                break;
            }

            let next_key = page.next_key_marker.filter(|marker| !marker.is_empty());
            let next_upload = page.next_upload_id_marker.filter(|marker| !marker.is_empty());
            if next_key.is_none() && next_upload.is_none() {
                break;
            }
            key_marker = next_key;
            upload_id_marker = next_upload;
        }

        Ok(count.min(limit))
    }

    fn uploads_url(
        &self,
        bucket: &str,
        max_uploads: u64,
        key_marker: Option<&str>,
        upload_id_marker: Option<&str>,
    ) -> Result<Url> {
        let mut url = self.endpoint().url_for(&[bucket])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_key_only("uploads");
            query.append_pair("max-uploads", &max_uploads.to_string());
            if let Some(marker) = key_marker {
                query.append_pair("key-marker", marker);
            }
            if let Some(marker) = upload_id_marker {
                query.append_pair("upload-id-marker", marker);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl DataPlaneApi for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        Self::list_buckets(self).await
    }

    async fn get_bucket_location(&self, bucket: &str) -> Result<String> {
        Self::get_bucket_location(self, bucket).await
    }

    async fn count_incomplete_uploads(&self, bucket: &str, limit: u64) -> Result<u64> {
        Self::count_incomplete_uploads(self, bucket, limit).await
    }
}
