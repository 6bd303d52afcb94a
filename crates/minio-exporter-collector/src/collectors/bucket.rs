use minio_exporter_client::{BucketUsageInfo, INCOMPLETE_UPLOADS_LIMIT};
use tracing::{debug, error};

use super::ScrapeContext;

/// Per-bucket statistics. Prefers the bulk data usage snapshot and falls back
/// to a plain bucket listing when that call fails.
pub async fn collect(ctx: ScrapeContext<'_>, incomplete_uploads: bool) {
    match ctx.admin.data_usage_info().await {
        Ok(usage) => {
            for (bucket, usage) in &usage.buckets_usage {
                emit_usage(ctx, bucket, usage, incomplete_uploads).await;
            }
        }
        Err(err) => {
            debug!(error = %err, "data usage unavailable, listing buckets instead");
            collect_existence(ctx).await;
        }
    }
}

async fn emit_usage(
    ctx: ScrapeContext<'_>,
    bucket: &str,
    usage: &BucketUsageInfo,
    incomplete_uploads: bool,
) {
    let location = resolve_location(ctx, bucket).await;
    let labels = [bucket, location.as_str()];

    ctx.sink.gauge(
        &ctx.descriptors.bucket_objects_number,
        usage.objects_count as f64,
        &labels,
    );
    ctx.sink.gauge(
        &ctx.descriptors.bucket_objects_total_size,
        usage.size as f64,
        &labels,
    );

    if !incomplete_uploads {
        return;
    }
    match ctx
        .s3
        .count_incomplete_uploads(bucket, INCOMPLETE_UPLOADS_LIMIT)
        .await
    {
        Ok(count) => ctx.sink.gauge(
            &ctx.descriptors.bucket_incomplete_uploads,
            count as f64,
            &labels,
        ),
        Err(err) => debug!(bucket, error = %err, "failed to list incomplete uploads"),
    }
}

async fn collect_existence(ctx: ScrapeContext<'_>) {
    let buckets = match ctx.s3.list_buckets().await {
        Ok(buckets) => buckets,
        Err(err) => {
            error!(error = %err, "failed to list buckets");
            return;
        }
    };

    for bucket in &buckets {
        let location = resolve_location(ctx, &bucket.name).await;
        ctx.sink.gauge(
            &ctx.descriptors.bucket_exists,
            1.0,
            &[bucket.name.as_str(), location.as_str()],
        );
    }
}

/// Location of a bucket, or an empty string when the lookup fails.
async fn resolve_location(ctx: ScrapeContext<'_>, bucket: &str) -> String {
    match ctx.s3.get_bucket_location(bucket).await {
        Ok(location) => location,
        Err(err) => {
            debug!(bucket, error = %err, "failed to get bucket location");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::collect;
    use crate::testing::{FakeUpstream, Harness, bucket, data_usage, named, value_of};

    fn locations(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(bucket, location)| (bucket.to_string(), location.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn fast_path_emits_count_and_size() {
        let upstream = FakeUpstream {
            data_usage: Some(data_usage(&[("photos", 10, 2048)])),
            locations: locations(&[("photos", "us-east-1")]),
            ..FakeUpstream::default()
        };

        let harness = Harness::new();
        collect(harness.ctx(&upstream), false).await;
        let metrics = harness.finish();

        assert_eq!(metrics.len(), 2);
        assert_eq!(value_of(&metrics, "minio_bucket_objects_number"), Some(10.0));
        assert_eq!(value_of(&metrics, "minio_bucket_objects_total_size"), Some(2048.0));
        let count = named(&metrics, "minio_bucket_objects_number")[0];
        assert_eq!(count.label("bucket"), Some("photos"));
        assert_eq!(count.label("location"), Some("us-east-1"));
        assert!(!upstream.calls().contains(&"list_buckets".to_string()));
    }

    #[tokio::test]
    async fn fallback_emits_existence_only() {
        let upstream = FakeUpstream {
            buckets: Some(vec![bucket("photos"), bucket("logs")]),
            locations: locations(&[("photos", "eu-west-1"), ("logs", "us-east-1")]),
            ..FakeUpstream::default()
        };

        let harness = Harness::new();
        collect(harness.ctx(&upstream), true).await;
        let metrics = harness.finish();

        assert_eq!(metrics.len(), 2);
        assert!(
            metrics
                .iter()
                .all(|metric| metric.name() == "minio_bucket_exists" && metric.value() == 1.0)
        );
        assert_eq!(metrics[0].label("location"), Some("eu-west-1"));
        assert!(
            !upstream
                .calls()
                .iter()
                .any(|call| call.starts_with("count_incomplete_uploads"))
        );
    }

    #[tokio::test]
    async fn failed_listing_emits_nothing() {
        let upstream = FakeUpstream::default();

        let harness = Harness::new();
        collect(harness.ctx(&upstream), false).await;

        assert!(harness.finish().is_empty());
        assert_eq!(
            upstream.calls(),
            vec!["data_usage_info".to_string(), "list_buckets".to_string()]
        );
    }

    #[tokio::test]
    async fn failed_location_yields_empty_label() {
        let upstream = FakeUpstream {
            data_usage: Some(data_usage(&[("archive", 1, 5)])),
            ..FakeUpstream::default()
        };

        let harness = Harness::new();
        collect(harness.ctx(&upstream), false).await;
        let metrics = harness.finish();

        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|metric| metric.label("location") == Some("")));
    }

    #[tokio::test]
    async fn incomplete_uploads_are_capped_and_isolated() {
        let upstream = FakeUpstream {
            data_usage: Some(data_usage(&[("photos", 10, 2048), ("logs", 3, 30)])),
            locations: locations(&[("photos", "us-east-1"), ("logs", "us-east-1")]),
            uploads: HashMap::from([("photos".to_string(), 250)]),
            ..FakeUpstream::default()
        };

        let harness = Harness::new();
        collect(harness.ctx(&upstream), true).await;
        let metrics = harness.finish();

        let uploads = named(&metrics, "minio_bucket_incomplete_uploads_number");
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].label("bucket"), Some("photos"));
        assert_eq!(uploads[0].value(), 100.0);
        assert_eq!(named(&metrics, "minio_bucket_objects_number").len(), 2);
    }
}
