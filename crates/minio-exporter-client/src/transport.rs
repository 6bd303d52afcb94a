use chrono::Utc;
use minio_exporter_auth::{Credentials, EMPTY_PAYLOAD_SHA256, SigningParams, sign_request};
use minio_exporter_common::error::{ExporterError, Result};
use serde::Deserialize;
use tracing::trace;
use url::Url;

use crate::endpoint::Endpoint;

const SIGNING_SERVICE: &str = "s3";

/// Shared HTTP plumbing for the admin and S3 handles: signing, status
/// checks and error envelope decoding.
pub(crate) struct Transport {
    http: reqwest::Client,
    endpoint: Endpoint,
    credentials: Option<Credentials>,
    region: String,
}

impl Transport {
    pub(crate) fn new(
        http: reqwest::Client,
        endpoint: Endpoint,
        credentials: Option<Credentials>,
        region: String,
    ) -> Self {
        Self {
            http,
            endpoint,
            credentials,
            region,
        }
    }

    pub(crate) fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Issues a signed GET and returns the body of a 2xx reply.
    pub(crate) async fn get(&self, operation: &'static str, url: Url) -> Result<String> {
        trace!(operation, url = %url, "upstream request");

        let mut request = self.http.get(url.clone());
        if let Some(credentials) = &self.credentials {
            let signed = sign_request(
                "GET",
                &url,
                &[],
                EMPTY_PAYLOAD_SHA256,
                &SigningParams {
                    credentials,
                    region: &self.region,
                    service: SIGNING_SERVICE,
                    time: Utc::now(),
                },
            )?;
            for (name, value) in signed.iter() {
                request = request.header(name, value);
            }
        }

        let response = request.send().await.map_err(|err| ExporterError::Transport {
            operation,
            message: err.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|err| ExporterError::Transport {
            operation,
            message: format!("failed to read body: {err}"),
        })?;

        if !status.is_success() {
            let (code, message) = parse_error_envelope(&body);
            return Err(ExporterError::UpstreamStatus {
                operation,
                status: status.as_u16(),
                code: code.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                }),
                message: message.unwrap_or_default(),
            });
        }

        Ok(body)
    }

    pub(crate) async fn get_json<T>(&self, operation: &'static str, url: Url) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let body = self.get(operation, url).await?;
        serde_json::from_str(&body).map_err(|err| ExporterError::Decode {
            operation,
            message: err.to_string(),
        })
    }

    pub(crate) async fn get_xml<T>(&self, operation: &'static str, url: Url) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let body = self.get(operation, url).await?;
        quick_xml::de::from_str(&body).map_err(|err| ExporterError::Decode {
            operation,
            message: err.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct XmlErrorEnvelope {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonErrorEnvelope {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Extracts `Code`/`Message` from an S3 XML or admin JSON error body.
fn parse_error_envelope(body: &str) -> (Option<String>, Option<String>) {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') {
        if let Ok(envelope) = serde_json::from_str::<JsonErrorEnvelope>(trimmed) {
            return (envelope.code, envelope.message);
        }
    } else if trimmed.starts_with('<')
        && let Ok(envelope) = quick_xml::de::from_str::<XmlErrorEnvelope>(trimmed)
    {
        return (envelope.code, envelope.message);
    }
    (None, None)
}

#[cfg(test)]
mod tests {
    use super::parse_error_envelope;

    #[test]
    fn parses_s3_xml_error() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied.</Message><Resource>/</Resource></Error>"#;
        assert_eq!(
            parse_error_envelope(body),
            (
                Some("AccessDenied".to_string()),
                Some("Access Denied.".to_string())
            )
        );
    }

    #[test]
    fn parses_admin_json_error() {
        let body = r#"{"Code":"XMinioAdminNotImplemented","Message":"not implemented","Resource":"/"}"#;
        assert_eq!(
            parse_error_envelope(body),
            (
                Some("XMinioAdminNotImplemented".to_string()),
                Some("not implemented".to_string())
            )
        );
    }

    #[test]
    fn unknown_body_has_no_code() {
        assert_eq!(parse_error_envelope("bad gateway"), (None, None));
    }
}
