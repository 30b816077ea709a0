//! Cloudflare v4 API client.
//!
//! # Responsibilities
//! - List a zone's A records, following pagination
//! - Repoint one record at a new address
//! - Surface HTTP and API failures as DnsError

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;
use crate::config::CloudflareConfig;
use crate::dns::{ARecord, DnsError, DnsRecordStore};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct RecordPatch<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: String,
}

/// Cloudflare DNS client bound to one API token.
#[derive(Clone)]
pub struct CloudflareClient {
    http: reqwest::Client,
    api_base: String,
    per_page: u32,
}

impl CloudflareClient {
    pub fn new(config: &CloudflareConfig, token: &str) -> Result<Self, DnsError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| DnsError::Api("API token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            per_page: config.per_page,
        })
    }

    async fn list_page(&self, zone: &str, page: u32) -> Result<(Vec<RawRecord>, u32), DnsError> {
        let url = format!("{}/zones/{}/dns_records", self.api_base, zone);
        let res = self
            .http
            .get(url)
            .query(&[
                ("type", "A".to_string()),
                ("page", page.to_string()),
                ("per_page", self.per_page.to_string()),
            ])
            .send()
            .await?;

        let envelope: Envelope<Vec<RawRecord>> = decode(res).await?;
        let total_pages = envelope.result_info.map(|i| i.total_pages).unwrap_or(1);
        Ok((envelope.result.unwrap_or_default(), total_pages))
    }
}

/// Check status and `success`, then return the envelope.
async fn decode<T: serde::de::DeserializeOwned>(res: reqwest::Response) -> Result<Envelope<T>, DnsError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(DnsError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let envelope: Envelope<T> = res.json().await?;
    if !envelope.success {
        let messages: Vec<String> = envelope
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect();
        return Err(DnsError::Api(messages.join("; ")));
    }
    Ok(envelope)
}

#[async_trait]
impl DnsRecordStore for CloudflareClient {
    async fn list_a_records(&self, zone: &str) -> Result<Vec<ARecord>, DnsError> {
        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let (raw, total_pages) = self.list_page(zone, page).await?;
            for r in raw {
                if r.record_type != "A" {
                    continue;
                }
                match r.content.parse::<IpAddr>() {
                    Ok(ip) => records.push(ARecord { id: r.id, name: r.name, ip }),
                    Err(_) => tracing::warn!(zone, name = %r.name, content = %r.content, "Skipping A record with unparsable content"),
                }
            }
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        tracing::debug!(zone, count = records.len(), "Listed A records");
        Ok(records)
    }

    async fn set_a_record(&self, zone: &str, record_id: &str, name: &str, ip: IpAddr) -> Result<(), DnsError> {
        let url = format!("{}/zones/{}/dns_records/{}", self.api_base, zone, record_id);
        let body = RecordPatch {
            record_type: "A",
            name,
            content: ip.to_string(),
        };

        let res = self.http.patch(url).json(&body).send().await?;
        decode::<serde_json::Value>(res).await?;

        tracing::info!(zone, name, %ip, "DNS record updated");
        Ok(())
    }
}

impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_base", &self.api_base)
            .field("per_page", &self.per_page)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_decoding() {
        let json = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": [
                {"id": "r1", "name": "a.example.com", "type": "A", "content": "192.0.2.1", "ttl": 1, "proxied": false}
            ],
            "result_info": {"page": 1, "per_page": 100, "count": 1, "total_count": 1, "total_pages": 1}
        }"#;
        let envelope: Envelope<Vec<RawRecord>> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        let records = envelope.result.unwrap();
        assert_eq!(records[0].id, "r1");
        assert_eq!(records[0].record_type, "A");
        assert_eq!(envelope.result_info.unwrap().total_pages, 1);
    }

    #[test]
    fn test_patch_body() {
        let body = RecordPatch {
            record_type: "A",
            name: "a.example.com",
            content: "192.0.2.2".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"type": "A", "name": "a.example.com", "content": "192.0.2.2"})
        );
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let config = CloudflareConfig {
            api_base: "http://127.0.0.1:1/client/v4/".into(),
            ..CloudflareConfig::default()
        };
        let client = CloudflareClient::new(&config, "token").unwrap();
        assert_eq!(client.api_base, "http://127.0.0.1:1/client/v4");
    }
}
