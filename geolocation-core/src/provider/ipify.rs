use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::TrackerError;

use super::{PublicIpResolver, get_json_object};

/// api.ipify.org in JSON mode: `{"ip": "203.0.113.7"}`.
#[derive(Debug, Clone)]
pub struct IpifyResolver {
    url: String,
    http: Client,
}

impl IpifyResolver {
    pub fn new(url: String, http: Client) -> Self {
        Self { url, http }
    }
}

#[async_trait]
impl PublicIpResolver for IpifyResolver {
    async fn resolve_public_ip(&self) -> Result<String, TrackerError> {
        let body = get_json_object(&self.http, &self.url).await?;

        match body.get("ip") {
            Some(Value::String(ip)) if !ip.trim().is_empty() => Ok(ip.trim().to_string()),
            _ => Err(TrackerError::ResponseFormat {
                url: self.url.clone(),
                reason: "missing `ip` field".to_string(),
            }),
        }
    }
}
