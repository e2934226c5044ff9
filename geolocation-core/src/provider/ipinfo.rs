use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::{RawAttributes, TrackerError};

use super::{GeoLookup, expand_template, get_json_object};

/// ipinfo.io. Coordinates arrive as `"loc": "lat,lon"`, `country` is an ISO code.
#[derive(Debug, Clone)]
pub struct IpInfoLookup {
    url_template: String,
    http: Client,
}

impl IpInfoLookup {
    pub fn new(url_template: String, http: Client) -> Self {
        Self { url_template, http }
    }
}

#[async_trait]
impl GeoLookup for IpInfoLookup {
    async fn lookup_geo(&self, address: &str) -> Result<RawAttributes, TrackerError> {
        let url = expand_template(&self.url_template, address);
        let body = get_json_object(&self.http, &url).await?;

        if body.get("bogon") == Some(&Value::Bool(true)) {
            debug!(address, "ipinfo reports a bogon address; no location data");
        }

        Ok(body)
    }
}
