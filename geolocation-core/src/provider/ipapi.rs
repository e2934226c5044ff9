use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::{RawAttributes, TrackerError};

use super::{GeoLookup, expand_template, get_json_object};

/// ipapi.co. Reports `country_name`, `region`, numeric `latitude`/`longitude`.
#[derive(Debug, Clone)]
pub struct IpApiLookup {
    url_template: String,
    http: Client,
}

impl IpApiLookup {
    pub fn new(url_template: String, http: Client) -> Self {
        Self { url_template, http }
    }
}

#[async_trait]
impl GeoLookup for IpApiLookup {
    async fn lookup_geo(&self, address: &str) -> Result<RawAttributes, TrackerError> {
        let url = expand_template(&self.url_template, address);
        let body = get_json_object(&self.http, &url).await?;

        // Reserved and malformed addresses come back as 200 with an error flag
        // and no location keys; the record just ends up mostly unknown.
        if body.get("error") == Some(&Value::Bool(true)) {
            let reason = body.get("reason").and_then(Value::as_str).unwrap_or("unspecified");
            warn!(address, reason, "ipapi.co returned no location data");
        }

        Ok(body)
    }
}
