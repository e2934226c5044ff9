use crate::{
    Config, RawAttributes, TrackerError,
    error::truncate_body,
    provider::{ipapi::IpApiLookup, ipify::IpifyResolver, ipinfo::IpInfoLookup},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};
use tracing::debug;

pub mod ipapi;
pub mod ipify;
pub mod ipinfo;

/// Geolocation services we know how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    IpApi,
    IpInfo,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::IpApi => "ipapi",
            ProviderId::IpInfo => "ipinfo",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::IpApi, ProviderId::IpInfo]
    }

    /// Public endpoint, `{ip}` standing in for the address.
    pub fn default_url_template(&self) -> &'static str {
        match self {
            ProviderId::IpApi => "https://ipapi.co/{ip}/json/",
            ProviderId::IpInfo => "https://ipinfo.io/{ip}/json",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "ipapi" => Ok(ProviderId::IpApi),
            "ipinfo" => Ok(ProviderId::IpInfo),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: ipapi, ipinfo."
            )),
        }
    }
}

/// Finds out which address the outside world sees us as.
#[async_trait]
pub trait PublicIpResolver: Send + Sync + Debug {
    async fn resolve_public_ip(&self) -> Result<String, TrackerError>;
}

/// Looks up geolocation attributes for one address. Single attempt, no retry.
#[async_trait]
pub trait GeoLookup: Send + Sync + Debug {
    async fn lookup_geo(&self, address: &str) -> Result<RawAttributes, TrackerError>;
}

/// Construct the public-IP resolver from config.
pub fn resolver_from_config(config: &Config) -> anyhow::Result<Box<dyn PublicIpResolver>> {
    let http = http_client(config.timeout())?;
    Ok(Box::new(IpifyResolver::new(config.public_ip_url.clone(), http)))
}

/// Construct the configured geolocation lookup.
pub fn lookup_from_config(config: &Config) -> anyhow::Result<Box<dyn GeoLookup>> {
    let id = config.provider_id()?;
    let template = config.geo_url_template()?;
    let http = http_client(config.timeout())?;

    let boxed: Box<dyn GeoLookup> = match id {
        ProviderId::IpApi => Box::new(IpApiLookup::new(template, http)),
        ProviderId::IpInfo => Box::new(IpInfoLookup::new(template, http)),
    };

    Ok(boxed)
}

fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("geolocation-tracker/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn expand_template(template: &str, address: &str) -> String {
    template.replace("{ip}", address)
}

/// GET `url` and decode the body as a JSON object.
pub(crate) async fn get_json_object(
    http: &Client,
    url: &str,
) -> Result<RawAttributes, TrackerError> {
    debug!(url, "GET request");

    let res = http.get(url).send().await.map_err(|e| TrackerError::network(url, &e))?;

    let status = res.status();
    let body = res.text().await.map_err(|e| TrackerError::network(url, &e))?;

    if !status.is_success() {
        return Err(TrackerError::Http {
            url: url.to_string(),
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TrackerError::ResponseFormat {
            url: url.to_string(),
            reason: format!("expected a JSON object, got: {}", truncate_body(&body)),
        }),
        Err(e) => Err(TrackerError::ResponseFormat {
            url: url.to_string(),
            reason: format!("invalid JSON ({e}): {}", truncate_body(&body)),
        }),
    }
}
