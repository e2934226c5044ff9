use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}, time::Duration};

use crate::provider::ProviderId;

pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAP_FILE: &str = "map.html";

/// Endpoints and output locations, loaded once at startup and never mutated.
///
/// Example TOML (every key optional):
/// ```toml
/// public_ip_url = "https://api.ipify.org?format=json"
/// geo_provider = "ipinfo"
/// geo_url = "https://ipinfo.io/{ip}/json"
/// timeout_secs = 5
/// map_file = "map.html"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub public_ip_url: String,

    /// Geolocation service, e.g. "ipapi" or "ipinfo".
    pub geo_provider: String,

    /// Overrides the provider's URL template; `{ip}` is replaced by the address.
    pub geo_url: Option<String>,

    pub timeout_secs: u64,

    pub map_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            public_ip_url: DEFAULT_PUBLIC_IP_URL.to_string(),
            geo_provider: ProviderId::IpApi.as_str().to_string(),
            geo_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            map_file: PathBuf::from(DEFAULT_MAP_FILE),
        }
    }
}

impl Config {
    /// Return the configured geolocation provider as a strongly-typed ProviderId.
    pub fn provider_id(&self) -> Result<ProviderId> {
        ProviderId::try_from(self.geo_provider.as_str())
    }

    /// URL template for the configured provider, after any override.
    pub fn geo_url_template(&self) -> Result<String> {
        match &self.geo_url {
            Some(url) => Ok(url.clone()),
            None => Ok(self.provider_id()?.default_url_template().to_string()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load config from the platform config directory, or defaults if there is none.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // Catch a misspelled provider now rather than after the first request.
        cfg.provider_id()
            .with_context(|| format!("Invalid geo_provider in {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "geolocation-tracker", "geolocation-tracker")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_point_at_public_services() {
        let cfg = Config::default();

        assert_eq!(cfg.public_ip_url, DEFAULT_PUBLIC_IP_URL);
        assert_eq!(cfg.provider_id().unwrap(), ProviderId::IpApi);
        assert_eq!(cfg.geo_url_template().unwrap(), "https://ipapi.co/{ip}/json/");
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert_eq!(cfg.map_file, PathBuf::from("map.html"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config("geo_provider = \"ipinfo\"\ntimeout_secs = 3\n");

        let cfg = Config::load_from(file.path()).unwrap();

        assert_eq!(cfg.provider_id().unwrap(), ProviderId::IpInfo);
        assert_eq!(cfg.geo_url_template().unwrap(), "https://ipinfo.io/{ip}/json");
        assert_eq!(cfg.timeout_secs, 3);
        assert_eq!(cfg.public_ip_url, DEFAULT_PUBLIC_IP_URL);
    }

    #[test]
    fn geo_url_overrides_provider_template() {
        let file = write_config("geo_url = \"http://localhost:8080/geo/{ip}\"\n");

        let cfg = Config::load_from(file.path()).unwrap();
        assert_eq!(cfg.geo_url_template().unwrap(), "http://localhost:8080/geo/{ip}");
    }

    #[test]
    fn unknown_provider_is_rejected_on_load() {
        let file = write_config("geo_provider = \"maxmind\"\n");

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid geo_provider"));
        assert!(format!("{err:#}").contains("Unknown provider 'maxmind'"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = write_config("timeout_secs = \"soon\"\n");

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
