use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use geolocation_core::{
    Config, GeoLookup, MapRenderer, PublicIpResolver, TrackerError, Viewer, csv_sink, format_record,
    map::{default_renderer, default_viewer},
    map_label, normalize,
    provider::{lookup_from_config, resolver_from_config},
};
use tracing::{debug, warn};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "geolocation_tracker",
    version,
    about = "Look up where an IP address is and show it on a map"
)]
pub struct Cli {
    /// IPv4 or IPv6 address; defaults to this machine's public address.
    pub address: Option<String>,

    /// Append the result to a CSV file, creating it with a header if needed.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Don't write map.html or open a browser.
    #[arg(long)]
    pub no_map: bool,

    /// Read settings from this TOML file instead of the platform config directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log requests and written files to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// How a run ended, for everything short of a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Resolution or lookup failed with a network or HTTP error.
    NetworkFailure,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::NetworkFailure => 1,
        }
    }
}

/// The external capabilities a run needs, swappable in tests.
#[derive(Debug)]
pub struct Services {
    pub resolver: Box<dyn PublicIpResolver>,
    pub lookup: Box<dyn GeoLookup>,
    pub renderer: Box<dyn MapRenderer>,
    pub viewer: Box<dyn Viewer>,
    pub map_file: PathBuf,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            resolver: resolver_from_config(config)?,
            lookup: lookup_from_config(config)?,
            renderer: default_renderer(),
            viewer: default_viewer(),
            map_file: config.map_file.clone(),
        })
    }
}

impl Cli {
    pub async fn run(self) -> Result<Outcome> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        debug!(?config, "loaded configuration");

        let services = Services::from_config(&config)?;
        self.execute(&services, &mut io::stdout()).await
    }

    /// Resolve, look up, then print / append / map, in that order.
    ///
    /// Network and HTTP failures before a record exists are reported on `out`
    /// and end the run with [`Outcome::NetworkFailure`]; every other error is returned.
    pub async fn execute(&self, services: &Services, out: &mut impl Write) -> Result<Outcome> {
        let address = match &self.address {
            Some(address) => address.clone(),
            None => match services.resolver.resolve_public_ip().await {
                Ok(ip) => ip,
                Err(err) => return report(err, out),
            },
        };
        debug!(%address, "looking up address");

        let raw = match services.lookup.lookup_geo(&address).await {
            Ok(raw) => raw,
            Err(err) => return report(err, out),
        };

        let record = normalize(&address, &raw);
        writeln!(out, "{}", format_record(&record))?;

        if let Some(path) = &self.csv {
            csv_sink::append(&record, path)?;
            writeln!(out, "Saved to CSV: {}", path.display())?;
        }

        if !self.no_map {
            match record.coordinates() {
                Some((lat, lon)) => {
                    let label = map_label(&record);
                    let path = services.renderer.render_map(lat, lon, &label, &services.map_file)?;
                    writeln!(out, "Map saved to: {}", path.display())?;

                    if let Err(err) = services.viewer.open_in_default_viewer(&path) {
                        warn!(error = %err, "could not open the map in a browser");
                    }
                }
                None => writeln!(out, "Map skipped: no coordinates available.")?,
            }
        }

        Ok(Outcome::Success)
    }
}

fn report(err: TrackerError, out: &mut impl Write) -> Result<Outcome> {
    match err.classified_message() {
        Some(message) => {
            writeln!(out, "{message}")?;
            Ok(Outcome::NetworkFailure)
        }
        None => Err(err.into()),
    }
}
