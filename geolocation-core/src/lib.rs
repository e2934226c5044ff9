//! Core library for the `geolocation_tracker` CLI.
//!
//! This crate defines:
//! - Configuration (endpoints, timeout, map location)
//! - Abstractions over the public-IP and geolocation services
//! - The normalized `GeoRecord` and its text, CSV and map renderings
//!
//! It is used by `geolocation-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod csv_sink;
pub mod error;
pub mod map;
pub mod model;
pub mod normalize;
pub mod present;
pub mod provider;

pub use config::Config;
pub use error::TrackerError;
pub use map::{MapRenderer, Viewer};
pub use model::{GeoRecord, RawAttributes};
pub use normalize::normalize;
pub use present::{format_record, map_label};
pub use provider::{GeoLookup, ProviderId, PublicIpResolver};
