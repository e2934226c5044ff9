//! Projection of a loosely-shaped lookup response onto [`GeoRecord`].

use serde_json::Value;

use crate::model::{GeoRecord, RawAttributes};

const REGION_KEYS: &[&str] = &["region", "region_name", "regionName"];
const COUNTRY_KEYS: &[&str] = &["country_name", "country"];
const LATITUDE_KEYS: &[&str] = &["latitude", "lat"];
const LONGITUDE_KEYS: &[&str] = &["longitude", "lon"];
const ORG_KEYS: &[&str] = &["org", "isp"];
const POSTAL_KEYS: &[&str] = &["postal", "zip"];

/// Build a record for `address` from whatever the lookup returned.
///
/// `ip` is always `address`, whatever the response claims. Never fails: keys
/// that are missing, `null`, or of the wrong shape become `None`.
pub fn normalize(address: &str, raw: &RawAttributes) -> GeoRecord {
    let (loc_lat, loc_lon) = loc_pair(raw);

    GeoRecord {
        ip: address.to_string(),
        city: text(raw, &["city"]),
        region: text(raw, REGION_KEYS),
        country: text(raw, COUNTRY_KEYS),
        latitude: number(raw, LATITUDE_KEYS).or(loc_lat),
        longitude: number(raw, LONGITUDE_KEYS).or(loc_lon),
        org: text(raw, ORG_KEYS),
        timezone: text(raw, &["timezone"]),
        postal: text(raw, POSTAL_KEYS),
    }
}

fn text(raw: &RawAttributes, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn number(raw: &RawAttributes, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_coordinate(s),
        _ => None,
    })
}

/// ipinfo.io style `"loc": "37.4056,-122.0775"`.
fn loc_pair(raw: &RawAttributes) -> (Option<f64>, Option<f64>) {
    let Some(Value::String(loc)) = raw.get("loc") else {
        return (None, None);
    };

    match loc.split_once(',') {
        Some((lat, lon)) => (parse_coordinate(lat), parse_coordinate(lon)),
        None => (None, None),
    }
}

fn parse_coordinate(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
