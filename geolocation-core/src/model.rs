/// Decoded body of a geolocation response, keys as the service sent them.
pub type RawAttributes = serde_json::Map<String, serde_json::Value>;

/// Normalized, fixed-shape result for one address.
///
/// Only `ip` is mandatory; everything else is `None` when the service did not
/// report it, which is distinct from an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub ip: String,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub org: Option<String>,
    pub timezone: Option<String>,
    pub postal: Option<String>,
}

impl GeoRecord {
    /// Column order for every tabular rendering of a record.
    pub const FIELDS: [&'static str; 9] = [
        "ip",
        "city",
        "region",
        "country",
        "latitude",
        "longitude",
        "org",
        "timezone",
        "postal",
    ];

    /// A record that knows nothing but its address.
    pub fn empty(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            city: None,
            region: None,
            country: None,
            latitude: None,
            longitude: None,
            org: None,
            timezone: None,
            postal: None,
        }
    }

    /// Both coordinates, or nothing.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// City, region and country joined by ", ", or "Unknown" when none are known.
    pub fn location_text(&self) -> String {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();

        if parts.is_empty() { "Unknown".to_string() } else { parts.join(", ") }
    }

    /// Field values in [`GeoRecord::FIELDS`] order, absent values as empty strings.
    pub fn to_row(&self) -> [String; 9] {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let coord = |v: Option<f64>| v.map(format_coordinate).unwrap_or_default();

        [
            self.ip.clone(),
            text(&self.city),
            text(&self.region),
            text(&self.country),
            coord(self.latitude),
            coord(self.longitude),
            text(&self.org),
            text(&self.timezone),
            text(&self.postal),
        ]
    }
}

/// Shortest round-trip decimal, always with a fractional part (`-122.0`, not `-122`).
pub fn format_coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
