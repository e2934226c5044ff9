use std::fmt::Write as _;

use crate::model::{GeoRecord, format_coordinate};

/// Human-readable, multi-line summary of a record. No trailing newline.
pub fn format_record(record: &GeoRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "IP: {}", record.ip);
    let _ = writeln!(out, "Location: {}", record.location_text());

    match record.coordinates() {
        Some((lat, lon)) => {
            let (lat, lon) = (format_coordinate(lat), format_coordinate(lon));
            let _ = write!(out, "Coordinates: {lat}, {lon}");
        }
        None => out.push_str("Coordinates: Unknown"),
    }

    let optional = [
        ("ISP/Org", &record.org),
        ("Timezone", &record.timezone),
        ("Postal", &record.postal),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            let _ = write!(out, "\n{label}: {value}");
        }
    }

    out
}

/// Popup text for the map marker: `"<ip> — <location>"`.
pub fn map_label(record: &GeoRecord) -> String {
    format!("{} — {}", record.ip, record.location_text())
}
