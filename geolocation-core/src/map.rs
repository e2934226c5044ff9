//! Interactive map output.
//!
//! Rendering and opening the result are separate capabilities so the CLI can
//! swap either for a stub. Both are compiled only with the `map` feature; a
//! build without it still links, but whatever [`default_renderer`] and
//! [`default_viewer`] return fails with [`TrackerError::DependencyMissing`].

use std::{fmt::Debug, path::{Path, PathBuf}};

use crate::error::TrackerError;

/// Initial zoom for a single-address map; roughly city level.
pub const DEFAULT_ZOOM: u8 = 12;

/// Tooltip shown when hovering the marker.
pub const MARKER_TOOLTIP: &str = "Location";

pub trait MapRenderer: Debug {
    /// Write a standalone HTML map centered on `(lat, lon)` with one marker.
    /// Overwrites `outfile`; returns the path written.
    fn render_map(
        &self,
        lat: f64,
        lon: f64,
        label: &str,
        outfile: &Path,
    ) -> Result<PathBuf, TrackerError>;
}

pub trait Viewer: Debug {
    fn open_in_default_viewer(&self, path: &Path) -> Result<(), TrackerError>;
}

#[cfg(feature = "map")]
pub use leaflet::{LeafletRenderer, SystemViewer};

#[cfg(feature = "map")]
pub fn default_renderer() -> Box<dyn MapRenderer> {
    Box::new(LeafletRenderer::default())
}

#[cfg(feature = "map")]
pub fn default_viewer() -> Box<dyn Viewer> {
    Box::new(SystemViewer)
}

#[cfg(not(feature = "map"))]
pub fn default_renderer() -> Box<dyn MapRenderer> {
    Box::new(Unavailable)
}

#[cfg(not(feature = "map"))]
pub fn default_viewer() -> Box<dyn Viewer> {
    Box::new(Unavailable)
}

/// Stands in for both capabilities when the crate is built without `map`.
#[cfg(not(feature = "map"))]
#[derive(Debug, Clone, Copy)]
pub struct Unavailable;

#[cfg(not(feature = "map"))]
impl Unavailable {
    fn error() -> TrackerError {
        TrackerError::DependencyMissing(
            "map rendering is not available: this binary was built without the `map` feature.\n\
             Hint: rebuild with default features, or pass --no-map."
                .to_string(),
        )
    }
}

#[cfg(not(feature = "map"))]
impl MapRenderer for Unavailable {
    fn render_map(
        &self,
        _lat: f64,
        _lon: f64,
        _label: &str,
        _outfile: &Path,
    ) -> Result<PathBuf, TrackerError> {
        Err(Self::error())
    }
}

#[cfg(not(feature = "map"))]
impl Viewer for Unavailable {
    fn open_in_default_viewer(&self, _path: &Path) -> Result<(), TrackerError> {
        Err(Self::error())
    }
}


#[cfg(feature = "map")]
mod leaflet {
    use std::{fs, path::{Path, PathBuf}};

    use tracing::{debug, info};

    use super::{DEFAULT_ZOOM, MARKER_TOOLTIP, MapRenderer, Viewer};
    use crate::{error::TrackerError, model::format_coordinate};

    const LEAFLET_VERSION: &str = "1.9.4";
    const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
    const TILE_ATTRIBUTION: &str =
        "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

    /// Leaflet page with OpenStreetMap tiles, scripts loaded from unpkg.
    #[derive(Debug, Clone)]
    pub struct LeafletRenderer {
        zoom: u8,
    }

    impl Default for LeafletRenderer {
        fn default() -> Self {
            Self { zoom: DEFAULT_ZOOM }
        }
    }

    impl LeafletRenderer {
        pub fn html(&self, lat: f64, lon: f64, label: &str) -> String {
            let lat = format_coordinate(lat);
            let lon = format_coordinate(lon);
            let popup = js_string(&escape_html(label));
            let tooltip = js_string(MARKER_TOOLTIP);
            let tiles = js_string(TILE_URL);
            let attribution = js_string(TILE_ATTRIBUTION);
            let title = escape_html(label);
            let zoom = self.zoom;
            let v = LEAFLET_VERSION;

            format!(
                r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{v}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{v}/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; width: 100%; margin: 0; padding: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer({tiles}, {{ maxZoom: 19, attribution: {attribution} }}).addTo(map);
L.marker([{lat}, {lon}]).addTo(map).bindTooltip({tooltip}).bindPopup({popup});
</script>
</body>
</html>
"#
            )
        }
    }

    impl MapRenderer for LeafletRenderer {
        fn render_map(
            &self,
            lat: f64,
            lon: f64,
            label: &str,
            outfile: &Path,
        ) -> Result<PathBuf, TrackerError> {
            fs::write(outfile, self.html(lat, lon, label))
                .map_err(|e| TrackerError::io(outfile, e))?;
            info!(path = %outfile.display(), "wrote map");
            Ok(outfile.to_path_buf())
        }
    }

    /// Opens files with whatever the desktop associates with them.
    #[derive(Debug, Clone, Copy)]
    pub struct SystemViewer;

    impl Viewer for SystemViewer {
        fn open_in_default_viewer(&self, path: &Path) -> Result<(), TrackerError> {
            // Absolute, so the browser doesn't resolve it against its own cwd.
            let target = fs::canonicalize(path).map_err(|e| TrackerError::io(path, e))?;
            debug!(path = %target.display(), "opening in default viewer");
            open::that(&target).map_err(|e| TrackerError::io(target, e))
        }
    }

    /// JSON string literal, with `</` broken up so it can't close the script element.
    fn js_string(s: &str) -> String {
        serde_json::Value::from(s).to_string().replace("</", "<\\/")
    }

    fn escape_html(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#x27;"),
                _ => out.push(c),
            }
        }
        out
    }

}
