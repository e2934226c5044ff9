use std::{fs::OpenOptions, io, path::Path};

use csv::WriterBuilder;
use tracing::info;

use crate::{error::TrackerError, model::GeoRecord};

/// Append one row for `record` to the CSV file at `path`.
///
/// The header is written only when the file is new (missing or zero-length).
/// Rows are never deduplicated.
pub fn append(record: &GeoRecord, path: &Path) -> Result<(), TrackerError> {
    let needs_header = match path.metadata() {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => return Err(TrackerError::io(path, e)),
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TrackerError::io(path, e))?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    if needs_header {
        writer.write_record(GeoRecord::FIELDS).map_err(|e| TrackerError::io(path, e.into()))?;
    }
    writer.write_record(record.to_row()).map_err(|e| TrackerError::io(path, e.into()))?;
    writer.flush().map_err(|e| TrackerError::io(path, e))?;

    info!(path = %path.display(), header = needs_header, "appended CSV row");
    Ok(())
}
