use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::data::datetime::parse_timestamp_ms;
use crate::processing::surface::Surface;
use crate::state::profile::Scan;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("File is empty")]
    Empty,
    #[error("No data rows found after the header")]
    NoRows,
}

/// Decode bytes as UTF-8, falling back to Latin-1 so odd exports still load.
fn decode(content: Vec<u8>) -> String {
    match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

/// Read every non-empty record after the single header row.
fn data_records<R: Read>(reader: R) -> Result<Vec<csv::StringRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = reader.records();
    match records.next() {
        None => return Err(LoadError::Empty),
        Some(header) => {
            header?;
        }
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record);
    }
    if rows.is_empty() {
        return Err(LoadError::NoRows);
    }
    Ok(rows)
}

/// Empty or non-numeric cells become NaN.
pub fn parse_sample(field: &str) -> f64 {
    let field = field.trim();
    if field.eq_ignore_ascii_case("nan") {
        return f64::NAN;
    }
    field.parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse scans in the `timestamp,z0,z1,…` layout with one header row.
pub fn parse_scans<R: Read>(reader: R) -> Result<Vec<Scan>, LoadError> {
    let scans = data_records(reader)?
        .iter()
        .map(|record| {
            let mut fields = record.iter();
            let timestamp = fields.next().map_or(f64::NAN, parse_timestamp_ms);
            Scan::new(timestamp, fields.map(parse_sample).collect())
        })
        .collect();
    Ok(scans)
}

pub fn load_scans(path: &Path) -> Result<Vec<Scan>, LoadError> {
    let text = decode(std::fs::read(path)?);
    let scans = parse_scans(text.as_bytes())?;
    tracing::info!(path = %path.display(), scans = scans.len(), "loaded scans");
    Ok(scans)
}

/// Parse a surface: same layout as scans, with the first column ignored.
pub fn parse_surface<R: Read>(reader: R) -> Result<Surface, LoadError> {
    let rows = data_records(reader)?
        .iter()
        .map(|record| record.iter().skip(1).map(parse_sample).collect())
        .collect();
    Ok(Surface::new(rows))
}

pub fn load_surface(path: &Path) -> Result<Surface, LoadError> {
    let text = decode(std::fs::read(path)?);
    let surface = parse_surface(text.as_bytes())?;
    tracing::info!(
        path = %path.display(),
        rows = surface.row_count(),
        cols = surface.col_count(),
        "loaded surface"
    );
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamp_and_samples() {
        let csv = "timestamp,z0,z1,z2\n1000,0.5,1.5,2.5\n2000,1,NaN,3\n";
        let scans = parse_scans(csv.as_bytes()).unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[0], Scan::new(1000.0, vec![0.5, 1.5, 2.5]));
        assert_eq!(scans[1].timestamp, 2000.0);
        assert!(scans[1].z[1].is_nan());
    }

    #[test]
    fn blank_and_empty_cells_are_handled() {
        let csv = "timestamp,z0,z1\r\n\r\n5,,2\r\n\r\n";
        let scans = parse_scans(csv.as_bytes()).unwrap();
        assert_eq!(scans.len(), 1);
        assert!(scans[0].z[0].is_nan());
        assert_eq!(scans[0].z[1], 2.0);
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let csv = "timestamp,z0,z1\n1,1,2\n2,3\n";
        let scans = parse_scans(csv.as_bytes()).unwrap();
        assert_eq!(scans[1].z, vec![3.0]);
    }

    #[test]
    fn header_only_file_has_no_rows() {
        assert!(matches!(parse_scans("timestamp,z0\n".as_bytes()), Err(LoadError::NoRows)));
        assert!(matches!(parse_scans("".as_bytes()), Err(LoadError::Empty)));
    }

    #[test]
    fn surface_drops_first_column() {
        let csv = "t,a,b\n0,1,2\n\n1,3,4\n";
        let surface = parse_surface(csv.as_bytes()).unwrap();
        assert_eq!(surface.rows(), &[vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn latin1_bytes_still_decode() {
        let text = decode(vec![b'a', 0xE9, b'b']);
        assert_eq!(text, "aéb");
    }
}
