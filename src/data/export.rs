use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::state::profile::Scan;

/// File name offered when saving a capture.
pub const DEFAULT_EXPORT_NAME: &str = "scan_capture.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Nothing to export")]
    Empty,
}

fn format_sample(z: f64) -> String {
    if z.is_finite() {
        format!("{z:.6}")
    } else {
        "NaN".to_string()
    }
}

/// Write `timestamp,z0,…` with one row per scan. Column count follows the
/// first scan; every scan writes all of its samples.
pub fn write_scans<W: Write>(writer: W, scans: &[Scan]) -> Result<(), ExportError> {
    let first = scans.first().ok_or(ExportError::Empty)?;

    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    let header = std::iter::once("timestamp".to_string())
        .chain((0..first.z.len()).map(|i| format!("z{i}")));
    wtr.write_record(header)?;

    for scan in scans {
        let row = std::iter::once(format!("{}", scan.timestamp))
            .chain(scan.z.iter().map(|&z| format_sample(z)));
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_scans(path: &Path, scans: &[Scan]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_scans(std::io::BufWriter::new(file), scans)?;
    tracing::info!(path = %path.display(), scans = scans.len(), "exported scans");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(scans: &[Scan]) -> String {
        let mut buf = Vec::new();
        write_scans(&mut buf, scans).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_header_and_six_decimals() {
        let out = to_string(&[
            Scan::new(1700000000123.0, vec![0.5, f64::NAN]),
            Scan::new(1700000000133.0, vec![1.0 / 3.0, 2.0]),
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "timestamp,z0,z1");
        assert_eq!(lines[1], "1700000000123,0.500000,NaN");
        assert_eq!(lines[2], "1700000000133,0.333333,2.000000");
    }

    #[test]
    fn empty_capture_is_an_error() {
        let mut buf = Vec::new();
        assert!(matches!(write_scans(&mut buf, &[]), Err(ExportError::Empty)));
        assert!(buf.is_empty());
    }
}
