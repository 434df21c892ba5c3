use profilescope::data::export::{export_scans, DEFAULT_EXPORT_NAME};
use profilescope::data::loader::{load_scans, load_surface};
use profilescope::processing::surface::SliceAxis;
use profilescope::Scan;

fn capture() -> Vec<Scan> {
    (0..5)
        .map(|i| {
            let z = (0..32)
                .map(|j| if (i + j) % 13 == 0 { f64::NAN } else { (i * j) as f64 / 7.0 })
                .collect();
            Scan::new(1_700_000_000_000.0 + 10.0 * i as f64, z)
        })
        .collect()
}

#[test]
fn exported_capture_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_EXPORT_NAME);
    let scans = capture();
    export_scans(&path, &scans).unwrap();

    let loaded = load_scans(&path).unwrap();
    assert_eq!(loaded.len(), scans.len());
    for (a, b) in scans.iter().zip(&loaded) {
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.z.len(), b.z.len());
        for (za, zb) in a.z.iter().zip(&b.z) {
            if za.is_nan() {
                assert!(zb.is_nan());
            } else {
                assert!((za - zb).abs() <= 5e-7, "{za} vs {zb}");
            }
        }
    }
}

#[test]
fn exported_capture_loads_as_surface() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("surface.csv");
    export_scans(&path, &capture()).unwrap();

    let surface = load_surface(&path).unwrap();
    assert_eq!(surface.row_count(), 5);
    assert_eq!(surface.col_count(), 32);
    let column = surface.slice(SliceAxis::X, 2, 0);
    assert_eq!(column.len(), 5);
    assert!((column[3] - 6.0 / 7.0).abs() < 1e-6);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_scans(&dir.path().join("nope.csv")).unwrap_err();
    assert!(err.to_string().starts_with("Cannot read file"));
}
