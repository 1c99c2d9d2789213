use std::path::Path;

use stokes::attributes::{classify, Bucket, RenderableValue};
use stokes::data::{
    ContainerBackend, ContainerOpener, NetcdfContainer, NetcdfOpener, NodeKind, ROOT_PATH,
};
use stokes::preview::{plan, preview, PreviewLimits, PreviewOutcome};
use stokes::session::Session;
use stokes::StokesError;

/// Write a small netCDF-4 scan and return its bytes.
fn write_scan(dir: &Path) -> Vec<u8> {
    let path = dir.join("scan.nc");
    {
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("time", 10).unwrap();
        file.add_dimension("freq", 30).unwrap();
        file.add_attribute("Measure_Sample_Name", "water").unwrap();
        file.add_attribute("Process_Fit", r#"{"function": "Lorentzian", "width": 0.5}"#)
            .unwrap();
        file.add_attribute("Laser_Wavelengths", vec![532i32, 660]).unwrap();

        let mut psd = file.add_variable::<f32>("PSD", &["time", "freq"]).unwrap();
        psd.put_attribute("Spectrometer_Type", "VIPA").unwrap();
        let values: Vec<f32> = (0..300).map(|i| i as f32 * 0.5).collect();
        psd.put_values(&values, ..).unwrap();

        let mut data = file.add_group("Data").unwrap();
        data.add_attribute("Measure_Date", "2024-01-01").unwrap();
        let mut freq = data.add_variable::<f64>("Frequency", &["freq"]).unwrap();
        let axis: Vec<f64> = (0..30).map(f64::from).collect();
        freq.put_values(&axis, ..).unwrap();
    }
    std::fs::read(&path).unwrap()
}

#[test]
fn test_unrecognized_bytes_rejected() {
    let mut session = Session::new();
    let err = session
        .open(&NetcdfOpener, "notes.txt", b"plain text")
        .unwrap_err();
    assert!(matches!(err, StokesError::Open { .. }));
    assert!(!session.is_open());
}

#[test]
fn test_truncated_hdf5_rejected() {
    let bytes = b"\x89HDF\r\n\x1a\n\0\0\0\0";

    assert!(matches!(
        NetcdfOpener.open("broken.h5", bytes),
        Err(StokesError::Open { .. })
    ));
}

#[test]
fn test_browse_netcdf4_file() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = write_scan(dir.path());
    let backend = NetcdfOpener.open("scan.nc", &bytes).unwrap();
    assert_eq!(backend.file_name(), "scan.nc");

    // groups before variables
    let children = backend.list_children(ROOT_PATH).unwrap();
    let paths: Vec<&str> = children.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, ["/Data", "/PSD"]);
    let NodeKind::Dataset(psd) = children[1].kind.clone() else {
        panic!("expected a dataset, got {:?}", children[1].kind);
    };
    assert_eq!(psd.shape, [10, 30]);
    assert_eq!(psd.dtype, "float32");

    let nested = backend.list_children("/Data").unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].path, "/Data/Frequency");

    let root = classify(&backend.attributes(ROOT_PATH).unwrap());
    assert_eq!(root.measure[0].label, "Sample Name");
    assert!(matches!(
        root.bucket(Bucket::Other)[0].display,
        RenderableValue::Structured(_)
    ));
    assert_eq!(root.other[1].label, "Laser Wavelengths");
    assert_eq!(root.other[1].display, RenderableValue::Text("532, 660".into()));

    let group = classify(&backend.attributes("/Data").unwrap());
    assert_eq!(group.measure[0].label, "Date");
    let var = classify(&backend.attributes("/PSD").unwrap());
    assert_eq!(var.spectrometer[0].label, "Type");

    let limits = PreviewLimits::default();
    assert_eq!(plan(&psd.shape, &limits).describe(), "[0:5, 0:1]");
    match preview(&*backend, "/PSD", &psd, &limits) {
        PreviewOutcome::Ready(payload) => {
            assert_eq!(payload.slice_description, "[0:5, 0:1]");
            assert_eq!(payload.elements, [0.0, 15.0, 30.0, 45.0, 60.0]);
            assert!(!payload.truncated);
        },
        other => panic!("expected a preview, got {:?}", other),
    }
}

#[test]
fn test_close_removes_staged_copy() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = write_scan(dir.path());

    let mut container = NetcdfContainer::open("scan.nc", &bytes).unwrap();
    let staged = container.staged_path().unwrap().to_path_buf();
    assert!(staged.exists());

    container.close();
    assert!(!staged.exists());
    assert!(container.staged_path().is_none());
    assert!(matches!(
        container.list_children(ROOT_PATH),
        Err(StokesError::Enumeration { .. })
    ));
}
