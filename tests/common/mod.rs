//! Shared fixtures for integration tests.

#![allow(dead_code)]

use stokes::data::{AttributeValue, MemoryContainer, ROOT_PATH};

/// A small Brillouin scan: one data group with a spectrum matrix.
pub fn brillouin_scan() -> MemoryContainer {
    MemoryContainer::new("scan.h5")
        .with_attribute(ROOT_PATH, "Measure_Sample", AttributeValue::text("water"))
        .with_group(ROOT_PATH, "Data")
        .with_group("/Data", "Raw")
        .with_dataset(
            "/Data",
            "PSD",
            &[3, 4],
            (0..12).map(|i| i as f64).collect(),
        )
        .with_dataset("/Data", "Frequency", &[4], vec![-5.0, -2.5, 2.5, 5.0])
        .with_dataset("/Data", "Cube", &[2, 2, 2], vec![0.0; 8])
        .with_attribute("/Data/PSD", "Brillouin_type", AttributeValue::text("PSD"))
        .with_attribute("/Data/PSD", "Measure_Date", AttributeValue::text("2024-01-01"))
        .with_attribute(
            "/Data/PSD",
            "Spectrometer_Type",
            AttributeValue::text("VIPA"),
        )
        .with_attribute(
            "/Data/PSD",
            "Process_Fit",
            AttributeValue::structured(r#"{"function": "Lorentzian", "width": 0.5}"#),
        )
        .with_attribute("/Data/PSD", "Process_Bad", AttributeValue::structured("not-json"))
}

/// Bytes accepted by the in-memory opener.
pub const BYTES: &[u8] = b"\x89HDF\r\n\x1a\n";
