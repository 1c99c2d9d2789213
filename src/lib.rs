//! Stokes - a terminal viewer for hierarchical scientific containers.
//!
//! Stokes browses HDF5 / netCDF-4 style containers: a tree of groups and
//! datasets, each carrying an ordered set of attributes. Groups are
//! enumerated lazily on first expansion, attributes are classified into
//! Brillouin-spectroscopy buckets, datasets get a bounded data preview and
//! one- or two-dimensional datasets can be plotted.
//!
//! # Features
//!
//! - Lazy tree loading with a per-group children cache
//! - Attribute classification with structured-text trees
//! - Bounded data previews and a plot dispatcher
//! - Pluggable container backends (netCDF/HDF5 and in-memory)
//! - Gruvbox color themes
//!
//! # Example
//!
//! ```
//! use stokes::data::{MemoryContainer, ROOT_PATH};
//! use stokes::session::Session;
//!
//! let container = MemoryContainer::new("scan.h5")
//!     .with_dataset(ROOT_PATH, "PSD", &[3], vec![1.0, 2.0, 3.0]);
//!
//! let mut session = Session::new();
//! session.open(&container, "scan.h5", b"bytes")?;
//! let children = session.expand(ROOT_PATH)?;
//! assert_eq!(children[0].name, "PSD");
//! # Ok::<(), stokes::StokesError>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod app;
pub mod attributes;
pub mod config;
pub mod data;
pub mod error;
pub mod explorer;
pub mod inspect;
pub mod plot;
pub mod preview;
pub mod session;
pub mod ui;

pub use error::{Result, StokesError};
