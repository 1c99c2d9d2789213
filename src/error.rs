//! Error types for Stokes.
//!
//! This module provides a unified error handling approach using `thiserror`.
//! Each variant is scoped to the region of the viewer it can break: an
//! `Open` failure resets the whole session, an `Enumeration` failure stays
//! attached to one group, a `Read` failure to one dataset fetch, and a
//! `StructuredPayload` failure to one attribute.

use thiserror::Error;

/// Result type alias for Stokes operations.
pub type Result<T> = std::result::Result<T, StokesError>;

/// Errors that can occur in Stokes.
#[derive(Debug, Error)]
pub enum StokesError {
    /// The container could not be opened.
    #[error("Failed to open {name}: {reason}")]
    Open {
        /// File identifier handed to the opener.
        name: String,
        /// Backend explanation.
        reason: String,
    },

    /// Listing the children of a group failed.
    #[error("Failed to list {path}: {reason}")]
    Enumeration {
        /// Path of the group.
        path: String,
        /// Backend explanation.
        reason: String,
    },

    /// Reading attributes or data of a node failed.
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// Path of the node.
        path: String,
        /// Backend explanation.
        reason: String,
    },

    /// A structured-text attribute is not valid JSON.
    #[error("Invalid structured content in {key}: {source}")]
    StructuredPayload {
        /// Attribute key.
        key: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to read NetCDF file.
    #[error("NetCDF error: {0}")]
    NetCDF(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Node not found in tree.
    #[error("Node not found: {path}")]
    NodeNotFound {
        /// Requested path.
        path: String,
    },

    /// A dataset was asked to enumerate children.
    #[error("Not a group: {path}")]
    NotAGroup {
        /// Path of the dataset.
        path: String,
    },

    /// No container is open in the session.
    #[error("No file loaded")]
    NoContainer,
}

impl StokesError {
    /// Create an Open error.
    pub fn open(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Open {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an Enumeration error.
    pub fn enumeration(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Enumeration {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a Read error.
    pub fn read(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a NodeNotFound error.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }
}

impl From<netcdf::Error> for StokesError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCDF(err.to_string())
    }
}
