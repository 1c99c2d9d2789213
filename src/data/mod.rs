//! Data reading and representation.
//!
//! This module defines the container hierarchy (nodes, attributes), the
//! backend contract the viewer consumes, and the backends that ship with
//! Stokes.

mod attribute;
mod backend;
mod memory;
mod node;
mod reader;

pub use attribute::{AttributeMap, AttributeValue, Scalar, StructuredText};
pub use backend::{AxisRange, ChildRef, ContainerBackend, ContainerOpener, SliceSpec};
pub use memory::MemoryContainer;
pub use node::{
    child_path, join_dims, name_from_path, DatasetMeta, MaxDim, Node, NodeKind, ROOT_PATH,
};
pub use reader::{NetcdfContainer, NetcdfOpener};
