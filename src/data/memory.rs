//! In-memory container backend.
//!
//! Holds a small hierarchy entirely in memory. Clones share state, so a
//! handle given to a session can still be inspected afterwards: call
//! counters, recorded slice requests and the closed flag are visible
//! through every clone.

use super::{
    child_path, AttributeMap, AttributeValue, AxisRange, ChildRef, ContainerBackend,
    ContainerOpener, DatasetMeta, NodeKind, SliceSpec, ROOT_PATH,
};
use crate::error::{Result, StokesError};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Inner {
    children: HashMap<String, Vec<ChildRef>>,
    attributes: HashMap<String, AttributeMap>,
    data: HashMap<String, Vec<f64>>,
    failing_lists: HashSet<String>,
    failing_reads: HashSet<String>,
    list_calls: HashMap<String, usize>,
    reads: Vec<(String, SliceSpec)>,
    closed: bool,
}

/// A container living in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    inner: Rc<RefCell<Inner>>,
    name: String,
}

impl MemoryContainer {
    /// Create an empty container with a root group.
    pub fn new(name: impl Into<String>) -> Self {
        let container = Self {
            name: name.into(),
            ..Self::default()
        };
        container
            .inner
            .borrow_mut()
            .children
            .insert(ROOT_PATH.to_string(), Vec::new());
        container
    }

    /// Add a group called `name` under `parent`.
    pub fn with_group(self, parent: &str, name: &str) -> Self {
        let path = child_path(parent, name);
        {
            let mut inner = self.inner.borrow_mut();
            inner.children.insert(path.clone(), Vec::new());
            inner
                .children
                .entry(parent.to_string())
                .or_default()
                .push(ChildRef {
                    path,
                    kind: NodeKind::Group,
                });
        }
        self
    }

    /// Add an f64 dataset called `name` under `parent`.
    ///
    /// `values` is the row-major content and should hold `product(shape)`
    /// elements.
    pub fn with_dataset(self, parent: &str, name: &str, shape: &[usize], values: Vec<f64>) -> Self {
        self.with_dataset_meta(parent, name, DatasetMeta::new(shape.to_vec(), "f64"), values)
    }

    /// Add a dataset with explicit metadata.
    pub fn with_dataset_meta(
        self,
        parent: &str,
        name: &str,
        meta: DatasetMeta,
        values: Vec<f64>,
    ) -> Self {
        let path = child_path(parent, name);
        {
            let mut inner = self.inner.borrow_mut();
            inner.data.insert(path.clone(), values);
            inner
                .children
                .entry(parent.to_string())
                .or_default()
                .push(ChildRef {
                    path,
                    kind: NodeKind::Dataset(meta),
                });
        }
        self
    }

    /// Attach an attribute to the node at `path`.
    pub fn with_attribute(self, path: &str, key: &str, value: AttributeValue) -> Self {
        self.inner
            .borrow_mut()
            .attributes
            .entry(path.to_string())
            .or_default()
            .insert(key, value);
        self
    }

    /// Make listing `path` fail until [`MemoryContainer::heal_listing`].
    pub fn fail_listing(&self, path: &str) {
        self.inner.borrow_mut().failing_lists.insert(path.to_string());
    }

    /// Let listing `path` succeed again.
    pub fn heal_listing(&self, path: &str) {
        self.inner.borrow_mut().failing_lists.remove(path);
    }

    /// Make every data read of `path` fail.
    pub fn fail_reads(&self, path: &str) {
        self.inner.borrow_mut().failing_reads.insert(path.to_string());
    }

    /// How many times `path` was enumerated.
    pub fn list_calls(&self, path: &str) -> usize {
        self.inner
            .borrow()
            .list_calls
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Every slice request received so far.
    pub fn reads(&self) -> Vec<(String, SliceSpec)> {
        self.inner.borrow().reads.clone()
    }

    /// Check if the handle was closed.
    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }
}

impl ContainerBackend for MemoryContainer {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn list_children(&self, path: &str) -> Result<Vec<ChildRef>> {
        let mut inner = self.inner.borrow_mut();
        *inner.list_calls.entry(path.to_string()).or_insert(0) += 1;

        if inner.closed {
            return Err(StokesError::enumeration(path, "container is closed"));
        }
        if inner.failing_lists.contains(path) {
            return Err(StokesError::enumeration(path, "simulated listing failure"));
        }
        inner
            .children
            .get(path)
            .cloned()
            .ok_or_else(|| StokesError::node_not_found(path))
    }

    fn attributes(&self, path: &str) -> Result<AttributeMap> {
        Ok(self
            .inner
            .borrow()
            .attributes
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    fn read_slice(&self, path: &str, slice: &SliceSpec) -> Result<Vec<f64>> {
        let mut inner = self.inner.borrow_mut();
        inner.reads.push((path.to_string(), slice.clone()));

        if inner.failing_reads.contains(path) {
            return Err(StokesError::read(path, "simulated read failure"));
        }
        let values = inner
            .data
            .get(path)
            .ok_or_else(|| StokesError::node_not_found(path))?;
        if slice.is_all() {
            return Ok(values.clone());
        }

        let shape = inner
            .children
            .values()
            .flatten()
            .find(|child| child.path == path)
            .and_then(|child| match &child.kind {
                NodeKind::Dataset(meta) => Some(meta.shape.clone()),
                NodeKind::Group => None,
            })
            .ok_or_else(|| StokesError::read(path, "not a dataset"))?;

        gather(values, &shape, slice.axes())
            .ok_or_else(|| StokesError::read(path, format!("slice {} out of bounds", slice.describe())))
    }

    fn close(&mut self) {
        self.inner.borrow_mut().closed = true;
    }
}

impl ContainerOpener for MemoryContainer {
    fn open(&self, name: &str, bytes: &[u8]) -> Result<Box<dyn ContainerBackend>> {
        if bytes.is_empty() {
            return Err(StokesError::open(name, "file is empty"));
        }
        self.inner.borrow_mut().closed = false;
        let mut handle = self.clone();
        handle.name = name.to_string();
        Ok(Box::new(handle))
    }
}

/// Copy the row-major region described by `axes` out of `values`.
fn gather(values: &[f64], shape: &[usize], axes: &[AxisRange]) -> Option<Vec<f64>> {
    if axes.len() != shape.len() {
        return None;
    }
    if axes
        .iter()
        .zip(shape)
        .any(|(axis, &len)| axis.start + axis.count > len)
    {
        return None;
    }
    if axes.iter().any(|axis| axis.count == 0) {
        return Some(Vec::new());
    }

    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }

    let mut offsets = vec![0usize; axes.len()];
    let mut out = Vec::new();
    loop {
        let flat: usize = axes
            .iter()
            .zip(&offsets)
            .zip(&strides)
            .map(|((axis, &off), &stride)| (axis.start + off) * stride)
            .sum();
        out.push(*values.get(flat)?);

        // Odometer increment, last axis fastest.
        let mut dim = axes.len();
        loop {
            if dim == 0 {
                return Some(out);
            }
            dim -= 1;
            offsets[dim] += 1;
            if offsets[dim] < axes[dim].count {
                break;
            }
            offsets[dim] = 0;
        }
    }
}
