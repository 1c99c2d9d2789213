//! NetCDF / HDF5 container reader.
//!
//! netCDF-C opens files by path, so dropped bytes are first staged into a
//! named temporary file that lives as long as the handle.

use super::{
    child_path, AttributeMap, AttributeValue, ChildRef, ContainerBackend, ContainerOpener,
    DatasetMeta, MaxDim, NodeKind, Scalar, SliceSpec, ROOT_PATH,
};
use crate::attributes::is_structured_key;
use crate::error::{Result, StokesError};
use netcdf::types::{FloatType, IntType, NcVariableType};
use std::collections::BTreeSet;
use std::fmt;
use std::io::Write;
use tempfile::NamedTempFile;

const HDF5_SIGNATURE: &[u8] = b"\x89HDF\r\n\x1a\n";
const NETCDF_CLASSIC_SIGNATURE: &[u8] = b"CDF";

/// Opens HDF5 and netCDF files through netCDF-C.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetcdfOpener;

impl ContainerOpener for NetcdfOpener {
    fn open(&self, name: &str, bytes: &[u8]) -> Result<Box<dyn ContainerBackend>> {
        Ok(Box::new(NetcdfContainer::open(name, bytes)?))
    }
}

/// An open netCDF / HDF5 file.
pub struct NetcdfContainer {
    name: String,
    file: Option<netcdf::File>,
    staged: Option<NamedTempFile>,
}

impl fmt::Debug for NetcdfContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetcdfContainer")
            .field("name", &self.name)
            .field("open", &self.file.is_some())
            .finish()
    }
}

impl NetcdfContainer {
    /// Stage `bytes` and open them as container `name`.
    pub fn open(name: &str, bytes: &[u8]) -> Result<Self> {
        if !has_known_signature(bytes) {
            return Err(StokesError::open(name, "not an HDF5 or netCDF file"));
        }

        let staged = stage_bytes(name, bytes).map_err(|e| StokesError::open(name, e))?;
        let file = netcdf::open(staged.path()).map_err(|e| StokesError::open(name, e))?;

        tracing::info!(name, bytes = bytes.len(), "container opened");
        Ok(Self {
            name: name.to_string(),
            file: Some(file),
            staged: Some(staged),
        })
    }

    /// Path of the staged copy; `None` once closed.
    pub fn staged_path(&self) -> Option<&std::path::Path> {
        self.staged.as_ref().map(NamedTempFile::path)
    }

    fn file(&self) -> Result<&netcdf::File> {
        self.file.as_ref().ok_or(StokesError::NoContainer)
    }

    fn group(&self, path: &str) -> Result<Option<netcdf::Group<'_>>> {
        let file = self.file()?;
        if path == ROOT_PATH {
            return Ok(file.root());
        }
        Ok(file.group(path.trim_start_matches('/'))?)
    }

    fn variable(&self, path: &str) -> Result<netcdf::Variable<'_>> {
        self.file()?
            .variable(path.trim_start_matches('/'))
            .ok_or_else(|| StokesError::node_not_found(path))
    }
}

impl ContainerBackend for NetcdfContainer {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn list_children(&self, path: &str) -> Result<Vec<ChildRef>> {
        let group = self
            .group(path)
            .map_err(|e| StokesError::enumeration(path, e))?
            .ok_or_else(|| StokesError::enumeration(path, "no such group"))?;

        let mut children = Vec::new();
        for sub in group.groups() {
            children.push(ChildRef {
                path: child_path(path, &sub.name()),
                kind: NodeKind::Group,
            });
        }
        for var in group.variables() {
            children.push(ChildRef {
                path: child_path(path, &var.name()),
                kind: NodeKind::Dataset(dataset_meta(&var)),
            });
        }
        Ok(children)
    }

    fn attributes(&self, path: &str) -> Result<AttributeMap> {
        let mut map = AttributeMap::new();

        if let Some(group) = self.group(path).ok().flatten() {
            for attr in group.attributes() {
                map.insert(attr.name(), attribute_value(&attr));
            }
            return Ok(map);
        }

        for attr in self.variable(path)?.attributes() {
            map.insert(attr.name(), attribute_value(&attr));
        }
        Ok(map)
    }

    fn read_slice(&self, path: &str, slice: &SliceSpec) -> Result<Vec<f64>> {
        let var = self.variable(path)?;

        let extents: netcdf::Extents = if slice.is_all() {
            (..).into()
        } else {
            slice
                .axes()
                .iter()
                .map(|axis| netcdf::Extent::from(axis.start..axis.start + axis.count))
                .collect::<Vec<_>>()
                .into()
        };

        read_values(&var, extents).map_err(|e| StokesError::read(path, e))
    }

    fn close(&mut self) {
        self.file = None;
        if let Some(staged) = self.staged.take() {
            if let Err(e) = staged.close() {
                tracing::warn!(name = %self.name, "failed to remove staged file: {}", e);
            }
        }
        tracing::info!(name = %self.name, "container closed");
    }
}

/// HDF5 signatures may sit behind a user block at 512, 1024, 2048, ...
fn has_known_signature(bytes: &[u8]) -> bool {
    if bytes.starts_with(NETCDF_CLASSIC_SIGNATURE) || bytes.starts_with(HDF5_SIGNATURE) {
        return true;
    }
    let mut offset = 512;
    while offset + HDF5_SIGNATURE.len() <= bytes.len() {
        if bytes[offset..].starts_with(HDF5_SIGNATURE) {
            return true;
        }
        offset *= 2;
    }
    false
}

fn stage_bytes(name: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let suffix = std::path::Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut staged = tempfile::Builder::new()
        .prefix("stokes-")
        .suffix(&suffix)
        .tempfile()?;
    staged.write_all(bytes)?;
    staged.flush()?;
    Ok(staged)
}

fn dataset_meta(var: &netcdf::Variable<'_>) -> DatasetMeta {
    let dims = var.dimensions();
    DatasetMeta {
        shape: dims.iter().map(|d| d.len()).collect(),
        dtype: type_name(&var.vartype()),
        chunk_shape: var.chunking().ok().flatten(),
        max_shape: dims
            .iter()
            .map(|d| {
                if d.is_unlimited() {
                    MaxDim::Unbounded
                } else {
                    MaxDim::Fixed(d.len())
                }
            })
            .collect(),
        // netCDF-C does not list filters through this binding.
        filters: BTreeSet::new(),
    }
}

fn type_name(vartype: &NcVariableType) -> String {
    match vartype {
        NcVariableType::Float(FloatType::F64) => "float64".to_string(),
        NcVariableType::Float(FloatType::F32) => "float32".to_string(),
        NcVariableType::Int(IntType::I64) => "int64".to_string(),
        NcVariableType::Int(IntType::I32) => "int32".to_string(),
        NcVariableType::Int(IntType::I16) => "int16".to_string(),
        NcVariableType::Int(IntType::I8) => "int8".to_string(),
        NcVariableType::Int(IntType::U64) => "uint64".to_string(),
        NcVariableType::Int(IntType::U32) => "uint32".to_string(),
        NcVariableType::Int(IntType::U16) => "uint16".to_string(),
        NcVariableType::Int(IntType::U8) => "uint8".to_string(),
        NcVariableType::Char => "char".to_string(),
        NcVariableType::String => "string".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

macro_rules! read_as {
    ($var:expr, $extents:expr, $t:ty) => {
        $var.get_values::<$t, _>($extents)
            .map(|values| values.into_iter().map(|x| x as f64).collect::<Vec<f64>>())
            .map_err(|e| StokesError::NetCDF(e.to_string()))
    };
}

fn read_values(var: &netcdf::Variable<'_>, extents: netcdf::Extents) -> Result<Vec<f64>> {
    match var.vartype() {
        NcVariableType::Float(FloatType::F64) => read_as!(var, extents, f64),
        NcVariableType::Float(FloatType::F32) => read_as!(var, extents, f32),
        NcVariableType::Int(IntType::I64) => read_as!(var, extents, i64),
        NcVariableType::Int(IntType::I32) => read_as!(var, extents, i32),
        NcVariableType::Int(IntType::I16) => read_as!(var, extents, i16),
        NcVariableType::Int(IntType::I8) => read_as!(var, extents, i8),
        NcVariableType::Int(IntType::U64) => read_as!(var, extents, u64),
        NcVariableType::Int(IntType::U32) => read_as!(var, extents, u32),
        NcVariableType::Int(IntType::U16) => read_as!(var, extents, u16),
        NcVariableType::Int(IntType::U8) => read_as!(var, extents, u8),
        NcVariableType::Char | NcVariableType::String => Err(StokesError::NetCDF(
            "Character/string data cannot be visualized".to_string(),
        )),
        other => Err(StokesError::NetCDF(format!(
            "Unsupported variable type: {:?}",
            other
        ))),
    }
}

fn attribute_value(attr: &netcdf::Attribute<'_>) -> AttributeValue {
    use netcdf::AttributeValue as Nc;

    fn list<T: ToString>(values: &[T]) -> AttributeValue {
        AttributeValue::text(
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    match attr.value() {
        Ok(Nc::Uchar(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Schar(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Ushort(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Short(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Uint(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Int(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Ulonglong(v)) => AttributeValue::number(v as f64),
        Ok(Nc::Longlong(v)) => AttributeValue::number(v as f64),
        Ok(Nc::Float(v)) => AttributeValue::number(f64::from(v)),
        Ok(Nc::Double(v)) => AttributeValue::number(v),
        Ok(Nc::Str(v)) if is_structured_key(attr.name()) => AttributeValue::structured(v),
        Ok(Nc::Str(v)) => AttributeValue::Scalar(Scalar::Text(v)),
        Ok(Nc::Uchars(v)) => list(&v),
        Ok(Nc::Schars(v)) => list(&v),
        Ok(Nc::Ushorts(v)) => list(&v),
        Ok(Nc::Shorts(v)) => list(&v),
        Ok(Nc::Uints(v)) => list(&v),
        Ok(Nc::Ints(v)) => list(&v),
        Ok(Nc::Ulonglongs(v)) => list(&v),
        Ok(Nc::Longlongs(v)) => list(&v),
        Ok(Nc::Floats(v)) => list(&v),
        Ok(Nc::Doubles(v)) => list(&v),
        Ok(Nc::Strs(v)) => list(&v),
        Err(e) => AttributeValue::text(format!("<unreadable: {}>", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_detection() {
        assert!(has_known_signature(b"\x89HDF\r\n\x1a\n rest"));
        assert!(has_known_signature(b"CDF\x01"));

        let mut user_block = vec![0u8; 512];
        user_block.extend_from_slice(HDF5_SIGNATURE);
        assert!(has_known_signature(&user_block));

        assert!(!has_known_signature(b"PK\x03\x04 zip file"));
        assert!(!has_known_signature(&[]));
    }

    #[test]
    fn test_open_rejects_unknown_bytes() {
        let err = NetcdfOpener.open("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, StokesError::Open { .. }));
    }
}
