//! Export data and the live package graph.
//!
//! Export data is the type-system summary of a package: the objects it
//! exports and the types of those objects. Archives carry it as opaque
//! bytes; decoding an archive rehydrates them into a [`PackageRecord`] and
//! installs it in the caller's [`PackageMap`], where archives decoded later
//! resolve their cross-package type references.
//!
//! Rehydration is strict: a reference to a package that is not yet in the
//! map, or to an object that package does not export, is a decode error.
//! Decode dependencies first.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::codec::DecodeError;

/// Kind of an exported object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Const,
    Var,
    Type,
    Func,
}

/// A type expression as it appears in export data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// A predeclared type (`int`, `string`, ...).
    Basic(String),
    /// A named type declared in `package`.
    Named { package: String, name: String },
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Map {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    Func {
        params: Vec<TypeRef>,
        results: Vec<TypeRef>,
    },
}

impl TypeRef {
    #[must_use]
    pub fn basic(name: impl Into<String>) -> Self {
        Self::Basic(name.into())
    }

    #[must_use]
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Named {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Visit every named reference, depth first.
    fn for_each_named<E>(
        &self,
        f: &mut impl FnMut(&str, &str) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Self::Basic(_) => Ok(()),
            Self::Named { package, name } => f(package, name),
            Self::Pointer(elem) | Self::Slice(elem) => elem.for_each_named(f),
            Self::Map { key, value } => {
                key.for_each_named(f)?;
                value.for_each_named(f)
            }
            Self::Func { params, results } => params
                .iter()
                .chain(results)
                .try_for_each(|t| t.for_each_named(f)),
        }
    }
}

/// One exported object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedObject {
    pub name: String,
    pub kind: ObjectKind,
    pub ty: TypeRef,
}

/// Serialized type-system summary of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    pub path: String,
    pub name: String,
    pub imports: Vec<String>,
    pub objects: Vec<ExportedObject>,
}

impl ExportData {
    #[must_use]
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    #[must_use]
    pub fn with_object(mut self, name: impl Into<String>, kind: ObjectKind, ty: TypeRef) -> Self {
        self.objects.push(ExportedObject {
            name: name.into(),
            kind,
            ty,
        });
        self
    }

    /// Encode for storage in [`crate::Archive::export_data`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }
}

/// A rehydrated package: its exported objects plus links to the records of
/// the packages it imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub path: String,
    pub name: String,
    pub imports: Vec<Arc<PackageRecord>>,
    objects: FxHashMap<String, ExportedObject>,
}

impl PackageRecord {
    /// Rehydrate `data`, resolving references against `packages`.
    ///
    /// Empty export data describes a package that exports nothing.
    pub fn import(
        path: &str,
        name: &str,
        data: &[u8],
        packages: &PackageMap,
    ) -> Result<Self, DecodeError> {
        if data.is_empty() {
            return Ok(Self {
                path: path.to_string(),
                name: name.to_string(),
                imports: Vec::new(),
                objects: FxHashMap::default(),
            });
        }

        let export =
            ExportData::from_bytes(data).map_err(|e| DecodeError::MalformedExportData {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let imports = export
            .imports
            .iter()
            .map(|imp| {
                packages
                    .get(imp)
                    .cloned()
                    .ok_or_else(|| DecodeError::UnresolvedPackage {
                        path: path.to_string(),
                        package: imp.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for object in &export.objects {
            object.ty.for_each_named(&mut |package, name| {
                // Same-package references may name unexported types.
                if package == path || package == export.path {
                    return Ok(());
                }
                let record =
                    packages
                        .get(package)
                        .ok_or_else(|| DecodeError::UnresolvedPackage {
                            path: path.to_string(),
                            package: package.to_string(),
                        })?;
                if record.lookup(name).is_none() {
                    return Err(DecodeError::UnresolvedObject {
                        path: path.to_string(),
                        package: package.to_string(),
                        name: name.to_string(),
                    });
                }
                Ok(())
            })?;
        }

        let objects = export
            .objects
            .into_iter()
            .map(|o| (o.name.clone(), o))
            .collect();

        Ok(Self {
            path: path.to_string(),
            name: export.name,
            imports,
            objects,
        })
    }

    /// Look up an exported object by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ExportedObject> {
        self.objects.get(name)
    }

    /// Exported object names, sorted.
    #[must_use]
    pub fn object_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.objects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Import path → rehydrated package, shared across decodes.
///
/// Decoding only ever adds entries. The map does no locking; callers that
/// decode concurrently into one map must serialize access themselves.
#[derive(Debug, Clone, Default)]
pub struct PackageMap {
    packages: FxHashMap<String, Arc<PackageRecord>>,
}

impl PackageMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Arc<PackageRecord>> {
        self.packages.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.packages.contains_key(path)
    }

    /// Install a record, replacing any previous record for the same path.
    pub fn insert(&mut self, record: PackageRecord) -> Arc<PackageRecord> {
        let record = Arc::new(record);
        self.packages
            .insert(record.path.clone(), Arc::clone(&record));
        record
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests;
