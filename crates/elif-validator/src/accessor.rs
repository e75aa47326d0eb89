//! Property reading with a shared reader cache

use crate::error::{Result, ValidatorError};
use crate::introspect::{Bean, PropertyReader};
use crate::value::{PropertyPath, Value};
use dashmap::DashMap;
use std::any::TypeId;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReaderKey {
    type_id: TypeId,
    property: String,
}

/// Reads simple and nested properties from [`Bean`]s.
///
/// Discovered readers are cached per (concrete type, property name), so
/// repeated reads skip discovery. The cache is safe to share across threads
/// and never changes what a read returns.
#[derive(Default)]
pub struct PropertyAccessor {
    readers: DashMap<ReaderKey, PropertyReader>,
}

impl PropertyAccessor {
    /// Create an empty accessor with its own cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a dot-separated path against `target`.
    ///
    /// A null intermediate is a broken association. A scalar intermediate or
    /// an unknown property is a configuration fault.
    pub fn resolve(&self, target: &dyn Bean, path: &PropertyPath) -> Result<Value> {
        let segments = path.segments();
        let mut current = self.read(target, &segments[0])?;

        for window in segments.windows(2) {
            let (owner, segment) = (&window[0], &window[1]);
            let bean = match &current {
                Value::Object(bean) => bean.clone(),
                Value::Null => return Err(ValidatorError::broken_association(owner, path.as_str())),
                other => {
                    return Err(ValidatorError::configuration(format!(
                        "Property '{}' is a {} and has no property '{}' (while reading '{}')",
                        owner,
                        other.kind_name(),
                        segment,
                        path
                    )))
                }
            };
            current = self.read(bean.as_ref(), segment)?;
        }

        Ok(current)
    }

    /// Parse `path` and resolve it
    pub fn resolve_str(&self, target: &dyn Bean, path: &str) -> Result<Value> {
        self.resolve(target, &PropertyPath::parse(path)?)
    }

    /// Read a single, non-nested property
    pub fn read(&self, target: &dyn Bean, property: &str) -> Result<Value> {
        let reader = self.reader(target, property)?;
        reader(target.as_any()).map_err(|source| {
            ValidatorError::accessor_failure(property, target.type_name(), source)
        })
    }

    fn reader(&self, target: &dyn Bean, property: &str) -> Result<PropertyReader> {
        let key = ReaderKey {
            type_id: target.bean_type_id(),
            property: property.to_string(),
        };

        if let Some(reader) = self.readers.get(&key) {
            return Ok(reader.value().clone());
        }

        let reader = target.discover(property).ok_or_else(|| {
            ValidatorError::configuration(format!(
                "Could not find property '{}' in type '{}'",
                property,
                target.type_name()
            ))
        })?;
        debug!("Discovered reader for '{}' on {}", property, target.type_name());

        Ok(self.readers.entry(key).or_insert(reader).value().clone())
    }

    /// Number of cached readers
    pub fn len(&self) -> usize {
        self.readers.len()
    }

    /// True when nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.readers.is_empty()
    }

    /// Drop every cached reader
    pub fn clear(&self) {
        self.readers.clear();
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("cached_readers", &self.readers.len())
            .finish()
    }
}
