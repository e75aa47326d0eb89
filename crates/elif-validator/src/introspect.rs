//! Runtime property discovery for validated objects
//!
//! Types opt in by implementing [`Introspect`], usually through the
//! [`introspect!`](crate::introspect!) macro:
//!
//! ```
//! use elif_validator::{introspect, Value};
//!
//! struct Address { city: Option<String> }
//! struct Person { name: String, address: Option<Address> }
//!
//! introspect!(Address {
//!     "city" => |a: &Address| a.city.clone(),
//! });
//!
//! introspect!(Person {
//!     "name" => |p: &Person| p.name.clone(),
//!     "address" => |p: &Person| {
//!         p.address.as_ref().map(|a| Value::object(Address { city: a.city.clone() }))
//!     },
//! });
//! ```

use crate::error::BoxError;
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Type-erased reader stored in the accessor cache
pub type PropertyReader = Arc<dyn Fn(&dyn Any) -> Result<Value, BoxError> + Send + Sync>;

/// A typed getter for one property of `T`
pub struct Getter<T> {
    read: Arc<dyn Fn(&T) -> Result<Value, BoxError> + Send + Sync>,
}

impl<T: 'static> Getter<T> {
    /// Getter that cannot fail
    pub fn new<F, V>(getter: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            read: Arc::new(move |target: &T| -> Result<Value, BoxError> {
                Ok(getter(target).into())
            }),
        }
    }

    /// Getter whose failures surface as accessor faults
    pub fn fallible<F>(getter: F) -> Self
    where
        F: Fn(&T) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self {
            read: Arc::new(getter),
        }
    }

    /// Read the property from `target`
    pub fn read(&self, target: &T) -> Result<Value, BoxError> {
        (self.read)(target)
    }

    /// Erase the target type so readers of different types share one cache
    pub fn erase(self) -> PropertyReader {
        let read = self.read;
        Arc::new(move |target: &dyn Any| -> Result<Value, BoxError> {
            match target.downcast_ref::<T>() {
                Some(target) => read(target),
                None => Err(format!(
                    "reader for '{}' applied to a different type",
                    std::any::type_name::<T>()
                )
                .into()),
            }
        })
    }
}

impl<T> Clone for Getter<T> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
        }
    }
}

impl<T> fmt::Debug for Getter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getter")
            .field("target", &std::any::type_name::<T>())
            .finish()
    }
}

/// Types whose named properties can be read at runtime
pub trait Introspect: Sized + Send + Sync + 'static {
    /// Getter for `name`, or `None` when the type has no such property
    fn property(name: &str) -> Option<Getter<Self>>;
}

/// Object-safe view over any [`Introspect`] type
pub trait Bean: Send + Sync + 'static {
    fn discover(&self, property: &str) -> Option<PropertyReader>;

    fn type_name(&self) -> &'static str;

    fn bean_type_id(&self) -> TypeId;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Introspect> Bean for T {
    fn discover(&self, property: &str) -> Option<PropertyReader> {
        T::property(property).map(Getter::erase)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn bean_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// JSON objects expose every key as a property; absent keys read as null
impl Introspect for Map<String, JsonValue> {
    fn property(name: &str) -> Option<Getter<Self>> {
        let key = name.to_string();
        Some(Getter::new(move |map: &Map<String, JsonValue>| -> Value {
            map.get(&key).cloned().map(Value::from).unwrap_or(Value::Null)
        }))
    }
}

/// Implement [`Introspect`] from a list of `"name" => getter` pairs.
///
/// Each getter is a closure taking `&Type` and returning anything
/// convertible into [`Value`].
#[macro_export]
macro_rules! introspect {
    ($ty:ty { $($name:literal => $getter:expr),* $(,)? }) => {
        impl $crate::Introspect for $ty {
            fn property(name: &str) -> ::std::option::Option<$crate::Getter<Self>> {
                match name {
                    $($name => ::std::option::Option::Some($crate::Getter::<$ty>::new($getter)),)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Book {
        title: String,
        pages: u32,
    }

    crate::introspect!(Book {
        "title" => |b: &Book| b.title.clone(),
        "pages" => |b: &Book| b.pages,
    });

    #[test]
    fn test_macro_exposes_declared_properties() {
        let book = Book {
            title: "Dune".into(),
            pages: 412,
        };

        let reader = book.discover("pages").unwrap();
        assert_eq!(reader(book.as_any()).unwrap(), Value::Integer(412));
        assert!(book.discover("author").is_none());
        assert!(book.type_name().ends_with("Book"));
    }

    #[test]
    fn test_erased_reader_rejects_foreign_type() {
        let reader = Book::property("title").unwrap().erase();
        let err = reader(&42u8).unwrap_err();
        assert!(err.to_string().contains("different type"));
    }

    #[test]
    fn test_fallible_getter_propagates_error() {
        let getter = Getter::<Book>::fallible(|_: &Book| -> Result<Value, BoxError> {
            Err("disk on fire".into())
        });
        let book = Book {
            title: String::new(),
            pages: 0,
        };
        assert_eq!(getter.read(&book).unwrap_err().to_string(), "disk on fire");
    }

    #[test]
    fn test_json_map_reads_missing_keys_as_null() {
        let JsonValue::Object(map) = serde_json::json!({"name": "Ada", "age": 36}) else {
            unreachable!()
        };
        let age = map.discover("age").unwrap();
        let nickname = map.discover("nickname").unwrap();
        assert_eq!(age(map.as_any()).unwrap(), Value::Integer(36));
        assert_eq!(nickname(map.as_any()).unwrap(), Value::Null);
    }
}
