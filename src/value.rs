use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::identity::{Id, Identity};

/// A dynamically typed, reference-counted value.
///
/// Cloning a value shares the instance. Wrapping equal data twice with
/// [`Value::new`] creates two distinct instances with different identities.
#[derive(Clone)]
pub struct Value(Arc<dyn Any + Send + Sync>);

impl Value {
    /// Wrap data in a new instance.
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Arc::new(data))
    }

    /// Create a new, empty object.
    pub fn object() -> Self {
        Self::new(Object::default())
    }

    /// The wrapped data, if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref()
    }

    /// The object this value wraps, if any.
    pub fn as_object(&self) -> Option<&Object> {
        self.downcast_ref()
    }

    /// Look up an attribute.
    ///
    /// Returns `None` if the attribute is not set or the value is not an
    /// object.
    pub fn attr(&self, name: &str) -> Option<Value> {
        self.as_object()?.get(name)
    }

    /// Whether both values are the same instance.
    pub fn is(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Identity for Value {
    #[inline]
    fn identity(&self) -> Id {
        Id::of_shared(&self.0)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.as_object() {
            Some(object) => object.fmt(f),
            None => f.pad("Value(..)"),
        }
    }
}

/// A bag of named, mutable attributes.
///
/// Setting an attribute replaces the instance stored under its name, which
/// changes the attribute's identity even if the new value is equal.
#[derive(Default)]
pub struct Object {
    attrs: RwLock<FxHashMap<String, Value>>,
}

impl Object {
    /// Look up an attribute.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.attrs.read().get(name).cloned()
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attrs.write().insert(name.into(), value)
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.attrs.write().remove(name)
    }

    /// Whether an attribute is set.
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.read().contains_key(name)
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let attrs = self.attrs.read();
        let mut names: Vec<_> = attrs.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}
