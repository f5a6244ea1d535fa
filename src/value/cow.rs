//! Defines a clone-on-write [`Value`].

use std::ops::Deref;

use crate::Value;

/// A value that is either borrowed from the render context or was produced
/// during rendering.
#[derive(Debug, Clone)]
pub enum ValueCow<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

impl Deref for ValueCow<'_> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(v) => v,
            Self::Owned(v) => v,
        }
    }
}

impl Default for ValueCow<'_> {
    fn default() -> Self {
        Self::Owned(Value::None)
    }
}

impl<'a> ValueCow<'a> {
    /// Extracts the owned value, cloning it if borrowed.
    pub fn into_owned(self) -> Value {
        match self {
            Self::Borrowed(v) => v.clone(),
            Self::Owned(v) => v,
        }
    }

    /// Looks up a map key or list index, borrowing from the underlying value
    /// where possible.
    pub(crate) fn lookup(self, key: &str) -> Option<ValueCow<'a>> {
        match self {
            Self::Borrowed(v) => v.get(key).map(ValueCow::Borrowed),
            Self::Owned(v) => v.get(key).cloned().map(ValueCow::Owned),
        }
    }
}

impl<'a> From<&'a Value> for ValueCow<'a> {
    fn from(v: &'a Value) -> Self {
        Self::Borrowed(v)
    }
}

impl From<Value> for ValueCow<'_> {
    fn from(v: Value) -> Self {
        Self::Owned(v)
    }
}
