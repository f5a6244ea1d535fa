//! Defines the [`Value`] enum, representing any valid renderable data.

mod cow;
mod from;
mod func;
mod safe;
#[cfg(feature = "serde")]
mod ser;

use std::mem;

pub use crate::value::cow::ValueCow;
pub use crate::value::func::Function;
pub use crate::value::safe::SafeString;
#[cfg(feature = "serde")]
pub use crate::value::ser::to_value;

/// An insertion ordered map of values.
pub type Map = indexmap::IndexMap<String, Value>;

/// A list of values.
pub type List = Vec<Value>;

/// Data to be rendered represented as a recursive enum.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// An absent value, renders as nothing.
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(List),
    Map(Map),
    /// Text that has already been rendered and must not be escaped again.
    Safe(SafeString),
    /// A callable value, invoked when it is looked up by a template.
    Fn(Function),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(s), Self::Bool(o)) => s == o,
            (Self::Integer(s), Self::Integer(o)) => s == o,
            (Self::Float(s), Self::Float(o)) => s == o,
            (Self::String(s), Self::String(o)) => s == o,
            (Self::List(s), Self::List(o)) => s == o,
            (Self::Map(s), Self::Map(o)) => s == o,
            (Self::Safe(s), Self::Safe(o)) => s == o,
            (Self::Fn(s), Self::Fn(o)) => s == o,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Value {
    /// A human readable name for the type of this value.
    pub fn human(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Safe(_) => "safe string",
            Self::Fn(_) => "function",
        }
    }

    /// Returns `false` for `None`, `false`, zero, and empty strings, lists,
    /// and maps. Everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::None => false,
            Self::Bool(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::List(l) => !l.is_empty(),
            Self::Map(m) => !m.is_empty(),
            Self::Safe(s) => !s.as_str().is_empty(),
            Self::Fn(_) => true,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the text of a string or safe string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Safe(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Looks up a map key, or a list index if the key is numeric.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            Self::List(list) => key.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        }
    }
}
