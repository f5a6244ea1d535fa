//! Typed access to helper arguments.

use crate::value::{List, Map};
use crate::Value;

/// A type that a helper argument can be converted to.
///
/// This is used by [`Call::param_as`][crate::Call::param_as] and
/// [`Call::hash_as`][crate::Call::hash_as]. Borrowed types such as `&str`
/// and `&[Value]` borrow from the evaluated arguments.
pub trait FromValue<'a>: Sized {
    #[doc(hidden)]
    fn from_value(v: &'a Value) -> Result<Self, Error>;
}

/// Why an argument could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The value has the wrong type.
    Type {
        expected: &'static str,
        found: &'static str,
    },
    /// The integer does not fit in the requested type.
    TryFromInt { ty: &'static str, value: i64 },
}

impl<'a> FromValue<'a> for &'a Value {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        Ok(v)
    }
}

impl<'a> FromValue<'a> for Value {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        Ok(v.clone())
    }
}

impl<'a> FromValue<'a> for bool {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        match v {
            Value::Bool(b) => Ok(*b),
            v => Err(Error::ty("bool", v)),
        }
    }
}

macro_rules! impl_for_int {
    ($($ty:ty)+) => {
        $(
            impl<'a> FromValue<'a> for $ty {
                fn from_value(v: &'a Value) -> Result<Self, Error> {
                    match v {
                        Value::Integer(i) => (*i).try_into().map_err(|_| Error::TryFromInt {
                            ty: stringify!($ty),
                            value: *i,
                        }),
                        v => Err(Error::ty(stringify!($ty), v)),
                    }
                }
            }
        )+
    };
}

impl_for_int! { u8 u16 u32 u64 usize i8 i16 i32 i64 isize }

impl<'a> FromValue<'a> for f64 {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        match v {
            Value::Float(f) => Ok(*f),
            Value::Integer(i) => Ok(*i as f64),
            v => Err(Error::ty("f64", v)),
        }
    }
}

impl<'a> FromValue<'a> for &'a str {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        v.as_str().ok_or_else(|| Error::ty("string", v))
    }
}

impl<'a> FromValue<'a> for String {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        <&str>::from_value(v).map(str::to_owned)
    }
}

impl<'a> FromValue<'a> for &'a [Value] {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        match v {
            Value::List(list) => Ok(list),
            v => Err(Error::ty("list", v)),
        }
    }
}

impl<'a> FromValue<'a> for List {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        <&[Value]>::from_value(v).map(<[Value]>::to_vec)
    }
}

impl<'a> FromValue<'a> for &'a Map {
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        match v {
            Value::Map(map) => Ok(map),
            v => Err(Error::ty("map", v)),
        }
    }
}

impl<'a, T> FromValue<'a> for Option<T>
where
    T: FromValue<'a>,
{
    fn from_value(v: &'a Value) -> Result<Self, Error> {
        match v {
            Value::None => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl Error {
    fn ty(expected: &'static str, found: &Value) -> Self {
        Self::Type {
            expected,
            found: found.human(),
        }
    }

    pub(crate) fn describe(&self, what: &str) -> String {
        match self {
            Self::Type { expected, found } => {
                format!("expected {expected} {what}, found {found}")
            }
            Self::TryFromInt { ty, value } => {
                format!("{what} `{value}` is out of range for `{ty}`")
            }
        }
    }
}
