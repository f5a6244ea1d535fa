use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::value::{Function, List, Map, SafeString};
use crate::Value;

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $convert:expr),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $convert
                }
            }
        )+
    };
}

impl_from! {
    () => |_unit| Value::None,
    bool => |b| Value::Bool(b),
    u8 => |i| Value::Integer(i64::from(i)),
    u16 => |i| Value::Integer(i64::from(i)),
    u32 => |i| Value::Integer(i64::from(i)),
    i8 => |i| Value::Integer(i64::from(i)),
    i16 => |i| Value::Integer(i64::from(i)),
    i32 => |i| Value::Integer(i64::from(i)),
    i64 => |i| Value::Integer(i),
    f32 => |f| Value::Float(f64::from(f)),
    f64 => |f| Value::Float(f),
    char => |c| Value::String(c.to_string()),
    String => |s| Value::String(s),
    &str => |s| Value::String(s.to_owned()),
    &String => |s| Value::String(s.clone()),
    Cow<'_, str> => |s| Value::String(s.into_owned()),
    SafeString => |s| Value::Safe(s),
    Function => |f| Value::Fn(f),
    Map => |map| Value::Map(map),
}

/// Context keys only need to become strings, so any ordered or hashed map
/// with string-like keys converts.
fn collect_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Value
where
    K: Into<String>,
    V: Into<Value>,
{
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}

fn collect_list<V>(items: impl IntoIterator<Item = V>) -> Value
where
    V: Into<Value>,
{
    Value::List(items.into_iter().map(Into::into).collect::<List>())
}

impl<V> From<Vec<V>> for Value
where
    V: Into<Value>,
{
    fn from(list: Vec<V>) -> Self {
        collect_list(list)
    }
}

impl<V, const N: usize> From<[V; N]> for Value
where
    V: Into<Value>,
{
    fn from(list: [V; N]) -> Self {
        collect_list(list)
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(entries: [(K, V); N]) -> Self {
        collect_map(entries)
    }
}

impl<K, V> From<BTreeMap<K, V>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: BTreeMap<K, V>) -> Self {
        collect_map(map)
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        collect_map(map)
    }
}

/// `None` becomes [`Value::None`], which renders empty and is falsy.
impl<V> From<Option<V>> for Value
where
    V: Into<Value>,
{
    fn from(opt: Option<V>) -> Self {
        opt.map_or(Value::None, Into::into)
    }
}

impl<V> FromIterator<V> for Value
where
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        collect_list(iter)
    }
}

impl<K, V> FromIterator<(K, V)> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        collect_map(iter)
    }
}
