/// Construct a [`Value::Map`][crate::Value::Map] from JSON-like map entries.
///
/// Keys are identifiers, string literals or parenthesized expressions. Values
/// can be nested maps `{...}`, lists `[...]`, `None`, or any expression that
/// converts using [`Value::from`][crate::Value].
///
/// # Examples
///
/// ```
/// let key = "computed";
/// let ctx = whisker::value! {
///     title: "Users",
///     users: [{ name: "Ann", admin: true }, { name: "Bo" }],
///     "@weird key": None,
///     (key): 1 + 2,
/// };
/// assert_eq!(ctx.get("title").and_then(|v| v.as_str()), Some("Users"));
/// ```
#[macro_export]
macro_rules! value {
    ($($entries:tt)*) => {
        $crate::Value::Map({
            #[allow(unused_mut)]
            let mut map = $crate::Map::new();
            $crate::_value_entries!(map $($entries)*);
            map
        })
    };
}

/// Inserts `key: value` entries into the map named by the first token.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_entries {
    ($map:ident) => {};

    ($map:ident , $($rest:tt)*) => {
        $crate::_value_entries!($map $($rest)*);
    };

    ($map:ident $key:ident : $($rest:tt)+) => {
        $crate::_value_entries!(@value $map (stringify!($key)) $($rest)+);
    };

    ($map:ident $key:literal : $($rest:tt)+) => {
        $crate::_value_entries!(@value $map ($key) $($rest)+);
    };

    ($map:ident ($key:expr) : $($rest:tt)+) => {
        $crate::_value_entries!(@value $map ($key) $($rest)+);
    };

    (@value $map:ident ($key:expr) None $($rest:tt)*) => {
        $crate::_value_entries!(@insert $map ($key) ($crate::Value::None) $($rest)*);
    };

    (@value $map:ident ($key:expr) { $($inner:tt)* } $($rest:tt)*) => {
        $crate::_value_entries!(@insert $map ($key) ($crate::value!($($inner)*)) $($rest)*);
    };

    (@value $map:ident ($key:expr) [ $($items:tt)* ] $($rest:tt)*) => {
        $crate::_value_entries!(@insert $map ($key) ($crate::_value_list!($($items)*)) $($rest)*);
    };

    (@value $map:ident ($key:expr) $value:expr $(, $($rest:tt)*)?) => {
        $crate::_value_entries!(@insert $map ($key) ($crate::Value::from($value)) $(, $($rest)*)?);
    };

    (@insert $map:ident ($key:expr) ($value:expr) $($rest:tt)*) => {
        $map.insert(::std::string::String::from($key), $value);
        $crate::_value_entries!($map $($rest)*);
    };
}

/// Builds a [`Value::List`][crate::Value::List] from comma separated items.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_list {
    (@items [$($done:expr),*]) => {
        ::std::vec![$($done),*]
    };

    (@items [$($done:expr),*] , $($rest:tt)*) => {
        $crate::_value_list!(@items [$($done),*] $($rest)*)
    };

    (@items [$($done:expr),*] None $($rest:tt)*) => {
        $crate::_value_list!(@items [$($done,)* $crate::Value::None] $($rest)*)
    };

    (@items [$($done:expr),*] { $($inner:tt)* } $($rest:tt)*) => {
        $crate::_value_list!(@items [$($done,)* $crate::value!($($inner)*)] $($rest)*)
    };

    (@items [$($done:expr),*] [ $($inner:tt)* ] $($rest:tt)*) => {
        $crate::_value_list!(@items [$($done,)* $crate::_value_list!($($inner)*)] $($rest)*)
    };

    (@items [$($done:expr),*] $item:expr $(, $($rest:tt)*)?) => {
        $crate::_value_list!(@items [$($done,)* $crate::Value::from($item)] $(, $($rest)*)?)
    };

    ($($items:tt)*) => {
        $crate::Value::List($crate::_value_list!(@items [] $($items)*))
    };
}
