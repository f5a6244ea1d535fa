//! The fallbacks invoked when a name does not resolve to a helper.
//!
//! These are always registered, even without the `builtins` feature, and can
//! be replaced by registering a helper with the same name.

use crate::helpers::{Call, Options};
use crate::render::Scope;
use crate::value::SafeString;
use crate::{ErrorKind, Result, Value};

/// Called for `{{name args}}` when `name` is neither a helper nor present in
/// the context.
pub fn helper_missing(call: &Call<'_>) -> Result<Value> {
    if call.params().is_empty() {
        return Ok(Value::None);
    }
    Err(call.error(
        ErrorKind::UnresolvedHelper,
        format!("could not find helper or property `{}`", call.name()),
    ))
}

/// Called for `{{#name}}` when `name` is not a callable helper. The first
/// parameter is the value `name` resolved to.
pub fn block_helper_missing(call: &Call<'_>) -> Result<SafeString> {
    let options = call.block_options()?;
    let this = call.this();
    let value = call.evaluated(0)?;
    match &*value {
        Value::String(s) if s.is_empty() => options.render(&this.child(value.clone())),
        v if !v.is_truthy() => options.inverse(this),
        Value::List(list) => iterate(this, options, list.iter().map(|v| (None, v))),
        Value::Bool(true) => options.render(this),
        _ => options.render(&this.child(value.clone())),
    }
}

/// Renders the block once per item, each in a child scope carrying the loop
/// variables. Falls back to the inverse when there are no items.
pub(super) fn iterate<'v, I>(
    this: &Scope<'_>,
    options: &Options<'_>,
    items: I,
) -> Result<SafeString>
where
    I: ExactSizeIterator<Item = (Option<&'v str>, &'v Value)>,
{
    let len = items.len();
    if len == 0 {
        return options.inverse(this);
    }
    items
        .enumerate()
        .map(|(i, (key, item))| {
            let scope = this.child_item(item, i, len, key.map(str::to_owned));
            options.render(&scope)
        })
        .collect()
}
