//! The standard helpers: `each`, `if`, `unless`, `with`, `lookup` and `log`.

use crate::helpers::missing::iterate;
use crate::helpers::Call;
use crate::value::{SafeString, ValueCow};
use crate::{Result, Value};

/// `{{#each items}}...{{else}}...{{/each}}`
///
/// Renders the body once per list element or map entry. Inside the body
/// `@index`, `@first` and `@last` are available, and `@key` for maps.
pub fn each(call: &Call<'_>) -> Result<SafeString> {
    let options = call.block_options()?;
    let this = call.this();
    match call.param(0) {
        Some(Value::List(list)) => iterate(this, options, list.iter().map(|v| (None, v))),
        Some(Value::Map(map)) => iterate(
            this,
            options,
            map.iter().map(|(k, v)| (Some(k.as_str()), v)),
        ),
        _ => options.inverse(this),
    }
}

/// `{{#if cond}}...{{else}}...{{/if}}`
pub fn if_(call: &Call<'_>) -> Result<SafeString> {
    let options = call.block_options()?;
    if call.evaluated(0)?.is_truthy() {
        options.render(call.this())
    } else {
        options.inverse(call.this())
    }
}

/// `{{#unless cond}}...{{else}}...{{/unless}}`
pub fn unless(call: &Call<'_>) -> Result<SafeString> {
    let options = call.block_options()?;
    if call.evaluated(0)?.is_truthy() {
        options.inverse(call.this())
    } else {
        options.render(call.this())
    }
}

/// `{{#with value}}...{{/with}}` renders the body with `value` as `this`.
pub fn with(call: &Call<'_>) -> Result<SafeString> {
    let options = call.block_options()?;
    let value = call
        .param(0)
        .map_or(ValueCow::Owned(Value::None), ValueCow::Borrowed);
    options.render(&call.this().child(value))
}

/// `{{lookup container key}}` indexes a map by key or a list by position.
pub fn lookup(call: &Call<'_>) -> Option<Value> {
    let container = call.param(0)?;
    let key = match call.param(1)? {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        _ => return None,
    };
    container.get(&key).cloned()
}

/// `{{log value}}` hands the value to the configured logger.
pub fn log(call: &Call<'_>) {
    let value = call.param(0).cloned().unwrap_or_default();
    tracing::info!(target: "whisker::log", value = ?value, "template log");
    if let Some(logger) = call.env().logger() {
        logger(&value);
    }
}
