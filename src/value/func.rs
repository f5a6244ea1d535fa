use std::fmt;
use std::sync::Arc;

use crate::helpers::{Call, HelperReturn};
use crate::{Result, Value};

type HelperFn = dyn Fn(&Call<'_>) -> Result<Value> + Send + Sync + 'static;

/// A callable value.
///
/// Functions are stored in the helper registries and can also be placed
/// directly in the render context, where they are invoked as soon as a
/// template looks them up.
///
/// # Examples
///
/// ```
/// use whisker::{value, Function, Value};
///
/// let ctx = value! {
///     greeting: Value::Fn(Function::new(|call| {
///         let name = call.this().value().get("name").and_then(Value::as_str);
///         format!("hello {}", name.unwrap_or("stranger"))
///     })),
///     name: "world",
/// };
///
/// let engine = whisker::Engine::new();
/// let result = engine.compile("{{greeting}}")?.render_from(&engine, &ctx).to_string()?;
/// assert_eq!(result, "hello world");
/// # Ok::<(), whisker::Error>(())
/// ```
#[derive(Clone)]
pub struct Function(Arc<HelperFn>);

impl Function {
    /// Wraps a closure taking the helper calling convention.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Call<'_>) -> R + Send + Sync + 'static,
        R: HelperReturn,
    {
        Self(Arc::new(move |call: &Call<'_>| f(call).into_value()))
    }

    /// Invokes the function.
    pub fn call(&self, call: &Call<'_>) -> Result<Value> {
        (self.0)(call)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<function>")
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
