//! Helper functions and the helper calling convention.
//!
//! A helper is any function or closure with the following signature, where
//! `R` is one of the types implementing [`HelperReturn`].
//!
//! ```text
//! Fn(&Call<'_>) -> R
//! ```
//!
//! The [`Call`] gives access to the evaluated positional and keyword
//! arguments, the current scope (`this`) and, for block helpers, the
//! [`Options`] used to render the block body and its `{{else}}` branch.
//!
//! # Examples
//!
//! ### An inline helper
//!
//! ```
//! use whisker::{value, Call, Engine, Result};
//!
//! fn shout(call: &Call<'_>) -> Result<String> {
//!     let s: &str = call.param_as(0)?;
//!     Ok(s.to_uppercase())
//! }
//!
//! let mut engine = Engine::new();
//! engine.add_helper("shout", shout);
//!
//! let result = engine
//!     .compile("{{shout name}}!")?
//!     .render(&engine, value! { name: "hey" })
//!     .to_string()?;
//! assert_eq!(result, "HEY!");
//! # Ok::<(), whisker::Error>(())
//! ```
//!
//! ### A block helper
//!
//! Block helpers render their body with [`Options::render`] and return the
//! resulting [`SafeString`], which is never escaped again.
//!
//! ```
//! use whisker::{value, Call, Engine, Result, SafeString};
//!
//! fn bold(call: &Call<'_>) -> Result<SafeString> {
//!     let mut out = SafeString::from("<b>");
//!     if let Some(options) = call.options() {
//!         out.push_str(options.render(call.this())?.as_str());
//!     }
//!     out.push_str("</b>");
//!     Ok(out)
//! }
//!
//! let mut engine = Engine::new();
//! engine.add_helper("bold", bold);
//!
//! let result = engine
//!     .compile("{{#bold}}{{name}}{{/bold}}")?
//!     .render(&engine, value! { name: "<Ann>" })
//!     .to_string()?;
//! assert_eq!(result, "<b>&lt;Ann&gt;</b>");
//! # Ok::<(), whisker::Error>(())
//! ```

mod args;
#[cfg(feature = "builtins")]
mod builtins;
mod missing;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub use crate::helpers::args::{Error as ArgError, FromValue};
use crate::fmt::Formatter;
use crate::render::{Env, Scope};
use crate::types::program;
use crate::types::span::Span;
use crate::value::{SafeString, ValueCow};
use crate::{Error, ErrorKind, Function, Result, Value};

/// A logging sink used by the `log` helper.
pub(crate) type LogFn = dyn Fn(&Value) + Send + Sync + 'static;

/// A registry of helpers.
///
/// Each [`Engine`][crate::Engine] owns one of these, and further registries
/// can be layered on top for a single render using
/// [`Renderer::with_helpers`][crate::Renderer::with_helpers].
#[derive(Clone, Default)]
pub struct Helpers {
    helpers: BTreeMap<String, Value>,
    logger: Option<Arc<LogFn>>,
}

/// A type that can be returned from a helper.
///
/// This is implemented for the common scalar types, [`String`] and
/// [`SafeString`], [`Value`] itself, and [`Option`] and [`Result`] wrapping
/// any of those.
pub trait HelperReturn {
    #[doc(hidden)]
    fn into_value(self) -> Result<Value>;
}

/// The arguments and environment of a single helper invocation.
pub struct Call<'a> {
    pub(crate) name: &'a str,
    pub(crate) this: &'a Scope<'a>,
    pub(crate) params: Vec<ValueCow<'a>>,
    pub(crate) hash: Vec<(&'a str, ValueCow<'a>)>,
    pub(crate) options: Option<Options<'a>>,
    pub(crate) env: Env<'a>,
    pub(crate) source: &'a str,
    pub(crate) span: Span,
    pub(crate) args: Option<&'a program::Args>,
}

/// Gives block helpers access to their body.
///
/// `render` renders the main body and `inverse` the `{{else}}` branch. For an
/// inverted block (`{{^name}}`) the two are swapped. For a raw block the main
/// body is the raw text.
#[derive(Clone, Copy)]
pub struct Options<'a> {
    pub(crate) fn_: Body<'a>,
    pub(crate) inverse: Body<'a>,
    pub(crate) env: Env<'a>,
}

#[derive(Clone, Copy)]
pub(crate) enum Body<'a> {
    Block(&'a program::Block),
    Raw(&'a str),
    Empty,
}

impl Helpers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a helper function.
    ///
    /// Any existing helper with the same name is replaced.
    pub fn register<F, R>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Call<'_>) -> R + Send + Sync + 'static,
        R: HelperReturn,
    {
        self.helpers
            .insert(name.into(), Value::Fn(Function::new(f)));
    }

    /// Register a plain value under a helper name.
    ///
    /// Simple names in templates are looked up as helpers before the render
    /// context, so this acts as a global that takes precedence over the data.
    pub fn register_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.helpers.insert(name.into(), value.into());
    }

    /// Set the sink that receives the value passed to the `log` helper.
    pub fn set_logger<F>(&mut self, f: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    pub(crate) fn logger(&self) -> Option<&LogFn> {
        self.logger.as_deref()
    }
}

impl fmt::Debug for Helpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helpers")
            .field("helpers", &self.helpers.keys())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Returns the helpers that are always available, unless shadowed.
pub(crate) fn builtins() -> &'static Helpers {
    static BUILTINS: OnceLock<Helpers> = OnceLock::new();
    BUILTINS.get_or_init(|| {
        let mut helpers = Helpers::new();
        helpers.register("helperMissing", missing::helper_missing);
        helpers.register("blockHelperMissing", missing::block_helper_missing);
        #[cfg(feature = "builtins")]
        {
            helpers.register("each", builtins::each);
            helpers.register("if", builtins::if_);
            helpers.register("unless", builtins::unless);
            helpers.register("with", builtins::with);
            helpers.register("lookup", builtins::lookup);
            helpers.register("log", builtins::log);
        }
        helpers
    })
}

////////////////////////////////////////////////////////////////////////////////
// Call
////////////////////////////////////////////////////////////////////////////////

impl<'a> Call<'a> {
    /// The name the helper was invoked with.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The scope the helper was invoked in.
    pub fn this(&self) -> &Scope<'a> {
        self.this
    }

    /// The evaluated positional arguments.
    pub fn params(&self) -> &[ValueCow<'a>] {
        &self.params
    }

    /// Returns the positional argument at `i`.
    pub fn param(&self, i: usize) -> Option<&Value> {
        self.params.get(i).map(|v| &**v)
    }

    /// Returns the positional argument at `i` converted to `T`.
    ///
    /// A missing argument is treated as [`Value::None`] so that `Option<T>`
    /// can be used for optional arguments. Conversion failures point at the
    /// argument in the template source.
    pub fn param_as<'b, T>(&'b self, i: usize) -> Result<T>
    where
        T: FromValue<'b>,
    {
        static NONE: Value = Value::None;
        let value = self.param(i).unwrap_or(&NONE);
        T::from_value(value).map_err(|err| {
            let span = self
                .args
                .and_then(|args| args.params.get(i))
                .map_or(self.span, |p| p.span);
            Error::spanned(
                ErrorKind::Helper,
                format!("helper `{}` {}", self.name, err.describe("argument")),
                self.source,
                span,
            )
        })
    }

    /// Returns the keyword argument with the given name.
    pub fn hash(&self, name: &str) -> Option<&Value> {
        self.hash
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| &**v)
    }

    /// Returns the keyword argument with the given name converted to `T`.
    pub fn hash_as<'b, T>(&'b self, name: &str) -> Result<T>
    where
        T: FromValue<'b>,
    {
        static NONE: Value = Value::None;
        let value = self.hash(name).unwrap_or(&NONE);
        T::from_value(value).map_err(|err| {
            let span = self
                .args
                .and_then(|args| args.hash.iter().find(|(k, _)| k == name))
                .map_or(self.span, |(_, p)| p.span);
            Error::spanned(
                ErrorKind::Helper,
                format!(
                    "helper `{}` {}",
                    self.name,
                    err.describe(&format!("keyword argument `{name}`"))
                ),
                self.source,
                span,
            )
        })
    }

    /// The keyword arguments in the order they were written.
    pub fn hash_pairs(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.hash.iter().map(|(k, v)| (*k, &**v))
    }

    /// The block options, only present when invoked as a block.
    pub fn options(&self) -> Option<&Options<'a>> {
        self.options.as_ref()
    }

    /// The outermost render context.
    pub fn root(&self) -> &Value {
        self.this.root()
    }

    /// Invokes a callable value with the current scope and no arguments.
    pub fn call(&self, f: &Function) -> Result<Value> {
        let call = Call {
            name: self.name,
            this: self.this,
            params: Vec::new(),
            hash: Vec::new(),
            options: None,
            env: self.env,
            source: self.source,
            span: self.span,
            args: None,
        };
        f.call(&call)
    }

    /// Returns the positional argument at `i`, invoking it first if it is a
    /// callable value.
    pub(crate) fn evaluated(&self, i: usize) -> Result<ValueCow<'_>> {
        match self.param(i) {
            Some(Value::Fn(f)) => self.call(f).map(ValueCow::Owned),
            Some(v) => Ok(ValueCow::Borrowed(v)),
            None => Ok(ValueCow::Owned(Value::None)),
        }
    }

    pub(crate) fn block_options(&self) -> Result<&Options<'a>> {
        self.options.as_ref().ok_or_else(|| {
            Error::render(
                format!("helper `{}` can only be used as a block", self.name),
                self.source,
                self.span,
            )
        })
    }

    pub(crate) fn error(&self, kind: ErrorKind, msg: impl Into<String>) -> Error {
        Error::spanned(kind, msg, self.source, self.span)
    }

    pub(crate) fn env(&self) -> &Env<'a> {
        &self.env
    }
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("hash", &self.hash)
            .field("block", &self.options.is_some())
            .finish_non_exhaustive()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Options
////////////////////////////////////////////////////////////////////////////////

impl<'a> Options<'a> {
    /// Renders the block body with the given scope.
    pub fn render(&self, scope: &Scope<'_>) -> Result<SafeString> {
        self.fn_.render(scope, &self.env)
    }

    /// Renders the `{{else}}` branch with the given scope.
    pub fn inverse(&self, scope: &Scope<'_>) -> Result<SafeString> {
        self.inverse.render(scope, &self.env)
    }

    /// Looks up a helper in the same registries the template uses.
    pub fn helper(&self, name: &str) -> Option<&'a Value> {
        self.env.helper(name)
    }

    /// Whether a partial with this name can be rendered.
    pub fn has_partial(&self, name: &str) -> bool {
        self.env.partial(name).is_some()
    }

    /// The outermost render context.
    pub fn root(&self) -> &'a Value {
        self.env.root()
    }
}

impl Body<'_> {
    fn render(&self, scope: &Scope<'_>, env: &Env<'_>) -> Result<SafeString> {
        let mut out = SafeString::new();
        match self {
            Self::Block(block) => {
                let mut f = Formatter::with_string(out.as_mut_string());
                block.render(&mut f, scope, env)?;
            }
            Self::Raw(raw) => out.push_str(raw),
            Self::Empty => {}
        }
        Ok(out)
    }
}

////////////////////////////////////////////////////////////////////////////////
// HelperReturn
////////////////////////////////////////////////////////////////////////////////

macro_rules! impl_helper_return {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl HelperReturn for $ty {
                fn into_value(self) -> Result<Value> {
                    Ok(Value::from(self))
                }
            }
        )+
    };
}

impl_helper_return! {
    Value, SafeString, String, &'static str, bool,
    u8, u16, u32, i8, i16, i32, i64, f32, f64,
}

impl HelperReturn for () {
    fn into_value(self) -> Result<Value> {
        Ok(Value::None)
    }
}

impl<T> HelperReturn for Option<T>
where
    T: HelperReturn,
{
    fn into_value(self) -> Result<Value> {
        match self {
            Some(v) => v.into_value(),
            None => Ok(Value::None),
        }
    }
}

impl<T> HelperReturn for Result<T>
where
    T: HelperReturn,
{
    fn into_value(self) -> Result<Value> {
        self?.into_value()
    }
}
