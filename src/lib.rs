//! A Handlebars-style template engine with helpers, partials and
//! precompilation.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Expressions: `{{ user.name }}`, unescaped with `{{{ html }}}`
//! - Helpers with arguments: `{{ format-date created "%Y" utc=true }}`
//! - Subexpressions: `{{ outer (inner value) }}`
//! - Blocks: `{{#if user}} ... {{else}} ... {{/if}}`
//! - Loops with `@index`, `@key`, `@first` and `@last`: `{{#each users}} ... {{/each}}`
//! - Partials with arguments: `{{> card user title="Hi"}}`
//! - Raw blocks: `{{{{raw}}}} {{ not parsed }} {{{{/raw}}}}`
//! - Comments: `{{! ignored }}` and `{{!-- ignored --}}`
//! - Lines holding only a block tag are removed from the output
//!
//! ### Engine
//!
//! - Helpers are plain closures taking a [`Call`]
//! - Render to a [`String`] or any [`std::io::Write`] implementor
//! - Render using any [`serde`] serializable values
//! - Precompile templates into a serializable form
//! - Convenient macro for quick rendering:
//!   `whisker::value!{ name: "John", age: 42 }`
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores helpers and
//! partials. Generally, you only need to construct one engine during the
//! lifetime of a program.
//!
//! ```
//! let engine = whisker::Engine::new();
//! ```
//!
//! Next, [`.compile`][Engine::compile] is used to compile a template.
//!
//! ```
//! # let engine = whisker::Engine::new();
//! let template = engine.compile("Hello {{ user.name }}!")?;
//! # Ok::<(), whisker::Error>(())
//! ```
//!
//! Finally, the template is rendered with the engine and some data.
//!
//! ```
//! # let engine = whisker::Engine::new();
//! # let template = engine.compile("Hello {{ user.name }}!")?;
//! let result = template
//!     .render(&engine, whisker::value!{ user: { name: "John Smith" }})
//!     .to_string()?;
//! assert_eq!(result, "Hello John Smith!");
//! # Ok::<(), whisker::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String }
//!
//! let ctx = Context { user: User { name: "John Smith".into() } };
//!
//! let engine = whisker::Engine::new();
//! let result = engine
//!     .compile("Hello {{ user.name }}")?
//!     .render(&engine, &ctx)
//!     .to_string()?;
//!
//! assert_eq!(result, "Hello John Smith");
//! # Ok::<(), whisker::Error>(())
//! ```
//!
//! ### Transform data using helpers
//!
//! ```
//! let mut engine = whisker::Engine::new();
//! engine.add_helper("lower", |call| {
//!     call.param_as::<&str>(0).map(str::to_lowercase)
//! });
//!
//! let result = engine
//!     .compile("Hello {{ lower value }}")?
//!     .render(&engine, whisker::value! { value: "WORLD!" })
//!     .to_string()?;
//!
//! assert_eq!(result, "Hello world!");
//! # Ok::<(), whisker::Error>(())
//! ```
//!
//! See the [`helpers`] module documentation for more information.
//!
//! ### Reuse markup with partials
//!
//! ```
//! let mut engine = whisker::Engine::new();
//! engine.add_partial("user", "<li>{{name}}</li>")?;
//!
//! let result = engine
//!     .compile("<ul>{{#each users}}{{> user}}{{/each}}</ul>")?
//!     .render(&engine, whisker::value! { users: [{ name: "Ann" }, { name: "Bo" }] })
//!     .to_string()?;
//!
//! assert_eq!(result, "<ul><li>Ann</li><li>Bo</li></ul>");
//! # Ok::<(), whisker::Error>(())
//! ```
//!
//! ### Render a template to an `impl io::Write`
//!
//! ```
//! use std::io;
//!
//! let stdout = io::BufWriter::new(io::stdout());
//!
//! let engine = whisker::Engine::new();
//! engine
//!     .compile("Hello {{ user.name }}")?
//!     .render(&engine, whisker::value! { user: { name: "John Smith" }})
//!     .to_writer(stdout)?;
//! # Ok::<(), whisker::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

mod compile;
mod error;
mod fmt;
pub mod helpers;
mod macros;
#[cfg(feature = "serde")]
mod precompile;
mod render;
mod types;
mod value;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::fmt::escape;
pub use crate::helpers::{Call, HelperReturn, Helpers, Options};
#[cfg(feature = "serde")]
pub use crate::precompile::Precompiled;
pub use crate::render::{Renderer, Scope};
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{Function, List, Map, SafeString, Value, ValueCow};

use crate::types::program;

/// The compilation and rendering engine.
///
/// The engine holds the helpers and partials that every template rendered
/// with it can use.
#[derive(Debug, Clone)]
pub struct Engine {
    helpers: Helpers,
    partials: Partials,
    max_partial_depth: usize,
}

/// A compiled template.
///
/// Templates are independent of the engine that compiled them, cheap to
/// clone, and can be rendered from many threads at once.
#[derive(Clone)]
pub struct Template {
    template: Arc<program::Template>,
}

/// A registry of named partial templates.
#[derive(Debug, Clone, Default)]
pub struct Partials {
    partials: BTreeMap<String, Template>,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine.
    #[inline]
    pub fn new() -> Self {
        Self {
            helpers: Helpers::new(),
            partials: Partials::new(),
            max_partial_depth: 64,
        }
    }

    /// Set the maximum number of nested partials.
    ///
    /// Rendering fails with [`ErrorKind::Render`] once this is exceeded,
    /// which stops recursive partials from running forever. Defaults to 64.
    #[inline]
    pub fn set_max_partial_depth(&mut self, depth: usize) {
        self.max_partial_depth = depth;
    }

    /// Add a new helper to the engine.
    ///
    /// Helpers take precedence over the builtins and over data with the same
    /// name.
    #[inline]
    pub fn add_helper<F, R>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Call<'_>) -> R + Send + Sync + 'static,
        R: HelperReturn,
    {
        self.helpers.register(name, f);
    }

    /// Add a plain value to the engine's helpers.
    #[inline]
    pub fn add_helper_value(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.helpers.register_value(name, value);
    }

    /// Set the sink that receives the value passed to `{{log value}}`.
    #[inline]
    pub fn set_logger<F>(&mut self, f: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.helpers.set_logger(f);
    }

    /// Compile a template and store it as a partial.
    #[inline]
    pub fn add_partial(&mut self, name: impl Into<String>, source: &str) -> Result<()> {
        self.partials.add(name, source)
    }

    /// Compile a template.
    #[inline]
    pub fn compile(&self, source: &str) -> Result<Template> {
        compile::template(source).map(Template::new)
    }

    /// Parse a template into a form that can be serialized and later loaded
    /// without parsing again.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn precompile(&self, source: &str) -> Result<Precompiled> {
        Precompiled::new(source)
    }

    /// Load a template produced by [`.precompile(..)`][Engine::precompile].
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    ///
    /// Fails if the precompiled tree does not match its stored source, for
    /// example when the serialized form was edited by hand.
    pub fn load_precompiled(&self, precompiled: Precompiled) -> Result<Template> {
        precompiled.into_program().map(Template::new)
    }
}

impl Template {
    fn new(template: program::Template) -> Self {
        Self {
            template: Arc::new(template),
        }
    }

    /// Render the template using the provided serializable value.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn render<'a, S>(&'a self, engine: &'a Engine, ctx: S) -> Renderer<'a>
    where
        S: ::serde::Serialize,
    {
        Renderer::with_serde(engine, &self.template, ctx)
    }

    /// Render the template using the provided value.
    #[inline]
    pub fn render_from<'a>(&'a self, engine: &'a Engine, ctx: &'a Value) -> Renderer<'a> {
        Renderer::with_value(engine, &self.template, ctx)
    }

    /// Returns the original template source.
    #[inline]
    pub fn source(&self) -> &str {
        &self.template.source
    }

    pub(crate) fn program(&self) -> &program::Template {
        &self.template
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("source", &self.source())
            .finish_non_exhaustive()
    }
}

impl Partials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a template and store it under the given name.
    pub fn add(&mut self, name: impl Into<String>, source: &str) -> Result<()> {
        let name = name.into();
        let template = compile::template(source).map_err(|err| err.with_name(&name))?;
        self.partials.insert(name, Template::new(template));
        Ok(())
    }

    /// Store an already compiled template under the given name.
    pub fn insert(&mut self, name: impl Into<String>, template: Template) {
        self.partials.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.partials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.partials.contains_key(name)
    }
}
