#![allow(clippy::wrong_self_convention)]

mod core;
mod scope;

use std::io;

pub(crate) use crate::render::core::{block, expand, partial, raw_block};
pub use crate::render::scope::Scope;

use crate::fmt::{Formatter, Writer};
use crate::helpers::{self, Helpers, LogFn};
use crate::types::program::Template;
use crate::types::span::Span;
use crate::{Engine, Error, Partials, Result, Value};

/// Everything a render step needs besides the scope: the helper and partial
/// registries, the root context, and the current partial depth.
#[derive(Clone, Copy)]
pub(crate) struct Env<'a> {
    helpers: &'a Helpers,
    partials: &'a Partials,
    local_helpers: Option<&'a Helpers>,
    local_partials: Option<&'a Partials>,
    root: &'a Value,
    depth: usize,
    max_depth: usize,
}

impl<'a> Env<'a> {
    /// Looks up a helper in the per-render registry, then the engine, then
    /// the builtins.
    pub fn helper(&self, name: &str) -> Option<&'a Value> {
        self.local_helpers
            .and_then(|h| h.get(name))
            .or_else(|| self.helpers.get(name))
            .or_else(|| helpers::builtins().get(name))
    }

    /// Looks up a partial in the per-render registry, then the engine.
    pub fn partial(&self, name: &str) -> Option<&'a Template> {
        self.local_partials
            .and_then(|p| p.get(name))
            .or_else(|| self.partials.get(name))
            .map(|t| t.program())
    }

    pub fn logger(&self) -> Option<&'a LogFn> {
        self.local_helpers
            .and_then(|h| h.logger())
            .or_else(|| self.helpers.logger())
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the environment for rendering a partial one level deeper.
    pub fn enter(&self, source: &str, span: Span) -> Result<Self> {
        if self.depth >= self.max_depth {
            return Err(Error::render(
                format!("reached maximum partial depth ({})", self.max_depth),
                source,
                span,
            ));
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }
}

/// A renderer that executes a compiled [`Template`][crate::Template].
///
/// This struct is created by [`Template::render`][crate::Template::render]
/// or [`Template::render_from`][crate::Template::render_from].
#[must_use = "must call `.to_string()` or `.to_writer(..)` on the renderer"]
pub struct Renderer<'render> {
    engine: &'render Engine,
    template: &'render Template,
    globals: Globals<'render>,
    helpers: Option<&'render Helpers>,
    partials: Option<&'render Partials>,
    max_partial_depth: Option<usize>,
}

enum Globals<'render> {
    #[cfg(feature = "serde")]
    Owned(Result<Value>),
    Borrowed(&'render Value),
}

impl<'render> Renderer<'render> {
    fn new(
        engine: &'render Engine,
        template: &'render Template,
        globals: Globals<'render>,
    ) -> Self {
        Self {
            engine,
            template,
            globals,
            helpers: None,
            partials: None,
            max_partial_depth: None,
        }
    }

    #[cfg(feature = "serde")]
    pub(crate) fn with_serde<S>(
        engine: &'render Engine,
        template: &'render Template,
        globals: S,
    ) -> Self
    where
        S: ::serde::Serialize,
    {
        Self::new(engine, template, Globals::Owned(crate::to_value(globals)))
    }

    pub(crate) fn with_value(
        engine: &'render Engine,
        template: &'render Template,
        globals: &'render Value,
    ) -> Self {
        Self::new(engine, template, Globals::Borrowed(globals))
    }

    /// Use these helpers for this render only.
    ///
    /// They are checked before the engine's helpers, so they can shadow
    /// them.
    pub fn with_helpers(mut self, helpers: &'render Helpers) -> Self {
        self.helpers = Some(helpers);
        self
    }

    /// Use these partials for this render only.
    ///
    /// They are checked before the engine's partials.
    pub fn with_partials(mut self, partials: &'render Partials) -> Self {
        self.partials = Some(partials);
        self
    }

    /// Set the maximum number of nested partials.
    ///
    /// Defaults to the engine setting.
    pub fn with_max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = Some(depth);
        self
    }

    /// Render the template to a string.
    pub fn to_string(self) -> Result<String> {
        let mut s = String::with_capacity(self.template.source.len());
        let mut f = Formatter::with_string(&mut s);
        self.render(&mut f)?;
        Ok(s)
    }

    /// Render the template to the given writer.
    pub fn to_writer<W>(self, writer: W) -> Result<()>
    where
        W: io::Write,
    {
        let mut w = Writer::new(writer);
        let mut f = Formatter::with_writer(&mut w);
        self.render(&mut f)
            .map_err(|err| w.take_err().map(Error::from).unwrap_or(err))
    }

    fn render(self, f: &mut Formatter<'_>) -> Result<()> {
        match self.globals {
            #[cfg(feature = "serde")]
            Globals::Owned(ref result) => {
                let root = result.as_ref().map_err(Clone::clone)?;
                render_root(&self, f, root)
            }
            Globals::Borrowed(root) => render_root(&self, f, root),
        }
    }
}

fn render_root(renderer: &Renderer<'_>, f: &mut Formatter<'_>, root: &Value) -> Result<()> {
    let env = Env {
        helpers: &renderer.engine.helpers,
        partials: &renderer.engine.partials,
        local_helpers: renderer.helpers,
        local_partials: renderer.partials,
        root,
        depth: 0,
        max_depth: renderer
            .max_partial_depth
            .unwrap_or(renderer.engine.max_partial_depth),
    };
    let scope = Scope::new(root);
    renderer.template.block.render(f, &scope, &env)
}
