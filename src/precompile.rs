use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compile;
use crate::types::span::Span;
use crate::types::{ast, program};
use crate::{Error, ErrorKind, Result};

/// A parsed template that can be stored and loaded later without parsing
/// the source again.
///
/// Created with [`Engine::precompile`][crate::Engine::precompile] and turned
/// back into a [`Template`][crate::Template] with
/// [`Engine::load_precompiled`][crate::Engine::load_precompiled].
///
/// # Examples
///
/// ```
/// use whisker::{value, Engine, Precompiled};
///
/// let engine = Engine::new();
/// let precompiled = engine.precompile("Hi {{name}}")?;
/// let json = serde_json::to_string(&precompiled).unwrap();
///
/// let loaded: Precompiled = serde_json::from_str(&json).unwrap();
/// let template = engine.load_precompiled(loaded)?;
/// let result = template.render(&engine, value! { name: "Jo" }).to_string()?;
/// assert_eq!(result, "Hi Jo");
/// # Ok::<(), whisker::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precompiled {
    source: String,
    template: ast::Template,
}

impl Precompiled {
    pub(crate) fn new(source: &str) -> Result<Self> {
        Ok(Self {
            source: source.to_owned(),
            template: compile::parse(source)?,
        })
    }

    /// Returns the original template source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compiles the stored tree, after checking that every span still points
    /// into the stored source. A tampered or mismatched payload is rejected
    /// instead of being sliced out of bounds later.
    pub(crate) fn into_program(self) -> Result<program::Template> {
        check_nodes(&self.source, &self.template.body)?;
        Ok(compile::compile(Arc::from(self.source), self.template))
    }
}

fn check_nodes(source: &str, nodes: &[ast::Node]) -> Result<()> {
    for node in nodes {
        match node {
            ast::Node::Literal(text) | ast::Node::Whitespace(text) | ast::Node::Newline(text) => {
                check_span(source, text.span)?;
            }
            ast::Node::Comment(span) => check_span(source, *span)?,
            ast::Node::Expand(expand) | ast::Node::EscapedExpand(expand) => {
                check_span(source, expand.span)?;
                check_call(source, &expand.call)?;
            }
            ast::Node::Block(block) | ast::Node::InvertedBlock(block) => {
                check_span(source, block.span)?;
                check_span(source, block.name.span())?;
                check_args(source, &block.args)?;
                check_nodes(source, &block.body)?;
                if let Some(body) = &block.else_body {
                    check_nodes(source, body)?;
                }
            }
            ast::Node::RawBlock(raw) => {
                check_span(source, raw.span)?;
                check_span(source, raw.name.span())?;
                check_args(source, &raw.args)?;
            }
            ast::Node::Partial(partial) => {
                check_span(source, partial.span)?;
                if let ast::PartialName::Dynamic(call) = &partial.name {
                    check_call(source, call)?;
                }
                check_args(source, &partial.args)?;
            }
        }
    }
    Ok(())
}

fn check_call(source: &str, call: &ast::Call) -> Result<()> {
    check_span(source, call.span)?;
    check_span(source, call.path.span())?;
    check_args(source, &call.args)
}

fn check_args(source: &str, args: &ast::Args) -> Result<()> {
    for param in &args.params {
        check_param(source, param)?;
    }
    for (key, param) in &args.hash {
        check_span(source, key.span)?;
        check_param(source, param)?;
    }
    Ok(())
}

fn check_param(source: &str, param: &ast::Param) -> Result<()> {
    match param {
        ast::Param::Subexpr(call) => check_call(source, call),
        param => check_span(source, param.span()),
    }
}

fn check_span(source: &str, span: Span) -> Result<()> {
    match source.get(span.m..span.n) {
        Some(_) => Ok(()),
        None => Err(Error::new(
            ErrorKind::Syntax,
            format!(
                "precompiled template has span {}..{} outside of its source",
                span.m, span.n
            ),
        )),
    }
}
