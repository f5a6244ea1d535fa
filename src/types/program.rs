//! Defines a compiled [`Template`]: a tree of render steps, each a boxed
//! closure that writes part of the output for a given scope.

use std::fmt;
use std::sync::Arc;

use crate::fmt::Formatter;
use crate::render::{Env, Scope};
use crate::types::ast;
use crate::types::span::Span;
use crate::{Result, Value};

/// A single render step.
pub type Step =
    Box<dyn Fn(&mut Formatter<'_>, &Scope<'_>, &Env<'_>) -> Result<()> + Send + Sync + 'static>;

pub struct Template {
    pub source: Arc<str>,
    pub block: Block,
}

/// The compiled form of one body: the template root, a block body, or an
/// `{{else}}` branch.
#[derive(Default)]
pub struct Block {
    pub steps: Vec<Step>,
}

/// A path or subexpression with its compiled arguments.
#[derive(Debug)]
pub struct Callee {
    pub path: ast::Path,
    /// The path as written in the template.
    pub name: String,
    pub args: Args,
    pub span: Span,
}

/// `{{#name}}` or `{{^name}}` with its bodies.
#[derive(Debug)]
pub struct BlockCall {
    pub callee: Callee,
    pub body: Block,
    pub inverse: Option<Block>,
    /// Whether `body` and `inverse` swap roles when calling the helper.
    pub inverted: bool,
}

#[derive(Debug)]
pub struct RawCall {
    pub callee: Callee,
    pub raw: String,
}

#[derive(Debug)]
pub struct PartialCall {
    pub name: PartialName,
    pub args: Args,
    pub span: Span,
}

#[derive(Debug)]
pub enum PartialName {
    Static(String),
    Dynamic(Box<Callee>),
}

#[derive(Debug, Default)]
pub struct Args {
    pub params: Vec<Param>,
    pub hash: Vec<(String, Param)>,
}

#[derive(Debug)]
pub struct Param {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug)]
pub enum Expr {
    /// A literal, converted once at compile time.
    Const(Value),
    /// Resolved structurally against the scope.
    Path(ast::Path),
    Call(Box<Callee>),
}

impl Block {
    pub fn render(&self, f: &mut Formatter<'_>, scope: &Scope<'_>, env: &Env<'_>) -> Result<()> {
        for step in &self.steps {
            step(f, scope, env)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("source", &self.source)
            .field("block", &self.block)
            .finish()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} steps>", self.steps.len())
    }
}
