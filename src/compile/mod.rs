//! Compile the template into a program that can be executed by the renderer.
//!
//! This process has four stages:
//! - The lexer chunks the template source into tokens.
//! - The parser constructs an AST from the token stream.
//! - The normalizer removes the whitespace around standalone block tags.
//! - The compiler turns the AST into a tree of render steps.

mod lex;
mod parse;
mod standalone;

use std::fmt::Write;
use std::sync::Arc;

use crate::render;
use crate::types::ast;
use crate::types::program::{
    Args, Block, BlockCall, Callee, Expr, Param, PartialCall, PartialName, RawCall, Step, Template,
};
use crate::types::span::Span;
use crate::{Result, Value};

/// Parse a template and normalize its whitespace.
pub fn parse(source: &str) -> Result<ast::Template> {
    let mut template = parse::Parser::new(source).parse_template()?;
    standalone::normalize(&mut template);
    Ok(template)
}

/// Compile a template into a program.
pub fn template(source: &str) -> Result<Template> {
    let ast = parse(source)?;
    Ok(compile(Arc::from(source), ast))
}

/// Compile an already parsed template.
pub fn compile(source: Arc<str>, ast: ast::Template) -> Template {
    let block = Compiler {
        source: source.clone(),
    }
    .compile_body(ast.body);
    tracing::debug!(
        len = source.len(),
        steps = block.steps.len(),
        "compiled template"
    );
    Template { source, block }
}

/// A compiler that constructs a program from an AST.
struct Compiler {
    source: Arc<str>,
}

impl Compiler {
    fn compile_body(&self, nodes: Vec<ast::Node>) -> Block {
        let mut steps = Vec::new();
        let mut text = String::new();
        for node in nodes {
            match node {
                ast::Node::Literal(t) | ast::Node::Whitespace(t) | ast::Node::Newline(t) => {
                    text.push_str(&t.text);
                    continue;
                }
                ast::Node::Comment(_) => continue,
                node => {
                    if !text.is_empty() {
                        steps.push(emit_text(std::mem::take(&mut text)));
                    }
                    steps.push(self.compile_node(node));
                }
            }
        }
        if !text.is_empty() {
            steps.push(emit_text(text));
        }
        Block { steps }
    }

    fn compile_node(&self, node: ast::Node) -> Step {
        let source = self.source.clone();
        match node {
            ast::Node::EscapedExpand(expand) => {
                let callee = self.compile_call(expand.call);
                Box::new(move |f, scope, env| render::expand(f, &source, &callee, true, scope, env))
            }
            ast::Node::Expand(expand) => {
                let callee = self.compile_call(expand.call);
                Box::new(move |f, scope, env| render::expand(f, &source, &callee, false, scope, env))
            }
            ast::Node::Block(block) => {
                let block = self.compile_block(block, false);
                Box::new(move |f, scope, env| render::block(f, &source, &block, scope, env))
            }
            ast::Node::InvertedBlock(block) => {
                let block = self.compile_block(block, true);
                Box::new(move |f, scope, env| render::block(f, &source, &block, scope, env))
            }
            ast::Node::RawBlock(raw) => {
                let raw = RawCall {
                    callee: self.compile_callee(raw.name, raw.args, raw.span),
                    raw: raw.raw,
                };
                Box::new(move |f, scope, env| render::raw_block(f, &source, &raw, scope, env))
            }
            ast::Node::Partial(partial) => {
                let partial = PartialCall {
                    name: match partial.name {
                        ast::PartialName::Static(name) => PartialName::Static(name),
                        ast::PartialName::Dynamic(call) => {
                            PartialName::Dynamic(Box::new(self.compile_call(*call)))
                        }
                    },
                    args: self.compile_args(partial.args),
                    span: partial.span,
                };
                Box::new(move |f, scope, env| render::partial(f, &source, &partial, scope, env))
            }
            ast::Node::Literal(_)
            | ast::Node::Whitespace(_)
            | ast::Node::Newline(_)
            | ast::Node::Comment(_) => unreachable!("text is merged by `compile_body`"),
        }
    }

    fn compile_block(&self, block: ast::Block, inverted: bool) -> BlockCall {
        BlockCall {
            callee: self.compile_callee(block.name, block.args, block.span),
            body: self.compile_body(block.body),
            inverse: block.else_body.map(|body| self.compile_body(body)),
            inverted,
        }
    }

    fn compile_call(&self, call: ast::Call) -> Callee {
        self.compile_callee(call.path, call.args, call.span)
    }

    fn compile_callee(&self, path: ast::Path, args: ast::Args, span: Span) -> Callee {
        Callee {
            name: self.source[path.span()].to_owned(),
            path,
            args: self.compile_args(args),
            span,
        }
    }

    fn compile_args(&self, args: ast::Args) -> Args {
        Args {
            params: args
                .params
                .into_iter()
                .map(|p| self.compile_param(p))
                .collect(),
            hash: args
                .hash
                .into_iter()
                .map(|(k, p)| (k.name, self.compile_param(p)))
                .collect(),
        }
    }

    fn compile_param(&self, param: ast::Param) -> Param {
        let span = param.span();
        let expr = match param {
            ast::Param::Literal(lit) => Expr::Const(match lit.value {
                ast::LiteralValue::Null => Value::None,
                ast::LiteralValue::Bool(b) => Value::Bool(b),
                ast::LiteralValue::Integer(n) => Value::Integer(n),
                ast::LiteralValue::String(s) => Value::String(s),
            }),
            ast::Param::Path(path) => Expr::Path(path),
            ast::Param::Subexpr(call) => Expr::Call(Box::new(self.compile_call(*call))),
        };
        Param { expr, span }
    }
}

fn emit_text(text: String) -> Step {
    Box::new(move |f, _, _| {
        f.write_str(&text)?;
        Ok(())
    })
}
