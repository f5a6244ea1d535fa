use std::fmt::Display;

use crate::compile::lex::{Lexer, Token};
use crate::types::ast;
use crate::types::span::Span;
use crate::{Error, ErrorKind, Result};

/// A parser that constructs an AST from a token stream.
///
/// The parser is implemented as a simple hand written parser. Nested blocks
/// are handled with explicit stacks, the only recursion is for
/// subexpressions. It sometimes needs to peek at the next token to know how
/// to proceed and uses the `peeked` buffer to do this.
pub struct Parser<'source> {
    /// A lexer that tokenizes the template source.
    tokens: Lexer<'source>,

    /// Remember a peeked value, even if it was `None`
    peeked: Option<Option<(Token, Span)>>,
}

/// Stores the state of an open block during parsing.
struct State {
    /// Whether this is a `{{^name}}` block.
    inverted: bool,
    /// The name of the block helper.
    name: ast::Path,
    /// The arguments passed to the block helper.
    args: ast::Args,
    /// The span of the opening tag.
    span: Span,
    /// Whether or not this block has an `else` clause.
    has_else: bool,
}

/// A parsed tag that affects the block structure.
enum Tag {
    Open(bool, ast::Path, ast::Args),
    Else,
    Close(ast::Path),
}

impl<'source> Parser<'source> {
    /// Construct a new parser.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: Lexer::new(source),
            peeked: None,
        }
    }

    /// Parses a template.
    ///
    /// This function works using two stacks:
    /// - A stack of blocks e.g. `{{#each items}} ... {{else}}`.
    /// - A stack of scopes which collect each parsed node.
    pub fn parse_template(mut self) -> Result<ast::Template> {
        let mut blocks: Vec<State> = vec![];
        let mut scopes: Vec<Vec<ast::Node>> = vec![vec![]];

        while let Some(next) = self.next()? {
            let node = match next {
                // Raw template, split into literal, whitespace, and newline
                // nodes so that standalone lines can be detected later.
                (Token::Raw, span) => {
                    let scope = scopes.last_mut().unwrap();
                    split_text(self.source(), span, scope);
                    continue;
                }

                // A comment, e.g. `{{! ... }}`
                (Token::BeginComment, begin) => {
                    if self.is_next(Token::Raw)? {
                        self.expect(Token::Raw)?;
                    }
                    let end = self.expect(Token::EndComment)?;
                    ast::Node::Comment(begin.combine(end))
                }

                // An unescaped expansion, e.g. `{{{ user.bio }}}`
                (Token::BeginUnescaped, begin) => {
                    let call = self.parse_call()?;
                    let end = self.expect(Token::EndUnescaped)?;
                    let span = begin.combine(end);
                    ast::Node::Expand(ast::Expand { call, span })
                }

                // A raw block, e.g. `{{{{ raw }}}} ... {{{{/ raw }}}}`
                (Token::BeginRawBlock, begin) => {
                    let first = self.parse()?;
                    let name = self.parse_path(first)?;
                    let args = self.parse_args(name.span())?;
                    let end = self.expect(Token::EndRawBlock)?;
                    let span = begin.combine(end);
                    let source = self.source();
                    let (raw, _) = self.tokens.raw_block_body(&source[name.span()], span)?;
                    ast::Node::RawBlock(ast::RawBlock {
                        name,
                        args,
                        raw: self.source()[raw].to_owned(),
                        span,
                    })
                }

                // Any other tag, e.g. `{{ name }}`, `{{# each items }}`
                (Token::BeginTag, begin) => {
                    let tag = match self.parse()? {
                        (Token::Amp, _) => {
                            let call = self.parse_call()?;
                            let end = self.expect(Token::EndTag)?;
                            let span = begin.combine(end);
                            scopes
                                .last_mut()
                                .unwrap()
                                .push(ast::Node::Expand(ast::Expand { call, span }));
                            continue;
                        }

                        (Token::Gt, _) => {
                            let partial = self.parse_partial(begin)?;
                            scopes
                                .last_mut()
                                .unwrap()
                                .push(ast::Node::Partial(partial));
                            continue;
                        }

                        (Token::Hash, _) => {
                            let first = self.parse()?;
                            let name = self.parse_path(first)?;
                            let args = self.parse_args(name.span())?;
                            Tag::Open(false, name, args)
                        }

                        (Token::Caret, _) if self.is_next(Token::EndTag)? => Tag::Else,

                        (Token::Caret, _) => {
                            let first = self.parse()?;
                            let name = self.parse_path(first)?;
                            let args = self.parse_args(name.span())?;
                            Tag::Open(true, name, args)
                        }

                        (Token::Ident, span) if &self.source()[span] == "else" => {
                            if !self.is_next(Token::EndTag)? {
                                return Err(Error::syntax(
                                    "expected end tag after `else`",
                                    self.source(),
                                    span,
                                ));
                            }
                            Tag::Else
                        }

                        (Token::Slash, _) => {
                            let first = self.parse()?;
                            Tag::Close(self.parse_path(first)?)
                        }

                        first => {
                            let call = self.parse_call_from(first)?;
                            let end = self.expect(Token::EndTag)?;
                            let span = begin.combine(end);
                            scopes
                                .last_mut()
                                .unwrap()
                                .push(ast::Node::EscapedExpand(ast::Expand { call, span }));
                            continue;
                        }
                    };

                    let end = self.expect(Token::EndTag)?;
                    let span = begin.combine(end);

                    match tag {
                        // The start of a block. For example:
                        //
                        //   {{#each items}}
                        //
                        // We must push a block to the block stack and a scope
                        // to the scope stack because a block starts a new
                        // scope.
                        Tag::Open(inverted, name, args) => {
                            blocks.push(State {
                                inverted,
                                name,
                                args,
                                span,
                                has_else: false,
                            });
                            scopes.push(Vec::new());
                            continue;
                        }

                        // The `else` clause of a block. For example:
                        //
                        //   {{else}}
                        //
                        // We expect that there is an open block without an
                        // else clause and update it accordingly. We must also
                        // push to the scope stack since an `else` clause
                        // starts a new scope.
                        Tag::Else => {
                            let err = || Error::syntax("unexpected `else` tag", self.source(), span);
                            match blocks.last_mut().ok_or_else(err)? {
                                State {
                                    has_else: has_else @ false,
                                    ..
                                } => {
                                    *has_else = true;
                                }
                                _ => return Err(err()),
                            }
                            scopes.push(Vec::new());
                            continue;
                        }

                        // The end of a block. For example:
                        //
                        //   {{/each}}
                        //
                        // The closing name must match the opening name
                        // exactly as written.
                        Tag::Close(close) => {
                            let state = blocks.pop().ok_or_else(|| {
                                Error::syntax("unexpected closing tag", self.source(), span)
                            })?;
                            let open_name = &self.source()[state.name.span()];
                            let close_name = &self.source()[close.span()];
                            if open_name != close_name {
                                return Err(Error::syntax(
                                    format!(
                                        "closing tag `{close_name}` does not match \
                                         opening tag `{open_name}`"
                                    ),
                                    self.source(),
                                    close.span(),
                                ));
                            }
                            let else_body = state.has_else.then(|| scopes.pop().unwrap());
                            let body = scopes.pop().unwrap();
                            let block = ast::Block {
                                name: state.name,
                                args: state.args,
                                body,
                                else_body,
                                span: state.span,
                            };
                            if state.inverted {
                                ast::Node::InvertedBlock(block)
                            } else {
                                ast::Node::Block(block)
                            }
                        }
                    }
                }

                (tk, span) => {
                    return Err(self.err_unexpected_token("template", tk, span));
                }
            };
            scopes.last_mut().unwrap().push(node);
        }

        if let Some(block) = blocks.first() {
            let name = &self.source()[block.name.span()];
            return Err(Error::syntax(
                format!("unclosed block `{name}`"),
                self.source(),
                block.span,
            ));
        }

        assert!(
            scopes.len() == 1,
            "parser bug: we should end with a single scope"
        );

        Ok(ast::Template {
            body: scopes.remove(0),
        })
    }

    /// Parses a partial after the `>`.
    ///
    ///   > user-card
    ///
    ///   > "user card" user
    ///
    ///   > (lookup . "kind") title="Hello"
    ///
    fn parse_partial(&mut self, begin: Span) -> Result<ast::Partial> {
        let (name, name_span) = match self.tokens.bare_word() {
            Some(span) => (ast::PartialName::Static(self.source()[span].to_owned()), span),
            None => match self.parse()? {
                (Token::String, span) => {
                    (ast::PartialName::Static(self.parse_string(span)?), span)
                }
                (Token::Bracket, span) => {
                    let name = bracket_inner(&self.source()[span]).to_owned();
                    (ast::PartialName::Static(name), span)
                }
                (Token::OpenParen, open) => {
                    let call = self.parse_subexpr(open)?;
                    let span = call.span;
                    (ast::PartialName::Dynamic(Box::new(call)), span)
                }
                (tk, span) => {
                    return Err(self.err_unexpected_token("partial name", tk, span));
                }
            },
        };
        let args = self.parse_args(name_span)?;
        if let Some(extra) = args.params.get(1) {
            return Err(Error::spanned(
                ErrorKind::TooManyArguments,
                "partials accept at most one positional argument",
                self.source(),
                extra.span(),
            ));
        }
        let end = self.expect(Token::EndTag)?;
        Ok(ast::Partial {
            name,
            args,
            span: begin.combine(end),
        })
    }

    /// Parses a path followed by arguments.
    ///
    ///   user.name
    ///
    ///   format-date created "short" tz=../timezone
    ///
    fn parse_call(&mut self) -> Result<ast::Call> {
        let first = self.parse()?;
        self.parse_call_from(first)
    }

    fn parse_call_from(&mut self, first: (Token, Span)) -> Result<ast::Call> {
        let path = self.parse_path(first)?;
        let args = self.parse_args(path.span())?;
        let mut span = path.span();
        if let Some(p) = args.params.last() {
            span = span.combine(p.span());
        }
        if let Some((_, p)) = args.hash.last() {
            span = span.combine(p.span());
        }
        Ok(ast::Call { path, args, span })
    }

    /// Parses a subexpression after the `(`.
    fn parse_subexpr(&mut self, open: Span) -> Result<ast::Call> {
        let call = self.parse_call()?;
        let close = self.expect(Token::CloseParen)?;
        Ok(ast::Call {
            span: open.combine(close),
            ..call
        })
    }

    /// Parses positional and keyword arguments up to the end of the tag or
    /// subexpression.
    ///
    /// Each argument must be separated by whitespace from whatever precedes
    /// it, starting with the helper name or partial name at `prev`.
    fn parse_args(&mut self, mut prev: Span) -> Result<ast::Args> {
        let mut args = ast::Args::default();
        loop {
            match self.peek()? {
                None
                | Some((
                    Token::EndTag | Token::EndUnescaped | Token::EndRawBlock | Token::CloseParen,
                    _,
                )) => break,
                _ => {}
            }
            let (tk, span) = self.parse()?;
            if prev.touches(span) {
                return Err(Error::syntax(
                    "expected whitespace before argument",
                    self.source(),
                    span,
                ));
            }
            if tk == Token::Ident && self.is_next(Token::Equals)? {
                self.expect(Token::Equals)?;
                let key = ast::Ident {
                    name: self.source()[span].to_owned(),
                    span,
                };
                let first = self.parse()?;
                let value = self.parse_param(first)?;
                prev = value.span();
                args.hash.push((key, value));
            } else {
                if !args.hash.is_empty() {
                    return Err(Error::syntax(
                        "positional arguments must come before keyword arguments",
                        self.source(),
                        span,
                    ));
                }
                let param = self.parse_param((tk, span))?;
                prev = param.span();
                args.params.push(param);
            }
        }
        Ok(args)
    }

    /// Parses a single argument value.
    ///
    ///   "a string"
    ///
    ///   -42
    ///
    ///   ../user.name
    ///
    ///   (helper arg)
    ///
    fn parse_param(&mut self, first: (Token, Span)) -> Result<ast::Param> {
        let param = match first {
            (Token::String, span) => {
                let value = ast::LiteralValue::String(self.parse_string(span)?);
                ast::Param::Literal(ast::Literal { value, span })
            }
            (Token::Number, span) if !self.is_next_separator(span)? => {
                let value = ast::LiteralValue::Integer(self.parse_integer(span)?);
                ast::Param::Literal(ast::Literal { value, span })
            }
            (Token::OpenParen, open) => ast::Param::Subexpr(Box::new(self.parse_subexpr(open)?)),
            (Token::Ident, span) if !self.is_next_separator(span)? => {
                let value = match &self.source()[span] {
                    "true" => Some(ast::LiteralValue::Bool(true)),
                    "false" => Some(ast::LiteralValue::Bool(false)),
                    "null" | "undefined" => Some(ast::LiteralValue::Null),
                    _ => None,
                };
                match value {
                    Some(value) => ast::Param::Literal(ast::Literal { value, span }),
                    None => ast::Param::Path(self.parse_path((Token::Ident, span))?),
                }
            }
            first => ast::Param::Path(self.parse_path(first)?),
        };
        Ok(param)
    }

    /// Parses a path.
    ///
    /// Segments are separated by `.` or `/` with no whitespace in between.
    ///
    ///   user
    ///
    ///   ../user.names.0
    ///
    ///   this.[first name]
    ///
    ///   @../@index
    ///
    fn parse_path(&mut self, first: (Token, Span)) -> Result<ast::Path> {
        let (tk, span) = first;
        let simple = matches!(tk, Token::Ident | Token::Number | Token::Bracket);
        let (segment, mut end) = self.parse_segment(tk, span)?;
        let mut segments = vec![segment];

        while self.is_next_separator(end)? {
            let (_, sep) = self.parse()?;
            let (tk, span) = self.parse()?;
            if !sep.touches(span) {
                return Err(Error::syntax("expected path segment", self.source(), sep));
            }
            let (segment, seg_span) = self.parse_segment(tk, span)?;
            segments.push(segment);
            end = seg_span;
        }

        let span = span.combine(end);
        match (simple, segments.as_slice()) {
            (true, [ast::Segment::Key(name)]) => Ok(ast::Path::Simple(ast::Ident {
                name: name.clone(),
                span,
            })),
            _ => Ok(ast::Path::Complex(segments, span)),
        }
    }

    /// Parses a single path segment, returning the segment and its span.
    fn parse_segment(&mut self, tk: Token, span: Span) -> Result<(ast::Segment, Span)> {
        let segment = match tk {
            Token::Ident if &self.source()[span] == "this" => ast::Segment::This,
            Token::Ident | Token::Number => ast::Segment::Key(self.source()[span].to_owned()),
            Token::Bracket => ast::Segment::Key(bracket_inner(&self.source()[span]).to_owned()),
            Token::Dot => ast::Segment::This,
            Token::DotDot => ast::Segment::Parent,
            Token::At => {
                let (tk, next) = self.parse()?;
                if !span.touches(next) {
                    return Err(self.err_unexpected_token("data variable", tk, next));
                }
                let segment = match tk {
                    Token::DotDot => ast::Segment::ParentSpecial,
                    Token::Ident => ast::Segment::Key(format!("@{}", &self.source()[next])),
                    tk => return Err(self.err_unexpected_token("data variable", tk, next)),
                };
                return Ok((segment, span.combine(next)));
            }
            tk => return Err(self.err_unexpected_token("path", tk, span)),
        };
        Ok((segment, span))
    }

    /// Parses an integer with an optional leading minus sign.
    fn parse_integer(&self, span: Span) -> Result<i64> {
        self.source()[span].parse().map_err(|_| {
            Error::syntax(
                "integer literal out of range for 64-bit integer",
                self.source(),
                span,
            )
        })
    }

    /// Parses a string and handles escape characters.
    ///
    /// A backslash only escapes the quote character that delimits the
    /// string, any other backslash is kept as is.
    fn parse_string(&self, span: Span) -> Result<String> {
        let raw = &self.source()[span];
        let quote = &raw[..1];
        let inner = &raw[1..raw.len() - 1];
        let escaped = format!("\\{quote}");
        Ok(inner.replace(&escaped, quote))
    }

    /// Returns `true` if the next token is a path separator directly after
    /// the given span.
    fn is_next_separator(&mut self, prev: Span) -> Result<bool> {
        Ok(matches!(
            self.peek()?,
            Some((Token::Dot | Token::Slash, sp)) if prev.touches(sp)
        ))
    }

    /// Parses any token.
    fn parse(&mut self) -> Result<(Token, Span)> {
        match self.next()? {
            Some((tk, sp)) => Ok((tk, sp)),
            None => Err(self.err_unexpected_eof("token")),
        }
    }

    /// Parses the specified token and returns its span.
    fn expect(&mut self, exp: Token) -> Result<Span> {
        match self.next()? {
            Some((tk, span)) if tk == exp => Ok(span),
            Some((tk, span)) => Err(self.err_unexpected_token(exp.human(), tk, span)),
            None => Err(self.err_unexpected_eof(exp.human())),
        }
    }

    /// Returns `true` if the next token is equal to the provided one.
    fn is_next(&mut self, token: Token) -> Result<bool> {
        Ok(self.peek()?.map(|(tk, _)| tk == token).unwrap_or(false))
    }

    /// Returns a copy of the next token without affecting the result of the
    /// following `.next()` call.
    fn peek(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked {
            Some(peeked) => Ok(peeked),
            None => {
                let peeked = self.tokens.next()?;
                self.peeked = Some(peeked);
                Ok(peeked)
            }
        }
    }

    /// Returns the next token and span in the stream.
    fn next(&mut self) -> Result<Option<(Token, Span)>> {
        match self.peeked.take() {
            Some(v) => Ok(v),
            None => self.tokens.next(),
        }
    }

    fn source(&self) -> &'source str {
        self.tokens.source
    }

    fn err_unexpected_eof(&self, exp: impl Display) -> Error {
        let n = self.source().len();
        Error::syntax(format!("expected {exp}, found EOF"), self.source(), n..n)
    }

    fn err_unexpected_token(&self, exp: impl Display, got: Token, span: Span) -> Error {
        let got = got.human();
        Error::syntax(format!("expected {exp}, found {got}"), self.source(), span)
    }
}

/// Splits raw template text into newline, whitespace, and literal nodes.
fn split_text(source: &str, span: Span, nodes: &mut Vec<ast::Node>) {
    let raw = &source[span];
    let mut i = 0;
    while i < raw.len() {
        let rest = &raw[i..];
        let (len, make): (usize, fn(ast::Text) -> ast::Node) = if rest.starts_with("\r\n") {
            (2, ast::Node::Newline)
        } else if rest.starts_with('\n') {
            (1, ast::Node::Newline)
        } else if rest.starts_with(|c: char| c == ' ' || c == '\t') {
            let len = rest
                .find(|c: char| c != ' ' && c != '\t')
                .unwrap_or(rest.len());
            (len, ast::Node::Whitespace)
        } else {
            let len = rest
                .char_indices()
                .find(|&(j, c)| matches!(c, ' ' | '\t' | '\n') || rest[j..].starts_with("\r\n"))
                .map(|(j, _)| j)
                .unwrap_or(rest.len());
            (len, ast::Node::Literal)
        };
        let m = span.m + i;
        nodes.push(make(ast::Text {
            text: rest[..len].to_owned(),
            span: Span::from(m..m + len),
        }));
        i += len;
    }
}

fn bracket_inner(raw: &str) -> &str {
    &raw[1..raw.len() - 1]
}
