//! AST representing a template.
//!
//! With the `serde` feature the whole tree is serializable, which is what a
//! precompiled template stores.

use crate::types::span::Span;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Template {
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// A run of text that is neither whitespace nor a newline.
    Literal(Text),
    /// A run of spaces and/or tabs.
    Whitespace(Text),
    /// A `\n` or `\r\n`.
    Newline(Text),
    /// `{{! ... }}`
    Comment(Span),
    /// `{{{ path args }}}` or `{{& path args }}`
    Expand(Expand),
    /// `{{ path args }}`
    EscapedExpand(Expand),
    /// `{{# name args }} ... {{/ name }}`
    Block(Block),
    /// `{{^ name args }} ... {{/ name }}`
    InvertedBlock(Block),
    /// `{{{{ name args }}}} ... {{{{/ name }}}}`
    RawBlock(RawBlock),
    /// `{{> name args }}`
    Partial(Partial),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expand {
    pub call: Call,
    pub span: Span,
}

/// A path with arguments, used for expansions and subexpressions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Call {
    pub path: Path,
    pub args: Args,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    pub name: Path,
    pub args: Args,
    pub body: Vec<Node>,
    pub else_body: Option<Vec<Node>>,
    /// The span of the opening tag.
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawBlock {
    pub name: Path,
    pub args: Args,
    pub raw: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partial {
    pub name: PartialName,
    pub args: Args,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartialName {
    Static(String),
    Dynamic(Box<Call>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Path {
    /// A single plain key, which may also name a helper.
    Simple(Ident),
    /// Anything else, always resolved structurally.
    Complex(Vec<Segment>, Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    /// `.` or `this`
    This,
    /// `..`
    Parent,
    /// `@..`
    ParentSpecial,
    /// An identifier, `@name`, index, or `[literal]`.
    Key(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Args {
    pub params: Vec<Param>,
    pub hash: Vec<(Ident, Param)>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Param {
    Literal(Literal),
    Path(Path),
    Subexpr(Box<Call>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Integer(i64),
    String(String),
}

impl Path {
    pub fn span(&self) -> Span {
        match self {
            Self::Simple(ident) => ident.span,
            Self::Complex(_, span) => *span,
        }
    }

    /// Returns the name if this is a simple path.
    pub fn as_simple(&self) -> Option<&str> {
        match self {
            Self::Simple(ident) => Some(&ident.name),
            Self::Complex(..) => None,
        }
    }
}

impl Param {
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(lit) => lit.span,
            Self::Path(path) => path.span(),
            Self::Subexpr(call) => call.span,
        }
    }
}

impl Args {
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.hash.is_empty()
    }
}
