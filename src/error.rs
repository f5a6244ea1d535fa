use std::cmp::max;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::types::span::Span;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur during template compilation or rendering.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,

    /// A short message describing the error.
    msg: String,

    /// The name of the partial in which the error occurred.
    name: Option<String>,

    /// Location information, only present if the error relates to a span of
    /// template source.
    pretty: Option<Pretty>,

    /// The underlying error, for example an I/O error or an error returned
    /// by a helper.
    source: Option<Arc<dyn std::error::Error + Send + Sync + 'static>>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The template source is malformed.
    Syntax,
    /// A partial could not be found in any registry.
    MissingPartial,
    /// A partial was given more than one positional argument.
    TooManyArguments,
    /// An expression with arguments named neither a helper nor a callable
    /// value.
    UnresolvedHelper,
    /// An error returned by a host helper.
    Helper,
    /// An error raised by the renderer itself.
    Render,
    /// A value could not be converted using serde.
    Serialize,
    /// Writing the rendered output failed.
    Io,
}

#[derive(Clone)]
struct Pretty {
    source: String,
    span: Span,
    line: usize,
    column: usize,
    token: String,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            name: None,
            pretty: None,
            source: None,
        }
    }

    pub(crate) fn spanned(
        kind: ErrorKind,
        msg: impl Into<String>,
        source: &str,
        span: impl Into<Span>,
    ) -> Self {
        let span = span.into();
        let (line, column) = to_line_col(source, span.m);
        Self {
            pretty: Some(Pretty {
                source: source.to_owned(),
                span,
                line,
                column,
                token: nearby_token(source, span),
            }),
            ..Self::new(kind, msg)
        }
    }

    pub(crate) fn syntax(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::spanned(ErrorKind::Syntax, msg, source, span)
    }

    pub(crate) fn render(msg: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        Self::spanned(ErrorKind::Render, msg, source, span)
    }

    /// Attach the name of the partial the error occurred in, unless one is
    /// already set. Helper errors pass through untouched.
    pub(crate) fn with_name(mut self, name: &str) -> Self {
        if self.name.is_none() && self.kind != ErrorKind::Helper {
            self.name = Some(name.to_owned());
        }
        self
    }

    /// Construct a helper error wrapping any standard error.
    ///
    /// The error is rendered using its [`Display`][fmt::Display]
    /// implementation and is available through
    /// [`source()`][std::error::Error::source].
    pub fn helper<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            source: Some(Arc::new(err)),
            ..Self::new(ErrorKind::Helper, String::new())
        }
    }

    /// Construct a helper error from a message.
    pub fn custom(msg: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Helper, msg.to_string())
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the 1-based line number the error occurred on, if known.
    pub fn line(&self) -> Option<usize> {
        self.pretty.as_ref().map(|p| p.line)
    }

    /// Returns the 1-based column the error occurred at, if known.
    pub fn column(&self) -> Option<usize> {
        self.pretty.as_ref().map(|p| p.column)
    }

    /// Returns the word of template source nearest to the error, if known.
    pub fn token(&self) -> Option<&str> {
        self.pretty.as_ref().map(|p| p.token.as_str())
    }

    /// Returns the name of the partial the error occurred in, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn message(&self) -> String {
        match (&self.source, self.msg.is_empty()) {
            (Some(source), true) => source.to_string(),
            _ => self.msg.clone(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            source: Some(Arc::new(err)),
            ..Self::new(ErrorKind::Io, "failed to write rendered output")
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::new(ErrorKind::Render, "format error")
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::new(ErrorKind::Serialize, msg.to_string())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pretty {
            Some(pretty) => fmt_pretty(self, pretty, f),
            None => f
                .debug_struct("Error")
                .field("kind", &self.kind)
                .field("msg", &self.message())
                .field("name", &self.name)
                .finish(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pretty {
            Some(pretty) if f.alternate() => fmt_pretty(self, pretty, f)?,
            Some(pretty) => write!(
                f,
                "{} at line {}, column {}",
                self.message(),
                pretty.line,
                pretty.column
            )?,
            None => write!(f, "{}", self.message())?,
        }
        if let Some(name) = &self.name {
            write!(f, " (in partial `{name}`)")?;
        }
        Ok(())
    }
}

fn fmt_pretty(err: &Error, pretty: &Pretty, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let lines: Vec<_> = pretty.source.split_terminator('\n').collect();
    let line = pretty.line - 1;
    let col = pretty.column - 1;
    let width = max(1, width(&pretty.source.as_str()[pretty.span]));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or("")
        .trim_end_matches('\r');

    let num = pretty.line.to_string();
    let pad = num.len();
    let pipe = "|";
    let underline = "^".repeat(width);
    let msg = err.message();

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

/// Converts a byte offset into a 1-based line and display column.
fn to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (line, width(&before[start..]) + 1)
}

/// Finds the word surrounding the span by scanning outwards to the nearest
/// whitespace or tag boundary.
fn nearby_token(source: &str, span: Span) -> String {
    let is_boundary = |c: char| c.is_whitespace() || c == '{' || c == '}';
    let m = span.m.min(source.len());
    let start = source[..m]
        .rfind(is_boundary)
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = source[m..]
        .find(is_boundary)
        .map(|i| m + i)
        .unwrap_or(source.len());
    let token = &source[start..end];
    if token.is_empty() {
        source[span.m.min(source.len())..span.n.min(source.len())]
            .trim()
            .to_owned()
    } else {
        token.to_owned()
    }
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}
