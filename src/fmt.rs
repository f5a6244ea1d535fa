//! Output formatting and HTML escaping.
//!
//! Rendering writes into a [`Formatter`], a [`std::fmt::Write`] façade over
//! either a [`String`] or an arbitrary [`std::io::Write`] buffer, so nested
//! blocks never build intermediate strings unless a helper asks for one.

use std::fmt;
use std::fmt::Write;
use std::io;

use crate::Value;

/// A [`std::fmt::Write`] façade.
pub(crate) struct Formatter<'a> {
    buf: &'a mut (dyn fmt::Write + 'a),
}

/// Adapts an [`io::Write`] so that it can be used as a [`fmt::Write`],
/// keeping hold of the underlying error.
pub(crate) struct Writer<W> {
    writer: W,
    err: Option<io::Error>,
}

impl<'a> Formatter<'a> {
    pub(crate) fn with_string(buf: &'a mut String) -> Self {
        Self { buf }
    }

    pub(crate) fn with_writer<W>(buf: &'a mut Writer<W>) -> Self
    where
        W: io::Write,
    {
        Self { buf }
    }
}

impl fmt::Write for Formatter<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        fmt::Write::write_str(self.buf, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        fmt::Write::write_char(self.buf, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        fmt::Write::write_fmt(self.buf, args)
    }
}

impl<W> Writer<W>
where
    W: io::Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer, err: None }
    }

    pub fn take_err(&mut self) -> Option<io::Error> {
        self.err.take()
    }
}

impl<W> fmt::Write for Writer<W>
where
    W: io::Write,
{
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.writer.write_all(s.as_bytes()).map_err(|e| {
            self.err = Some(e);
            fmt::Error
        })
    }
}

/// Replaces `&`, `"`, `'`, `` ` ``, `<` and `>` with HTML entities.
///
/// # Examples
///
/// ```
/// assert_eq!(whisker::escape("<a href='#'>"), "&lt;a href=&#x27;#&#x27;&gt;");
/// ```
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

pub(crate) fn escape_into(out: &mut String, s: &str) {
    // Writing to a String never fails.
    let _ = write_escaped(out, s);
}

fn write_escaped<W>(w: &mut W, s: &str) -> fmt::Result
where
    W: fmt::Write + ?Sized,
{
    let mut last = 0;
    for (i, b) in s.bytes().enumerate() {
        let entity = match b {
            b'&' => "&amp;",
            b'"' => "&quot;",
            b'\'' => "&#x27;",
            b'`' => "&#x60;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => continue,
        };
        w.write_str(&s[last..i])?;
        w.write_str(entity)?;
        last = i + 1;
    }
    w.write_str(&s[last..])
}

/// Writes the value of a `{{ }}` or `{{{ }}}` expression.
///
/// Safe strings are written verbatim, everything else is stringified and
/// escaped if requested. Lists are joined with commas.
pub(crate) fn write_expr(f: &mut Formatter<'_>, value: &Value, escape: bool) -> fmt::Result {
    match value {
        Value::None | Value::Fn(_) => Ok(()),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Integer(n) => write!(f, "{n}"),
        Value::Float(n) => write!(f, "{n}"),
        Value::String(s) if escape => write_escaped(f, s),
        Value::String(s) => f.write_str(s),
        Value::Safe(s) => f.write_str(s.as_str()),
        Value::List(list) => {
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                write_expr(f, item, escape)?;
            }
            Ok(())
        }
        Value::Map(_) => f.write_str("[object Object]"),
    }
}

/// Writes the result of a block helper. Nothing is escaped and lists of
/// fragments are concatenated.
pub(crate) fn write_block(f: &mut Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::List(list) => list.iter().try_for_each(|item| write_block(f, item)),
        value => write_expr(f, value, false),
    }
}

/// Stringifies a value without escaping.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        value => {
            let mut s = String::new();
            // Writing to a String never fails.
            let _ = write_expr(&mut Formatter::with_string(&mut s), value, false);
            s
        }
    }
}
