use crate::types::span::Span;
use crate::{Error, Result};

/// A lexer that tokenizes the template source into distinct chunks so that the
/// parser doesn't have to operate on raw text.
///
/// The lexer is implemented as a fallible iterator. The parser should
/// repeatedly call the [`.next()?`][Lexer::next] method to return the next
/// non-whitespace token until [`None`] is returned.
#[cfg_attr(internal_debug, derive(Debug))]
pub struct Lexer<'source> {
    /// The original template source.
    pub source: &'source str,

    /// A cursor over the template source.
    cursor: usize,

    /// The current state of the lexer.
    state: State,

    /// A buffer to store the next token.
    next: Option<(Token, Span)>,
}

/// The state of the lexer.
///
/// The lexer requires state because the tokenization is different when
/// tokenizing raw text, text between tags e.g. `{{# each items }}`, and
/// comments.
#[cfg_attr(internal_debug, derive(Debug))]
enum State {
    /// Within raw template.
    Template,

    /// Between tags.
    Tag {
        /// The span of the begin tag.
        begin: Span,
        /// The end token we are expecting.
        end: Token,
    },

    /// Between comment tags.
    Comment {
        /// The span of the begin tag.
        begin: Span,
        /// Whether this is a `{{!-- --}}` comment.
        long: bool,
    },
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Raw template
    Raw,
    /// `{{`
    BeginTag,
    /// `}}`
    EndTag,
    /// `{{{`
    BeginUnescaped,
    /// `}}}`
    EndUnescaped,
    /// `{{{{`
    BeginRawBlock,
    /// `}}}}`
    EndRawBlock,
    /// `{{!` or `{{!--`
    BeginComment,
    /// `}}` or `--}}` after a comment
    EndComment,
    /// `#`
    Hash,
    /// `^`
    Caret,
    /// `/`
    Slash,
    /// `>`
    Gt,
    /// `&`
    Amp,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `@`
    At,
    /// `=`
    Equals,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// Sequence of spaces, tabs, and newlines
    Whitespace,
    /// A path segment or helper name
    Ident,
    /// A `[bracketed]` segment
    Bracket,
    /// An integer literal, e.g. `19` or `-3`
    Number,
    /// A string literal, e.g. `"Hello World!\n"` or `'hi'`
    String,
}

impl<'source> Lexer<'source> {
    /// Construct a new lexer.
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            cursor: 0,
            state: State::Template,
            next: None,
        }
    }

    /// Returns the next non-whitespace token and its span.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>> {
        loop {
            match self.lex()? {
                Some((tk, sp)) if !tk.is_whitespace() => return Ok(Some((tk, sp))),
                None => return Ok(None),
                _ => continue,
            }
        }
    }

    /// Returns the span of a bare partial name, e.g. `some/partial.hbs`.
    ///
    /// Bare names may contain characters that aren't valid in a path, so
    /// they are scanned up to the next whitespace or end of the tag. Returns
    /// `None` if the next token is a string, bracket, or subexpression.
    pub fn bare_word(&mut self) -> Option<Span> {
        debug_assert!(self.next.is_none());
        let start = self.cursor
            + self.source[self.cursor..]
                .find(|c: char| !is_whitespace(c))
                .unwrap_or(self.source.len() - self.cursor);
        let rest = &self.source[start..];
        if rest.is_empty()
            || rest.starts_with(|c: char| matches!(c, '"' | '\'' | '[' | '('))
            || rest.starts_with("}}")
        {
            return None;
        }
        let len = rest
            .char_indices()
            .find(|&(i, c)| is_whitespace(c) || rest[i..].starts_with("}}"))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        self.cursor = start + len;
        Some(Span::from(start..start + len))
    }

    /// Consumes the body of a raw block up to and including the closing
    /// `{{{{/name}}}}` tag.
    ///
    /// Returns the span of the raw body and the span of the closing tag.
    pub fn raw_block_body(&mut self, name: &str, begin: Span) -> Result<(Span, Span)> {
        debug_assert!(self.next.is_none());
        let close = format!("{{{{{{{{/{name}}}}}}}}}");
        let i = self.cursor;
        match self.source[i..].find(&close) {
            Some(d) => {
                let j = i + d;
                let k = j + close.len();
                self.cursor = k;
                self.state = State::Template;
                Ok((Span::from(i..j), Span::from(j..k)))
            }
            None => Err(Error::syntax(
                format!("unclosed raw block, expected `{close}`"),
                self.source,
                begin,
            )),
        }
    }

    /// Returns the next token and span.
    fn lex(&mut self) -> Result<Option<(Token, Span)>> {
        if let Some(next) = self.next.take() {
            return Ok(Some(next));
        }

        let i = self.cursor;

        if self.source[i..].is_empty() {
            return match self.state {
                State::Template => Ok(None),
                State::Tag { begin, end } => Err(self.err_unclosed(begin, end)),
                State::Comment { begin, .. } => Err(self.err_unclosed(begin, Token::EndComment)),
            };
        }

        match self.state {
            State::Template => self.lex_template(i),
            State::Tag { begin, end } => self.lex_tag(begin, end, i),
            State::Comment { begin, long } => self.lex_comment(begin, long, i),
        }
    }

    fn lex_template(&mut self, i: usize) -> Result<Option<(Token, Span)>> {
        // We are within raw template, that means all we have to do is
        // find the next begin tag from `i` and and any relevant cursor
        // indexes. The following diagram helps describe the variable
        // naming.
        //
        // xxxxxxx{{xxxxxxxxx
        //    ^   ^ ^
        //    i   j k

        match self.source[i..].find("{{").map(|d| i + d) {
            Some(j) => {
                let rest = &self.source[j..];
                let (tk, len) = if rest.starts_with("{{{{") {
                    (Token::BeginRawBlock, 4)
                } else if rest.starts_with("{{{") {
                    (Token::BeginUnescaped, 3)
                } else if rest.starts_with("{{!--") && !rest.starts_with("{{!--}}") {
                    (Token::BeginComment, 5)
                } else if rest.starts_with("{{!") {
                    (Token::BeginComment, 3)
                } else {
                    (Token::BeginTag, 2)
                };
                let k = j + len;

                let begin = Span::from(j..k);
                self.cursor = k;
                self.state = match tk {
                    Token::BeginComment => State::Comment {
                        begin,
                        long: len == 5,
                    },
                    _ => State::Tag {
                        begin,
                        end: tk.pair(),
                    },
                };

                if i == j {
                    // The current cursor is exactly at the token.
                    Ok(Some((tk, begin)))
                } else {
                    // We must first emit the raw token, so we store the
                    // begin tag token in the `next` buffer.
                    self.next = Some((tk, begin));
                    Ok(Some((Token::Raw, Span::from(i..j))))
                }
            }
            None => {
                let j = self.source.len();
                self.cursor = j;
                Ok(Some((Token::Raw, Span::from(i..j))))
            }
        }
    }

    fn lex_tag(&mut self, begin: Span, end: Token, i: usize) -> Result<Option<(Token, Span)>> {
        // We are between two tags {{ ... }} that means we must parse template
        // syntax relevant tokens and also lookout for the corresponding end
        // tag `end`.

        let rest = &self.source[i..];

        if rest.starts_with(end.as_str()) {
            // A matching end tag! Update the state and return the token.
            let j = i + end.as_str().len();
            self.state = State::Template;
            self.cursor = j;
            return Ok(Some((end, Span::from(i..j))));
        }
        if rest.starts_with("}}") {
            return Err(self.err_unexpected_token(Token::EndTag, i..i + 2));
        }
        if rest.starts_with("{{") {
            return Err(self.err_unclosed(begin, end));
        }

        // We iterate over chars because that is nicer than operating on
        // raw bytes. The map call here fixes the index to be relative
        // to the actual template source.
        let mut iter = rest.char_indices().map(|(d, c)| (i + d, c));

        // There is always at least one character, the emptiness check is
        // done in `lex()`.
        let Some((i, c)) = iter.next() else {
            return Ok(None);
        };

        let (tk, j) = match c {
            // Single character to token mappings.
            '#' => (Token::Hash, i + 1),
            '^' => (Token::Caret, i + 1),
            '/' => (Token::Slash, i + 1),
            '>' => (Token::Gt, i + 1),
            '&' => (Token::Amp, i + 1),
            '@' => (Token::At, i + 1),
            '=' => (Token::Equals, i + 1),
            '(' => (Token::OpenParen, i + 1),
            ')' => (Token::CloseParen, i + 1),
            '.' if rest[1..].starts_with('.') => (Token::DotDot, i + 2),
            '.' => (Token::Dot, i + 1),

            // Multi-character tokens with a distinct start character.
            '"' | '\'' => self.lex_string(iter, c, i)?,
            '[' => self.lex_bracket(iter, i)?,
            '-' if rest[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                self.lex_number(iter)
            }
            c if c.is_ascii_digit() => self.lex_number(iter),
            c if is_whitespace(c) => self.lex_whitespace(iter),
            c if is_ident(c) => self.lex_ident(iter),

            // Any other character...
            _ => {
                return Err(self.err_unexpected_character(i..(i + c.len_utf8())));
            }
        };

        // Finally, we need to update the cursor.
        self.cursor = j;

        Ok(Some((tk, Span::from(i..j))))
    }

    fn lex_comment(&mut self, begin: Span, long: bool, i: usize) -> Result<Option<(Token, Span)>> {
        // We are between two comment tags {{! ... }}, that means all we
        // have to do is find the corresponding end tag. The following
        // diagram helps describe the variable naming.
        //
        // x{{!cccccc}}xxxxxx
        //     ^     ^ ^
        //     i     j k

        let end = if long { "--}}" } else { "}}" };
        match self.source[i..].find(end).map(|d| i + d) {
            Some(j) => {
                let k = j + end.len();
                self.cursor = k;
                self.state = State::Template;
                let end = (Token::EndComment, Span::from(j..k));
                if i == j {
                    Ok(Some(end))
                } else {
                    self.next = Some(end);
                    Ok(Some((Token::Raw, Span::from(i..j))))
                }
            }
            None => Err(self.err_unclosed(begin, Token::EndComment)),
        }
    }

    fn lex_string<I>(&mut self, mut iter: I, quote: char, i: usize) -> Result<(Token, usize)>
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        loop {
            match iter.next() {
                None => {
                    return Err(self.err_undelimited_string(i..self.source.len()));
                }
                // A backslash only escapes the closing quote.
                Some((_, '\\')) if matches!(iter.clone().next(), Some((_, c)) if c == quote) => {
                    iter.next();
                }
                Some((j, c)) if c == quote => {
                    return Ok((Token::String, j + 1));
                }
                Some(_) => {}
            }
        }
    }

    fn lex_bracket<I>(&mut self, mut iter: I, i: usize) -> Result<(Token, usize)>
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        match iter.find(|&(_, c)| c == ']') {
            Some((j, _)) => Ok((Token::Bracket, j + 1)),
            None => Err(Error::syntax(
                "unclosed bracket",
                self.source,
                i..self.source.len(),
            )),
        }
    }

    fn lex_number<I>(&mut self, iter: I) -> (Token, usize)
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        // Numbers directly followed by identifier characters are
        // identifiers, e.g. `1st`.
        let j = self.lex_while(iter.clone(), |c| c.is_ascii_digit());
        match self.source[j..].chars().next() {
            Some(c) if is_ident(c) => self.lex_ident(iter),
            _ => (Token::Number, j),
        }
    }

    fn lex_whitespace<I>(&mut self, iter: I) -> (Token, usize)
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        (Token::Whitespace, self.lex_while(iter, is_whitespace))
    }

    fn lex_ident<I>(&mut self, iter: I) -> (Token, usize)
    where
        I: Iterator<Item = (usize, char)> + Clone,
    {
        (Token::Ident, self.lex_while(iter, is_ident))
    }

    fn lex_while<I, P>(&mut self, mut iter: I, pred: P) -> usize
    where
        I: Iterator<Item = (usize, char)> + Clone,
        P: Fn(char) -> bool,
    {
        loop {
            match iter.clone().next() {
                Some((_, c)) if pred(c) => {
                    iter.next();
                }
                Some((j, _)) => return j,
                None => return self.source.len(),
            }
        }
    }

    fn err_unclosed(&self, begin: Span, end: Token) -> Error {
        let begin_tk = end.pair().human();
        Error::syntax(format!("unclosed {begin_tk}"), self.source, begin)
    }

    fn err_unexpected_token(&self, tk: Token, span: impl Into<Span>) -> Error {
        let tk = tk.human();
        Error::syntax(format!("unexpected {tk}"), self.source, span)
    }

    fn err_unexpected_character(&self, span: impl Into<Span>) -> Error {
        Error::syntax("unexpected character", self.source, span)
    }

    fn err_undelimited_string(&self, span: impl Into<Span>) -> Error {
        Error::syntax("undelimited string", self.source, span)
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Raw => "raw template",
            Self::BeginTag => "begin tag",
            Self::EndTag => "end tag",
            Self::BeginUnescaped => "begin unescaped tag",
            Self::EndUnescaped => "end unescaped tag",
            Self::BeginRawBlock => "begin raw block",
            Self::EndRawBlock => "end raw block",
            Self::BeginComment => "begin comment",
            Self::EndComment => "end comment",
            Self::Hash => "hash",
            Self::Caret => "caret",
            Self::Slash => "slash",
            Self::Gt => "partial operator",
            Self::Amp => "ampersand",
            Self::Dot => "dot",
            Self::DotDot => "parent operator",
            Self::At => "at",
            Self::Equals => "equals",
            Self::OpenParen => "open parenthesis",
            Self::CloseParen => "close parenthesis",
            Self::Whitespace => "whitespace",
            Self::Ident => "identifier",
            Self::Bracket => "bracket literal",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::EndTag => "}}",
            Self::EndUnescaped => "}}}",
            Self::EndRawBlock => "}}}}",
            _ => "",
        }
    }

    /// Returns the corresponding tag if this token is a tag.
    fn pair(&self) -> Self {
        match self {
            Self::BeginTag => Self::EndTag,
            Self::EndTag => Self::BeginTag,
            Self::BeginUnescaped => Self::EndUnescaped,
            Self::EndUnescaped => Self::BeginUnescaped,
            Self::BeginRawBlock => Self::EndRawBlock,
            Self::EndRawBlock => Self::BeginRawBlock,
            Self::BeginComment => Self::EndComment,
            Self::EndComment => Self::BeginComment,
            _ => panic!("not a tag"),
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ' | '\r' | '\n')
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    matches!(c, '-' | '_' | '$') || unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '-' | '_' | '$')
}
