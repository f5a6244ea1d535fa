use std::fmt;

use crate::fmt::escape_into;

/// Text that is already safe to output and must not be escaped again.
///
/// Block helpers return this from [`Options::render`][crate::Options::render]
/// and helpers can return it to emit markup from `{{ expr }}` without
/// escaping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeString(String);

impl SafeString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends text verbatim.
    pub fn push_str(&mut self, s: &str) {
        self.0.push_str(s);
    }

    /// Appends text, escaping HTML special characters.
    pub fn push_escaped(&mut self, s: &str) {
        escape_into(&mut self.0, s);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub(crate) fn as_mut_string(&mut self) -> &mut String {
        &mut self.0
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Write for SafeString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.push_str(s);
        Ok(())
    }
}

impl From<String> for SafeString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SafeString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl FromIterator<SafeString> for SafeString {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = SafeString>,
    {
        let mut s = Self::new();
        s.extend(iter);
        s
    }
}

impl Extend<SafeString> for SafeString {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = SafeString>,
    {
        for part in iter {
            self.0.push_str(&part.0);
        }
    }
}
