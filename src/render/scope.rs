use std::borrow::Cow;

use crate::types::ast::Segment;
use crate::value::{Map, ValueCow};
use crate::Value;

/// The context a template body is rendered in.
///
/// Scopes form a chain: every block, loop iteration, and partial renders in a
/// child of the scope it was invoked from, which is what `../` walks back up.
/// A scope only ever borrows its parent and the root context.
#[derive(Debug)]
pub struct Scope<'a> {
    value: ValueCow<'a>,
    parent: Option<&'a Scope<'a>>,
    root: &'a Value,
    frame: Option<Frame>,
    overrides: Option<Map>,
}

/// The loop variables of one iteration.
#[derive(Debug, Clone)]
struct Frame {
    index: usize,
    key: Option<String>,
    first: bool,
    last: bool,
}

enum Cursor<'a> {
    Scope(&'a Scope<'a>),
    Value(ValueCow<'a>),
}

impl<'a> Scope<'a> {
    pub(crate) fn new(root: &'a Value) -> Self {
        Self {
            value: ValueCow::Borrowed(root),
            parent: None,
            root,
            frame: None,
            overrides: None,
        }
    }

    /// The value this scope wraps, `this` in a template.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn parent(&self) -> Option<&Scope<'a>> {
        self.parent
    }

    /// The outermost render context, `@root` in a template.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Creates a scope wrapping `value` whose parent is this scope.
    pub fn child<'b>(&'b self, value: impl Into<ValueCow<'b>>) -> Scope<'b> {
        Scope {
            value: value.into(),
            parent: Some(self),
            root: self.root,
            frame: None,
            overrides: None,
        }
    }

    /// Creates a child scope for item `index` of a collection of `len` items,
    /// setting `@index`, `@first`, `@last` and, for map entries, `@key`.
    pub fn child_item<'b>(
        &'b self,
        value: impl Into<ValueCow<'b>>,
        index: usize,
        len: usize,
        key: Option<String>,
    ) -> Scope<'b> {
        Scope {
            frame: Some(Frame {
                index,
                key,
                first: index == 0,
                last: index + 1 == len,
            }),
            ..self.child(value)
        }
    }

    /// Makes keyword arguments visible as names in this scope, shadowing the
    /// wrapped value.
    pub(crate) fn with_overrides(mut self, overrides: Map) -> Self {
        if !overrides.is_empty() {
            self.overrides = Some(overrides);
        }
        self
    }

    /// Looks up a single name.
    ///
    /// `@root`, `@_parent` and the loop variables are checked first, then
    /// any keyword arguments passed to the enclosing partial, and finally the
    /// wrapped value.
    pub fn get(&self, name: &str) -> Option<ValueCow<'_>> {
        if let Some(special) = name.strip_prefix('@') {
            match special {
                "root" => return Some(ValueCow::Borrowed(self.root)),
                "_parent" => return self.parent.map(|p| ValueCow::Borrowed(p.value())),
                "index" | "key" | "first" | "last" => return self.frame_var(special),
                _ => {}
            }
        }
        if let Some(v) = self.overrides.as_ref().and_then(|o| o.get(name)) {
            return Some(ValueCow::Borrowed(v));
        }
        self.value.get(name).map(ValueCow::Borrowed)
    }

    /// Resolves a path of segments, starting at this scope.
    pub(crate) fn resolve(&self, segments: &[Segment]) -> Option<ValueCow<'_>> {
        let mut cursor = Cursor::Scope(self);
        let mut special = false;
        for segment in segments {
            match segment {
                Segment::This => {}
                Segment::Parent | Segment::ParentSpecial => {
                    let Cursor::Scope(scope) = cursor else {
                        return None;
                    };
                    cursor = Cursor::Scope(scope.parent?);
                    special = matches!(segment, Segment::ParentSpecial);
                }
                Segment::Key(key) => {
                    let key = match special && !key.starts_with('@') {
                        true => Cow::Owned(format!("@{key}")),
                        false => Cow::Borrowed(key.as_str()),
                    };
                    special = false;
                    cursor = match cursor {
                        Cursor::Scope(scope) if key == "@_parent" => Cursor::Scope(scope.parent?),
                        Cursor::Scope(scope) => Cursor::Value(scope.get(&key)?),
                        Cursor::Value(value) => Cursor::Value(value.lookup(&key)?),
                    };
                }
            }
        }
        Some(match cursor {
            Cursor::Scope(scope) => ValueCow::Borrowed(scope.value()),
            Cursor::Value(value) => value,
        })
    }

    fn frame_var(&self, name: &str) -> Option<ValueCow<'_>> {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if let Some(frame) = &s.frame {
                let value = match name {
                    "index" => Value::from(frame.index as i64),
                    "first" => Value::Bool(frame.first),
                    "last" => Value::Bool(frame.last),
                    _ => match &frame.key {
                        Some(key) => Value::String(key.clone()),
                        None => {
                            scope = s.parent;
                            continue;
                        }
                    },
                };
                return Some(ValueCow::Owned(value));
            }
            scope = s.parent;
        }
        None
    }
}
