//! Typed block builder.
//!
//! All literal formatting (quoting, escaping, list joining) lives here.

use itertools::Itertools;
use std::fmt::Write;

/// Indentation unit for document text.
pub(crate) static INDENT: &str = "    ";

/// Nesting depth of blocks inside the document envelope.
pub(crate) const BLOCK_DEPTH: usize = 2;

/// Value of a single block field.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Literal {
    /// Bare `true`/`false` token.
    Bool(bool),
    /// Single-quoted string.
    Scalar(String),
    /// Ordered names, joined inside a single pair of quotes.
    List(Vec<String>),
}

impl Literal {
    /// Whether this value carries nothing worth emitting.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Literal::Bool(_) => false,
            Literal::Scalar(s) => s.is_empty(),
            Literal::List(items) => items.iter().all(String::is_empty),
        }
    }

    /// Document text for this value.
    pub(crate) fn render(&self) -> String {
        match self {
            Literal::Bool(b) => b.to_string(),
            Literal::Scalar(s) => format!("'{}'", escape(s)),
            Literal::List(items) => {
                let joined = items
                    .iter()
                    .filter(|s| !s.is_empty())
                    .map(|s| escape(s))
                    .join("','");
                format!("'{}'", joined)
            }
        }
    }
}

/// Double embedded single quotes.
fn escape(input: &str) -> String {
    input.replace('\'', "''")
}

/// A named block of `Field = literal` lines.
#[derive(Clone, Debug)]
pub(crate) struct BlockBuilder {
    header: String,
    fields: Vec<(&'static str, Literal)>,
}

impl BlockBuilder {
    pub(crate) fn new<S: Into<String>>(header: S) -> Self {
        Self {
            header: header.into(),
            fields: vec![],
        }
    }

    /// Add a boolean field, if set.
    pub(crate) fn flag(self, name: &'static str, value: Option<bool>) -> Self {
        self.push(name, value.map(Literal::Bool))
    }

    /// Add a scalar field, if set.
    pub(crate) fn scalar<T: ToString>(self, name: &'static str, value: Option<T>) -> Self {
        self.push(name, value.map(|v| Literal::Scalar(v.to_string())))
    }

    /// Add a list field, if non-empty.
    pub(crate) fn list<T: ToString>(self, name: &'static str, values: &[T]) -> Self {
        let items = values.iter().map(ToString::to_string).collect();
        self.push(name, Some(Literal::List(items)))
    }

    fn push(mut self, name: &'static str, value: Option<Literal>) -> Self {
        match value {
            Some(ref lit) if !lit.is_empty() => self.fields.push((name, lit.clone())),
            _ => {}
        }
        self
    }

    /// Render this block at the given nesting depth.
    pub(crate) fn render(&self, depth: usize) -> String {
        let outer = INDENT.repeat(depth);
        let inner = INDENT.repeat(depth + 1);

        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = writeln!(out, "{}{}", outer, self.header);
        let _ = writeln!(out, "{}{{", outer);
        for (name, lit) in &self.fields {
            let _ = writeln!(out, "{}{} = {}", inner, name, lit.render());
        }
        let _ = writeln!(out, "{}}}", outer);
        out
    }
}
