//! Non-fatal findings reported during graph construction and rewriting.
//!
//! Diagnostics are part of the tool's output contract: they are collected in
//! scan order and printed to stdout as plain lines. None of them abort the
//! run.

use std::fmt;

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A call site matched no registered function.
    UnresolvedCall { name: String },
    /// A call site matched several same-name functions; the first-registered
    /// candidate was substituted.
    AmbiguousCall { name: String, chosen: String },
    /// A recognized header named a function the registry does not know for
    /// that file.
    UnknownFunction { name: String, file: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedCall { name } => {
                write!(f, "unresolved call target: {name}")
            }
            Diagnostic::AmbiguousCall { name, chosen } => {
                write!(f, "ambiguous call target {name}, resolved arbitrarily to {chosen}")
            }
            Diagnostic::UnknownFunction { name, file } => {
                write!(f, "no function registered for header {name} in {file}")
            }
        }
    }
}

/// Ordered sink of diagnostics for one run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unresolved_call(&mut self, name: &str) {
        self.entries.push(Diagnostic::UnresolvedCall {
            name: name.to_owned(),
        });
    }

    pub fn ambiguous_call(&mut self, name: &str, chosen: &str) {
        self.entries.push(Diagnostic::AmbiguousCall {
            name: name.to_owned(),
            chosen: chosen.to_owned(),
        });
    }

    pub fn unknown_function(&mut self, name: &str, file: &str) {
        self.entries.push(Diagnostic::UnknownFunction {
            name: name.to_owned(),
            file: file.to_owned(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.unresolved_call("s:Gone");
        diagnostics.ambiguous_call("Dup", "org#core#Dup");
        let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
        assert_eq!(rendered[0], "unresolved call target: s:Gone");
        assert_eq!(
            rendered[1],
            "ambiguous call target Dup, resolved arbitrarily to org#core#Dup"
        );
    }
}
