//! Canonical catalog of every function across the loaded project
//!
//! The registry is the single source of truth for function identity. Each
//! entry is unique by (scope, name, originating file); several *global*
//! functions may share a name across files, and that ambiguity is kept as-is
//! here and resolved only at rewrite time.

use std::borrow::Cow;

use rustc_hash::FxHashMap;

use crate::types::{DestId, FileId, FuncId, FxIndexSet, Scope};

/// Marker name of the synthetic per-file function anchoring top-level code.
pub const TOP_LEVEL_MARKER: &str = "$$toplevel";

/// Prefix of script-local (private) function names.
pub const PRIVATE_PREFIX: &str = "s:";

/// Alternate spelling of the private prefix at definition and call sites.
pub const SID_MARKER: &str = "<SID>";

/// Folds the `<SID>` marker into the canonical `s:` private prefix.
pub fn normalize(raw: &str) -> Cow<'_, str> {
    match raw.get(..SID_MARKER.len()) {
        Some(head) if head.eq_ignore_ascii_case(SID_MARKER) => {
            Cow::Owned(format!("{PRIVATE_PREFIX}{}", &raw[SID_MARKER.len()..]))
        }
        _ => Cow::Borrowed(raw),
    }
}

/// Classifies a canonical name into its visibility scope.
pub fn classify(canonical: &str) -> Scope {
    if canonical == TOP_LEVEL_MARKER {
        Scope::TopLevel
    } else if canonical.starts_with(PRIVATE_PREFIX) {
        Scope::Private
    } else {
        Scope::Global
    }
}

/// A single function definition, or the synthetic top-level anchor of a file.
#[derive(Debug, Clone)]
pub struct Function {
    pub id: FuncId,
    /// Canonical name, `<SID>` folded to `s:`.
    pub name: String,
    /// Raw parameter text from the definition header, opening paren included.
    pub params: String,
    pub scope: Scope,
    /// File the function originates from.
    pub file: FileId,
    /// Functions observed to call this one. Append-only while the call graph
    /// is under construction, immutable afterwards.
    pub callers: FxIndexSet<FuncId>,
    /// Destination assigned by placement; set exactly once.
    pub destination: Option<DestId>,
    /// Name after migration; set by the renamer once every placement is known.
    pub final_name: Option<String>,
}

impl Function {
    pub fn is_private(&self) -> bool {
        self.scope.is_private()
    }

    pub fn is_top_level(&self) -> bool {
        self.scope.is_top_level()
    }

    /// Name the rewriter substitutes at definition and call sites.
    pub fn effective_name(&self) -> &str {
        self.final_name.as_deref().unwrap_or(&self.name)
    }
}

/// Central registry of function definitions, in registration order.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    funcs: Vec<Function>,
    by_name: FxHashMap<String, Vec<FuncId>>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, returning the existing id when the
    /// (scope, name, file) identity was already seen.
    pub fn add(&mut self, raw_name: &str, params: String, file: FileId) -> FuncId {
        let name = normalize(raw_name).into_owned();
        if let Some(existing) = self.find_in_file(file, &name) {
            return existing;
        }
        let scope = classify(&name);
        let id = FuncId::new(self.funcs.len() as u32);
        self.by_name.entry(name.clone()).or_default().push(id);
        self.funcs.push(Function {
            id,
            name,
            params,
            scope,
            file,
            callers: FxIndexSet::default(),
            destination: None,
            final_name: None,
        });
        id
    }

    pub fn get(&self, id: FuncId) -> &Function {
        &self.funcs[id.index()]
    }

    pub fn get_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.funcs[id.index()]
    }

    /// Looks up a function defined in `file` by raw name.
    pub fn find_in_file(&self, file: FileId, raw_name: &str) -> Option<FuncId> {
        let name = normalize(raw_name);
        self.by_name
            .get(name.as_ref())?
            .iter()
            .copied()
            .find(|id| self.get(*id).file == file)
    }

    /// All functions registered under a canonical name, in registration
    /// order. Zero, one, or several entries; several only ever for globals
    /// defined in more than one file.
    pub fn lookup_by_name(&self, raw_name: &str) -> &[FuncId] {
        let name = normalize(raw_name);
        match self.by_name.get(name.as_ref()) {
            Some(ids) => ids,
            None => &[],
        }
    }

    /// Iterate over all functions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.funcs.iter()
    }

    /// Ids of all functions in registration order
    pub fn ids(&self) -> impl Iterator<Item = FuncId> + '_ {
        self.funcs.iter().map(|f| f.id)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}
