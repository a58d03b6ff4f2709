//! In-memory project aggregate: loaded source files, their functions, and
//! the destination files being assembled.
//!
//! All project state is owned here and threaded through the pipeline stages
//! explicitly; nothing is ambient or global. The aggregate exists for the
//! duration of exactly one batch run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::registry::{FunctionRegistry, TOP_LEVEL_MARKER};
use crate::scanner;
use crate::types::{DestId, FileId, FuncId, FxIndexMap};

/// A loaded input file: its text and the functions defined in it.
#[derive(Debug)]
pub struct SourceFile {
    pub id: FileId,
    /// Path as given to the tool, relative to the project root. Placement
    /// policies derive destinations from this form.
    pub name: String,
    /// Text lines in original order.
    pub lines: Vec<String>,
    /// Functions defined in this file, in textual order.
    pub functions: Vec<FuncId>,
    /// Synthetic anchor owning the file's top-level code.
    pub top_level: FuncId,
}

impl SourceFile {
    /// Looks up one of this file's own functions by raw name.
    pub fn find_function(&self, registry: &FunctionRegistry, raw_name: &str) -> Option<FuncId> {
        registry.find_in_file(self.id, raw_name)
    }
}

/// An output file accumulating migrated content.
#[derive(Debug)]
pub struct DestinationFile {
    pub id: DestId,
    /// Destination path in the migrated project layout,
    /// e.g. `autoload/org/core.vim`.
    pub path: String,
    /// Functions placed here, in placement order.
    pub functions: Vec<FuncId>,
    /// Rewritten lines accumulated by the rewriter.
    pub lines: Vec<String>,
}

/// Destination files keyed by path, created lazily on first reference and
/// kept in creation order.
#[derive(Debug, Default)]
pub struct DestinationSet {
    dests: FxIndexMap<String, DestinationFile>,
}

impl DestinationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the destination for `path`, creating it on first reference.
    pub fn get_or_create(&mut self, path: &str) -> DestId {
        if let Some(dest) = self.dests.get(path) {
            return dest.id;
        }
        let id = DestId::new(self.dests.len() as u32);
        self.dests.insert(
            path.to_owned(),
            DestinationFile {
                id,
                path: path.to_owned(),
                functions: Vec::new(),
                lines: Vec::new(),
            },
        );
        id
    }

    pub fn get(&self, id: DestId) -> &DestinationFile {
        &self.dests[id.index()]
    }

    pub fn get_mut(&mut self, id: DestId) -> &mut DestinationFile {
        &mut self.dests[id.index()]
    }

    pub fn path(&self, id: DestId) -> &str {
        &self.get(id).path
    }

    /// Iterate over destinations in creation order
    pub fn iter(&self) -> impl Iterator<Item = &DestinationFile> {
        self.dests.values()
    }

    pub fn len(&self) -> usize {
        self.dests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dests.is_empty()
    }
}

/// The whole loaded project: every input file plus the function registry.
#[derive(Debug)]
pub struct Project {
    pub files: Vec<SourceFile>,
    pub registry: FunctionRegistry,
}

impl Project {
    /// Reads every input file relative to `root` and registers all function
    /// definitions. An unreadable input aborts the run.
    pub fn load(root: &Path, inputs: &[String]) -> Result<Self> {
        let mut sources = Vec::with_capacity(inputs.len());
        for input in inputs {
            let content = fs::read_to_string(root.join(input))
                .with_context(|| format!("failed to read input file `{input}`"))?;
            sources.push((input.clone(), content));
        }
        Ok(Self::from_sources(sources))
    }

    /// Builds a project from already-loaded file contents.
    pub fn from_sources(sources: Vec<(String, String)>) -> Self {
        let mut files = Vec::with_capacity(sources.len());
        let mut registry = FunctionRegistry::new();
        for (name, content) in sources {
            let id = FileId::new(files.len() as u32);
            // TODO: ignore definitions after a top-level `finish` line
            let lines: Vec<String> = content.lines().map(str::to_owned).collect();
            let mut functions = Vec::new();
            for line in &lines {
                if let Some(header) = scanner::match_header(line) {
                    let func = registry.add(header.name, header.params.to_owned(), id);
                    if !functions.contains(&func) {
                        functions.push(func);
                    }
                }
            }
            let top_level = registry.add(TOP_LEVEL_MARKER, String::new(), id);
            debug!("loaded `{name}`: {} lines, {} functions", lines.len(), functions.len());
            files.push(SourceFile {
                id,
                name,
                lines,
                functions,
                top_level,
            });
        }
        Self { files, registry }
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sources_registers_functions_and_anchor() {
        let project = Project::from_sources(vec![(
            "plugin/org.vim".to_owned(),
            "function! OrgInit()\nendfunction\nfunction! s:Helper()\nendfunction\n".to_owned(),
        )]);
        let file = &project.files[0];
        assert_eq!(file.functions.len(), 2);
        assert_eq!(project.registry.len(), 3);
        assert!(project.registry.get(file.top_level).is_top_level());
        assert_eq!(project.registry.get(file.top_level).file, file.id);
    }

    #[test]
    fn test_registration_order_groups_by_file() {
        let project = Project::from_sources(vec![
            ("a.vim".to_owned(), "function! A()\nendfunction\n".to_owned()),
            ("b.vim".to_owned(), "function! B()\nendfunction\n".to_owned()),
        ]);
        let names: Vec<&str> = project.registry.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["A", TOP_LEVEL_MARKER, "B", TOP_LEVEL_MARKER]
        );
    }

    #[test]
    fn test_destination_set_creates_lazily_in_order() {
        let mut dests = DestinationSet::new();
        let a = dests.get_or_create("plugin/org.vim");
        let b = dests.get_or_create("autoload/org/core.vim");
        let again = dests.get_or_create("plugin/org.vim");
        assert_eq!(a, again);
        assert_ne!(a, b);
        let paths: Vec<&str> = dests.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["plugin/org.vim", "autoload/org/core.vim"]);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let err = Project::load(Path::new("/nonexistent"), &["missing.vim".to_owned()]);
        assert!(err.is_err());
    }
}
