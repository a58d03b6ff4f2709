//! Final-name computation under the autoload naming convention.
//!
//! Runs strictly after placement has finished for *every* function: whether
//! a private function keeps its bare name depends on where each of its
//! callers ended up, which is only known once the whole project is placed.

use crate::call_graph::CallGraph;
use crate::config::Config;
use crate::project::DestinationSet;
use crate::registry::{self, FunctionRegistry, PRIVATE_PREFIX};
use crate::types::FuncId;

/// Unqualified base of a name: private prefix stripped, then anything up to
/// and including the last `#`.
pub fn base_name(name: &str) -> String {
    let canonical = registry::normalize(name);
    let stripped = canonical.strip_prefix(PRIVATE_PREFIX).unwrap_or(&canonical);
    match stripped.rfind('#') {
        Some(at) => stripped[at + 1..].to_owned(),
        None => stripped.to_owned(),
    }
}

/// Computes each function's post-migration name.
#[derive(Debug)]
pub struct Renamer<'a> {
    namespace_root: &'a str,
    script_extension: &'a str,
}

impl<'a> Renamer<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            namespace_root: &config.namespace_root,
            script_extension: &config.script_extension,
        }
    }

    /// Whether `path` addresses its functions by the namespace convention.
    pub fn is_autoload(&self, path: &str) -> bool {
        path.starts_with(self.namespace_root)
    }

    /// Namespace prefix of an autoload destination: the path relative to the
    /// last namespace-root segment, extension stripped, separators as `#`.
    pub fn autoload_prefix(&self, path: &str) -> String {
        let ext_suffix = format!(".{}", self.script_extension);
        let trimmed = path.strip_suffix(ext_suffix.as_str()).unwrap_or(path);
        let marker = format!("{}/", self.namespace_root);
        match trimmed.rfind(marker.as_str()) {
            Some(at) => trimmed[at + marker.len()..].replace('/', "#"),
            None => String::new(),
        }
    }

    /// Computes and stores the final name of every function.
    pub fn compute_final_names(
        &self,
        registry: &mut FunctionRegistry,
        dests: &DestinationSet,
        graph: &CallGraph,
    ) {
        let ids: Vec<FuncId> = registry.ids().collect();
        for id in ids {
            let final_name = self.final_name_for(registry, dests, graph, id);
            registry.get_mut(id).final_name = Some(final_name);
        }
    }

    fn final_name_for(
        &self,
        registry: &FunctionRegistry,
        dests: &DestinationSet,
        graph: &CallGraph,
        id: FuncId,
    ) -> String {
        let func = registry.get(id);
        let Some(dest) = func.destination else {
            return func.name.clone();
        };
        let path = dests.path(dest);
        if !func.is_private() && !self.is_autoload(path) {
            return func.name.clone();
        }
        if self.is_autoload(path) {
            if func.is_private() && self.all_callers_local(registry, graph, id) {
                // The move keeps every call site in the same file; no
                // cross-file addressing needed.
                return func.name.clone();
            }
            return format!("{}#{}", self.autoload_prefix(path), base_name(&func.name));
        }
        func.name.clone()
    }

    /// True when every caller's destination equals `func`'s own.
    fn all_callers_local(
        &self,
        registry: &FunctionRegistry,
        graph: &CallGraph,
        func: FuncId,
    ) -> bool {
        let destination = registry.get(func).destination;
        graph
            .callers(func)
            .into_iter()
            .all(|caller| registry.get(caller).destination == destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileId;

    /// Registers a function, places it, and returns its id.
    fn place(
        registry: &mut FunctionRegistry,
        dests: &mut DestinationSet,
        name: &str,
        file: FileId,
        dest_path: &str,
    ) -> FuncId {
        let id = registry.add(name, "()".to_owned(), file);
        let dest = dests.get_or_create(dest_path);
        dests.get_mut(dest).functions.push(id);
        registry.get_mut(id).destination = Some(dest);
        id
    }

    #[test]
    fn test_autoload_prefix_round_trip() {
        let config = Config::default();
        let renamer = Renamer::new(&config);
        let path = "autoload/org/core.vim";
        let prefix = renamer.autoload_prefix(path);
        assert_eq!(prefix, "org#core");
        let rebuilt = format!("autoload/{}.vim", prefix.replace('#', "/"));
        assert_eq!(rebuilt, path);
    }

    #[test]
    fn test_base_name_strips_prefixes() {
        assert_eq!(base_name("s:Foo"), "Foo");
        assert_eq!(base_name("<SID>Foo"), "Foo");
        assert_eq!(base_name("org#core#Foo"), "Foo");
        assert_eq!(base_name("Foo"), "Foo");
    }

    #[test]
    fn test_private_with_remote_caller_gets_qualified_name() {
        // Scenario: s:Foo moves to autoload/org/core.vim while its only
        // caller stays behind in the plugin file.
        let config = Config::default();
        let mut registry = FunctionRegistry::new();
        let mut dests = DestinationSet::new();
        let file = FileId::new(0);
        let foo = place(&mut registry, &mut dests, "s:Foo", file, "autoload/org/core.vim");
        let caller = place(&mut registry, &mut dests, "OrgInit", file, "plugin/org.vim");
        registry.get_mut(foo).callers.insert(caller);
        let graph = CallGraph::finalize(&registry);

        Renamer::new(&config).compute_final_names(&mut registry, &dests, &graph);
        assert_eq!(registry.get(foo).effective_name(), "org#core#Foo");
    }

    #[test]
    fn test_private_with_colocated_callers_keeps_name() {
        let config = Config::default();
        let mut registry = FunctionRegistry::new();
        let mut dests = DestinationSet::new();
        let file = FileId::new(0);
        let foo = place(&mut registry, &mut dests, "s:Foo", file, "autoload/org/core.vim");
        let caller = place(&mut registry, &mut dests, "s:Bar", file, "autoload/org/core.vim");
        registry.get_mut(foo).callers.insert(caller);
        let graph = CallGraph::finalize(&registry);

        Renamer::new(&config).compute_final_names(&mut registry, &dests, &graph);
        assert_eq!(registry.get(foo).effective_name(), "s:Foo");
    }

    #[test]
    fn test_private_without_callers_in_autoload_keeps_name() {
        let config = Config::default();
        let mut registry = FunctionRegistry::new();
        let mut dests = DestinationSet::new();
        let foo = place(
            &mut registry,
            &mut dests,
            "s:Foo",
            FileId::new(0),
            "autoload/org/core.vim",
        );
        let graph = CallGraph::finalize(&registry);

        Renamer::new(&config).compute_final_names(&mut registry, &dests, &graph);
        assert_eq!(registry.get(foo).effective_name(), "s:Foo");
    }

    #[test]
    fn test_global_outside_autoload_unchanged() {
        // Scenario: global Bar placed into a non-autoload plugin file.
        let config = Config::default();
        let mut registry = FunctionRegistry::new();
        let mut dests = DestinationSet::new();
        let bar = place(&mut registry, &mut dests, "Bar", FileId::new(0), "plugin/org.vim");
        let graph = CallGraph::finalize(&registry);

        Renamer::new(&config).compute_final_names(&mut registry, &dests, &graph);
        assert_eq!(registry.get(bar).effective_name(), "Bar");
    }

    #[test]
    fn test_global_in_autoload_gets_qualified_name() {
        let config = Config::default();
        let mut registry = FunctionRegistry::new();
        let mut dests = DestinationSet::new();
        let bar = place(
            &mut registry,
            &mut dests,
            "Bar",
            FileId::new(0),
            "autoload/org/export.vim",
        );
        let graph = CallGraph::finalize(&registry);

        Renamer::new(&config).compute_final_names(&mut registry, &dests, &graph);
        assert_eq!(registry.get(bar).effective_name(), "org#export#Bar");
    }
}
