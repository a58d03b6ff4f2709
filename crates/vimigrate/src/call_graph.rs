//! Whole-project call graph construction
//!
//! Deliberately two-pass: the combined call-site pattern can only be built
//! once every definition in the project is known, so the registry is filled
//! completely first and every file is then re-scanned for call sites. A call
//! name may resolve to several candidates; every candidate that survives the
//! visibility gate receives an edge, so ambiguity is preserved in the graph
//! and collapsed only at rewrite time.

use std::borrow::Cow;

use anyhow::Result;
use log::trace;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

use crate::diagnostics::Diagnostics;
use crate::project::SourceFile;
use crate::registry::{FunctionRegistry, PRIVATE_PREFIX, SID_MARKER};
use crate::scanner;
use crate::types::FuncId;

/// Regex fragment matching every accepted spelling of a call to `canonical`.
/// Private names match both the `s:` and the `<SID>` form.
fn call_fragment(canonical: &str) -> String {
    match canonical.strip_prefix(PRIVATE_PREFIX) {
        Some(base) => format!(
            "(?:{}|{}){}",
            regex::escape(PRIVATE_PREFIX),
            regex::escape(SID_MARKER),
            regex::escape(base)
        ),
        None => regex::escape(canonical),
    }
}

/// One combined matcher for every call site in the project: an alternation
/// of every known canonical name, each followed by the call-opening paren.
///
/// Alternatives keep registration order, so earlier definitions win when
/// several names could match at the same position.
#[derive(Debug)]
pub struct CallSitePattern {
    regex: Option<Regex>,
}

impl CallSitePattern {
    /// Builds the matcher over every non-synthetic registered name.
    pub fn from_registry(registry: &FunctionRegistry) -> Result<Self> {
        Self::from_names(
            registry
                .iter()
                .filter(|f| !f.is_top_level())
                .map(|f| f.name.as_str()),
        )
    }

    /// Builds the matcher from an explicit name list.
    pub fn from_names<'n>(names: impl IntoIterator<Item = &'n str>) -> Result<Self> {
        let fragments: Vec<String> = names.into_iter().map(call_fragment).collect();
        if fragments.is_empty() {
            return Ok(Self { regex: None });
        }
        let pattern = format!(r"({})\s*\(", fragments.join("|"));
        Ok(Self {
            regex: Some(Regex::new(&pattern)?),
        })
    }

    /// Names (as written) of the call sites found on `line`.
    pub fn call_names<'l>(&self, line: &'l str) -> Vec<&'l str> {
        match &self.regex {
            Some(re) => re
                .captures_iter(line)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Rewrites every call site on `line`. `repl` receives the name as
    /// written and returns the full replacement, paren included.
    pub fn replace_calls<'l>(
        &self,
        line: &'l str,
        mut repl: impl FnMut(&str) -> String,
    ) -> Cow<'l, str> {
        match &self.regex {
            Some(re) => re.replace_all(line, |caps: &Captures<'_>| repl(&caps[1])),
            None => Cow::Borrowed(line),
        }
    }
}

/// Scans every file's lines and records caller → callee edges on the
/// registry. Header and end-marker lines switch the caller context and are
/// themselves never scanned for call sites.
pub fn record_call_edges(
    files: &[SourceFile],
    registry: &mut FunctionRegistry,
    pattern: &CallSitePattern,
    diagnostics: &mut Diagnostics,
) {
    for file in files {
        let mut current = file.top_level;
        for line in &file.lines {
            if let Some(header) = scanner::match_header(line) {
                match file.find_function(registry, header.name) {
                    Some(func) => current = func,
                    None => diagnostics.unknown_function(header.name, &file.name),
                }
                continue;
            }
            if scanner::is_end_marker(line) {
                current = file.top_level;
                continue;
            }
            for name in pattern.call_names(line) {
                let candidates = registry.lookup_by_name(name).to_vec();
                for callee in candidates {
                    try_add_caller(registry, current, callee);
                }
            }
        }
    }
}

/// Adds a caller edge unless visibility forbids it: a private callee is
/// reachable only from its own file.
fn try_add_caller(registry: &mut FunctionRegistry, caller: FuncId, callee: FuncId) -> bool {
    let caller_file = registry.get(caller).file;
    let target = registry.get(callee);
    if target.is_private() && target.file != caller_file {
        return false;
    }
    registry.get_mut(callee).callers.insert(caller);
    true
}

/// Read-only call graph derived from the registry's caller sets once
/// construction has finished.
#[derive(Debug)]
pub struct CallGraph {
    graph: DiGraph<FuncId, ()>,
    nodes: FxHashMap<FuncId, NodeIndex>,
}

impl CallGraph {
    /// Snapshots the registry's caller sets into a digraph.
    pub fn finalize(registry: &FunctionRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = FxHashMap::default();
        for func in registry.iter() {
            nodes.insert(func.id, graph.add_node(func.id));
        }
        for func in registry.iter() {
            let callee = nodes[&func.id];
            for caller in &func.callers {
                graph.add_edge(nodes[caller], callee, ());
            }
        }
        trace!(
            "call graph finalized: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Self { graph, nodes }
    }

    /// Callers of `func`, in edge insertion order.
    pub fn callers(&self, func: FuncId) -> Vec<FuncId> {
        let Some(&node) = self.nodes.get(&func) else {
            return Vec::new();
        };
        let mut callers: Vec<FuncId> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|n| self.graph[n])
            .collect();
        // petgraph iterates neighbors most-recent-first
        callers.reverse();
        callers
    }

    pub fn caller_count(&self, func: FuncId) -> usize {
        self.nodes.get(&func).map_or(0, |&node| {
            self.graph.neighbors_directed(node, Direction::Incoming).count()
        })
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}
