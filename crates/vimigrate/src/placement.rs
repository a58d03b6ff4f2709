//! Pluggable policies deciding each function's destination file.
//!
//! A policy is a pure mapping from a function (and its originating file) to
//! a destination path. The pipeline is agnostic to which rule set is active;
//! the caller injects one.

use log::debug;

use crate::config::Config;
use crate::project::{DestinationSet, SourceFile};
use crate::registry::{Function, FunctionRegistry};
use crate::types::FuncId;

/// Decision rule mapping a function to the path of its new home.
pub trait PlacementPolicy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Destination path for `func`, which originates from `origin`.
    fn decide(&self, func: &Function, origin: &SourceFile) -> String;
}

/// Destination of content staying with its original file: the original path
/// under a `new_` prefix, so output never collides with input.
fn stay_home(origin: &SourceFile) -> String {
    format!("new_{}", origin.name)
}

/// Binary split by scope: private functions go to one autoload core file,
/// globals to one plugin file, top-level code stays with its file.
#[derive(Debug, Clone)]
pub struct ScopeSplitPolicy {
    core_autoload: String,
    plugin_file: String,
}

impl ScopeSplitPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            core_autoload: config.core_autoload.clone(),
            plugin_file: config.plugin_file.clone(),
        }
    }
}

impl PlacementPolicy for ScopeSplitPolicy {
    fn name(&self) -> &'static str {
        "scope-split"
    }

    fn decide(&self, func: &Function, origin: &SourceFile) -> String {
        if func.is_top_level() {
            stay_home(origin)
        } else if func.is_private() {
            self.core_autoload.clone()
        } else {
            self.plugin_file.clone()
        }
    }
}

/// Keyword-bucketed split: private functions are routed to per-topic
/// autoload files by case-insensitive substring match on their name.
#[derive(Debug, Clone)]
pub struct KeywordBucketPolicy {
    /// Lowercased keywords and the destination they select, first match wins.
    buckets: Vec<(Vec<String>, String)>,
    core_autoload: String,
    plugin_file: String,
}

impl KeywordBucketPolicy {
    pub fn from_config(config: &Config) -> Self {
        let buckets = config
            .buckets
            .iter()
            .map(|bucket| {
                let keywords = bucket.keywords.iter().map(|k| k.to_lowercase()).collect();
                (keywords, bucket.destination.clone())
            })
            .collect();
        Self {
            buckets,
            core_autoload: config.core_autoload.clone(),
            plugin_file: config.plugin_file.clone(),
        }
    }
}

impl PlacementPolicy for KeywordBucketPolicy {
    fn name(&self) -> &'static str {
        "keyword-bucket"
    }

    fn decide(&self, func: &Function, origin: &SourceFile) -> String {
        if func.is_top_level() {
            return stay_home(origin);
        }
        if !func.is_private() {
            return self.plugin_file.clone();
        }
        // Functions wrapping the <SID> lookup trick only work from their own
        // file and must stay there.
        if func.name.ends_with("SID") {
            return stay_home(origin);
        }
        let lowered = func.name.to_lowercase();
        for (keywords, destination) in &self.buckets {
            if keywords.iter().any(|keyword| lowered.contains(keyword)) {
                return destination.clone();
            }
        }
        self.core_autoload.clone()
    }
}

/// Runs the policy over every function in registration order, creating
/// destinations on first reference and recording the assignment on the
/// function. After this, every function has a destination.
pub fn assign_destinations(
    files: &[SourceFile],
    registry: &mut FunctionRegistry,
    policy: &dyn PlacementPolicy,
) -> DestinationSet {
    let mut dests = DestinationSet::new();
    let ids: Vec<FuncId> = registry.ids().collect();
    for id in ids {
        let path = {
            let func = registry.get(id);
            policy.decide(func, &files[func.file.index()])
        };
        let dest = dests.get_or_create(&path);
        dests.get_mut(dest).functions.push(id);
        registry.get_mut(id).destination = Some(dest);
        debug!("placed {} into {path}", registry.get(id).name);
    }
    dests
}

/// Per-destination table of original and migrated names, matching the
/// placement order.
pub fn placement_summary(registry: &FunctionRegistry, dests: &DestinationSet) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    for dest in dests.iter() {
        let _ = writeln!(out, "----- {}", dest.path);
        for &func in &dest.functions {
            let entry = registry.get(func);
            let _ = writeln!(out, "{:>30}\t{}", entry.name, entry.effective_name());
        }
    }
    out
}
