//! Pipeline driver: load → registry → call graph → placement → rename →
//! rewrite → write.
//!
//! Strictly single-threaded, one batch pass. The orchestrator owns every
//! piece of project state for the duration of the run; placement and
//! renaming each require the preceding stage to have finished for the whole
//! project before they start.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;

use crate::call_graph::{self, CallGraph, CallSitePattern};
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::placement::{self, PlacementPolicy};
use crate::project::Project;
use crate::renamer::Renamer;
use crate::rewriter::{self, Rewriter};

/// Everything a migration run produced besides the files on disk.
#[derive(Debug)]
pub struct MigrationReport {
    /// Paths of the written destination files.
    pub written: Vec<PathBuf>,
    /// Per-destination table of original and migrated names.
    pub summary: String,
    pub diagnostics: Diagnostics,
}

/// Caller counts per function, for the call-graph calculator mode.
#[derive(Debug)]
pub struct CallGraphReport {
    pub text: String,
    pub diagnostics: Diagnostics,
}

/// Result of the shared analysis stages (load, registry, call graph).
struct Analysis {
    project: Project,
    pattern: CallSitePattern,
    graph: CallGraph,
    diagnostics: Diagnostics,
}

/// Owns one full batch run.
#[derive(Debug)]
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn analyze(&self, root: &Path, inputs: &[String]) -> Result<Analysis> {
        let mut project = Project::load(root, inputs)?;
        debug!(
            "registry holds {} functions from {} files",
            project.registry.len(),
            project.files.len()
        );
        let pattern = CallSitePattern::from_registry(&project.registry)?;
        let mut diagnostics = Diagnostics::new();
        call_graph::record_call_edges(
            &project.files,
            &mut project.registry,
            &pattern,
            &mut diagnostics,
        );
        let graph = CallGraph::finalize(&project.registry);
        Ok(Analysis {
            project,
            pattern,
            graph,
            diagnostics,
        })
    }

    /// Full migration: rewrites every input into its destination files under
    /// `out_dir`.
    pub fn migrate(
        &self,
        root: &Path,
        inputs: &[String],
        policy: &dyn PlacementPolicy,
        out_dir: &Path,
    ) -> Result<MigrationReport> {
        let Analysis {
            mut project,
            pattern,
            graph,
            mut diagnostics,
        } = self.analyze(root, inputs)?;
        debug!("placing with the {} policy", policy.name());
        let mut dests =
            placement::assign_destinations(&project.files, &mut project.registry, policy);
        Renamer::new(&self.config).compute_final_names(&mut project.registry, &dests, &graph);
        Rewriter::new(&project.registry, &pattern).rewrite(
            &project.files,
            &mut dests,
            &mut diagnostics,
        );
        let written = rewriter::write_output(&dests, out_dir, &self.config.output_extension)?;
        let summary = placement::placement_summary(&project.registry, &dests);
        Ok(MigrationReport {
            written,
            summary,
            diagnostics,
        })
    }

    /// Call-graph calculator mode: reports caller counts instead of
    /// rewriting anything.
    pub fn call_graph_report(&self, root: &Path, inputs: &[String]) -> Result<CallGraphReport> {
        use std::fmt::Write as _;

        let Analysis {
            project,
            graph,
            diagnostics,
            ..
        } = self.analyze(root, inputs)?;
        let mut text = String::new();
        for func in project.registry.iter() {
            let _ = writeln!(text, "{:>30}\t{}", func.name, graph.caller_count(func.id));
        }
        Ok(CallGraphReport { text, diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_graph_report_counts_callers() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(
            dir.path().join("a.vim"),
            "function! s:Util()\nendfunction\ncall s:Util()\ncall s:Util()\n",
        )
        .expect("input should be written");

        let orchestrator = Orchestrator::new(Config::default());
        let report = orchestrator
            .call_graph_report(dir.path(), &["a.vim".to_owned()])
            .expect("report should build");
        assert!(report.diagnostics.is_empty());
        assert!(report.text.contains("s:Util"));
        let util_line = report
            .text
            .lines()
            .find(|l| l.contains("s:Util"))
            .expect("s:Util should be reported");
        assert!(util_line.trim_end().ends_with('1'));
    }
}
