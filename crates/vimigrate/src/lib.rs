//! vimigrate — redistributes the functions of a multi-file VimScript
//! project across plugin and autoload files, renaming them to the autoload
//! convention where the move requires it.
//!
//! The pipeline is a single batch pass: scan → registry → call graph →
//! placement → rename → rewrite. Each stage depends on the previous one
//! having finished for the whole project.

pub mod call_graph;
pub mod config;
pub mod diagnostics;
pub mod orchestrator;
pub mod placement;
pub mod project;
pub mod registry;
pub mod renamer;
pub mod rewriter;
pub mod scanner;
pub mod types;
