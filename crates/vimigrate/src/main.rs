use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use vimigrate::config::Config;
use vimigrate::orchestrator::Orchestrator;
use vimigrate::placement::{KeywordBucketPolicy, PlacementPolicy, ScopeSplitPolicy};

/// Placement rule set to run the migration with
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyKind {
    /// Binary split: private functions to the autoload core, globals to the
    /// plugin file
    Scope,
    /// Keyword buckets: private functions routed to per-topic autoload files
    Keyword,
}

#[derive(Parser, Debug)]
#[command(name = "vimigrate")]
#[command(version)]
#[command(about = "Redistribute VimScript functions across plugin and autoload files", long_about = None)]
struct Cli {
    /// VimScript files to migrate, relative to the project root
    #[arg(required = true, value_name = "FILE")]
    files: Vec<String>,

    /// Project root the input paths are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Placement policy
    #[arg(long, value_enum, default_value = "scope")]
    policy: PolicyKind,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the call graph (caller counts) instead of rewriting
    #[arg(long)]
    call_graph: bool,

    /// Print the per-destination placement table after rewriting
    #[arg(long)]
    summary: bool,

    /// Directory the rewritten files are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

fn make_policy(kind: PolicyKind, config: &Config) -> Box<dyn PlacementPolicy> {
    match kind {
        PolicyKind::Scope => Box::new(ScopeSplitPolicy::from_config(config)),
        PolicyKind::Keyword => Box::new(KeywordBucketPolicy::from_config(config)),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref())?;
    let orchestrator = Orchestrator::new(config.clone());

    if cli.call_graph {
        let report = orchestrator.call_graph_report(&cli.root, &cli.files)?;
        for diagnostic in report.diagnostics.iter() {
            println!("{diagnostic}");
        }
        print!("{}", report.text);
        return Ok(());
    }

    let policy = make_policy(cli.policy, &config);
    let report = orchestrator.migrate(&cli.root, &cli.files, policy.as_ref(), &cli.out_dir)?;
    for diagnostic in report.diagnostics.iter() {
        println!("{diagnostic}");
    }
    if cli.summary {
        print!("{}", report.summary);
    }
    log::info!("wrote {} destination files", report.written.len());
    Ok(())
}
