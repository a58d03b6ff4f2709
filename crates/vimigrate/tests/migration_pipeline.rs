//! End-to-end pipeline tests against real files on disk.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vimigrate::config::Config;
use vimigrate::orchestrator::Orchestrator;
use vimigrate::placement::ScopeSplitPolicy;

fn write_input(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("input directory should be created");
    }
    fs::write(path, content).expect("input file should be written");
}

#[test]
fn migrates_private_function_into_autoload_namespace() {
    let project_dir = TempDir::new().expect("tempdir should be created");
    let out_dir = TempDir::new().expect("tempdir should be created");
    write_input(
        project_dir.path(),
        "plugin/x.vim",
        concat!(
            "function! OrgSetup()\n",
            "  call s:Prepare()\n",
            "endfunction\n",
            "function! s:Prepare()\n",
            "  let g:org_ready = 1\n",
            "endfunction\n",
            "call OrgSetup()\n",
        ),
    );

    let config = Config::default();
    let policy = ScopeSplitPolicy::from_config(&config);
    let report = Orchestrator::new(config)
        .migrate(
            project_dir.path(),
            &["plugin/x.vim".to_owned()],
            &policy,
            out_dir.path(),
        )
        .expect("migration should succeed");

    assert!(report.diagnostics.is_empty());
    assert_eq!(report.written.len(), 3);

    let plugin = fs::read_to_string(out_dir.path().join("plugin_org.vim.vx"))
        .expect("plugin output should exist");
    assert_eq!(
        plugin,
        "function! OrgSetup()\n  call org#core#Prepare()\nendfunction\n\n"
    );

    let core = fs::read_to_string(out_dir.path().join("autoload_org_core.vim.vx"))
        .expect("autoload output should exist");
    assert_eq!(
        core,
        "function! org#core#Prepare()\n  let g:org_ready = 1\nendfunction\n\n"
    );

    let top = fs::read_to_string(out_dir.path().join("new_plugin_x.vim.vx"))
        .expect("top-level output should exist");
    assert_eq!(top, "call OrgSetup()\n");
}

#[test]
fn placement_summary_lists_old_and_new_names() {
    let project_dir = TempDir::new().expect("tempdir should be created");
    let out_dir = TempDir::new().expect("tempdir should be created");
    write_input(
        project_dir.path(),
        "plugin/x.vim",
        "function! s:Prepare()\nendfunction\ncall s:Prepare()\n",
    );

    let config = Config::default();
    let policy = ScopeSplitPolicy::from_config(&config);
    let report = Orchestrator::new(config)
        .migrate(
            project_dir.path(),
            &["plugin/x.vim".to_owned()],
            &policy,
            out_dir.path(),
        )
        .expect("migration should succeed");

    assert!(report.summary.contains("----- autoload/org/core.vim"));
    assert!(report.summary.contains("s:Prepare"));
    assert!(report.summary.contains("org#core#Prepare"));
}

#[test]
fn rerunning_on_final_names_is_textually_stable() {
    // A project whose call names each resolve to exactly one candidate and
    // already carry their final names: the rewrite must not change any call
    // site.
    let project_dir = TempDir::new().expect("tempdir should be created");
    let out_dir = TempDir::new().expect("tempdir should be created");
    let source = concat!(
        "function! OrgInit(options)\n",
        "  call OrgApply(a:options)\n",
        "endfunction\n",
        "function! OrgApply(options)\n",
        "  echo a:options\n",
        "endfunction\n",
    );
    write_input(project_dir.path(), "plugin/org.vim", source);

    let config = Config::default();
    let policy = ScopeSplitPolicy::from_config(&config);
    let report = Orchestrator::new(config)
        .migrate(
            project_dir.path(),
            &["plugin/org.vim".to_owned()],
            &policy,
            out_dir.path(),
        )
        .expect("migration should succeed");

    assert!(report.diagnostics.is_empty());
    let plugin = fs::read_to_string(out_dir.path().join("plugin_org.vim.vx"))
        .expect("plugin output should exist");
    // Same blocks, same call sites; only the blank block separators are new.
    assert_eq!(
        plugin,
        concat!(
            "function! OrgInit(options)\n",
            "  call OrgApply(a:options)\n",
            "endfunction\n",
            "\n",
            "function! OrgApply(options)\n",
            "  echo a:options\n",
            "endfunction\n",
            "\n",
        )
    );
}

#[test]
fn unreadable_input_aborts_the_run() {
    let project_dir = TempDir::new().expect("tempdir should be created");
    let out_dir = TempDir::new().expect("tempdir should be created");
    let config = Config::default();
    let policy = ScopeSplitPolicy::from_config(&config);
    let result = Orchestrator::new(config).migrate(
        project_dir.path(),
        &["missing.vim".to_owned()],
        &policy,
        out_dir.path(),
    );
    assert!(result.is_err());
}
