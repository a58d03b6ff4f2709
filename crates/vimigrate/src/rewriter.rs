//! Emits destination files with headers and call sites rewritten to final
//! names.
//!
//! Each source file is walked once. Function blocks land in the block's
//! destination buffer; top-level lines land in the buffer of the file's
//! top-level anchor, keeping their original relative order. Ambiguous call
//! names are resolved here, and only here, to the first-registered
//! candidate.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::call_graph::CallSitePattern;
use crate::diagnostics::Diagnostics;
use crate::project::{DestinationSet, SourceFile};
use crate::registry::FunctionRegistry;
use crate::scanner;
use crate::types::FuncId;

#[derive(Debug)]
pub struct Rewriter<'a> {
    registry: &'a FunctionRegistry,
    pattern: &'a CallSitePattern,
}

impl<'a> Rewriter<'a> {
    pub fn new(registry: &'a FunctionRegistry, pattern: &'a CallSitePattern) -> Self {
        Self { registry, pattern }
    }

    /// Rewrites every source file into the destination buffers.
    pub fn rewrite(
        &self,
        files: &[SourceFile],
        dests: &mut DestinationSet,
        diagnostics: &mut Diagnostics,
    ) {
        for file in files {
            self.rewrite_file(file, dests, diagnostics);
        }
    }

    fn rewrite_file(
        &self,
        file: &SourceFile,
        dests: &mut DestinationSet,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(top_dest) = self.registry.get(file.top_level).destination else {
            return;
        };
        let mut pos = 0;
        while pos < file.lines.len() {
            let line = &file.lines[pos];
            if let Some(header) = scanner::match_header(line) {
                if let Some(func) = file.find_function(self.registry, header.name) {
                    let block = scanner::consume_function_body(&file.lines, pos + 1);
                    self.emit_function(file, func, &block, dests, diagnostics);
                    pos = block.next;
                    continue;
                }
                // Registry and rewriter use the same header matcher, so this
                // only happens on registry corruption; the block degrades to
                // top-level content.
                diagnostics.unknown_function(header.name, &file.name);
            }
            let rewritten = self.rename_calls(line, diagnostics).into_owned();
            dests.get_mut(top_dest).lines.push(rewritten);
            pos += 1;
        }
    }

    /// Emits one function block: rewritten header, call-rewritten body up to
    /// and including the end marker, then a blank separator.
    fn emit_function(
        &self,
        file: &SourceFile,
        func: FuncId,
        block: &scanner::FunctionBlock,
        dests: &mut DestinationSet,
        diagnostics: &mut Diagnostics,
    ) {
        let entry = self.registry.get(func);
        let Some(dest) = entry.destination else {
            return;
        };
        let header = format!("function! {}{}", entry.effective_name(), entry.params);
        let mut rewritten = Vec::with_capacity(block.body.len() + 2);
        rewritten.push(header);
        for body_line in &file.lines[block.body.clone()] {
            rewritten.push(self.rename_calls(body_line, diagnostics).into_owned());
        }
        rewritten.push(String::new());
        dests.get_mut(dest).lines.append(&mut rewritten);
    }

    /// Rewrites every call site on a line to the target's final name.
    ///
    /// Zero candidates leaves the token untouched; several candidates pick
    /// the first-registered one. Both cases log a diagnostic.
    fn rename_calls<'l>(&self, line: &'l str, diagnostics: &mut Diagnostics) -> Cow<'l, str> {
        self.pattern.replace_calls(line, |name| {
            match self.registry.lookup_by_name(name) {
                [] => {
                    diagnostics.unresolved_call(name);
                    format!("{name}(")
                }
                [only] => format!("{}(", self.registry.get(*only).effective_name()),
                [first, ..] => {
                    let chosen = self.registry.get(*first).effective_name();
                    diagnostics.ambiguous_call(name, chosen);
                    format!("{chosen}(")
                }
            }
        })
    }
}

/// Writes each destination into `out_dir`, flattening the destination path
/// with underscores and appending the output extension so originals are
/// never overwritten.
pub fn write_output(
    dests: &DestinationSet,
    out_dir: &Path,
    output_extension: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(dests.len());
    for dest in dests.iter() {
        let file_name = format!("{}.{output_extension}", dest.path.replace('/', "_"));
        let target = out_dir.join(file_name);
        let mut content = String::new();
        for line in &dest.lines {
            content.push_str(line);
            content.push('\n');
        }
        fs::write(&target, content)
            .with_context(|| format!("failed to write `{}`", target.display()))?;
        debug!("wrote {} ({} lines)", target.display(), dest.lines.len());
        written.push(target);
    }
    Ok(written)
}
