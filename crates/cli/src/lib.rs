//! `scriptsync` library crate.
//!
//! Re-exports the file selection and report rendering modules for
//! integration testing. The binary entrypoint lives in `main.rs`.

pub mod input;
pub mod report;

use std::path::PathBuf;

use serde::Serialize;

use scriptsync_core::pipeline::{self, FileReport};
use scriptsync_core::record::ScriptRecord;

use crate::input::IgnoredPath;

/// Everything one run has to say about the requested paths.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub reports: Vec<FileReport>,
    pub ignored: Vec<IgnoredPath>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty() && self.ignored.is_empty()
    }
}

/// Select, read, and plan every script in `paths`.
pub fn plan_paths(paths: &[PathBuf], prefix: &str, remote_records: &[ScriptRecord]) -> RunReport {
    let selection = input::select_paths(paths, prefix);
    tracing::info!(
        requested = paths.len(),
        selected = selection.selected.len(),
        ignored = selection.ignored.len(),
        "Planning scripts"
    );
    RunReport {
        reports: pipeline::process_batch(input::read_sources(&selection.selected), remote_records),
        ignored: selection.ignored,
    }
}
