//! Selection and reading of the script files named on the command line.

use std::path::{Path, PathBuf};

use serde::Serialize;

use scriptsync_core::pipeline::ScriptSource;

/// Why a requested path was not planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IgnoreReason {
    OutsidePrefix,
    NotAFile,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutsidePrefix => "OUTSIDE_PREFIX",
            Self::NotAFile => "NOT_A_FILE",
        }
    }
}

/// A requested path that is not an input of this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoredPath {
    pub path: String,
    pub reason: IgnoreReason,
}

/// Requested paths split into files to plan and paths to report as ignored.
/// Both lists keep the request order.
#[derive(Debug, Default)]
pub struct Selection {
    pub selected: Vec<PathBuf>,
    pub ignored: Vec<IgnoredPath>,
}

/// Keep the paths under `prefix` that point at regular files.
///
/// An empty prefix keeps every path. Paths outside the prefix and paths
/// that are not files (deleted in the change set, directories) end up in
/// [`Selection::ignored`].
pub fn select_paths(paths: &[PathBuf], prefix: &str) -> Selection {
    let mut selection = Selection::default();

    for path in paths {
        let reason = if !has_prefix(path, prefix) {
            IgnoreReason::OutsidePrefix
        } else if !path.is_file() {
            IgnoreReason::NotAFile
        } else {
            selection.selected.push(path.clone());
            continue;
        };

        tracing::warn!(path = %path.display(), prefix, reason = reason.as_str(), "Ignoring requested path");
        selection.ignored.push(IgnoredPath {
            path: path.display().to_string(),
            reason,
        });
    }

    selection
}

/// Read each path into a [`ScriptSource`]. Read errors are kept per file.
pub fn read_sources(paths: &[PathBuf]) -> Vec<ScriptSource> {
    paths
        .iter()
        .map(|path| ScriptSource {
            file_name: path.display().to_string(),
            contents: std::fs::read(path),
        })
        .collect()
}

fn has_prefix(path: &Path, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let normalized = path.to_string_lossy().replace('\\', "/");
    normalized.strip_prefix("./").unwrap_or(&normalized).starts_with(prefix)
}
