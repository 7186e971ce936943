//! Per-file driver: every input file yields exactly one [`FileOutcome`].

use serde::Serialize;

use crate::error::CoreError;
use crate::language;
use crate::metadata;
use crate::plan::{self, ChangePlan, PlanOutcome};
use crate::record::ScriptRecord;

/// Raw input for one file, as handed over by the file reader.
#[derive(Debug)]
pub struct ScriptSource {
    pub file_name: String,
    pub contents: std::io::Result<Vec<u8>>,
}

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileOutcome {
    Processed { plan: ChangePlan },
    SkippedUnsupportedExtension,
    Failed { reason: String },
}

impl FileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed { .. } => "PROCESSED",
            Self::SkippedUnsupportedExtension => "SKIPPED_UNSUPPORTED_EXTENSION",
            Self::Failed { .. } => "FAILED",
        }
    }

    fn failed(err: CoreError) -> Self {
        Self::Failed {
            reason: err.to_string(),
        }
    }
}

/// A file name paired with its outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Extract, normalize, and diff one file against the remote records.
pub fn process_file(file_name: &str, contents: &[u8], remote_records: &[ScriptRecord]) -> FileOutcome {
    let Some((_, language)) = language::identify(file_name) else {
        tracing::info!(file = %file_name, "Skipping file with unsupported extension");
        return FileOutcome::SkippedUnsupportedExtension;
    };

    let text = match std::str::from_utf8(contents) {
        Ok(text) => text,
        Err(e) => {
            return FileOutcome::failed(CoreError::Encoding {
                file_name: file_name.to_string(),
                reason: e.to_string(),
            });
        }
    };

    let parsed = metadata::extract_for(language, text);
    match plan::build_plan(file_name, text, parsed, remote_records) {
        Ok(PlanOutcome::Planned(plan)) => FileOutcome::Processed { plan },
        Ok(PlanOutcome::Skipped) => FileOutcome::SkippedUnsupportedExtension,
        Err(e) => {
            tracing::warn!(file = %file_name, error = %e, "Failed to plan script");
            FileOutcome::failed(e)
        }
    }
}

/// Process a single source, turning read errors into a failed outcome.
pub fn process_source(source: ScriptSource, remote_records: &[ScriptRecord]) -> FileReport {
    let outcome = match &source.contents {
        Ok(bytes) => process_file(&source.file_name, bytes, remote_records),
        Err(e) => FileOutcome::failed(CoreError::Io {
            file_name: source.file_name.clone(),
            reason: e.to_string(),
        }),
    };
    FileReport {
        file_name: source.file_name,
        outcome,
    }
}

/// Process sources one at a time. A failure never stops the batch.
pub fn process_batch<I>(sources: I, remote_records: &[ScriptRecord]) -> Vec<FileReport>
where
    I: IntoIterator<Item = ScriptSource>,
{
    sources
        .into_iter()
        .map(|source| process_source(source, remote_records))
        .collect()
}
