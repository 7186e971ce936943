//! Human-readable and JSON rendering of file reports.

use std::fmt::{self, Write};

use scriptsync_core::pipeline::{FileOutcome, FileReport};
use scriptsync_core::plan::{ChangePlan, ParameterDiff};
use scriptsync_core::record::{ComparableVariable, ScriptRecord};

use crate::input::{IgnoreReason, IgnoredPath};
use crate::RunReport;

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Render a whole run in the requested format.
///
/// Text output has one block per planned file followed by one block per
/// ignored path.
pub fn render(run: &RunReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => {
            let mut blocks = Vec::with_capacity(run.reports.len() + run.ignored.len());
            for report in &run.reports {
                blocks.push(render_text(report)?);
            }
            for ignored in &run.ignored {
                blocks.push(render_ignored(ignored)?);
            }
            Ok(blocks.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(run)?),
    }
}

/// Render one report as a text block.
pub fn render_text(report: &FileReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "== {} [{}]", report.file_name, report.outcome.as_str())?;

    match &report.outcome {
        FileOutcome::Processed { plan } => write_plan(&mut out, plan)?,
        FileOutcome::SkippedUnsupportedExtension => {
            writeln!(out, "Skipped: unsupported file extension")?
        }
        FileOutcome::Failed { reason } => writeln!(out, "Failed: {reason}")?,
    }
    Ok(out)
}

/// Render one ignored path as a text block.
pub fn render_ignored(ignored: &IgnoredPath) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "== {} [IGNORED]", ignored.path)?;
    match ignored.reason {
        IgnoreReason::OutsidePrefix => writeln!(out, "Ignored: outside prefix")?,
        IgnoreReason::NotAFile => writeln!(out, "Ignored: not a regular file")?,
    }
    Ok(out)
}

fn write_plan(out: &mut String, plan: &ChangePlan) -> fmt::Result {
    if plan.is_new {
        writeln!(out, "Script: {} (not in registry, create it manually)", plan.script_name)?;
        write_record(out, &plan.local)?;
    } else {
        match &plan.remote_id {
            Some(id) => writeln!(out, "Script: {} (remote id {id})", plan.script_name)?,
            None => writeln!(out, "Script: {}", plan.script_name)?,
        }
        if plan.is_unchanged() {
            writeln!(out, "  Metadata is up to date.")?;
        }
        write_changes(out, plan)?;
    }
    writeln!(out, "  Note: {}", plan.code_note)
}

fn write_record(out: &mut String, record: &ScriptRecord) -> fmt::Result {
    writeln!(out, "  Description: {}", record.description)?;
    if let Some(language) = record.language {
        writeln!(out, "  Language: {language}")?;
    }
    if let Some(os) = record.operating_systems.as_ref().filter(|v| !v.is_empty()) {
        writeln!(out, "  Operating systems: {}", os.join(", "))?;
    }
    if let Some(arch) = record.architecture.as_ref().filter(|v| !v.is_empty()) {
        writeln!(out, "  Architecture: {}", arch.join(", "))?;
    }
    if !record.script_variables.is_empty() {
        writeln!(out, "  Variables:")?;
        for var in &record.script_variables {
            writeln!(out, "    - {}", describe_variable(&var.comparable()))?;
        }
    }
    Ok(())
}

fn write_changes(out: &mut String, plan: &ChangePlan) -> fmt::Result {
    if let Some(change) = &plan.description_diff {
        writeln!(out, "  Description:")?;
        writeln!(out, "    - {}", change.before)?;
        writeln!(out, "    + {}", change.after)?;
    }
    if let Some(change) = &plan.operating_systems_diff {
        writeln!(
            out,
            "  Operating systems: [{}] -> [{}]",
            change.before.join(", "),
            change.after.join(", ")
        )?;
    }
    if let Some(change) = &plan.architecture_diff {
        writeln!(
            out,
            "  Architecture: [{}] -> [{}]",
            change.before.join(", "),
            change.after.join(", ")
        )?;
    }
    if plan.parameter_diffs.is_empty() {
        return Ok(());
    }

    writeln!(out, "  Parameters:")?;
    for diff in &plan.parameter_diffs {
        match diff {
            ParameterDiff::Add { variable } => {
                writeln!(out, "    ADD {}", describe_variable(variable))?
            }
            ParameterDiff::Remove { name } => writeln!(out, "    REMOVE {name}")?,
            ParameterDiff::Modify { name, changes } => {
                writeln!(out, "    MODIFY {name}")?;
                for change in changes {
                    writeln!(
                        out,
                        "      {}: {} -> {}",
                        change.field,
                        quoted(change.before.as_deref()),
                        quoted(change.after.as_deref())
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn describe_variable(var: &ComparableVariable) -> String {
    let required = if var.required { "required" } else { "optional" };
    let default = var
        .default_value
        .as_ref()
        .map(|d| format!(", default \"{d}\""))
        .unwrap_or_default();
    format!(
        "{}: {}, {required}{default} -- {}",
        var.name, var.variable_type, var.description
    )
}

fn quoted(value: Option<&str>) -> String {
    value.map_or_else(|| "(unset)".to_string(), |v| format!("\"{v}\""))
}
