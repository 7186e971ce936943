//! Change plans between a local script and its published counterpart.
//!
//! The registry cannot return script bodies and cannot reliably update
//! them, so a plan is advisory: it lists what a reviewer has to change by
//! hand, field by field.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::diff::{DiffKind, FieldChange};
use crate::error::CoreError;
use crate::language::{self, ScriptLanguage};
use crate::metadata::ParsedMetadata;
use crate::record::{ComparableVariable, ScriptCode, ScriptRecord, ScriptVariable};
use crate::tags;
use crate::types::ScriptId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Attached to every plan because remote script bodies cannot be fetched.
pub const CODE_NOTE: &str =
    "Script code cannot be compared: the registry does not return script bodies. Review the code manually.";

/// Prefix of the description used when a script has no `.DESCRIPTION`.
pub const GENERATED_DESCRIPTION_PREFIX: &str = "Synced from GitHub: ";

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A diffable variable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableField {
    Description,
    Type,
    Required,
    DefaultValue,
}

impl VariableField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Type => "type",
            Self::Required => "required",
            Self::DefaultValue => "defaultValue",
        }
    }
}

impl std::fmt::Display for VariableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field of a variable, rendered as text. `None` means the
/// field is unset on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableFieldChange {
    pub field: VariableField,
    pub before: Option<String>,
    pub after: Option<String>,
}

/// A parameter-level entry of a change plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterDiff {
    Add { variable: ComparableVariable },
    Remove { name: String },
    Modify { name: String, changes: Vec<VariableFieldChange> },
}

impl ParameterDiff {
    pub fn kind(&self) -> DiffKind {
        match self {
            Self::Add { .. } => DiffKind::Add,
            Self::Remove { .. } => DiffKind::Remove,
            Self::Modify { .. } => DiffKind::Modify,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Add { variable } => &variable.name,
            Self::Remove { name } | Self::Modify { name, .. } => name,
        }
    }
}

/// Field-level differences between a local script and the remote record of
/// the same name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlan {
    pub script_name: String,
    /// Remote id, for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<ScriptId>,
    /// No remote record exists; `local` is the record to enter by hand.
    pub is_new: bool,
    pub local: ScriptRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_diff: Option<FieldChange<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_systems_diff: Option<FieldChange<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture_diff: Option<FieldChange<Vec<String>>>,
    pub code_note: &'static str,
    pub parameter_diffs: Vec<ParameterDiff>,
}

impl ChangePlan {
    /// True when an existing remote record needs no changes besides the
    /// code review every plan carries.
    pub fn is_unchanged(&self) -> bool {
        !self.is_new
            && self.description_diff.is_none()
            && self.operating_systems_diff.is_none()
            && self.architecture_diff.is_none()
            && self.parameter_diffs.is_empty()
    }
}

/// Result of planning one file.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Planned(ChangePlan),
    /// The file extension is not a supported script language.
    Skipped,
}

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Build the change plan for one script file.
///
/// Returns [`PlanOutcome::Skipped`] for unsupported extensions and
/// [`CoreError::AmbiguousRemote`] when several remote records share the
/// script's name.
pub fn build_plan(
    file_name: &str,
    raw_text: &str,
    parsed: ParsedMetadata,
    remote_records: &[ScriptRecord],
) -> Result<PlanOutcome, CoreError> {
    let Some((name, language)) = language::identify(file_name) else {
        return Ok(PlanOutcome::Skipped);
    };

    let mut local = build_local_record(file_name, name, language, raw_text, parsed);

    let Some(remote) = find_remote(&local.name, remote_records)? else {
        tracing::debug!(script = %local.name, "No remote script, planning creation");
        return Ok(PlanOutcome::Planned(ChangePlan {
            script_name: local.name.clone(),
            remote_id: None,
            is_new: true,
            local,
            description_diff: None,
            operating_systems_diff: None,
            architecture_diff: None,
            code_note: CODE_NOTE,
            parameter_diffs: Vec::new(),
        }));
    };

    carry_variable_ids(&mut local, remote);

    let description_diff =
        FieldChange::between(remote.description.clone(), local.description.clone());
    let operating_systems_diff = diff_tags(
        remote.operating_systems.as_deref(),
        local.operating_systems.as_deref(),
        tags::canonical_operating_systems,
    );
    let architecture_diff = diff_tags(
        remote.architecture.as_deref(),
        local.architecture.as_deref(),
        tags::canonical_architecture,
    );
    let parameter_diffs = diff_variables(&local, remote);

    tracing::debug!(
        script = %local.name,
        remote_id = ?remote.id,
        parameter_changes = parameter_diffs.len(),
        description_changed = description_diff.is_some(),
        "Planned update",
    );

    Ok(PlanOutcome::Planned(ChangePlan {
        script_name: local.name.clone(),
        remote_id: remote.id.clone(),
        is_new: false,
        local,
        description_diff,
        operating_systems_diff,
        architecture_diff,
        code_note: CODE_NOTE,
        parameter_diffs,
    }))
}

/// Normalize extracted metadata into a local [`ScriptRecord`].
pub fn build_local_record(
    file_name: &str,
    name: String,
    language: ScriptLanguage,
    raw_text: &str,
    parsed: ParsedMetadata,
) -> ScriptRecord {
    let description = if parsed.description.is_empty() {
        format!("{GENERATED_DESCRIPTION_PREFIX}{}", base_file_name(file_name))
    } else {
        parsed.description
    };

    ScriptRecord {
        id: None,
        name,
        description,
        language: Some(language),
        operating_systems: Some(tags::normalize_operating_systems(&parsed.operating_systems)),
        architecture: Some(tags::normalize_architecture(&parsed.architecture)),
        code: Some(ScriptCode::encode(raw_text)),
        script_variables: parsed.variables.into_iter().map(ScriptVariable::from).collect(),
    }
}

/// Find the remote record named exactly `name`.
pub fn find_remote<'a>(
    name: &str,
    remote_records: &'a [ScriptRecord],
) -> Result<Option<&'a ScriptRecord>, CoreError> {
    let matches: Vec<&ScriptRecord> = remote_records.iter().filter(|r| r.name == name).collect();
    match matches.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(single)),
        many => Err(CoreError::AmbiguousRemote {
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

/// Compare variables of both records on their comparable fields.
///
/// `Add` and `Modify` entries follow the local name order; `Remove` entries
/// follow the remote name order and come last.
pub fn diff_variables(local: &ScriptRecord, remote: &ScriptRecord) -> Vec<ParameterDiff> {
    let local_vars = local.sorted_comparable_variables();
    let remote_vars = remote.sorted_comparable_variables();

    let remote_by_name: BTreeMap<&str, &ComparableVariable> =
        remote_vars.iter().map(|v| (v.name.as_str(), v)).collect();
    let local_by_name: BTreeMap<&str, &ComparableVariable> =
        local_vars.iter().map(|v| (v.name.as_str(), v)).collect();

    let mut diffs = Vec::new();

    for var in &local_vars {
        match remote_by_name.get(var.name.as_str()) {
            None => diffs.push(ParameterDiff::Add {
                variable: var.clone(),
            }),
            Some(remote_var) => {
                let changes = diff_fields(remote_var, var);
                if !changes.is_empty() {
                    diffs.push(ParameterDiff::Modify {
                        name: var.name.clone(),
                        changes,
                    });
                }
            }
        }
    }

    for var in &remote_vars {
        if !local_by_name.contains_key(var.name.as_str()) {
            diffs.push(ParameterDiff::Remove {
                name: var.name.clone(),
            });
        }
    }

    diffs
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn diff_fields(before: &ComparableVariable, after: &ComparableVariable) -> Vec<VariableFieldChange> {
    let candidates = [
        (
            VariableField::Description,
            Some(before.description.clone()),
            Some(after.description.clone()),
        ),
        (
            VariableField::Type,
            Some(before.variable_type.to_string()),
            Some(after.variable_type.to_string()),
        ),
        (
            VariableField::Required,
            Some(before.required.to_string()),
            Some(after.required.to_string()),
        ),
        (
            VariableField::DefaultValue,
            before.default_value.clone(),
            after.default_value.clone(),
        ),
    ];

    candidates
        .into_iter()
        .filter(|(_, before, after)| before != after)
        .map(|(field, before, after)| VariableFieldChange {
            field,
            before,
            after,
        })
        .collect()
}

/// Only compared when the remote side reported the field. The remote list is
/// brought into canonical form first so order and case never count.
fn diff_tags(
    remote: Option<&[String]>,
    local: Option<&[String]>,
    canonical: fn(&[String]) -> Vec<String>,
) -> Option<FieldChange<Vec<String>>> {
    let remote = remote?;
    FieldChange::between(canonical(remote), local.unwrap_or_default().to_vec())
}

/// Copy remote variable ids onto local variables of the same name.
fn carry_variable_ids(local: &mut ScriptRecord, remote: &ScriptRecord) {
    for var in &mut local.script_variables {
        if let Some(remote_var) = remote.script_variables.iter().find(|r| r.name == var.name) {
            var.id = remote_var.id.clone();
        }
    }
}

fn base_file_name(file_name: &str) -> &str {
    std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{self, ParameterSpec};
    use crate::types::{VariableSource, VariableType};
    use assert_matches::assert_matches;

    fn spec(name: &str, default_value: Option<&str>) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            variable_type: VariableType::Text,
            required: false,
            default_value: default_value.map(str::to_string),
            description: format!("Variable {name}"),
            source: VariableSource::Literal,
        }
    }

    fn parsed_with(description: &str, vars: Vec<ParameterSpec>) -> ParsedMetadata {
        ParsedMetadata {
            description: description.to_string(),
            variables: vars,
            ..ParsedMetadata::default()
        }
    }

    /// A remote record equal to what `build_plan` would derive locally.
    fn remote_from(name: &str, id: i64, parsed: &ParsedMetadata) -> ScriptRecord {
        let mut record = ScriptRecord::named(name);
        record.id = Some(ScriptId::new(id.to_string()));
        record.description = parsed.description.clone();
        record.script_variables = parsed
            .variables
            .iter()
            .cloned()
            .map(ScriptVariable::from)
            .collect();
        record
    }

    fn plan(outcome: PlanOutcome) -> ChangePlan {
        match outcome {
            PlanOutcome::Planned(plan) => plan,
            PlanOutcome::Skipped => panic!("expected a plan"),
        }
    }

    // -- file identity ------------------------------------------------------

    #[test]
    fn unsupported_extension_is_skipped() {
        let outcome = build_plan("notes.txt", "", ParsedMetadata::default(), &[]).unwrap();
        assert_eq!(outcome, PlanOutcome::Skipped);
    }

    #[test]
    fn local_record_uses_stem_and_language() {
        let plan = plan(build_plan("scripts/Backup.sh", "tar", ParsedMetadata::default(), &[]).unwrap());
        assert_eq!(plan.script_name, "Backup");
        assert_eq!(plan.local.language, Some(ScriptLanguage::Shell));
        assert_eq!(plan.local.code, Some(ScriptCode::encode("tar")));
    }

    #[test]
    fn missing_description_gets_generated_text() {
        let plan = plan(build_plan("scripts/Backup.cmd", "", ParsedMetadata::default(), &[]).unwrap());
        assert_eq!(plan.local.description, "Synced from GitHub: Backup.cmd");
    }

    // -- tags ---------------------------------------------------------------

    #[test]
    fn tags_are_normalized_in_canonical_order() {
        let parsed = metadata::extract("# NINJA_OS: LINUX, WINDOWS\n# NINJA_ARCH: AMD64, ARM\n");
        let plan = plan(build_plan("a.ps1", "", parsed, &[]).unwrap());
        assert_eq!(plan.local.operating_systems, Some(vec!["Windows".into(), "Linux".into()]));
        assert_eq!(plan.local.architecture, Some(vec!["64".into()]));
    }

    #[test]
    fn tags_diffed_only_when_remote_reports_them() {
        let parsed = metadata::extract("# NINJA_OS: Windows\n");
        let mut remote = ScriptRecord::named("a");
        remote.description = "Synced from GitHub: a.ps1".to_string();
        let without = plan(build_plan("a.ps1", "", parsed.clone(), &[remote.clone()]).unwrap());
        assert_eq!(without.operating_systems_diff, None);

        remote.operating_systems = Some(vec!["Windows".into(), "Mac".into()]);
        let with = plan(build_plan("a.ps1", "", parsed, &[remote]).unwrap());
        assert_eq!(
            with.operating_systems_diff,
            Some(FieldChange {
                before: vec!["Windows".into(), "Mac".into()],
                after: vec!["Windows".into()],
            })
        );
    }

    #[test]
    fn remote_tag_order_is_not_a_change() {
        let parsed = metadata::extract("# NINJA_OS: Windows, Linux\n# NINJA_ARCH: X86, AMD64\n");
        let mut remote = ScriptRecord::named("Tool");
        remote.description = "Synced from GitHub: Tool.ps1".to_string();
        remote.operating_systems = Some(vec!["Linux".into(), "Windows".into()]);
        remote.architecture = Some(vec!["64".into(), "32".into()]);

        let plan = plan(build_plan("Tool.ps1", "", parsed, &[remote]).unwrap());
        assert_eq!(plan.operating_systems_diff, None);
        assert_eq!(plan.architecture_diff, None);
        assert!(plan.is_unchanged());
    }

    #[test]
    fn remote_tag_case_is_not_a_change() {
        let parsed = metadata::extract("# NINJA_OS: Windows\n# NINJA_ARCH: AMD64\n");
        let mut remote = ScriptRecord::named("Tool");
        remote.operating_systems = Some(vec!["WINDOWS".into()]);
        remote.architecture = Some(vec!["amd64".into()]);

        let plan = plan(build_plan("Tool.ps1", "", parsed, &[remote]).unwrap());
        assert_eq!(plan.operating_systems_diff, None);
        assert_eq!(plan.architecture_diff, None);
    }

    #[test]
    fn unrecognized_remote_tags_still_show_as_changes() {
        let parsed = metadata::extract("# NINJA_OS: Windows\n");
        let mut remote = ScriptRecord::named("Tool");
        remote.operating_systems = Some(vec!["Solaris".into(), "windows".into()]);

        let plan = plan(build_plan("Tool.ps1", "", parsed, &[remote]).unwrap());
        assert_eq!(
            plan.operating_systems_diff,
            Some(FieldChange {
                before: vec!["Windows".into(), "Solaris".into()],
                after: vec!["Windows".into()],
            })
        );
    }

    // -- remote lookup ------------------------------------------------------

    #[test]
    fn absent_remote_yields_creation_plan() {
        let parsed = parsed_with("Does things", vec![spec("X", Some("1"))]);
        let plan = plan(build_plan("Tool.ps1", "", parsed, &[ScriptRecord::named("tool")]).unwrap());
        assert!(plan.is_new);
        assert_eq!(plan.remote_id, None);
        assert_eq!(plan.local.description, "Does things");
        assert_eq!(plan.local.script_variables.len(), 1);
        assert!(plan.parameter_diffs.is_empty());
        assert_eq!(plan.code_note, CODE_NOTE);
    }

    #[test]
    fn duplicate_remote_names_are_ambiguous() {
        let remotes = vec![ScriptRecord::named("Tool"), ScriptRecord::named("Tool")];
        let result = build_plan("Tool.ps1", "", ParsedMetadata::default(), &remotes);
        assert_matches!(
            result,
            Err(CoreError::AmbiguousRemote { ref name, count: 2 }) if name == "Tool"
        );
    }

    // -- diffs --------------------------------------------------------------

    #[test]
    fn identical_records_produce_empty_plan() {
        let parsed = parsed_with("Same", vec![spec("A", None), spec("B", Some("x"))]);
        let remote = remote_from("Tool", 9, &parsed);
        let plan = plan(build_plan("Tool.ps1", "", parsed, &[remote]).unwrap());
        assert!(!plan.is_new);
        assert_eq!(plan.remote_id, Some(ScriptId::new("9")));
        assert_eq!(plan.description_diff, None);
        assert!(plan.parameter_diffs.is_empty());
        assert!(plan.is_unchanged());
        assert_eq!(plan.code_note, CODE_NOTE);
    }

    #[test]
    fn description_change_is_reported() {
        let remote = remote_from("Tool", 1, &parsed_with("Old", vec![]));
        let plan = plan(build_plan("Tool.ps1", "", parsed_with("New", vec![]), &[remote]).unwrap());
        assert_eq!(
            plan.description_diff,
            Some(FieldChange {
                before: "Old".to_string(),
                after: "New".to_string(),
            })
        );
    }

    #[test]
    fn changed_default_is_a_single_modify() {
        let remote = remote_from("Tool", 1, &parsed_with("d", vec![spec("X", Some("2"))]));
        let local = parsed_with("d", vec![spec("X", Some("1"))]);
        let plan = plan(build_plan("Tool.ps1", "", local, &[remote]).unwrap());

        assert_eq!(
            plan.parameter_diffs,
            vec![ParameterDiff::Modify {
                name: "X".to_string(),
                changes: vec![VariableFieldChange {
                    field: VariableField::DefaultValue,
                    before: Some("2".to_string()),
                    after: Some("1".to_string()),
                }],
            }]
        );
    }

    #[test]
    fn added_and_removed_names() {
        let remote = remote_from("Tool", 1, &parsed_with("d", vec![spec("B", None), spec("C", None)]));
        let local = parsed_with("d", vec![spec("B", None), spec("A", None)]);
        let plan = plan(build_plan("Tool.ps1", "", local, &[remote]).unwrap());

        let summary: Vec<_> = plan
            .parameter_diffs
            .iter()
            .map(|d| (d.kind(), d.name().to_string()))
            .collect();
        assert_eq!(
            summary,
            vec![(DiffKind::Add, "A".to_string()), (DiffKind::Remove, "C".to_string())]
        );
    }

    #[test]
    fn removes_come_after_adds_and_modifies() {
        let mut required_z = spec("Z", None);
        required_z.required = true;
        let remote = remote_from(
            "Tool",
            1,
            &parsed_with("d", vec![spec("A", None), spec("M", None), spec("Z", None)]),
        );
        let local = parsed_with("d", vec![required_z, spec("N", None)]);
        let plan = plan(build_plan("Tool.ps1", "", local, &[remote]).unwrap());

        let summary: Vec<_> = plan
            .parameter_diffs
            .iter()
            .map(|d| format!("{} {}", d.kind(), d.name()))
            .collect();
        assert_eq!(summary, vec!["ADD N", "MODIFY Z", "REMOVE A", "REMOVE M"]);
    }

    #[test]
    fn modify_lists_every_changed_field() {
        let remote = remote_from("Tool", 1, &parsed_with("d", vec![spec("X", Some("1"))]));
        let mut changed = spec("X", None);
        changed.variable_type = VariableType::Integer;
        changed.required = true;
        changed.description = "Count of things".to_string();
        let plan = plan(build_plan("Tool.ps1", "", parsed_with("d", vec![changed]), &[remote]).unwrap());

        let ParameterDiff::Modify { changes, .. } = &plan.parameter_diffs[0] else {
            panic!("expected a modify entry");
        };
        let fields: Vec<_> = changes.iter().map(|c| c.field).collect();
        assert_eq!(
            fields,
            vec![
                VariableField::Description,
                VariableField::Type,
                VariableField::Required,
                VariableField::DefaultValue,
            ]
        );
        assert_eq!(changes[1].before.as_deref(), Some("TEXT"));
        assert_eq!(changes[1].after.as_deref(), Some("INTEGER"));
        assert_eq!(changes[3].after, None);
    }

    #[test]
    fn source_and_value_list_are_not_diffed() {
        let parsed = parsed_with("d", vec![spec("X", None)]);
        let mut remote = remote_from("Tool", 1, &parsed);
        remote.script_variables[0].value_list = vec!["a".to_string(), "b".to_string()];
        let plan = plan(build_plan("Tool.ps1", "", parsed, &[remote]).unwrap());
        assert!(plan.parameter_diffs.is_empty());
    }

    #[test]
    fn remote_variable_ids_are_carried_to_local() {
        let parsed = parsed_with("d", vec![spec("X", None), spec("Y", None)]);
        let mut remote = remote_from("Tool", 1, &parsed);
        remote.script_variables[0].id = Some(ScriptId::new("501"));
        remote.script_variables.truncate(1);
        let plan = plan(build_plan("Tool.ps1", "", parsed, &[remote]).unwrap());
        assert_eq!(plan.local.script_variables[0].id, Some(ScriptId::new("501")));
        assert_eq!(plan.local.script_variables[1].id, None);
    }

    #[test]
    fn plan_serializes_tagged_entries() {
        let remote = remote_from("Tool", 1, &parsed_with("d", vec![spec("Gone", None)]));
        let plan = plan(build_plan("Tool.ps1", "", parsed_with("d", vec![]), &[remote]).unwrap());
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["scriptName"], "Tool");
        assert_eq!(json["isNew"], false);
        assert_eq!(json["parameterDiffs"][0]["kind"], "REMOVE");
        assert_eq!(json["parameterDiffs"][0]["name"], "Gone");
    }
}
