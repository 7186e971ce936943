//! Validation of raw registry JSON into typed [`ScriptRecord`]s.
//!
//! The registry returns loosely shaped objects. Entries are checked one by
//! one so a single malformed script does not hide the rest of the list.

use serde::Deserialize;

use scriptsync_core::language::ScriptLanguage;
use scriptsync_core::record::{ScriptRecord, ScriptVariable};
use scriptsync_core::types::{ScriptId, VariableSource, VariableType};

/// Script object as returned by `GET /v2/automation/scripts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteScript {
    id: Option<ScriptId>,
    name: Option<String>,
    description: Option<String>,
    language: Option<String>,
    operating_systems: Option<Vec<String>>,
    architecture: Option<Vec<String>>,
    #[serde(default)]
    script_variables: Vec<serde_json::Value>,
}

/// Variable object nested in a [`RemoteScript`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteVariable {
    id: Option<ScriptId>,
    name: Option<String>,
    description: Option<String>,
    #[serde(rename = "type")]
    variable_type: Option<String>,
    required: Option<bool>,
    default_value: Option<serde_json::Value>,
    #[serde(default)]
    value_list: Vec<serde_json::Value>,
}

/// Why a remote entry was not passed on.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("entry is not a script object: {0}")]
    Malformed(String),
    #[error("script has no name")]
    MissingName,
}

/// Convert the raw script list, dropping entries that fail validation.
pub fn validate_scripts(raw: Vec<serde_json::Value>) -> Vec<ScriptRecord> {
    let total = raw.len();
    let records: Vec<ScriptRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match validate_script(value) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::warn!(index, %reason, "Rejecting remote script entry");
                None
            }
        })
        .collect();

    tracing::debug!(total, accepted = records.len(), "Validated remote scripts");
    records
}

/// Convert one raw script object.
pub fn validate_script(value: serde_json::Value) -> Result<ScriptRecord, RejectReason> {
    let script: RemoteScript =
        serde_json::from_value(value).map_err(|e| RejectReason::Malformed(e.to_string()))?;

    let name = script
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or(RejectReason::MissingName)?;

    let mut script_variables: Vec<ScriptVariable> = Vec::new();
    for var in script
        .script_variables
        .into_iter()
        .filter_map(|raw| validate_variable(&name, raw))
    {
        if script_variables.iter().any(|kept| kept.name == var.name) {
            tracing::warn!(script = %name, variable = %var.name, "Dropping duplicate remote variable");
            continue;
        }
        script_variables.push(var);
    }

    Ok(ScriptRecord {
        id: script.id,
        description: script.description.unwrap_or_default(),
        language: script.language.as_deref().and_then(ScriptLanguage::from_name),
        operating_systems: script.operating_systems,
        architecture: script.architecture,
        code: None,
        script_variables,
        name,
    })
}

fn validate_variable(script: &str, raw: serde_json::Value) -> Option<ScriptVariable> {
    let var: RemoteVariable = match serde_json::from_value(raw) {
        Ok(var) => var,
        Err(e) => {
            tracing::warn!(script, error = %e, "Dropping malformed remote variable");
            return None;
        }
    };

    let Some(name) = var.name.filter(|n| !n.trim().is_empty()) else {
        tracing::warn!(script, "Dropping remote variable without a name");
        return None;
    };

    let variable_type = match var.variable_type.as_deref() {
        None => VariableType::Text,
        Some(wire) => VariableType::from_wire(wire).unwrap_or_else(|| {
            tracing::warn!(script, variable = %name, wire, "Unknown remote variable type, using TEXT");
            VariableType::Text
        }),
    };

    Some(ScriptVariable {
        id: var.id,
        description: var.description.unwrap_or_default(),
        variable_type,
        required: var.required.unwrap_or(false),
        default_value: var.default_value.and_then(value_as_text),
        source: VariableSource::Literal,
        value_list: var.value_list.into_iter().filter_map(value_as_text).collect(),
        name,
    })
}

/// Render scalar JSON as text; `null` means unset.
fn value_as_text(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
