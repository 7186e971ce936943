//! Normalized script records, comparable between local and remote sides.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::language::ScriptLanguage;
use crate::metadata::ParameterSpec;
use crate::types::{ScriptId, VariableSource, VariableType};

/// A script variable as stored on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptVariable {
    /// Registry-assigned id. Absent for variables that only exist locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScriptId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub variable_type: VariableType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub source: VariableSource,
    #[serde(default)]
    pub value_list: Vec<String>,
}

impl From<ParameterSpec> for ScriptVariable {
    fn from(spec: ParameterSpec) -> Self {
        Self {
            id: None,
            name: spec.name,
            description: spec.description,
            variable_type: spec.variable_type,
            required: spec.required,
            default_value: spec.default_value,
            source: spec.source,
            value_list: Vec::new(),
        }
    }
}

impl ScriptVariable {
    /// The fields that take part in a diff. `id`, `source`, and the value
    /// list are left out.
    pub fn comparable(&self) -> ComparableVariable {
        ComparableVariable {
            name: self.name.clone(),
            description: self.description.clone(),
            variable_type: self.variable_type,
            required: self.required,
            default_value: self.default_value.clone(),
        }
    }
}

/// Projection of a [`ScriptVariable`] onto its diffable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableVariable {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Opaque script body. Stored base64-encoded and never compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptCode(String);

impl ScriptCode {
    pub fn encode(text: &str) -> Self {
        Self(STANDARD.encode(text.as_bytes()))
    }

    pub fn as_encoded(&self) -> &str {
        &self.0
    }
}

/// A script as published (remote) or as derived from a local file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ScriptId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<ScriptLanguage>,
    /// `None` when the remote side did not report the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_systems: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ScriptCode>,
    #[serde(default)]
    pub script_variables: Vec<ScriptVariable>,
}

impl ScriptRecord {
    /// A record with just a name, for building remote fixtures and tests.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: String::new(),
            language: None,
            operating_systems: None,
            architecture: None,
            code: None,
            script_variables: Vec::new(),
        }
    }

    /// Variables projected to their comparable fields, sorted by name.
    pub fn sorted_comparable_variables(&self) -> Vec<ComparableVariable> {
        let mut vars: Vec<_> = self
            .script_variables
            .iter()
            .map(ScriptVariable::comparable)
            .collect();
        vars.sort_by(|a, b| a.name.cmp(&b.name));
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_conversion_sets_literal_source_and_empty_values() {
        let spec = ParameterSpec {
            name: "Count".to_string(),
            variable_type: VariableType::Integer,
            required: false,
            default_value: Some("5".to_string()),
            description: "Variable Count".to_string(),
            source: VariableSource::Literal,
        };
        let var = ScriptVariable::from(spec);
        assert_eq!(var.id, None);
        assert_eq!(var.source, VariableSource::Literal);
        assert!(var.value_list.is_empty());
        assert_eq!(var.default_value.as_deref(), Some("5"));
    }

    #[test]
    fn remote_record_deserializes_with_missing_fields() {
        let record: ScriptRecord = serde_json::from_value(json!({
            "id": 17,
            "name": "Clear-Temp",
            "scriptVariables": [
                { "id": 3, "name": "Days", "type": "INTEGER", "defaultValue": "7" }
            ]
        }))
        .unwrap();

        assert_eq!(record.id, Some(ScriptId::new("17")));
        assert_eq!(record.description, "");
        assert_eq!(record.operating_systems, None);
        let days = &record.script_variables[0];
        assert_eq!(days.variable_type, VariableType::Integer);
        assert!(!days.required);
        assert_eq!(days.source, VariableSource::Literal);
    }

    #[test]
    fn comparable_variables_are_sorted_by_name() {
        let mut record = ScriptRecord::named("s");
        for name in ["b", "C", "a"] {
            record.script_variables.push(ScriptVariable {
                id: None,
                name: name.to_string(),
                description: String::new(),
                variable_type: VariableType::Text,
                required: false,
                default_value: None,
                source: VariableSource::Literal,
                value_list: vec!["ignored".to_string()],
            });
        }
        let names: Vec<_> = record
            .sorted_comparable_variables()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["C", "a", "b"]);
    }

    #[test]
    fn code_is_base64_encoded() {
        let code = ScriptCode::encode("echo hi");
        assert_eq!(code.as_encoded(), "ZWNobyBoaQ==");
    }
}
