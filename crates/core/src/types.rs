//! Primitive types shared by the extractor, records, and change plans.

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote registry.
///
/// The registry returns numeric ids today, but the core never interprets
/// them, so both numbers and strings are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct ScriptId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for ScriptId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        }
    }
}

impl From<ScriptId> for String {
    fn from(id: ScriptId) -> Self {
        id.0
    }
}

impl ScriptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input type of a script variable as understood by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableType {
    Integer,
    #[default]
    Text,
    Checkbox,
    Decimal,
    Datetime,
}

impl VariableType {
    /// Map a declared PowerShell type tag to a variable type.
    ///
    /// Matching is case-insensitive. Unknown tags fall back to [`Self::Text`].
    pub fn from_declared(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "int" => Self::Integer,
            "string" => Self::Text,
            "bool" | "switch" => Self::Checkbox,
            "decimal" | "double" | "float" => Self::Decimal,
            "datetime" => Self::Datetime,
            _ => Self::Text,
        }
    }

    /// Parse the registry's wire name (`"INTEGER"`, `"TEXT"`, ...).
    pub fn from_wire(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INTEGER" => Some(Self::Integer),
            "TEXT" => Some(Self::Text),
            "CHECKBOX" => Some(Self::Checkbox),
            "DECIMAL" => Some(Self::Decimal),
            "DATETIME" => Some(Self::Datetime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Checkbox => "CHECKBOX",
            Self::Decimal => "DECIMAL",
            Self::Datetime => "DATETIME",
        }
    }
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a variable's value comes from. Only literal values exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableSource {
    #[default]
    Literal,
}
