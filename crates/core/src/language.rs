//! Script language detection from file names.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Runtime a script is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    Powershell,
    Shell,
    Batch,
}

impl ScriptLanguage {
    /// Resolve a language from a file extension (with or without the leading
    /// dot, any case). Returns `None` for unsupported extensions.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "ps1" => Some(Self::Powershell),
            "sh" => Some(Self::Shell),
            "bat" | "cmd" => Some(Self::Batch),
            _ => None,
        }
    }

    /// Parse a language name as reported by the registry (any case).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "powershell" => Some(Self::Powershell),
            "shell" | "sh" | "bash" => Some(Self::Shell),
            "batch" | "cmd" => Some(Self::Batch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Powershell => "powershell",
            Self::Shell => "shell",
            Self::Batch => "batch",
        }
    }
}

impl std::fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a file name into its script name (the stem) and language.
///
/// Returns `None` when the extension is missing or unsupported.
pub fn identify(file_name: &str) -> Option<(String, ScriptLanguage)> {
    let path = Path::new(file_name);
    let language = ScriptLanguage::from_extension(path.extension()?.to_str()?)?;
    let name = path.file_stem()?.to_str()?.to_string();
    Some((name, language))
}
