//! Annotation extraction from script source text.
//!
//! Recognizes four independent sections:
//!
//! - `# NINJA_OS: Windows, Linux` -- operating system tag line
//! - `# NINJA_ARCH: AMD64` -- architecture tag line
//! - `<# ... #>` -- comment-based help with `.DESCRIPTION` and
//!   `.PARAMETER <name>` sections
//! - `param( ... )` -- the PowerShell parameter declaration block
//!
//! Each section is extracted on its own and missing or malformed sections
//! fall back to defaults. Extraction never fails.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::ScriptLanguage;
use crate::types::{VariableSource, VariableType};

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static OS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#[ \t]*NINJA_OS:[ \t]*([\w \t,]*)").expect("valid regex")
});

static ARCH_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#[ \t]*NINJA_ARCH:[ \t]*([\w \t,]*)").expect("valid regex")
});

static HELP_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<#(.*?)#>").expect("valid regex"));

static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.DESCRIPTION\b").expect("valid regex"));

static PARAMETER_HELP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.PARAMETER[ \t]+(\w+)").expect("valid regex"));

/// A help section runs until the next line that starts with a `.` keyword.
static SECTION_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\.").expect("valid regex"));

static PARAM_KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bparam\s*\(").expect("valid regex"));

/// One declaration: attribute tags, optional bare-word type tag, `$Name`,
/// optional `= default`.
static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:\[[^\]]+\]\s*)*?)(?:\[(\w+)\]\s*)?\$(\w+)(?:\s*=\s*([^,\r\n)]+))?")
        .expect("valid regex")
});

static MANDATORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Mandatory\s*=\s*\$?true").expect("valid regex"));

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// One declared script input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub description: String,
    pub source: VariableSource,
}

/// Everything the extractor found in one script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMetadata {
    /// `.DESCRIPTION` text, empty when absent.
    pub description: String,
    /// Declared parameters in source order.
    pub variables: Vec<ParameterSpec>,
    /// Raw upper-cased OS tokens in declared order.
    pub operating_systems: Vec<String>,
    /// Raw upper-cased architecture tokens in declared order.
    pub architecture: Vec<String>,
}

/// Contents of the `<# ... #>` help block.
#[derive(Debug, Default)]
struct HelpBlock {
    description: Option<String>,
    /// Keyed by lower-cased parameter name.
    parameters: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Extract every recognized section from `text`.
pub fn extract(text: &str) -> ParsedMetadata {
    let help = extract_help_block(text).unwrap_or_default();
    let variables = extract_declarations(text, &help.parameters).unwrap_or_default();

    ParsedMetadata {
        description: help.description.unwrap_or_default(),
        variables,
        operating_systems: extract_os_tags(text).unwrap_or_default(),
        architecture: extract_arch_tags(text).unwrap_or_default(),
    }
}

/// Extract the sections that apply to `language`.
///
/// Tag lines use the `#` comment marker and are read for every language.
/// Help and declaration blocks are PowerShell syntax, so other languages
/// only get their tag lines.
pub fn extract_for(language: ScriptLanguage, text: &str) -> ParsedMetadata {
    match language {
        ScriptLanguage::Powershell => extract(text),
        ScriptLanguage::Shell | ScriptLanguage::Batch => ParsedMetadata {
            operating_systems: extract_os_tags(text).unwrap_or_default(),
            architecture: extract_arch_tags(text).unwrap_or_default(),
            ..ParsedMetadata::default()
        },
    }
}

/// Raw tokens from the `NINJA_OS:` line, or `None` if there is no such line.
pub fn extract_os_tags(text: &str) -> Option<Vec<String>> {
    extract_tag_line(&OS_LINE_RE, text)
}

/// Raw tokens from the `NINJA_ARCH:` line, or `None` if there is no such line.
pub fn extract_arch_tags(text: &str) -> Option<Vec<String>> {
    extract_tag_line(&ARCH_LINE_RE, text)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn extract_tag_line(re: &Regex, text: &str) -> Option<Vec<String>> {
    let caps = re.captures(text)?;
    let mut tokens: Vec<String> = Vec::new();
    for token in caps[1].split(',') {
        let token = token.trim().to_uppercase();
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    Some(tokens)
}

fn extract_help_block(text: &str) -> Option<HelpBlock> {
    let caps = HELP_BLOCK_RE.captures(text)?;
    let help = caps.get(1)?.as_str();

    let description = DESCRIPTION_RE
        .find(help)
        .map(|m| section_body(help, m.end()).to_string());

    let mut parameters = HashMap::new();
    for caps in PARAMETER_HELP_RE.captures_iter(help) {
        let (Some(header), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        parameters.insert(
            name.as_str().to_lowercase(),
            section_body(help, header.end()).to_string(),
        );
    }

    Some(HelpBlock {
        description,
        parameters,
    })
}

/// Text from `start` up to the next keyword line or the end of the block.
fn section_body(help: &str, start: usize) -> &str {
    let rest = &help[start..];
    let end = SECTION_END_RE.find(rest).map_or(rest.len(), |m| m.start());
    rest[..end].trim()
}

/// Contents of the `param( ... )` block.
///
/// The block ends at the first `)` outside square brackets, so attribute
/// tags like `[Parameter(Mandatory=$true)]` are skipped. Parentheses in
/// default-value expressions are not tracked and end the block early.
fn find_declaration_block(text: &str) -> Option<&str> {
    let open = PARAM_KEYWORD_RE.find(text)?;
    let body = &text[open.end()..];

    let mut bracket_depth: usize = 0;
    for (idx, ch) in body.char_indices() {
        match ch {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            ')' if bracket_depth == 0 => return Some(&body[..idx]),
            _ => {}
        }
    }
    None
}

fn extract_declarations(
    text: &str,
    help: &HashMap<String, String>,
) -> Option<Vec<ParameterSpec>> {
    let block = find_declaration_block(text)?;
    let mut variables: Vec<ParameterSpec> = Vec::new();

    for caps in DECLARATION_RE.captures_iter(block) {
        let Some(name) = caps.get(3).map(|m| m.as_str().to_string()) else {
            continue;
        };
        let attributes = caps.get(1).map_or("", |m| m.as_str());
        let variable_type = caps
            .get(2)
            .map_or(VariableType::Text, |m| VariableType::from_declared(m.as_str()));
        let default_value = caps.get(4).and_then(|m| clean_default(m.as_str()));
        let description = help
            .get(&name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| format!("Variable {name}"));

        let spec = ParameterSpec {
            variable_type,
            required: MANDATORY_RE.is_match(attributes),
            default_value,
            description,
            source: VariableSource::Literal,
            name,
        };

        match variables
            .iter_mut()
            .find(|existing| existing.name.eq_ignore_ascii_case(&spec.name))
        {
            Some(existing) => *existing = spec,
            None => variables.push(spec),
        }
    }

    Some(variables)
}

/// Trim a default value and strip surrounding quotes.
fn clean_default(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.trim_matches(|c| c == '\'' || c == '"').to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
