//! Diff vocabulary shared by change plans.
//!
//! Parameter-level entries use [`DiffKind`]; field-level before/after pairs
//! use [`FieldChange`].

use serde::{Deserialize, Serialize};

/// The kind of a parameter-level diff entry.
///
/// - `Add`    -- declared locally, missing remotely.
/// - `Remove` -- present remotely, no longer declared locally.
/// - `Modify` -- present on both sides with at least one differing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffKind {
    Add,
    Remove,
    Modify,
}

impl DiffKind {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Remove => "REMOVE",
            Self::Modify => "MODIFY",
        }
    }
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single changed value. `before` is the remote side, `after` the local
/// side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange<T> {
    pub before: T,
    pub after: T,
}

impl<T: PartialEq> FieldChange<T> {
    /// `Some` when the two sides differ.
    pub fn between(before: T, after: T) -> Option<Self> {
        if before == after {
            None
        } else {
            Some(Self { before, after })
        }
    }
}
