//! Script metadata extraction and change planning.
//!
//! Turns annotated automation scripts into normalized records and compares
//! them with the records already published in the remote registry. All
//! functions here are pure; reading files and talking to the registry live
//! in the outer crates.

pub mod diff;
pub mod error;
pub mod language;
pub mod metadata;
pub mod pipeline;
pub mod plan;
pub mod record;
pub mod tags;
pub mod types;
