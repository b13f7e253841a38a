// MIT License - Copyright (c) 2026 Peter Wright
// Contact ID event code table

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BridgeError, ParseError, Result};

/// Table shipped with the binary, used when no override path is configured.
const BUILTIN_TABLE: &str = include_str!("../data/contactid.json");

/// Name and description of one event code.
///
/// JSON keys follow the `contactid.json` layout: `{"Event": .., "Description": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeTableEntry {
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Description")]
    pub description: String,
}

/// Read-only lookup from 3-digit event code to [`CodeTableEntry`].
///
/// Built once at startup and shared behind an `Arc`; there is no mutation
/// API, so concurrent readers need no locking.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: HashMap<String, CodeTableEntry>,
}

impl CodeTable {
    /// Parse a JSON object keyed by event code.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, CodeTableEntry> =
            serde_json::from_str(json).map_err(|e| BridgeError::CodeTable {
                details: e.to_string(),
            })?;

        if let Some(bad) = entries.keys().find(|k| !is_event_code(k)) {
            return Err(BridgeError::CodeTable {
                details: format!("key {:?} is not a 3-digit event code", bad),
            });
        }

        debug!("Code table parsed with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_json(&text)?;
        info!("Loaded {} event codes from {}", table.len(), path.display());
        Ok(table)
    }

    /// Look up an event code. A miss is an error, never a silent default.
    pub fn lookup(&self, code: &str) -> std::result::Result<&CodeTableEntry, ParseError> {
        self.entries
            .get(code)
            .ok_or_else(|| ParseError::UnknownEventCode {
                code: code.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_event_code(s: &str) -> bool {
    s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit())
}
