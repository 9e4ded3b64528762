//! Optional second-opinion service that proposes names the heuristics missed
//!
//! Proposals never bypass the validator, and a failing service only costs
//! its own suggestions.

use std::path::Path;

use crate::error::AuditError;

pub trait AuditService {
    /// Names found in `full_text` that are not among `known`
    fn propose(&self, full_text: &str, known: &[String]) -> Result<Vec<String>, AuditError>;
}

/// Audit answers prepared offline, stored as a JSON array of names
#[derive(Debug, Clone, Default)]
pub struct JsonAuditFile {
    names: Vec<String>,
}

impl JsonAuditFile {
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn from_json(json: &str) -> Result<Self, AuditError> {
        let names: Vec<String> = serde_json::from_str(json)
            .map_err(|e| AuditError::InvalidResponse(e.to_string()))?;
        Ok(Self { names })
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AuditError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

impl AuditService for JsonAuditFile {
    fn propose(&self, full_text: &str, known: &[String]) -> Result<Vec<String>, AuditError> {
        let known: Vec<String> = known.iter().map(|k| k.to_lowercase()).collect();
        let text = full_text.to_lowercase();
        Ok(self
            .names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .filter(|n| {
                let key = n.to_lowercase();
                !known.contains(&key) && text.contains(&key)
            })
            .map(str::to_string)
            .collect())
    }
}
