//! Versioned heuristic rulesets
//!
//! The highlighter went through four revisions whose behaviour differed only
//! in their tables and bounds. Each revision is a preset here; a TOML file
//! can layer additions and overrides on top of a preset:
//!
//! ```toml
//! base = "v3"
//! max_term_len = 1500
//! extend_blocklist = ["CONDOMÍNIO EDIFÍCIO"]
//! manual_terms = ["FULANO DE TAL"]
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared_types::TermSource;

use crate::error::RulesetError;
use crate::patterns;

/// Ruleset revision
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RulesetVersion {
    /// Party and attorney blocks only, raw substring highlighting
    V1,
    /// Appeal roles, corporate splitting
    V2,
    /// Trial roles, judgment boilerplate
    V3,
    /// Full tables
    #[default]
    V4,
}

impl RulesetVersion {
    pub fn all() -> [RulesetVersion; 4] {
        [Self::V1, Self::V2, Self::V3, Self::V4]
    }

    /// Upper bound on candidate length (in characters)
    pub fn max_term_len(&self) -> usize {
        match self {
            Self::V1 => 200,
            Self::V2 => 500,
            Self::V3 => 1000,
            Self::V4 => 3000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
            Self::V4 => "v4",
        }
    }
}

impl fmt::Display for RulesetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RulesetVersion {
    type Err = RulesetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            "v3" | "3" => Ok(Self::V3),
            "v4" | "4" | "latest" => Ok(Self::V4),
            other => Err(RulesetError::UnknownVersion(other.to_string())),
        }
    }
}

/// A label that introduces a list of entity names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMarker {
    pub label: String,
    /// `None` for the generic party list
    #[serde(default)]
    pub role: Option<String>,
}

impl RoleMarker {
    pub fn new(label: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            label: label.into(),
            role: role.map(str::to_string),
        }
    }

    /// Provenance tag for terms found under this marker
    pub fn source(&self) -> TermSource {
        match &self.role {
            Some(role) => TermSource::Role(role.clone()),
            None => TermSource::Party,
        }
    }
}

/// Every table and bound the heuristics read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub version: RulesetVersion,
    pub min_term_len: usize,
    pub max_term_len: usize,
    /// Only highlight occurrences that are not glued to other letters/digits
    pub whole_word_matching: bool,
    pub role_markers: Vec<RoleMarker>,
    /// Roles whose list may run to the end of the publication without a stop-token
    #[serde(default)]
    pub open_ended_roles: Vec<String>,
    pub stop_tokens: Vec<String>,
    pub corporate_suffixes: Vec<String>,
    pub exception_suffixes: Vec<String>,
    pub institutional_tokens: Vec<String>,
    pub split_connectors: Vec<String>,
    pub protected_slash_abbreviations: Vec<String>,
    pub tail_boilerplate: Vec<String>,
    pub representative_clauses: Vec<String>,
    pub syntax_guard_words: Vec<String>,
    pub blocklist: Vec<String>,
    pub header_labels: Vec<String>,
    pub keyword_separators: Vec<String>,
    /// Names always added to the term set (still validated)
    #[serde(default)]
    pub manual_terms: Vec<String>,
}

fn strings(tables: &[&[&str]]) -> Vec<String> {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .map(|s| s.to_string())
        .collect()
}

fn markers(tables: &[&[(&str, Option<&str>)]]) -> Vec<RoleMarker> {
    tables
        .iter()
        .flat_map(|t| t.iter())
        .map(|(label, role)| RoleMarker::new(*label, *role))
        .collect()
}

impl Ruleset {
    /// Built-in tables for a revision
    pub fn preset(version: RulesetVersion) -> Self {
        use RulesetVersion::*;

        let role_markers = match version {
            V1 => markers(&[patterns::ROLE_MARKERS_BASE]),
            V2 => markers(&[patterns::ROLE_MARKERS_BASE, patterns::ROLE_MARKERS_APPEAL]),
            V3 => markers(&[
                patterns::ROLE_MARKERS_BASE,
                patterns::ROLE_MARKERS_APPEAL,
                patterns::ROLE_MARKERS_TRIAL,
            ]),
            V4 => markers(&[
                patterns::ROLE_MARKERS_BASE,
                patterns::ROLE_MARKERS_APPEAL,
                patterns::ROLE_MARKERS_TRIAL,
                patterns::ROLE_MARKERS_EXTENDED,
            ]),
        };

        let stop_tokens = match version {
            V1 => strings(&[patterns::STOP_TOKENS_BASE]),
            _ => strings(&[patterns::STOP_TOKENS_BASE, patterns::STOP_TOKENS_EXTENDED]),
        };

        let corporate_suffixes = match version {
            V1 => strings(&[patterns::CORPORATE_SUFFIXES_BASE]),
            _ => strings(&[
                patterns::CORPORATE_SUFFIXES_BASE,
                patterns::CORPORATE_SUFFIXES_EXTENDED,
            ]),
        };

        let institutional_tokens = match version {
            V1 | V2 => Vec::new(),
            V3 | V4 => strings(&[patterns::INSTITUTIONAL_TOKENS]),
        };

        let blocklist = match version {
            V1 => strings(&[patterns::BLOCKLIST_BASE]),
            V2 => strings(&[patterns::BLOCKLIST_BASE, patterns::BLOCKLIST_PROCEDURAL]),
            V3 => strings(&[
                patterns::BLOCKLIST_BASE,
                patterns::BLOCKLIST_PROCEDURAL,
                patterns::BLOCKLIST_JUDGMENT,
            ]),
            V4 => strings(&[
                patterns::BLOCKLIST_BASE,
                patterns::BLOCKLIST_PROCEDURAL,
                patterns::BLOCKLIST_JUDGMENT,
                patterns::BLOCKLIST_CASE_SPECIFIC,
            ]),
        };

        let mut keyword_separators: Vec<String> =
            role_markers.iter().map(|m| m.label.clone()).collect();
        keyword_separators.extend(strings(&[patterns::KEYWORD_SEPARATORS]));

        Self {
            version,
            min_term_len: 3,
            max_term_len: version.max_term_len(),
            whole_word_matching: version != V1,
            role_markers,
            open_ended_roles: vec!["advogado".to_string()],
            stop_tokens,
            corporate_suffixes,
            exception_suffixes: strings(&[patterns::EXCEPTION_SUFFIXES]),
            institutional_tokens,
            split_connectors: strings(&[patterns::SPLIT_CONNECTORS]),
            protected_slash_abbreviations: strings(&[patterns::PROTECTED_SLASH_ABBREVIATIONS]),
            tail_boilerplate: strings(&[patterns::TAIL_BOILERPLATE]),
            representative_clauses: strings(&[patterns::REPRESENTATIVE_CLAUSES]),
            syntax_guard_words: strings(&[patterns::SYNTAX_GUARD_WORDS]),
            blocklist,
            header_labels: strings(&[patterns::HEADER_LABELS]),
            keyword_separators,
            manual_terms: Vec::new(),
        }
    }

    /// Load a ruleset TOML file (overrides layered on a preset)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RulesetError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RulesetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, RulesetError> {
        let overrides: RulesetOverrides = toml::from_str(s)?;
        overrides.apply()
    }

    /// Stop-tokens plus every role marker label, which also closes a window
    pub fn window_terminators(&self) -> Vec<&str> {
        self.stop_tokens
            .iter()
            .map(String::as_str)
            .chain(self.role_markers.iter().map(|m| m.label.as_str()))
            .collect()
    }

    /// Whether a marker's window may end at the end of the publication
    pub fn is_open_ended(&self, marker: &RoleMarker) -> bool {
        marker
            .role
            .as_ref()
            .is_some_and(|role| self.open_ended_roles.contains(role))
    }

    /// Reject rulesets the pipeline cannot run with
    pub fn validate(&self) -> Result<(), RulesetError> {
        if self.min_term_len == 0 {
            return Err(RulesetError::Invalid(
                "min_term_len must be at least 1".to_string(),
            ));
        }
        if self.max_term_len < self.min_term_len {
            return Err(RulesetError::Invalid(format!(
                "max_term_len {} is below min_term_len {}",
                self.max_term_len, self.min_term_len
            )));
        }
        if let Some(marker) = self.role_markers.iter().find(|m| m.label.trim().is_empty()) {
            return Err(RulesetError::Invalid(format!(
                "role marker with empty label (role {:?})",
                marker.role
            )));
        }
        if self.stop_tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(RulesetError::Invalid("empty stop token".to_string()));
        }
        Ok(())
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::preset(RulesetVersion::default())
    }
}

/// TOML layer applied on top of a preset
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesetOverrides {
    #[serde(default)]
    pub base: RulesetVersion,
    pub min_term_len: Option<usize>,
    pub max_term_len: Option<usize>,
    pub whole_word_matching: Option<bool>,
    #[serde(default)]
    pub extend_role_markers: Vec<RoleMarker>,
    #[serde(default)]
    pub extend_stop_tokens: Vec<String>,
    #[serde(default)]
    pub extend_corporate_suffixes: Vec<String>,
    #[serde(default)]
    pub extend_exception_suffixes: Vec<String>,
    #[serde(default)]
    pub extend_institutional_tokens: Vec<String>,
    #[serde(default)]
    pub extend_tail_boilerplate: Vec<String>,
    #[serde(default)]
    pub extend_blocklist: Vec<String>,
    #[serde(default)]
    pub extend_header_labels: Vec<String>,
    /// Blocklist phrases to drop from the preset
    #[serde(default)]
    pub remove_blocklist: Vec<String>,
    #[serde(default)]
    pub manual_terms: Vec<String>,
}

impl RulesetOverrides {
    pub fn apply(self) -> Result<Ruleset, RulesetError> {
        let mut ruleset = Ruleset::preset(self.base);

        if let Some(min) = self.min_term_len {
            ruleset.min_term_len = min;
        }
        if let Some(max) = self.max_term_len {
            ruleset.max_term_len = max;
        }
        if let Some(whole_word) = self.whole_word_matching {
            ruleset.whole_word_matching = whole_word;
        }

        ruleset
            .keyword_separators
            .extend(self.extend_role_markers.iter().map(|m| m.label.clone()));
        ruleset.role_markers.extend(self.extend_role_markers);
        ruleset.stop_tokens.extend(self.extend_stop_tokens);
        ruleset
            .corporate_suffixes
            .extend(self.extend_corporate_suffixes);
        ruleset
            .exception_suffixes
            .extend(self.extend_exception_suffixes);
        ruleset
            .institutional_tokens
            .extend(self.extend_institutional_tokens);
        ruleset.tail_boilerplate.extend(self.extend_tail_boilerplate);
        ruleset.blocklist.extend(self.extend_blocklist);
        ruleset.header_labels.extend(self.extend_header_labels);
        ruleset.manual_terms.extend(self.manual_terms);

        if !self.remove_blocklist.is_empty() {
            let removed: Vec<String> = self
                .remove_blocklist
                .iter()
                .map(|p| patterns::fold_key(p))
                .collect();
            ruleset
                .blocklist
                .retain(|p| !removed.contains(&patterns::fold_key(p)));
        }

        ruleset.validate()?;
        Ok(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_presets_grow_max_length() {
        let lens: Vec<usize> = RulesetVersion::all()
            .iter()
            .map(|v| Ruleset::preset(*v).max_term_len)
            .collect();
        assert_eq!(lens, vec![200, 500, 1000, 3000]);
    }

    #[test]
    fn test_presets_are_cumulative() {
        let v1 = Ruleset::preset(RulesetVersion::V1);
        let v4 = Ruleset::preset(RulesetVersion::V4);
        assert!(v1.role_markers.len() < v4.role_markers.len());
        assert!(v1.blocklist.iter().all(|p| v4.blocklist.contains(p)));
        assert!(!v1.whole_word_matching);
        assert!(v4.whole_word_matching);
    }

    #[test]
    fn test_every_preset_validates() {
        for version in RulesetVersion::all() {
            assert!(Ruleset::preset(version).validate().is_ok(), "{}", version);
        }
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("V2".parse::<RulesetVersion>().unwrap(), RulesetVersion::V2);
        assert_eq!("latest".parse::<RulesetVersion>().unwrap(), RulesetVersion::V4);
        assert!("v9".parse::<RulesetVersion>().is_err());
    }

    #[test]
    fn test_marker_labels_are_window_terminators() {
        let ruleset = Ruleset::preset(RulesetVersion::V2);
        let terminators = ruleset.window_terminators();
        assert!(terminators.contains(&"Apelante:"));
        assert!(terminators.contains(&"Certifico"));
    }

    #[test]
    fn test_toml_overrides_layer_on_preset() {
        let ruleset = Ruleset::from_toml_str(
            r#"
            base = "v2"
            max_term_len = 750
            extend_blocklist = ["CONDOMÍNIO EDIFÍCIO"]
            remove_blocklist = ["foro"]
            manual_terms = ["FULANO DE TAL"]

            [[extend_role_markers]]
            label = "Denunciado:"
            role = "denunciado"
            "#,
        )
        .unwrap();

        assert_eq!(ruleset.version, RulesetVersion::V2);
        assert_eq!(ruleset.max_term_len, 750);
        assert!(ruleset.blocklist.contains(&"CONDOMÍNIO EDIFÍCIO".to_string()));
        assert!(!ruleset.blocklist.contains(&"FORO".to_string()));
        assert_eq!(ruleset.manual_terms, vec!["FULANO DE TAL".to_string()]);
        assert!(ruleset
            .keyword_separators
            .contains(&"Denunciado:".to_string()));
        assert_eq!(
            ruleset.role_markers.last().map(RoleMarker::source),
            Some(TermSource::Role("denunciado".into()))
        );
    }

    #[test]
    fn test_toml_rejects_unknown_fields_and_bad_bounds() {
        assert!(matches!(
            Ruleset::from_toml_str("colour = \"red\""),
            Err(RulesetError::Parse(_))
        ));
        assert!(matches!(
            Ruleset::from_toml_str("min_term_len = 10\nmax_term_len = 5"),
            Err(RulesetError::Invalid(_))
        ));
    }

    #[test]
    fn test_ruleset_round_trips_through_json() {
        let ruleset = Ruleset::preset(RulesetVersion::V3);
        let json = serde_json::to_string(&ruleset).unwrap();
        let back: Ruleset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ruleset);
    }
}
