//! Configuration constants and extraction settings.

use crate::error::{ExtractError, Result};

/// Section id that marks the foreword in ISO STS documents.
pub const DEFAULT_FOREWORD_ID: &str = "sec_foreword";

/// Section categories whose paragraphs are never requirements.
pub const DEFAULT_EXCLUDED_SECTION_TYPES: &[&str] = &["scope", "terms"];

/// Tag denoting a structural division.
pub const DEFAULT_SECTION_TAG: &str = "sec";

/// Tag denoting a paragraph.
pub const DEFAULT_PARAGRAPH_TAG: &str = "p";

/// Elements whose text never contributes to a requirement's text.
///
/// Formulas have no sensible plain-text rendering; tables, lists and figures
/// are extracted as additional information instead.
pub const DEFAULT_TEXT_EXCLUSIONS: &[&str] = &[
    "inline-formula",
    "disp-formula",
    "table-wrap",
    "list",
    "fig",
];

/// Containers for document-level metadata (ISO, national, regional and NISO).
pub const METADATA_CONTAINERS: &[&str] =
    &["iso-meta", "nat-meta", "reg-meta", "std-meta", "std-doc-meta"];

/// Environment variable overriding the foreword sentinel.
pub const ENV_FOREWORD_ID: &str = "STS_FOREWORD_ID";

/// Environment variable overriding the excluded section types (comma separated).
pub const ENV_EXCLUDED_SECTION_TYPES: &str = "STS_EXCLUDED_SECTION_TYPES";

/// Settings that steer the extraction rules.
///
/// Different document families label forewords and section categories
/// differently, so none of these are hardcoded in the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Section `id` designating the foreword.
    pub foreword_id: String,
    /// Section categories (`sec-type`) excluded from requirement extraction.
    pub excluded_section_types: Vec<String>,
    /// Tag of structural divisions.
    pub section_tag: String,
    /// Tag of paragraphs.
    pub paragraph_tag: String,
    /// Element names skipped when flattening requirement text.
    pub text_exclusions: Vec<String>,
    /// Containers searched for document metadata.
    pub metadata_containers: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            foreword_id: DEFAULT_FOREWORD_ID.to_string(),
            excluded_section_types: to_strings(DEFAULT_EXCLUDED_SECTION_TYPES),
            section_tag: DEFAULT_SECTION_TAG.to_string(),
            paragraph_tag: DEFAULT_PARAGRAPH_TAG.to_string(),
            text_exclusions: to_strings(DEFAULT_TEXT_EXCLUSIONS),
            metadata_containers: to_strings(METADATA_CONTAINERS),
        }
    }
}

impl ExtractConfig {
    /// Defaults overlaid with `STS_FOREWORD_ID` and `STS_EXCLUDED_SECTION_TYPES`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(id) = std::env::var(ENV_FOREWORD_ID) {
            config.foreword_id = id;
        }

        if let Ok(types) = std::env::var(ENV_EXCLUDED_SECTION_TYPES) {
            config = config.with_excluded_section_types(split_list(&types));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the foreword sentinel.
    #[must_use]
    pub fn with_foreword_id(mut self, id: impl Into<String>) -> Self {
        self.foreword_id = id.into();
        self
    }

    /// Replace the excluded section types.
    #[must_use]
    pub fn with_excluded_section_types(
        mut self,
        types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.excluded_section_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Check the settings are usable.
    pub fn validate(&self) -> Result<()> {
        if self.foreword_id.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "foreword sentinel must not be empty".to_string(),
            ));
        }
        if self.section_tag.trim().is_empty() || self.paragraph_tag.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "section and paragraph tags must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a section category is excluded (ASCII case-insensitive).
    #[must_use]
    pub fn is_excluded_type(&self, section_type: &str) -> bool {
        self.excluded_section_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(section_type.trim()))
    }

    /// Whether a section id is the foreword sentinel.
    #[must_use]
    pub fn is_foreword(&self, section_id: &str) -> bool {
        section_id == self.foreword_id
    }
}

/// Split a comma separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.foreword_id, "sec_foreword");
        assert_eq!(config.section_tag, "sec");
        assert_eq!(config.paragraph_tag, "p");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_excluded_type_case_insensitive() {
        let config = ExtractConfig::default();
        assert!(config.is_excluded_type("scope"));
        assert!(config.is_excluded_type("Scope"));
        assert!(config.is_excluded_type("TERMS"));
        assert!(!config.is_excluded_type("normal"));
        assert!(!config.is_excluded_type("scopes"));
    }

    #[test]
    fn test_custom_excluded_types() {
        let config = ExtractConfig::default().with_excluded_section_types(["bibl"]);
        assert!(config.is_excluded_type("BIBL"));
        assert!(!config.is_excluded_type("scope"));
    }

    #[test]
    fn test_foreword_sentinel_is_exact() {
        let config = ExtractConfig::default().with_foreword_id("sec_forword");
        assert!(config.is_foreword("sec_forword"));
        assert!(!config.is_foreword("sec_foreword"));
    }

    #[test]
    fn test_validate_rejects_empty_sentinel() {
        let config = ExtractConfig::default().with_foreword_id("  ");
        assert!(matches!(
            config.validate(),
            Err(ExtractError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("scope, terms,,bibl "), ["scope", "terms", "bibl"]);
        assert!(split_list("").is_empty());
    }
}
