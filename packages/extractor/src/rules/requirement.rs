//! Requirement rule: one row per paragraph inside a section.
//!
//! A paragraph nested in another paragraph is not a candidate: its text is
//! part of the enclosing paragraph and would otherwise be emitted twice.
//! Paragraphs of list items and table cells directly inside a section are
//! candidates like any other.

use roxmltree::Node;

use super::{Built, ExtractionRule, RuleContext};
use crate::config::ExtractConfig;
use crate::error::SchemaViolation;
use crate::types::{RecordKind, RequirementRow};
use crate::xml::{
    find_section_context, has_tag, nearest_ancestor, node_path, text_content_excluding,
};

/// Whether a node is a candidate paragraph: a paragraph with an enclosing
/// section and no enclosing paragraph.
pub fn is_candidate(node: Node<'_, '_>, config: &ExtractConfig) -> bool {
    has_tag(node, &config.paragraph_tag)
        && nearest_ancestor(node, &config.section_tag).is_some()
        && nearest_ancestor(node, &config.paragraph_tag).is_none()
}

/// Whether a candidate is dropped: any enclosing section is of an excluded
/// type, or is the foreword.
pub fn is_excluded(node: Node<'_, '_>, config: &ExtractConfig) -> bool {
    let Some(section) = find_section_context(node, &config.section_tag) else {
        return false;
    };

    let excluded = section.chain().any(|s| {
        s.section_type.is_some_and(|t| config.is_excluded_type(t))
            || s.id.is_some_and(|id| config.is_foreword(id))
    });
    excluded
}

/// The flattened text of a requirement paragraph.
pub fn requirement_text(node: Node<'_, '_>, config: &ExtractConfig) -> String {
    text_content_excluding(node, &config.text_exclusions)
}

/// Whether a paragraph yields a requirement row (and so may be linked to).
pub fn is_requirement(node: Node<'_, '_>, config: &ExtractConfig) -> bool {
    is_candidate(node, config)
        && !is_excluded(node, config)
        && !requirement_text(node, config).is_empty()
}

/// Rule producing the requirement table.
#[derive(Debug, Default)]
pub struct RequirementRule;

impl ExtractionRule for RequirementRule {
    type Row = RequirementRow;

    const KIND: RecordKind = RecordKind::Requirements;

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        is_candidate(node, context.config)
    }

    fn excluded(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        is_excluded(node, context.config)
    }

    fn build(
        &mut self,
        node: Node<'_, '_>,
        context: &mut RuleContext<'_>,
    ) -> Vec<Built<RequirementRow>> {
        let Some(section) = find_section_context(node, &context.config.section_tag) else {
            return Vec::new();
        };

        let text = requirement_text(node, context.config);
        if text.is_empty() {
            return vec![Err(SchemaViolation::new(node_path(node), "Text"))];
        }

        let Some(standard) = context.metadata.standard.clone() else {
            return vec![Err(SchemaViolation::new(node_path(node), "Standard"))];
        };

        vec![Ok(RequirementRow {
            req_uuid: context.registry.requirement_id(node),
            text,
            standard,
            section: section.label(),
        })]
    }
}
