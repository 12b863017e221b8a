//! Bibliographic references to other standards.

use std::collections::HashSet;

use roxmltree::Node;

use super::{Built, ExtractionRule, RuleContext};
use crate::types::{RecordKind, ReferenceRow};
use crate::xml::{find_descendant, has_tag, nearest_ancestor, text_content};

/// References of this length or shorter are too ambiguous to count.
const MIN_REFERENCE_LEN: usize = 3;

/// Rule producing one row per distinct standard cited in a reference list.
#[derive(Debug, Default)]
pub struct ReferenceRule {
    /// Reference texts already emitted for the current document.
    seen: HashSet<String>,
    /// Every text node of the current document.
    texts: Vec<String>,
}

impl ReferenceRule {
    /// Number of text nodes mentioning `reference`.
    fn occurrences(&self, reference: &str) -> usize {
        self.texts.iter().filter(|t| t.contains(reference)).count()
    }
}

impl ExtractionRule for ReferenceRule {
    type Row = ReferenceRow;

    const KIND: RecordKind = RecordKind::References;

    fn prepare(&mut self, root: Node<'_, '_>, _context: &RuleContext<'_>) {
        self.seen.clear();
        self.texts = root
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .map(String::from)
            .collect();
    }

    fn qualifies(&self, node: Node<'_, '_>, _context: &RuleContext<'_>) -> bool {
        has_tag(node, "ref") && nearest_ancestor(node, "ref-list").is_some()
    }

    fn build(
        &mut self,
        node: Node<'_, '_>,
        context: &mut RuleContext<'_>,
    ) -> Vec<Built<ReferenceRow>> {
        let Some(std) = find_descendant(node, "std") else {
            return Vec::new();
        };
        let Some(std_ref) = find_descendant(std, "std-ref") else {
            return Vec::new();
        };

        let reference = text_content(std_ref);
        if reference.chars().count() < MIN_REFERENCE_LEN || !self.seen.insert(reference.clone()) {
            return Vec::new();
        }

        vec![Ok(ReferenceRow {
            id: context.job_id.to_string(),
            content_type: node.attribute("content-type").map(String::from),
            std_type: std.attribute("type").map(String::from),
            std_id: std.attribute("std-id").map(String::from),
            std_ref_type: std_ref.attribute("type").map(String::from),
            count: self.occurrences(&reference),
            std_ref: reference,
        })]
    }
}
