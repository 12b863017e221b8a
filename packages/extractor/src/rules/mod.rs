//! Extraction rule engine.
//!
//! Every record kind is a rule with the same three operations: a
//! qualification predicate, an exclusion predicate, and a record builder.
//! [`extract`] drives one rule over a document in a single pre-order pass.

mod additional_info;
mod front_matter;
mod links;
mod references;
mod requirement;
mod sections;
mod standard;
mod terms;

use std::fmt;

use roxmltree::Node;

use crate::config::ExtractConfig;
use crate::error::SchemaViolation;
use crate::ids::IdRegistry;
use crate::metadata::DocumentMetadata;
use crate::types::{RecordKind, TableRow};

pub use additional_info::AdditionalInfoRule;
pub use front_matter::{CommitteeRule, DateRule, IcsRule, TitleRule};
pub use links::LinkIndex;
pub use references::ReferenceRule;
pub use requirement::{
    is_candidate, is_excluded, is_requirement, requirement_text, RequirementRule,
};
pub use sections::SectionRule;
pub use standard::StandardRule;
pub use terms::TermRule;

/// Outcome of building one record: a row, or the reason it was dropped.
pub type Built<R> = Result<R, SchemaViolation>;

/// Context passed to every rule during one document's extraction.
pub struct RuleContext<'a> {
    /// Identity of the document (used in diagnostics).
    pub document: &'a str,
    /// Job id written into the `id` column of the supplementary tables.
    pub job_id: &'a str,
    /// Extraction settings.
    pub config: &'a ExtractConfig,
    /// Document-level metadata, read once.
    pub metadata: &'a DocumentMetadata,
    /// Identifier registry for this document.
    pub registry: &'a mut IdRegistry,
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("document", &self.document)
            .field("job_id", &self.job_id)
            .field("metadata", &self.metadata)
            .field("minted", &self.registry.requirement_count())
            .finish()
    }
}

/// A record kind's extraction rule.
pub trait ExtractionRule {
    /// Row type of the table this rule fills.
    type Row: TableRow;

    /// The record kind this rule produces.
    const KIND: RecordKind;

    /// Called once with the document root before the traversal starts.
    fn prepare(&mut self, _root: Node<'_, '_>, _context: &RuleContext<'_>) {}

    /// Whether a node is a candidate for this record kind.
    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool;

    /// Whether a candidate is skipped. Default: never.
    fn excluded(&self, _node: Node<'_, '_>, _context: &RuleContext<'_>) -> bool {
        false
    }

    /// Turn a surviving candidate into zero or more rows.
    fn build(&mut self, node: Node<'_, '_>, context: &mut RuleContext<'_>)
        -> Vec<Built<Self::Row>>;
}

/// Rows and dropped records produced by one rule over one document.
#[derive(Debug)]
pub struct Extraction<R> {
    /// Rows in document order.
    pub rows: Vec<R>,
    /// Records dropped for missing required fields.
    pub violations: Vec<SchemaViolation>,
    /// Candidates removed by the exclusion predicate.
    pub excluded: usize,
}

impl<R> Default for Extraction<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            violations: Vec::new(),
            excluded: 0,
        }
    }
}

/// Run a rule over every node under `root` in document order.
pub fn extract<R: ExtractionRule>(
    rule: &mut R,
    root: Node<'_, '_>,
    context: &mut RuleContext<'_>,
) -> Extraction<R::Row> {
    rule.prepare(root, context);

    let mut extraction = Extraction::default();
    for node in root.descendants().filter(|n| n.is_element()) {
        if !rule.qualifies(node, context) {
            continue;
        }
        if rule.excluded(node, context) {
            tracing::trace!(tag = %node.tag_name().name(), "Candidate excluded");
            extraction.excluded += 1;
            continue;
        }
        for built in rule.build(node, context) {
            match built {
                Ok(row) => extraction.rows.push(row),
                Err(violation) => extraction.violations.push(violation),
            }
        }
    }
    extraction
}

/// Whether a node lies inside one of the configured metadata containers.
pub(crate) fn in_metadata(node: Node<'_, '_>, config: &ExtractConfig) -> bool {
    node.ancestors().skip(1).any(|a| {
        a.is_element()
            && config
                .metadata_containers
                .iter()
                .any(|c| c == a.tag_name().name())
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use roxmltree::Document;

    use super::*;
    use crate::xml::parse_document;

    /// Run a rule over an XML literal with a fresh registry.
    pub fn run<R: ExtractionRule>(
        rule: &mut R,
        xml: &str,
        config: &ExtractConfig,
    ) -> (Extraction<R::Row>, IdRegistry) {
        let doc: Document<'_> = parse_document(xml).unwrap();
        let metadata = DocumentMetadata::read(&doc, config);
        let mut registry = IdRegistry::new("test.xml");
        let extraction = {
            let mut context = RuleContext {
                document: "test.xml",
                job_id: "test",
                config,
                metadata: &metadata,
                registry: &mut registry,
            };
            extract(rule, doc.root(), &mut context)
        };
        (extraction, registry)
    }
}
