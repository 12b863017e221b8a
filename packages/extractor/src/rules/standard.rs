//! Identification metadata of the standard: references, identification
//! blocks and key dates, collected into one row per document.

use roxmltree::Node;

use super::front_matter::normalize_date;
use super::{in_metadata, Built, ExtractionRule, RuleContext};
use crate::metadata::metadata_containers;
use crate::types::{RecordKind, StandardRow};
use crate::xml::{descendants_by_tag, find_descendant, get_tag_name, text_content};

/// Rule producing the standards table.
///
/// The first metadata container of a document anchors the row; values are
/// gathered from all containers, first occurrence wins.
#[derive(Debug, Default)]
pub struct StandardRule {
    emitted: bool,
}

impl ExtractionRule for StandardRule {
    type Row = StandardRow;

    const KIND: RecordKind = RecordKind::Standards;

    fn prepare(&mut self, _root: Node<'_, '_>, _context: &RuleContext<'_>) {
        self.emitted = false;
    }

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        node.is_element()
            && context
                .config
                .metadata_containers
                .iter()
                .any(|c| c == get_tag_name(node))
            && !in_metadata(node, context.config)
    }

    fn build(
        &mut self,
        node: Node<'_, '_>,
        context: &mut RuleContext<'_>,
    ) -> Vec<Built<StandardRow>> {
        if self.emitted {
            return Vec::new();
        }
        self.emitted = true;

        let containers: Vec<Node<'_, '_>> =
            metadata_containers(node.document().root_element(), context.config).collect();

        let first = |tag: &str| {
            containers
                .iter()
                .find_map(|c| find_descendant(*c, tag))
                .map(text_content)
                .filter(|s| !s.is_empty())
        };
        let std_ref = |kind: &str| {
            containers
                .iter()
                .flat_map(|c| descendants_by_tag(*c, "std-ref"))
                .find(|r| r.attribute("type") == Some(kind))
                .map(|r| text_content(r).to_uppercase())
                .filter(|s| !s.is_empty())
        };
        let block_field = |block: &str, tag: &str| {
            containers
                .iter()
                .find_map(|c| find_descendant(*c, block))
                .and_then(|b| find_descendant(b, tag))
                .map(text_content)
                .filter(|s| !s.is_empty())
        };
        let ident = |tag: &str| block_field("std-ident", tag);
        let doc_ident = |tag: &str| block_field("doc-ident", tag);

        vec![Ok(StandardRow {
            id: context.job_id.to_string(),
            ref_dated: std_ref("dated"),
            ref_undated: std_ref("undated"),
            doc_ref: first("doc-ref"),
            rel_date: first("release-date").and_then(|d| normalize_date(&d)),
            secretariat: first("secretariat"),
            sdo: doc_ident("sdo"),
            proj_id: doc_ident("proj-id"),
            doc_lang: doc_ident("language"),
            rel_version: doc_ident("release-version"),
            urn: doc_ident("urn"),
            originator: ident("originator"),
            doc_type: ident("doc-type"),
            doc_nr: ident("doc-number"),
            part_nr: ident("part-number"),
            edition: ident("edition"),
            version: ident("version"),
            year: ident("year"),
            pub_date: first("pub-date").and_then(|d| normalize_date(&d)),
            content_language: first("content-language"),
        })]
    }
}
