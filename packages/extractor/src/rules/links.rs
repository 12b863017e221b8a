//! Index of requirement paragraphs used to link additional information.
//!
//! Built once per document before additional information is extracted. It
//! holds node ids only, so it outlives no borrow of the parsed tree.

use std::collections::HashMap;

use roxmltree::{Node, NodeId};

use super::requirement::is_requirement;
use crate::config::ExtractConfig;
use crate::xml::{descendants_by_tag, find_section_context, is_within};

/// Requirement paragraphs of one document and the items they cross-reference.
#[derive(Debug, Default)]
pub struct LinkIndex {
    /// Requirement paragraphs in document order.
    requirements: Vec<NodeId>,
    /// First requirement paragraph citing each `xref/@rid` target.
    xref_targets: HashMap<String, NodeId>,
}

impl LinkIndex {
    /// Index every paragraph under `root` that yields a requirement row.
    #[must_use]
    pub fn build(root: Node<'_, '_>, config: &ExtractConfig) -> Self {
        let mut index = Self::default();

        for paragraph in descendants_by_tag(root, &config.paragraph_tag) {
            if !is_requirement(paragraph, config) {
                continue;
            }
            index.requirements.push(paragraph.id());

            for xref in descendants_by_tag(paragraph, "xref") {
                let Some(rid) = xref.attribute("rid") else {
                    continue;
                };
                for target in rid.split_whitespace() {
                    index
                        .xref_targets
                        .entry(target.to_string())
                        .or_insert(paragraph.id());
                }
            }
        }

        index
    }

    /// Number of indexed requirement paragraphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether the document has no requirement paragraphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    fn contains(&self, id: NodeId) -> bool {
        self.requirements
            .binary_search_by_key(&id.get_usize(), |r| r.get_usize())
            .is_ok()
    }

    /// The requirement paragraph containing `node`, if any.
    pub fn enclosing<'a, 'input>(&self, node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
        node.ancestors().skip(1).find(|a| self.contains(a.id()))
    }

    /// The first requirement paragraph that cross-references `item_id`.
    pub fn citing<'a, 'input>(
        &self,
        item_id: &str,
        node: Node<'a, 'input>,
    ) -> Option<Node<'a, 'input>> {
        let id = *self.xref_targets.get(item_id)?;
        node.document().get_node(id)
    }

    /// Link target of a norm reference.
    ///
    /// Preference: the requirement containing the reference, then the
    /// nearest preceding requirement within the reference's section, then
    /// the first following one.
    pub fn norm_reference_target<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        config: &ExtractConfig,
    ) -> Option<Node<'a, 'input>> {
        if let Some(enclosing) = self.enclosing(node) {
            return Some(enclosing);
        }

        let section = find_section_context(node, &config.section_tag)?.node;
        let doc = node.document();
        let in_section: Vec<Node<'a, 'input>> = self
            .requirements
            .iter()
            .filter_map(|id| doc.get_node(*id))
            .filter(|p| is_within(*p, section))
            .collect();

        let position = in_section
            .partition_point(|p| p.id().get_usize() < node.id().get_usize());
        position
            .checked_sub(1)
            .and_then(|i| in_section.get(i))
            .or_else(|| in_section.get(position))
            .copied()
    }

    /// Link target of a table or list: the first requirement citing it by
    /// id, else the requirement containing it.
    pub fn item_target<'a, 'input>(
        &self,
        item_id: Option<&str>,
        node: Node<'a, 'input>,
    ) -> Option<Node<'a, 'input>> {
        item_id
            .and_then(|id| self.citing(id, node))
            .or_else(|| self.enclosing(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{descendants_by_tag, parse_document, text_content};

    fn text_of(node: Option<Node<'_, '_>>) -> Option<String> {
        node.map(text_content)
    }

    #[test]
    fn test_build_skips_non_requirements() {
        let xml = r#"<body>
            <sec id="s1" sec-type="scope"><p>Scope.</p></sec>
            <sec id="s2"><p>One.</p><p> </p><p>Two.</p></sec>
            <p>Loose.</p>
        </body>"#;
        let doc = parse_document(xml).unwrap();
        let index = LinkIndex::build(doc.root(), &ExtractConfig::default());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_norm_reference_inside_requirement() {
        let xml = r#"<body><sec id="s"><p>See <std>ISO 1</std>.</p><p>Other.</p></sec></body>"#;
        let doc = parse_document(xml).unwrap();
        let config = ExtractConfig::default();
        let index = LinkIndex::build(doc.root(), &config);
        let std = descendants_by_tag(doc.root(), "std").next().unwrap();

        assert_eq!(
            text_of(index.norm_reference_target(std, &config)),
            Some("See ISO 1.".to_string())
        );
    }

    #[test]
    fn test_norm_reference_prefers_preceding_then_following() {
        let xml = r#"<body><sec id="s">
            <p>First.</p><p>Second.</p>
            <non-normative-note><std>ISO 1</std></non-normative-note>
            <p>Third.</p>
        </sec><sec id="t">
            <non-normative-note><std>ISO 2</std></non-normative-note>
            <p>Fourth.</p>
        </sec><sec id="u"><title><std>ISO 3</std></title></sec></body>"#;
        let doc = parse_document(xml).unwrap();
        let config = ExtractConfig::default();
        let index = LinkIndex::build(doc.root(), &config);
        let stds: Vec<_> = descendants_by_tag(doc.root(), "std").collect();

        assert_eq!(
            text_of(index.norm_reference_target(stds[0], &config)),
            Some("Second.".to_string())
        );
        assert_eq!(
            text_of(index.norm_reference_target(stds[1], &config)),
            Some("Fourth.".to_string())
        );
        assert_eq!(index.norm_reference_target(stds[2], &config), None);
    }

    #[test]
    fn test_item_target_prefers_xref() {
        let xml = r#"<body><sec id="s">
            <p>Intro.</p>
            <p>See <xref ref-type="table" rid="tab_1">Table 1</xref>.</p>
            <p>Also <xref rid="tab_1 tab_2">Tables 1 and 2</xref>.</p>
            <table-wrap id="tab_1"/>
        </sec></body>"#;
        let doc = parse_document(xml).unwrap();
        let config = ExtractConfig::default();
        let index = LinkIndex::build(doc.root(), &config);
        let table = descendants_by_tag(doc.root(), "table-wrap").next().unwrap();

        assert_eq!(
            text_of(index.item_target(Some("tab_1"), table)),
            Some("See Table 1.".to_string())
        );
        assert_eq!(
            text_of(index.item_target(Some("tab_2"), table)),
            Some("Also Tables 1 and 2.".to_string())
        );
        assert_eq!(index.item_target(Some("tab_9"), table), None);
        assert_eq!(index.item_target(None, table), None);
    }

    #[test]
    fn test_item_target_falls_back_to_enclosing() {
        let xml = r#"<body><sec id="s">
            <p>Items:<list id="l1"><list-item><p>a</p></list-item></list></p>
        </sec></body>"#;
        let doc = parse_document(xml).unwrap();
        let config = ExtractConfig::default();
        let index = LinkIndex::build(doc.root(), &config);
        let list = descendants_by_tag(doc.root(), "list").next().unwrap();

        assert_eq!(
            text_of(index.item_target(Some("l1"), list)),
            Some("Items:a".to_string())
        );
    }
}
