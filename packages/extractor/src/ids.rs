//! Identifier registry scoped to the processing of one document.
//!
//! Every processor that runs over the same document receives the same
//! registry, so a requirement paragraph resolves to the same `Req_UUID`
//! whichever processor reaches it first. A registry is created when a
//! document's processing starts and dropped when it ends; it refuses to be
//! used for another document.

use std::collections::HashMap;

use roxmltree::{Node, NodeId};
use uuid::Uuid;

use crate::error::{ExtractError, Result};

/// Registry of identifiers minted while processing one document.
#[derive(Debug)]
pub struct IdRegistry {
    /// Identity of the document this registry belongs to.
    document: String,
    /// Requirement identifiers keyed by paragraph node.
    requirements: HashMap<NodeId, Uuid>,
    /// Number of additional-info identifiers minted.
    info_count: usize,
}

impl IdRegistry {
    /// Create a registry for a document.
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            requirements: HashMap::new(),
            info_count: 0,
        }
    }

    /// The document this registry belongs to.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Fail unless this registry belongs to `document`.
    pub fn ensure_document(&self, document: &str) -> Result<()> {
        if self.document == document {
            Ok(())
        } else {
            Err(ExtractError::RegistryMismatch {
                expected: self.document.clone(),
                found: document.to_string(),
            })
        }
    }

    /// The `Req_UUID` of a requirement paragraph, minting it on first use.
    ///
    /// Node ids are stable for identical input, so processors that parse the
    /// same source independently resolve the same paragraph to the same id.
    pub fn requirement_id(&mut self, paragraph: Node<'_, '_>) -> Uuid {
        *self
            .requirements
            .entry(paragraph.id())
            .or_insert_with(Uuid::new_v4)
    }

    /// Mint an identifier for an additional-info item.
    pub fn mint_info_id(&mut self) -> Uuid {
        self.info_count += 1;
        Uuid::new_v4()
    }

    /// Number of requirement identifiers minted so far.
    #[must_use]
    pub fn requirement_count(&self) -> usize {
        self.requirements.len()
    }

    /// Number of additional-info identifiers minted so far.
    #[must_use]
    pub fn info_count(&self) -> usize {
        self.info_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_requirement_id_is_stable_within_registry() {
        let doc = Document::parse("<sec><p>a</p><p>b</p></sec>").unwrap();
        let mut paragraphs = doc.root_element().children().filter(|n| n.is_element());
        let (p1, p2) = (paragraphs.next().unwrap(), paragraphs.next().unwrap());

        let mut registry = IdRegistry::new("doc.xml");
        let first = registry.requirement_id(p1);
        assert_eq!(registry.requirement_id(p1), first);
        assert_ne!(registry.requirement_id(p2), first);
        assert_eq!(registry.requirement_count(), 2);
    }

    #[test]
    fn test_same_node_across_parses() {
        let xml = "<sec><p>a</p></sec>";
        let first_parse = Document::parse(xml).unwrap();
        let second_parse = Document::parse(xml).unwrap();
        let p1 = first_parse.root_element().first_element_child().unwrap();
        let p2 = second_parse.root_element().first_element_child().unwrap();

        let mut registry = IdRegistry::new("doc.xml");
        let id = registry.requirement_id(p1);
        assert_eq!(registry.requirement_id(p2), id);
        assert_eq!(registry.requirement_count(), 1);
    }

    #[test]
    fn test_fresh_registries_never_share_ids() {
        let doc = Document::parse("<p>a</p>").unwrap();
        let p = doc.root_element();

        let first = IdRegistry::new("doc.xml").requirement_id(p);
        let second = IdRegistry::new("doc.xml").requirement_id(p);
        assert_ne!(first, second);
    }

    #[test]
    fn test_ensure_document() {
        let registry = IdRegistry::new("a.xml");
        assert!(registry.ensure_document("a.xml").is_ok());
        assert!(matches!(
            registry.ensure_document("b.xml"),
            Err(ExtractError::RegistryMismatch { .. })
        ));
    }

    #[test]
    fn test_mint_info_id() {
        let mut registry = IdRegistry::new("a.xml");
        assert_ne!(registry.mint_info_id(), registry.mint_info_id());
        assert_eq!(registry.info_count(), 2);
        assert_eq!(registry.requirement_count(), 0);
    }
}
