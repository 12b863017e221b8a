//! Document-level metadata read once per document.
//!
//! The standard designation (e.g. `ISO 9999:2020`) is taken from the
//! metadata containers in the front matter, never from citations in the
//! body, which use the same `<std-ref>` element.

use roxmltree::{Document, Node};

use crate::config::ExtractConfig;
use crate::xml::{collapse_whitespace, descendants_by_tag, find_by_path, get_tag_name, text_content};

/// Metadata shared by every row derived from one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentMetadata {
    /// Designation of the standard, upper-cased. `None` when unresolvable.
    pub standard: Option<String>,
}

impl DocumentMetadata {
    /// Read the metadata of a parsed document.
    #[must_use]
    pub fn read(doc: &Document<'_>, config: &ExtractConfig) -> Self {
        let standard = find_standard_designation(doc.root_element(), config);
        if standard.is_none() {
            tracing::warn!("No standard designation found in document metadata");
        }
        Self { standard }
    }
}

/// All metadata container elements of a document, in document order.
pub fn metadata_containers<'a, 'input>(
    root: Node<'a, 'input>,
    config: &'a ExtractConfig,
) -> impl Iterator<Item = Node<'a, 'input>> {
    root.descendants().filter(move |n| {
        n.is_element()
            && config
                .metadata_containers
                .iter()
                .any(|c| c == get_tag_name(*n))
    })
}

/// Resolve the designation of the standard.
///
/// Order of preference:
/// 1. an undated `<std-ref type="undated">`
/// 2. a dated `<std-ref type="dated">`
/// 3. the only `<std-ref>` of the national metadata
/// 4. originator, document number and part number of `<std-ident>`
pub fn find_standard_designation(root: Node<'_, '_>, config: &ExtractConfig) -> Option<String> {
    let std_refs: Vec<Node<'_, '_>> = metadata_containers(root, config)
        .flat_map(|container| descendants_by_tag(container, "std-ref"))
        .collect();

    let typed = |kind: &str| {
        std_refs
            .iter()
            .find(|n| n.attribute("type") == Some(kind))
            .map(|n| designation(*n))
            .filter(|s| !s.is_empty())
    };

    typed("undated")
        .or_else(|| typed("dated"))
        .or_else(|| single_national_ref(root, config))
        .or_else(|| from_std_ident(root, config))
}

fn designation(node: Node<'_, '_>) -> String {
    text_content(node).to_uppercase()
}

fn single_national_ref(root: Node<'_, '_>, config: &ExtractConfig) -> Option<String> {
    let nat_meta = metadata_containers(root, config).find(|n| get_tag_name(*n) == "nat-meta")?;
    let mut refs = descendants_by_tag(nat_meta, "std-ref");
    let only = refs.next()?;
    if refs.next().is_some() {
        return None;
    }
    Some(designation(only)).filter(|s| !s.is_empty())
}

fn from_std_ident(root: Node<'_, '_>, config: &ExtractConfig) -> Option<String> {
    let ident = metadata_containers(root, config)
        .find_map(|container| find_by_path(container, "std-ident"))?;
    let part = |tag: &str| {
        find_by_path(ident, tag)
            .map(text_content)
            .filter(|s| !s.is_empty())
    };

    let number = part("doc-number")?;
    let mut result = match part("originator") {
        Some(originator) => format!("{originator} {number}"),
        None => number,
    };
    if let Some(part_number) = part("part-number") {
        result.push('-');
        result.push_str(&part_number);
    }
    Some(collapse_whitespace(&result).to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_of(xml: &str) -> Option<String> {
        let doc = Document::parse(xml).unwrap();
        DocumentMetadata::read(&doc, &ExtractConfig::default()).standard
    }

    #[test]
    fn test_undated_preferred() {
        let xml = r#"<standard><front><iso-meta>
            <std-ref type="dated">ISO 9999:2020</std-ref>
            <std-ref type="undated">iso 9999</std-ref>
        </iso-meta></front></standard>"#;
        assert_eq!(standard_of(xml), Some("ISO 9999".to_string()));
    }

    #[test]
    fn test_dated_fallback() {
        let xml = r#"<standard><front><iso-meta>
            <std-ref type="dated">ISO 9999:2020</std-ref>
        </iso-meta></front></standard>"#;
        assert_eq!(standard_of(xml), Some("ISO 9999:2020".to_string()));
    }

    #[test]
    fn test_body_citations_ignored() {
        let xml = r#"<standard><front><iso-meta/></front><body><sec><p>
            <std><std-ref type="undated">ISO 1</std-ref></std>
        </p></sec></body></standard>"#;
        assert_eq!(standard_of(xml), None);
    }

    #[test]
    fn test_single_national_ref() {
        let xml = r#"<standard><front><nat-meta>
            <std-ref>nen 1010</std-ref>
        </nat-meta></front></standard>"#;
        assert_eq!(standard_of(xml), Some("NEN 1010".to_string()));
    }

    #[test]
    fn test_ambiguous_national_refs_fall_through() {
        let xml = r#"<standard><front><nat-meta>
            <std-ref>NEN 1010</std-ref><std-ref>NEN 1010/A1</std-ref>
        </nat-meta></front></standard>"#;
        assert_eq!(standard_of(xml), None);
    }

    #[test]
    fn test_std_ident_fallback() {
        let xml = r#"<standard><front><std-meta><std-ident>
            <originator>ISO</originator><doc-number>7000</doc-number><part-number>2</part-number>
        </std-ident></std-meta></front></standard>"#;
        assert_eq!(standard_of(xml), Some("ISO 7000-2".to_string()));
    }
}
