//! XML utility functions for navigating and extracting data from STS trees.
//!
//! This is a thin navigation layer over `roxmltree`; no extraction logic
//! lives here.

use roxmltree::{Document, Node, ParsingOptions};
use unicode_normalization::UnicodeNormalization;

/// Namespace bound to the reserved `xml:` prefix.
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse an STS document.
///
/// STS files routinely carry a `<!DOCTYPE standard ...>` declaration, so DTDs
/// are allowed. External DTDs are never fetched.
pub fn parse_document(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Document::parse_with_options(text, options)
}

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sts_extractor::xml::get_tag_name;
///
/// let xml = r#"<standard><body>text</body></standard>"#;
/// let doc = Document::parse(xml).unwrap();
/// let body = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(body), "body");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Find the first child element with the given tag name.
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find all child elements with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sts_extractor::xml::find_children;
///
/// let xml = r#"<list><list-item/><list-item/><label/></list>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert_eq!(find_children(doc.root_element(), "list-item").count(), 2);
/// ```
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| has_tag(*child, tag))
}

/// Find a descendant element matching a path of tag names.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sts_extractor::xml::find_by_path;
///
/// let xml = r#"<front><iso-meta><std-ident><doc-number>9999</doc-number></std-ident></iso-meta></front>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let nr = find_by_path(doc.root_element(), "iso-meta/std-ident/doc-number");
/// assert_eq!(nr.and_then(|n| n.text()), Some("9999"));
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let mut current = node;
    for part in path.split('/') {
        current = find_child(current, part)?;
    }
    Some(current)
}

/// Lazily iterate over all descendants with the given tag, in document order.
///
/// The node itself is not included. Each call starts a fresh traversal.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sts_extractor::xml::descendants_by_tag;
///
/// let xml = r#"<sec><p>1</p><sec><p>2</p></sec><p>3</p></sec>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let texts: Vec<_> = descendants_by_tag(doc.root_element(), "p")
///     .filter_map(|p| p.text())
///     .collect();
/// assert_eq!(texts, ["1", "2", "3"]);
/// ```
pub fn descendants_by_tag<'a, 'input>(
    root: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    root.descendants()
        .skip(1)
        .filter(move |node| has_tag(*node, tag))
}

/// Find the first descendant with the given tag.
pub fn find_descendant<'a, 'input>(
    root: Node<'a, 'input>,
    tag: &'a str,
) -> Option<Node<'a, 'input>> {
    descendants_by_tag(root, tag).next()
}

/// Get an attribute value from a node. Missing attributes are `None`.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute(name)
}

/// Get the `xml:lang` attribute of a node.
pub fn get_lang<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute((XML_NAMESPACE, "lang"))
}

/// Walk up the parent links and return the first element with the given tag.
pub fn nearest_ancestor<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.ancestors().skip(1).find(|a| has_tag(*a, tag))
}

/// Check whether `node` lies inside `ancestor` (or is `ancestor`).
pub fn is_within<'a, 'input>(node: Node<'a, 'input>, ancestor: Node<'a, 'input>) -> bool {
    node.ancestors().any(|a| a == ancestor)
}

/// Collapse runs of whitespace to one space, trim, and normalize to NFC.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfc()
        .collect()
}

/// Text content of a subtree: every descendant text node in document order,
/// with whitespace collapsed.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sts_extractor::xml::text_content;
///
/// let xml = "<p>Widgets <italic>shall</italic>\n   be round.</p>";
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(text_content(doc.root_element()), "Widgets shall be round.");
/// ```
pub fn text_content(node: Node<'_, '_>) -> String {
    text_content_excluding::<&str>(node, &[])
}

/// Text content of a subtree, skipping the text of descendant elements whose
/// tag is listed in `exclusions`.
pub fn text_content_excluding<S: AsRef<str>>(node: Node<'_, '_>, exclusions: &[S]) -> String {
    let mut raw = String::new();
    collect_text(node, exclusions, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text<S: AsRef<str>>(node: Node<'_, '_>, exclusions: &[S], out: &mut String) {
    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                out.push_str(text);
            }
        } else if child.is_element() {
            let tag = get_tag_name(child);
            if exclusions.iter().any(|e| e.as_ref() == tag) {
                // Keep words on either side of the removed block apart.
                out.push(' ');
                continue;
            }
            collect_text(child, exclusions, out);
        }
    }
}

/// Structural path of a node, e.g. `/standard[1]/body[1]/sec[2]/p[1]`.
///
/// Indices are 1-based and count siblings with the same tag, so the path can
/// be used to find the node in the source without the markup at hand.
pub fn node_path(node: Node<'_, '_>) -> String {
    let mut segments: Vec<String> = node
        .ancestors()
        .filter(|n| n.is_element())
        .map(|n| {
            let tag = get_tag_name(n);
            let index = n
                .prev_siblings()
                .filter(|s| has_tag(*s, tag))
                .count();
            format!("{tag}[{index}]")
        })
        .collect();
    segments.reverse();
    format!("/{}", segments.join("/"))
}

/// The effective section context of a node: its nearest enclosing section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionContext<'a, 'input> {
    /// The section element itself.
    pub node: Node<'a, 'input>,
    /// The section's `id` attribute.
    pub id: Option<&'a str>,
    /// The section's category (`sec-type`, falling back to `type`).
    pub section_type: Option<&'a str>,
    /// Number of enclosing sections including this one (1 = top level).
    pub depth: usize,
    /// 1-based position among sibling sections.
    pub index: usize,
}

impl<'a, 'input> SectionContext<'a, 'input> {
    /// Build the context for a section element.
    pub fn of(section: Node<'a, 'input>) -> Self {
        let tag = get_tag_name(section);
        let depth = section.ancestors().filter(|a| has_tag(*a, tag)).count();
        let index = section
            .prev_siblings()
            .filter(|s| has_tag(*s, tag))
            .count();
        Self {
            node: section,
            id: section.attribute("id").filter(|id| !id.trim().is_empty()),
            section_type: section
                .attribute("sec-type")
                .or_else(|| section.attribute("type")),
            depth,
            index,
        }
    }

    /// The section's `id`, or a positional label when it has none.
    #[must_use]
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => format!("section at depth {}, index {}", self.depth, self.index),
        }
    }

    /// All sections enclosing this one, nearest first, including itself.
    pub fn chain(&self) -> impl Iterator<Item = SectionContext<'a, 'input>> + '_ {
        let tag = get_tag_name(self.node);
        self.node
            .ancestors()
            .filter(move |a| has_tag(*a, tag))
            .map(SectionContext::of)
    }
}

/// Find the nearest enclosing section of a node.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use sts_extractor::xml::{descendants_by_tag, find_section_context};
///
/// let xml = r#"<body><sec id="sec_1" sec-type="scope"><p>x</p></sec></body>"#;
/// let doc = Document::parse(xml).unwrap();
/// let p = descendants_by_tag(doc.root_element(), "p").next().unwrap();
///
/// let ctx = find_section_context(p, "sec").unwrap();
/// assert_eq!(ctx.id, Some("sec_1"));
/// assert_eq!(ctx.section_type, Some("scope"));
/// ```
pub fn find_section_context<'a, 'input>(
    node: Node<'a, 'input>,
    section_tag: &str,
) -> Option<SectionContext<'a, 'input>> {
    nearest_ancestor(node, section_tag).map(SectionContext::of)
}
