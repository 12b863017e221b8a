//! Additional-info rule: norm references, tables and lists.
//!
//! Items are gathered per section, independently of requirement exclusion,
//! and linked to at most one requirement through the [`LinkIndex`].

use roxmltree::Node;

use super::links::LinkIndex;
use super::{in_metadata, Built, ExtractionRule, RuleContext};
use crate::error::SchemaViolation;
use crate::types::{AdditionalInfoRow, AdditionalInfoType, RecordKind};
use crate::xml::{
    find_child, find_children, find_section_context, get_tag_name, nearest_ancestor, node_path,
    text_content, text_content_excluding,
};

const NORM_REFERENCE_TAG: &str = "std";
const TABLE_TAG: &str = "table-wrap";
const LIST_TAG: &str = "list";

/// `list-type` values of lists with addressable item labels.
const NUMBERED_LIST_TYPES: &[&str] = &[
    "order",
    "arabic",
    "alpha-lower",
    "alpha-upper",
    "roman-lower",
    "roman-upper",
];

/// `list-type` values of lists without addressable item labels.
const UNNUMBERED_LIST_TYPES: &[&str] = &["bullet", "dash", "simple", "none"];

/// Item labels that mark a list item without addressing it.
const BULLET_LABELS: &[&str] = &["•", "·", "*", "-", "–", "—"];

/// Separator between table cells in a table body.
const CELL_SEPARATOR: &str = " | ";

/// Rule producing the additional-info table.
#[derive(Debug, Default)]
pub struct AdditionalInfoRule {
    links: LinkIndex,
}

impl AdditionalInfoRule {
    /// The type of an item this rule accepts, if any.
    fn info_type(node: Node<'_, '_>) -> Option<AdditionalInfoType> {
        match get_tag_name(node) {
            NORM_REFERENCE_TAG => Some(AdditionalInfoType::NormReference),
            TABLE_TAG => Some(AdditionalInfoType::Table),
            LIST_TAG if is_numbered_list(node) => Some(AdditionalInfoType::NumberedList),
            LIST_TAG => Some(AdditionalInfoType::UnnumberedList),
            _ => None,
        }
    }

    fn link(&self, node: Node<'_, '_>, context: &mut RuleContext<'_>) -> Option<uuid::Uuid> {
        let target = match get_tag_name(node) {
            NORM_REFERENCE_TAG => self.links.norm_reference_target(node, context.config),
            _ => self.links.item_target(item_id(node), node),
        };
        target.map(|paragraph| context.registry.requirement_id(paragraph))
    }
}

impl ExtractionRule for AdditionalInfoRule {
    type Row = AdditionalInfoRow;

    const KIND: RecordKind = RecordKind::AdditionalInfo;

    fn prepare(&mut self, root: Node<'_, '_>, context: &RuleContext<'_>) {
        self.links = LinkIndex::build(root, context.config);
        tracing::debug!(requirements = self.links.len(), "Link index built");
    }

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        if !node.is_element() || in_metadata(node, context.config) {
            return false;
        }
        if nearest_ancestor(node, &context.config.section_tag).is_none() {
            return false;
        }

        match get_tag_name(node) {
            NORM_REFERENCE_TAG => true,
            // Nested tables and lists are part of the enclosing item's body.
            TABLE_TAG => nearest_ancestor(node, TABLE_TAG).is_none(),
            LIST_TAG => {
                nearest_ancestor(node, LIST_TAG).is_none()
                    && nearest_ancestor(node, TABLE_TAG).is_none()
            }
            _ => false,
        }
    }

    fn build(
        &mut self,
        node: Node<'_, '_>,
        context: &mut RuleContext<'_>,
    ) -> Vec<Built<AdditionalInfoRow>> {
        let Some(info_type) = Self::info_type(node) else {
            return Vec::new();
        };
        let Some(standard_id) = context.metadata.standard.clone() else {
            return vec![Err(SchemaViolation::new(node_path(node), "StandardID"))];
        };

        let req_uuid = self.link(node, context);

        if info_type == AdditionalInfoType::NormReference {
            return vec![Ok(AdditionalInfoRow::norm_reference(req_uuid, standard_id))];
        }

        let section_id = find_section_context(node, &context.config.section_tag)
            .map(|s| s.label())
            .unwrap_or_default();
        let body = match info_type {
            AdditionalInfoType::Table => table_body(node),
            _ => list_body(node),
        };

        vec![Ok(AdditionalInfoRow {
            req_uuid,
            info_type,
            info_uuid: Some(context.registry.mint_info_id()),
            standard_id,
            section_id,
            id: item_id(node).unwrap_or_default().to_string(),
            body,
        })]
    }
}

fn item_id<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute("id").map(str::trim).filter(|id| !id.is_empty())
}

/// Whether a list's items carry addressable labels.
///
/// An explicit `list-type` decides; otherwise the list is numbered when
/// every item has a label and none of them is a bullet or dash.
pub(crate) fn is_numbered_list(list: Node<'_, '_>) -> bool {
    if let Some(list_type) = list.attribute("list-type").map(str::trim) {
        if NUMBERED_LIST_TYPES.contains(&list_type) {
            return true;
        }
        if UNNUMBERED_LIST_TYPES.contains(&list_type) {
            return false;
        }
    }

    let mut items = find_children(list, "list-item").peekable();
    if items.peek().is_none() {
        return false;
    }

    items.all(|item| {
        let label = find_child(item, "label").map(text_content).unwrap_or_default();
        !label.is_empty() && !BULLET_LABELS.contains(&label.as_str())
    })
}

/// Plain-text dump of a table: title line, one line per row, footnotes.
fn table_body(table: Node<'_, '_>) -> String {
    let mut lines = Vec::new();

    let title = [find_child(table, "label"), find_child(table, "caption")]
        .into_iter()
        .flatten()
        .map(text_content)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !title.is_empty() {
        lines.push(title);
    }

    for row in table.descendants().filter(|n| n.is_element() && get_tag_name(*n) == "tr") {
        let cells: Vec<String> = row
            .children()
            .filter(|c| c.is_element() && matches!(get_tag_name(*c), "td" | "th"))
            .map(text_content)
            .collect();
        if cells.iter().any(|c| !c.is_empty()) {
            lines.push(cells.join(CELL_SEPARATOR));
        }
    }

    if let Some(foot) = find_child(table, "table-wrap-foot") {
        let text = text_content(foot);
        if !text.is_empty() {
            lines.push(text);
        }
    }

    lines.join("\n")
}

/// Plain-text dump of a list: one line per item, nested lists indented.
fn list_body(list: Node<'_, '_>) -> String {
    let mut lines = Vec::new();
    render_list(list, 0, &mut lines);
    lines.join("\n")
}

fn render_list(list: Node<'_, '_>, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);

    for item in find_children(list, "list-item") {
        let label = find_child(item, "label").map(text_content).unwrap_or_default();
        let text = text_content_excluding(item, &["label", LIST_TAG]);
        let line = match (label.is_empty(), text.is_empty()) {
            (false, false) => format!("{indent}{label} {text}"),
            (false, true) => format!("{indent}{label}"),
            _ => format!("{indent}{text}"),
        };
        if !line.trim().is_empty() {
            lines.push(line);
        }

        let nested = item
            .descendants()
            .skip(1)
            .filter(|n| n.is_element() && get_tag_name(*n) == LIST_TAG)
            .filter(|n| nearest_ancestor(*n, LIST_TAG) == Some(list));
        for sublist in nested {
            render_list(sublist, depth + 1, lines);
        }
    }
}
