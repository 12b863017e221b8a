//! Terminological entries.
//!
//! ISO STS embeds TBX (`tbx:langSet`/`tbx:tig`); NISO STS uses the newer
//! names `tbx:langSec`/`tbx:termSec`. Both are matched by local name.

use roxmltree::Node;

use super::{Built, ExtractionRule, RuleContext};
use crate::error::SchemaViolation;
use crate::types::{RecordKind, TermRow};
use crate::xml::{
    find_child, find_descendant, get_lang, get_tag_name, nearest_ancestor, node_path, text_content,
};

const LANGUAGE_SET_TAGS: &[&str] = &["langSet", "langSec"];
const TERM_GROUP_TAGS: &[&str] = &["tig", "termSec"];

/// Rule producing one row per term of a term entry's language section.
#[derive(Debug, Default)]
pub struct TermRule;

impl ExtractionRule for TermRule {
    type Row = TermRow;

    const KIND: RecordKind = RecordKind::Terms;

    fn qualifies(&self, node: Node<'_, '_>, _context: &RuleContext<'_>) -> bool {
        node.is_element()
            && LANGUAGE_SET_TAGS.contains(&get_tag_name(node))
            && nearest_ancestor(node, "term-sec").is_some()
    }

    fn build(&mut self, node: Node<'_, '_>, context: &mut RuleContext<'_>) -> Vec<Built<TermRow>> {
        let term_sec = nearest_ancestor(node, "term-sec");
        let tds_id = term_sec.and_then(|s| s.attribute("id")).map(String::from);
        let label = term_sec
            .and_then(|s| find_child(s, "label"))
            .map(text_content)
            .filter(|s| !s.is_empty());

        let definition_node = find_descendant(node, "definition");
        let definition = definition_node.map(text_content).filter(|s| !s.is_empty());
        let source = definition_node
            .and_then(|d| find_descendant(d, "std-ref"))
            .map(text_content)
            .filter(|s| !s.is_empty());
        let note = find_descendant(node, "note")
            .map(text_content)
            .filter(|s| !s.is_empty());
        let lang = get_lang(node).map(String::from);

        node.children()
            .filter(|c| c.is_element() && TERM_GROUP_TAGS.contains(&get_tag_name(*c)))
            .map(|group| -> Built<TermRow> {
                let term = find_descendant(group, "term")
                    .map(text_content)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| SchemaViolation::new(node_path(group), "term"))?;

                Ok(TermRow {
                    id: context.job_id.to_string(),
                    tds_id: tds_id.clone(),
                    label: label.clone(),
                    note: note.clone(),
                    lang: lang.clone(),
                    definition: definition.clone(),
                    source: source.clone(),
                    term_id: group.attribute("id").map(String::from),
                    term,
                    pos: term_property(group, "partOfSpeech"),
                    norm_auth: term_property(group, "normativeAuthorization"),
                })
            })
            .collect()
    }
}

/// A TBX term property: the `value` attribute, or the element text.
fn term_property(group: Node<'_, '_>, tag: &'static str) -> Option<String> {
    let node = find_descendant(group, tag)?;
    node.attribute("value")
        .map(|v| v.trim().to_string())
        .or_else(|| Some(text_content(node)))
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;
    use crate::rules::test_support::run;
    use pretty_assertions::assert_eq;

    const ISO_TERMS: &str = r#"<standard xmlns:tbx="urn:iso:std:iso:30042:ed-1"><body>
        <sec id="sec_3" sec-type="terms">
          <term-sec id="sec_3.1"><label>3.1</label>
            <tbx:termEntry id="term_3.1">
              <tbx:langSet xml:lang="en">
                <tbx:definition>round object used in
                  <std><std-ref>ISO 1</std-ref></std></tbx:definition>
                <tbx:note>Widgets are often blue.</tbx:note>
                <tbx:tig id="tig_1">
                  <tbx:term>widget</tbx:term>
                  <tbx:partOfSpeech value="noun"/>
                  <tbx:normativeAuthorization value="preferredTerm"/>
                </tbx:tig>
                <tbx:tig id="tig_2"><tbx:term>gadget</tbx:term></tbx:tig>
              </tbx:langSet>
              <tbx:langSet xml:lang="fr"><tbx:definition>objet rond</tbx:definition></tbx:langSet>
            </tbx:termEntry>
          </term-sec>
        </sec></body></standard>"#;

    #[test]
    fn test_one_row_per_term() {
        let (extraction, _) = run(&mut TermRule, ISO_TERMS, &ExtractConfig::default());
        assert_eq!(extraction.rows.len(), 2);

        let widget = &extraction.rows[0];
        assert_eq!(widget.id, "test");
        assert_eq!(widget.tds_id.as_deref(), Some("sec_3.1"));
        assert_eq!(widget.label.as_deref(), Some("3.1"));
        assert_eq!(widget.lang.as_deref(), Some("en"));
        assert_eq!(widget.definition.as_deref(), Some("round object used in ISO 1"));
        assert_eq!(widget.source.as_deref(), Some("ISO 1"));
        assert_eq!(widget.note.as_deref(), Some("Widgets are often blue."));
        assert_eq!(widget.term_id.as_deref(), Some("tig_1"));
        assert_eq!(widget.term, "widget");
        assert_eq!(widget.pos.as_deref(), Some("noun"));
        assert_eq!(widget.norm_auth.as_deref(), Some("preferredTerm"));

        let gadget = &extraction.rows[1];
        assert_eq!(gadget.term, "gadget");
        assert_eq!(gadget.pos, None);
        assert_eq!(gadget.definition, widget.definition);
    }

    #[test]
    fn test_niso_names() {
        let xml = r#"<standard xmlns:tbx="urn:iso:std:iso:30042:ed-2"><body><sec>
          <term-sec id="ts"><tbx:termEntry>
            <tbx:langSec xml:lang="en"><tbx:termSec>
              <tbx:term>sprocket</tbx:term><tbx:partOfSpeech>noun</tbx:partOfSpeech>
            </tbx:termSec></tbx:langSec>
          </tbx:termEntry></term-sec></sec></body></standard>"#;
        let (extraction, _) = run(&mut TermRule, xml, &ExtractConfig::default());

        assert_eq!(extraction.rows.len(), 1);
        assert_eq!(extraction.rows[0].term, "sprocket");
        assert_eq!(extraction.rows[0].pos.as_deref(), Some("noun"));
    }

    #[test]
    fn test_empty_term_is_a_violation() {
        let xml = r#"<standard xmlns:tbx="urn:iso:std:iso:30042:ed-1"><term-sec>
            <tbx:langSet><tbx:tig><tbx:term> </tbx:term></tbx:tig></tbx:langSet>
            </term-sec></standard>"#;
        let (extraction, _) = run(&mut TermRule, xml, &ExtractConfig::default());
        assert!(extraction.rows.is_empty());
        assert_eq!(extraction.violations[0].field, "term");
    }
}
