//! Sections of the body with their flattened text.

use roxmltree::Node;

use super::{in_metadata, Built, ExtractionRule, RuleContext};
use crate::types::{RecordKind, SectionRow};
use crate::xml::{has_tag, text_content, SectionContext};

/// Rule producing one row per section, nested sections included.
#[derive(Debug, Default)]
pub struct SectionRule;

impl ExtractionRule for SectionRule {
    type Row = SectionRow;

    const KIND: RecordKind = RecordKind::Sections;

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        has_tag(node, &context.config.section_tag) && !in_metadata(node, context.config)
    }

    fn build(
        &mut self,
        node: Node<'_, '_>,
        context: &mut RuleContext<'_>,
    ) -> Vec<Built<SectionRow>> {
        let section = SectionContext::of(node);
        vec![Ok(SectionRow {
            id: context.job_id.to_string(),
            section_id: section.label(),
            section_type: section.section_type.map(String::from),
            section: text_content(node),
        })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractConfig;
    use crate::rules::test_support::run;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sections_in_document_order() {
        let xml = r#"<standard><body>
            <sec id="sec_1" sec-type="scope">
                <title>Scope</title>
                <p>Widgets.</p>
            </sec>
            <sec id="sec_2">
                <title>Requirements</title>
                <sec>
                    <title>Surface</title>
                    <p>Smooth.</p>
                </sec>
            </sec>
        </body></standard>"#;
        let (extraction, _) = run(&mut SectionRule, xml, &ExtractConfig::default());

        let rows: Vec<_> = extraction
            .rows
            .iter()
            .map(|r| (r.section_id.as_str(), r.section_type.as_deref(), r.section.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("sec_1", Some("scope"), "Scope Widgets."),
                ("sec_2", None, "Requirements Surface Smooth."),
                ("section at depth 2, index 1", None, "Surface Smooth."),
            ]
        );
    }
}
