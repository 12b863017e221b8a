//! Rules over the front-matter metadata: ICS codes, committees, dates and
//! titles.
//!
//! Each produces rows keyed by the document's job id.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use roxmltree::Node;

use super::{in_metadata, Built, ExtractionRule, RuleContext};
use crate::error::SchemaViolation;
use crate::types::{CommitteeRow, DateRow, IcsRow, RecordKind, TitleRow};
use crate::xml::{find_child, get_attribute, get_lang, has_tag, node_path, text_content};

/// Calendar date, with or without separators: `YYYY-MM-DD` or `YYYYMMDD`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})$").expect("valid regex")
});

/// ICS classification codes.
#[derive(Debug, Default)]
pub struct IcsRule;

impl ExtractionRule for IcsRule {
    type Row = IcsRow;

    const KIND: RecordKind = RecordKind::Ics;

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        has_tag(node, "ics") && in_metadata(node, context.config)
    }

    fn build(&mut self, node: Node<'_, '_>, context: &mut RuleContext<'_>) -> Vec<Built<IcsRow>> {
        let ics = text_content(node);
        if ics.is_empty() {
            return Vec::new();
        }
        vec![Ok(IcsRow {
            id: context.job_id.to_string(),
            ics,
        })]
    }
}

/// Committees responsible for the standard.
///
/// NISO STS nests committees in `<comm-ref-group>`; the nesting depth is the
/// committee's level. Ungrouped committees have no level.
#[derive(Debug, Default)]
pub struct CommitteeRule;

impl ExtractionRule for CommitteeRule {
    type Row = CommitteeRow;

    const KIND: RecordKind = RecordKind::Committees;

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        has_tag(node, "comm-ref") && in_metadata(node, context.config)
    }

    fn build(
        &mut self,
        node: Node<'_, '_>,
        context: &mut RuleContext<'_>,
    ) -> Vec<Built<CommitteeRow>> {
        let committee = text_content(node);
        if committee.is_empty() {
            return vec![Err(SchemaViolation::new(node_path(node), "committee"))];
        }

        let depth = node
            .ancestors()
            .filter(|a| has_tag(*a, "comm-ref-group"))
            .count();

        vec![Ok(CommitteeRow {
            id: context.job_id.to_string(),
            level: (depth > 0).then_some(depth),
            committee,
        })]
    }
}

/// Publication, release and other dated events.
#[derive(Debug, Default)]
pub struct DateRule;

impl DateRule {
    fn date_type(node: Node<'_, '_>) -> Option<String> {
        match node.tag_name().name() {
            "pub-date" => Some("publication".to_string()),
            "release-date" => Some("release".to_string()),
            _ => get_attribute(node, "type")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_uppercase),
        }
    }
}

impl ExtractionRule for DateRule {
    type Row = DateRow;

    const KIND: RecordKind = RecordKind::Dates;

    fn qualifies(&self, node: Node<'_, '_>, context: &RuleContext<'_>) -> bool {
        node.is_element()
            && matches!(
                node.tag_name().name(),
                "pub-date" | "release-date" | "meta-date"
            )
            && in_metadata(node, context.config)
    }

    fn build(&mut self, node: Node<'_, '_>, context: &mut RuleContext<'_>) -> Vec<Built<DateRow>> {
        let Some(date_type) = Self::date_type(node) else {
            return vec![Err(SchemaViolation::new(node_path(node), "date_type"))];
        };

        vec![Ok(DateRow {
            id: context.job_id.to_string(),
            date_type,
            date_val: normalize_date(&text_content(node)),
        })]
    }
}

/// Normalize a date to `YYYY-MM-DD`.
///
/// Compact `YYYYMMDD` dates are expanded; anything that is not a calendar
/// date (a year, free text) is passed through unchanged. Blank is `None`.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_PATTERN
        .captures(value)
        .and_then(|caps| {
            let year = caps[1].parse().ok()?;
            let month = caps[2].parse().ok()?;
            let day = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .map(|date| date.format("%Y-%m-%d").to_string())
        .or_else(|| Some(value.to_string()))
}

/// Titles of the standard, one row per language.
#[derive(Debug, Default)]
pub struct TitleRule;

impl ExtractionRule for TitleRule {
    type Row = TitleRow;

    const KIND: RecordKind = RecordKind::Titles;

    fn qualifies(&self, node: Node<'_, '_>, _context: &RuleContext<'_>) -> bool {
        has_tag(node, "title-wrap")
    }

    fn build(&mut self, node: Node<'_, '_>, context: &mut RuleContext<'_>) -> Vec<Built<TitleRow>> {
        let part = |tag: &str| {
            find_child(node, tag)
                .map(text_content)
                .filter(|s| !s.is_empty())
        };

        let Some(main) = part("main") else {
            return vec![Err(SchemaViolation::new(node_path(node), "main"))];
        };

        vec![Ok(TitleRow {
            id: context.job_id.to_string(),
            lang: get_lang(node).map(String::from),
            intro: part("intro"),
            main,
            compl: part("compl"),
            full: part("full"),
        })]
    }
}
