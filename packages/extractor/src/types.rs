//! Core data types: the record kinds and the rows of every output table.
//!
//! Column order of each table is the field order of its row struct; the
//! `COLUMNS` constant repeats it for header writing and must stay in sync.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

/// A row of an output table.
pub trait TableRow: Serialize {
    /// Column names in declared order.
    const COLUMNS: &'static [&'static str];
}

/// The closed set of record kinds the extractor can produce.
///
/// Declaration order is processing order: requirements are extracted before
/// the additional information that links to them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum RecordKind {
    /// Requirement paragraphs.
    Requirements,
    /// Norm references, tables and lists linked to requirements.
    AdditionalInfo,
    /// Identification metadata of the standard, one row per document.
    Standards,
    /// Structural divisions of the body.
    Sections,
    /// ICS classification codes.
    Ics,
    /// Responsible committees.
    Committees,
    /// Terminological entries (TBX).
    Terms,
    /// Publication, release and meta dates.
    Dates,
    /// Bibliographic references to other standards.
    References,
    /// Document titles per language.
    Titles,
}

impl RecordKind {
    /// Default file name of the table for this kind.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Requirements => "requirements.csv",
            Self::AdditionalInfo => "additional_info.csv",
            Self::Standards => "standards.csv",
            Self::Sections => "sections.csv",
            Self::Ics => "ics.csv",
            Self::Committees => "committees.csv",
            Self::Terms => "terms.csv",
            Self::Dates => "dates.csv",
            Self::References => "references.csv",
            Self::Titles => "titles.csv",
        }
    }

    /// Column schema of the table for this kind.
    #[must_use]
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Requirements => RequirementRow::COLUMNS,
            Self::AdditionalInfo => AdditionalInfoRow::COLUMNS,
            Self::Standards => StandardRow::COLUMNS,
            Self::Sections => SectionRow::COLUMNS,
            Self::Ics => IcsRow::COLUMNS,
            Self::Committees => CommitteeRow::COLUMNS,
            Self::Terms => TermRow::COLUMNS,
            Self::Dates => DateRow::COLUMNS,
            Self::References => ReferenceRow::COLUMNS,
            Self::Titles => TitleRow::COLUMNS,
        }
    }
}

/// Kind of supplementary content linked to a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdditionalInfoType {
    /// Citation of an external standard.
    NormReference,
    /// A `<table-wrap>`.
    Table,
    /// A list whose items carry addressable labels.
    NumberedList,
    /// A bulleted, dashed or unlabelled list.
    UnnumberedList,
}

/// One requirement paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementRow {
    #[serde(rename = "Req_UUID")]
    pub req_uuid: Uuid,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Standard")]
    pub standard: String,
    #[serde(rename = "Section")]
    pub section: String,
}

impl TableRow for RequirementRow {
    const COLUMNS: &'static [&'static str] = &["Req_UUID", "Text", "Standard", "Section"];
}

/// One item of supplementary content.
///
/// For norm references only `req_uuid`, `info_type` and `standard_id` are
/// populated; use [`AdditionalInfoRow::norm_reference`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionalInfoRow {
    #[serde(rename = "Req_UUID")]
    pub req_uuid: Option<Uuid>,
    #[serde(rename = "AdditionalInfo_Type")]
    pub info_type: AdditionalInfoType,
    #[serde(rename = "AdditionalInfo_UUID")]
    pub info_uuid: Option<Uuid>,
    #[serde(rename = "StandardID")]
    pub standard_id: String,
    #[serde(rename = "SectionID")]
    pub section_id: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "AdditionalInfo_Body")]
    pub body: String,
}

impl AdditionalInfoRow {
    /// A norm reference row: everything except the link and standard is empty.
    #[must_use]
    pub fn norm_reference(req_uuid: Option<Uuid>, standard_id: impl Into<String>) -> Self {
        Self {
            req_uuid,
            info_type: AdditionalInfoType::NormReference,
            info_uuid: None,
            standard_id: standard_id.into(),
            section_id: String::new(),
            id: String::new(),
            body: String::new(),
        }
    }
}

impl TableRow for AdditionalInfoRow {
    const COLUMNS: &'static [&'static str] = &[
        "Req_UUID",
        "AdditionalInfo_Type",
        "AdditionalInfo_UUID",
        "StandardID",
        "SectionID",
        "ID",
        "AdditionalInfo_Body",
    ];
}

/// Identification metadata of a standard.
///
/// Each value is the first occurrence of its element in the metadata
/// containers; references are upper-cased and dates normalized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StandardRow {
    pub id: String,
    pub ref_dated: Option<String>,
    pub ref_undated: Option<String>,
    pub doc_ref: Option<String>,
    pub rel_date: Option<String>,
    pub secretariat: Option<String>,
    pub sdo: Option<String>,
    pub proj_id: Option<String>,
    pub doc_lang: Option<String>,
    pub rel_version: Option<String>,
    pub urn: Option<String>,
    pub originator: Option<String>,
    pub doc_type: Option<String>,
    pub doc_nr: Option<String>,
    pub part_nr: Option<String>,
    pub edition: Option<String>,
    pub version: Option<String>,
    pub year: Option<String>,
    pub pub_date: Option<String>,
    pub content_language: Option<String>,
}

impl TableRow for StandardRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "ref_dated",
        "ref_undated",
        "doc_ref",
        "rel_date",
        "secretariat",
        "sdo",
        "proj_id",
        "doc_lang",
        "rel_version",
        "urn",
        "originator",
        "doc_type",
        "doc_nr",
        "part_nr",
        "edition",
        "version",
        "year",
        "pub_date",
        "content_language",
    ];
}

/// A section of the body with its flattened text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRow {
    pub id: String,
    /// Same label as the `Section` column of the requirement table.
    pub section_id: String,
    pub section_type: Option<String>,
    pub section: String,
}

impl TableRow for SectionRow {
    const COLUMNS: &'static [&'static str] = &["id", "section_id", "section_type", "section"];
}

/// An ICS classification code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IcsRow {
    pub id: String,
    pub ics: String,
}

impl TableRow for IcsRow {
    const COLUMNS: &'static [&'static str] = &["id", "ics"];
}

/// A committee responsible for the standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitteeRow {
    pub id: String,
    /// Nesting depth inside `<comm-ref-group>`; empty for ungrouped refs.
    pub level: Option<usize>,
    pub committee: String,
}

impl TableRow for CommitteeRow {
    const COLUMNS: &'static [&'static str] = &["id", "level", "committee"];
}

/// A terminological entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermRow {
    pub id: String,
    pub tds_id: Option<String>,
    pub label: Option<String>,
    pub note: Option<String>,
    pub lang: Option<String>,
    pub definition: Option<String>,
    pub source: Option<String>,
    pub term_id: Option<String>,
    pub term: String,
    pub pos: Option<String>,
    pub norm_auth: Option<String>,
}

impl TableRow for TermRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tds_id",
        "label",
        "note",
        "lang",
        "definition",
        "source",
        "term_id",
        "term",
        "pos",
        "norm_auth",
    ];
}

/// A dated event in the life of the standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRow {
    pub id: String,
    pub date_type: String,
    pub date_val: Option<String>,
}

impl TableRow for DateRow {
    const COLUMNS: &'static [&'static str] = &["id", "date_type", "date_val"];
}

/// A bibliographic reference to another standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRow {
    pub id: String,
    pub content_type: Option<String>,
    pub std_type: Option<String>,
    pub std_id: Option<String>,
    pub std_ref_type: Option<String>,
    pub std_ref: String,
    /// Number of text nodes in the document mentioning `std_ref`.
    pub count: usize,
}

impl TableRow for ReferenceRow {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "content_type",
        "std_type",
        "std_id",
        "std_ref_type",
        "std_ref",
        "count",
    ];
}

/// The title of the standard in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleRow {
    pub id: String,
    pub lang: Option<String>,
    pub intro: Option<String>,
    pub main: String,
    pub compl: Option<String>,
    pub full: Option<String>,
}

impl TableRow for TitleRow {
    const COLUMNS: &'static [&'static str] = &["id", "lang", "intro", "main", "compl", "full"];
}
