//! Processor: one record kind over one document.
//!
//! A processor walks `Idle -> Reading -> Extracting -> Writing -> Done` once.
//! Parse failures (while `Reading`) and sink failures (while `Writing`) end
//! in `Failed`. Rows are built completely before the first one is written,
//! so a failure before `Writing` leaves the sink untouched. A failure while
//! `Writing` leaves the rows already written in place.

use std::fs;
use std::path::Path;

use strum::Display;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result, SchemaViolation};
use crate::ids::IdRegistry;
use crate::metadata::DocumentMetadata;
use crate::rules::{
    extract, AdditionalInfoRule, CommitteeRule, DateRule, ExtractionRule, IcsRule,
    ReferenceRule, RequirementRule, RuleContext, SectionRule, StandardRule, TermRule, TitleRule,
};
use crate::table::RowSink;
use crate::types::RecordKind;
use crate::xml::parse_document;

/// Lifecycle state of a [`Processor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProcessorState {
    Idle,
    Reading,
    Extracting,
    Writing,
    Done,
    Failed,
}

/// A document's text together with its identity.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    /// Identity used in diagnostics and for registry scoping.
    pub name: String,
    /// Job id written into the supplementary tables.
    pub job_id: String,
    /// The XML text, decoded as UTF-8.
    pub text: String,
}

impl DocumentSource {
    pub fn new(name: impl Into<String>, job_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_id: job_id.into(),
            text: text.into(),
        }
    }

    /// Read a document from disk. The job id is the file stem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let job_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(path.display().to_string(), job_id, text))
    }
}

/// Outcome of one successful [`Processor::process`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    pub kind: RecordKind,
    pub rows_written: usize,
    /// Records dropped for missing required fields.
    pub violations: Vec<SchemaViolation>,
    /// Candidates removed by the exclusion predicate.
    pub excluded: usize,
}

/// Drives one rule over one document into one sink.
#[derive(Debug)]
pub struct Processor<'c, R: ExtractionRule> {
    rule: R,
    config: &'c ExtractConfig,
    state: ProcessorState,
}

impl<'c, R: ExtractionRule> Processor<'c, R> {
    pub fn new(rule: R, config: &'c ExtractConfig) -> Self {
        Self {
            rule,
            config,
            state: ProcessorState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> ProcessorState {
        self.state
    }

    fn transition(&mut self, next: ProcessorState) {
        tracing::debug!(kind = %R::KIND, from = %self.state, to = %next, "Processor state change");
        self.state = next;
    }

    fn fail(&mut self, error: ExtractError) -> ExtractError {
        self.transition(ProcessorState::Failed);
        error
    }

    /// Extract this processor's record kind from `source` and write the rows
    /// to `sink`.
    ///
    /// # Errors
    /// - `ProcessorReused` if called a second time
    /// - `RegistryMismatch` if `registry` belongs to another document
    /// - `MalformedDocument` if the source does not parse; nothing is written
    /// - `SinkFailure` if the sink rejects a row
    #[tracing::instrument(skip_all, fields(kind = %R::KIND, document = %source.name))]
    pub fn process<S: RowSink>(
        &mut self,
        source: &DocumentSource,
        registry: &mut IdRegistry,
        sink: &mut S,
    ) -> Result<ProcessReport> {
        if self.state != ProcessorState::Idle {
            return Err(ExtractError::ProcessorReused {
                state: self.state.to_string(),
            });
        }
        registry.ensure_document(&source.name)?;

        self.transition(ProcessorState::Reading);
        let doc = match parse_document(&source.text) {
            Ok(doc) => doc,
            Err(source_error) => {
                return Err(self.fail(ExtractError::MalformedDocument {
                    document: source.name.clone(),
                    source: source_error,
                }))
            }
        };
        let metadata = DocumentMetadata::read(&doc, self.config);

        self.transition(ProcessorState::Extracting);
        let extraction = {
            let mut context = RuleContext {
                document: &source.name,
                job_id: &source.job_id,
                config: self.config,
                metadata: &metadata,
                registry,
            };
            extract(&mut self.rule, doc.root(), &mut context)
        };

        for violation in &extraction.violations {
            let error = violation.clone().into_error(source.name.as_str());
            tracing::warn!(error = %error, "Record dropped");
        }

        self.transition(ProcessorState::Writing);
        for row in &extraction.rows {
            if let Err(e) = sink.write_row(row) {
                return Err(self.fail(ExtractError::SinkFailure {
                    document: source.name.clone(),
                    source: e,
                }));
            }
        }
        if let Err(e) = sink.flush() {
            return Err(self.fail(ExtractError::SinkFailure {
                document: source.name.clone(),
                source: e,
            }));
        }

        self.transition(ProcessorState::Done);
        Ok(ProcessReport {
            kind: R::KIND,
            rows_written: extraction.rows.len(),
            violations: extraction.violations,
            excluded: extraction.excluded,
        })
    }
}

/// Run a fresh processor for `kind`.
pub fn process_kind<S: RowSink>(
    kind: RecordKind,
    source: &DocumentSource,
    config: &ExtractConfig,
    registry: &mut IdRegistry,
    sink: &mut S,
) -> Result<ProcessReport> {
    match kind {
        RecordKind::Requirements => {
            Processor::new(RequirementRule, config).process(source, registry, sink)
        }
        RecordKind::AdditionalInfo => {
            Processor::new(AdditionalInfoRule::default(), config).process(source, registry, sink)
        }
        RecordKind::Standards => {
            Processor::new(StandardRule::default(), config).process(source, registry, sink)
        }
        RecordKind::Sections => {
            Processor::new(SectionRule, config).process(source, registry, sink)
        }
        RecordKind::Ics => Processor::new(IcsRule, config).process(source, registry, sink),
        RecordKind::Committees => {
            Processor::new(CommitteeRule, config).process(source, registry, sink)
        }
        RecordKind::Terms => Processor::new(TermRule, config).process(source, registry, sink),
        RecordKind::Dates => Processor::new(DateRule, config).process(source, registry, sink),
        RecordKind::References => {
            Processor::new(ReferenceRule::default(), config).process(source, registry, sink)
        }
        RecordKind::Titles => Processor::new(TitleRule, config).process(source, registry, sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CsvSink;
    use crate::types::{AdditionalInfoRow, TableRow};

    const DOC: &str = r#"<!DOCTYPE standard PUBLIC "-//ISO//DTD ISOSTS v1.1//EN" "ISOSTS.dtd">
<standard>
  <front><iso-meta><std-ref type="undated">ISO 9999</std-ref></iso-meta></front>
  <body>
    <sec id="sec_1" sec-type="normal">
      <p>Widgets shall be round. see Table <xref ref-type="table" rid="tab_1">tab_1</xref></p>
      <table-wrap id="tab_1"><table><tr><td>r</td></tr></table></table-wrap>
    </sec>
  </body>
</standard>"#;

    fn source(text: &str) -> DocumentSource {
        DocumentSource::new("doc.xml", "doc", text)
    }

    /// Sink that fails once `limit` rows have been written.
    struct FailingSink {
        written: usize,
        limit: usize,
    }

    impl RowSink for FailingSink {
        fn write_row<R: TableRow>(&mut self, _row: &R) -> std::result::Result<(), csv::Error> {
            if self.written == self.limit {
                return Err(csv::Error::from(std::io::Error::other("disk full")));
            }
            self.written += 1;
            Ok(())
        }

        fn flush(&mut self) -> std::result::Result<(), csv::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_processors_share_registry() {
        let config = ExtractConfig::default();
        let source = source(DOC);
        let mut registry = IdRegistry::new("doc.xml");

        let mut requirements = CsvSink::new(Vec::new());
        let report = process_kind(
            RecordKind::Requirements,
            &source,
            &config,
            &mut registry,
            &mut requirements,
        )
        .unwrap();
        assert_eq!(report.rows_written, 1);

        let mut info = CsvSink::new(Vec::new());
        process_kind(
            RecordKind::AdditionalInfo,
            &source,
            &config,
            &mut registry,
            &mut info,
        )
        .unwrap();

        let requirements = String::from_utf8(requirements.into_inner().unwrap()).unwrap();
        let info = String::from_utf8(info.into_inner().unwrap()).unwrap();
        let req_uuid = requirements.split(',').next().unwrap();
        assert!(info.starts_with(&format!("{req_uuid},table,")));
        assert!(info.contains(",ISO 9999,sec_1,tab_1,r"));
    }

    #[test]
    fn test_state_machine() {
        let config = ExtractConfig::default();
        let mut registry = IdRegistry::new("doc.xml");
        let mut processor = Processor::new(RequirementRule, &config);
        assert_eq!(processor.state(), ProcessorState::Idle);

        processor
            .process(&source(DOC), &mut registry, &mut CsvSink::new(Vec::new()))
            .unwrap();
        assert_eq!(processor.state(), ProcessorState::Done);

        let again = processor.process(&source(DOC), &mut registry, &mut CsvSink::new(Vec::new()));
        assert!(matches!(again, Err(ExtractError::ProcessorReused { .. })));
    }

    #[test]
    fn test_malformed_document_writes_nothing() {
        let config = ExtractConfig::default();
        let mut registry = IdRegistry::new("doc.xml");
        let mut processor = Processor::new(RequirementRule, &config);
        let mut sink = FailingSink {
            written: 0,
            limit: usize::MAX,
        };

        let result = processor.process(
            &source("<standard><body><sec><p>open"),
            &mut registry,
            &mut sink,
        );

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "MalformedDocument");
        assert!(err.to_string().contains("doc.xml"));
        assert_eq!(processor.state(), ProcessorState::Failed);
        assert_eq!(sink.written, 0);
        assert_eq!(registry.requirement_count(), 0);
    }

    #[test]
    fn test_sink_failure_keeps_written_rows() {
        let config = ExtractConfig::default();
        let xml = DOC.replace(
            "<p>Widgets",
            "<p>First.</p><p>Second.</p><p>Widgets",
        );
        let mut registry = IdRegistry::new("doc.xml");
        let mut processor = Processor::new(RequirementRule, &config);
        let mut sink = FailingSink {
            written: 0,
            limit: 2,
        };

        let err = processor
            .process(&source(&xml), &mut registry, &mut sink)
            .unwrap_err();
        assert!(matches!(err, ExtractError::SinkFailure { .. }));
        assert_eq!(processor.state(), ProcessorState::Failed);
        assert_eq!(sink.written, 2);
    }

    #[test]
    fn test_registry_for_other_document_rejected() {
        let config = ExtractConfig::default();
        let mut registry = IdRegistry::new("other.xml");
        let result = Processor::new(RequirementRule, &config).process(
            &source(DOC),
            &mut registry,
            &mut CsvSink::new(Vec::new()),
        );
        assert!(matches!(result, Err(ExtractError::RegistryMismatch { .. })));
    }

    #[test]
    fn test_violations_reported_not_fatal() {
        let config = ExtractConfig::default();
        let xml = DOC.replace(r#"<std-ref type="undated">ISO 9999</std-ref>"#, "");
        let mut registry = IdRegistry::new("doc.xml");

        let report = process_kind(
            RecordKind::AdditionalInfo,
            &source(&xml),
            &config,
            &mut registry,
            &mut CsvSink::new(Vec::new()),
        )
        .unwrap();
        assert_eq!(report.rows_written, 0);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].field, "StandardID");
        assert_eq!(report.kind, RecordKind::AdditionalInfo);
    }

    #[test]
    fn test_norm_reference_columns_empty() {
        let config = ExtractConfig::default();
        let xml = DOC.replace("see Table", "per <std><std-ref>ISO 1</std-ref></std>, see Table");
        let mut registry = IdRegistry::new("doc.xml");
        let mut sink = CsvSink::new(Vec::new());

        process_kind(
            RecordKind::AdditionalInfo,
            &source(&xml),
            &config,
            &mut registry,
            &mut sink,
        )
        .unwrap();

        let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let norm = out.lines().next().unwrap();
        let fields: Vec<_> = norm.split(',').collect();
        assert_eq!(fields.len(), AdditionalInfoRow::COLUMNS.len());
        assert_eq!(&fields[1..], ["norm_reference", "", "ISO 9999", "", "", ""]);
        assert!(!fields[0].is_empty());
    }
}
