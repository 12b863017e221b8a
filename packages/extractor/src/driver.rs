//! Batch driver: enumerate documents, open the tables, run the processors.
//!
//! Documents are processed one after another. Each gets its own identifier
//! registry, shared by all of that document's processors and dropped when
//! the document is done.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;

use crate::config::ExtractConfig;
use crate::error::{ExtractError, Result};
use crate::ids::IdRegistry;
use crate::processor::{process_kind, DocumentSource, ProcessReport};
use crate::table::{create_table, CsvSink};
use crate::types::RecordKind;

/// Expand files and directories into the list of documents to process.
///
/// Directories are listed non-recursively and contribute their `*.xml` files
/// (extension compared case-insensitively). Files are taken as given. The
/// result is sorted and free of duplicates.
pub fn collect_documents(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_xml(&path) {
                    documents.push(path);
                }
            }
        } else if input.is_file() {
            documents.push(input.clone());
        } else {
            return Err(ExtractError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Input does not exist: {}", input.display()),
            )));
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

/// What to run and where to write it.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Documents in processing order.
    pub documents: Vec<PathBuf>,
    /// Directory receiving the table files.
    pub output: PathBuf,
    /// Record kinds to extract.
    pub kinds: Vec<RecordKind>,
    pub config: ExtractConfig,
}

impl RunOptions {
    /// Extract every record kind with the default configuration.
    pub fn new(documents: Vec<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            documents,
            output: output.into(),
            kinds: RecordKind::iter().collect(),
            config: ExtractConfig::default(),
        }
    }

    #[must_use]
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = RecordKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }
}

/// A document that was not processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub document: String,
    pub reason: String,
}

/// Totals of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub documents_processed: usize,
    pub skipped: Vec<SkippedDocument>,
    /// Rows written per table.
    pub rows_written: BTreeMap<RecordKind, usize>,
    /// Records dropped for missing required fields.
    pub violations: usize,
    /// Paths of the written table files.
    pub tables: Vec<PathBuf>,
}

impl RunSummary {
    fn record(&mut self, report: &ProcessReport) {
        *self.rows_written.entry(report.kind).or_default() += report.rows_written;
        self.violations += report.violations.len();
    }

    /// Total rows over all tables.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.rows_written.values().sum()
    }
}

/// Check a table selection.
///
/// Additional information links to requirement ids minted while the
/// requirement table is written, so it cannot be selected on its own.
pub fn validate_kinds(kinds: &[RecordKind]) -> Result<()> {
    if kinds.is_empty() {
        return Err(ExtractError::InvalidConfig(
            "at least one table must be selected".to_string(),
        ));
    }
    if kinds.contains(&RecordKind::AdditionalInfo) && !kinds.contains(&RecordKind::Requirements) {
        return Err(ExtractError::InvalidConfig(format!(
            "table '{}' requires table '{}'",
            RecordKind::AdditionalInfo,
            RecordKind::Requirements
        )));
    }
    Ok(())
}

/// The open tables of a run, one per record kind.
pub struct Tables<W: Write = File> {
    tables: Vec<(RecordKind, CsvSink<W>, PathBuf)>,
}

impl Tables<File> {
    /// Create the output directory and one table per kind, headers written.
    ///
    /// Kinds are opened in declaration order whatever order they are given in.
    pub fn create(dir: &Path, kinds: &[RecordKind]) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut kinds = kinds.to_vec();
        kinds.sort();
        kinds.dedup();

        let mut tables = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let (sink, path) = create_table(dir, kind)?;
            tables.push((kind, sink, path));
        }
        Ok(Self::from_sinks(tables))
    }
}

impl<W: Write> Tables<W> {
    /// Tables over already opened sinks, sorted into declaration order.
    pub fn from_sinks(
        sinks: impl IntoIterator<Item = (RecordKind, CsvSink<W>, PathBuf)>,
    ) -> Self {
        let mut tables: Vec<_> = sinks.into_iter().collect();
        tables.sort_by_key(|(kind, _, _)| *kind);
        Self { tables }
    }

    /// Record kinds of the open tables, in processing order.
    pub fn kinds(&self) -> impl Iterator<Item = RecordKind> + '_ {
        self.tables.iter().map(|(kind, _, _)| *kind)
    }

    /// Flush and close every table.
    pub fn finish(self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(self.tables.len());
        for (_, sink, path) in self.tables {
            sink.into_inner()
                .map_err(|source| ExtractError::SinkFailure {
                    document: path.display().to_string(),
                    source,
                })?;
            paths.push(path);
        }
        Ok(paths)
    }
}

/// Run every open table's processor over one document with a fresh registry.
pub fn process_document<W: Write>(
    source: &DocumentSource,
    tables: &mut Tables<W>,
    config: &ExtractConfig,
) -> Result<Vec<ProcessReport>> {
    let mut registry = IdRegistry::new(source.name.as_str());
    let mut reports = Vec::with_capacity(tables.tables.len());

    for (kind, sink, _) in &mut tables.tables {
        reports.push(process_kind(*kind, source, config, &mut registry, sink)?);
    }

    tracing::debug!(
        document = %registry.document(),
        requirements = registry.requirement_count(),
        items = registry.info_count(),
        "Identifiers minted"
    );
    Ok(reports)
}

/// Process `documents` into already opened tables.
///
/// `on_document` is called before each document is processed. Unreadable
/// and malformed documents are skipped; any other error aborts the run.
pub fn run_documents<W: Write, F: FnMut(&Path)>(
    documents: &[PathBuf],
    tables: &mut Tables<W>,
    config: &ExtractConfig,
    mut on_document: F,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    for kind in tables.kinds() {
        summary.rows_written.insert(kind, 0);
    }

    for path in documents {
        on_document(path);

        let source = match DocumentSource::from_path(path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(
                    document = %path.display(),
                    kind = e.kind(),
                    error = %e,
                    "Skipping unreadable document"
                );
                summary.skipped.push(SkippedDocument {
                    document: path.display().to_string(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match process_document(&source, tables, config) {
            Ok(reports) => {
                for report in &reports {
                    summary.record(report);
                }
                summary.documents_processed += 1;
                tracing::info!(
                    document = %source.name,
                    rows = reports.iter().map(|r| r.rows_written).sum::<usize>(),
                    dropped = reports.iter().map(|r| r.violations.len()).sum::<usize>(),
                    "Document processed"
                );
            }
            Err(e @ ExtractError::MalformedDocument { .. }) => {
                tracing::warn!(
                    document = %source.name,
                    kind = e.kind(),
                    error = %e,
                    "Skipping malformed document"
                );
                summary.skipped.push(SkippedDocument {
                    document: source.name.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

/// Process all documents of `options` into table files.
pub fn run<F: FnMut(&Path)>(options: &RunOptions, on_document: F) -> Result<RunSummary> {
    options.config.validate()?;
    validate_kinds(&options.kinds)?;

    let mut tables = Tables::create(&options.output, &options.kinds)?;
    let mut summary =
        run_documents(&options.documents, &mut tables, &options.config, on_document)?;
    summary.tables = tables.finish()?;
    Ok(summary)
}
