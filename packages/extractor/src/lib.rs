//! STS Extractor - Convert ISO STS / NISO STS XML into CSV tables.
//!
//! This crate extracts requirement paragraphs, the tables, lists and norm
//! references linked to them, and front-matter metadata from standards
//! published as ISO STS or NISO STS XML, and writes them as CSV tables.
//!
//! # Example
//!
//! ```
//! use sts_extractor::{process_kind, CsvSink, DocumentSource, ExtractConfig, IdRegistry, RecordKind};
//!
//! let xml = r#"<standard>
//!   <front><iso-meta><std-ref type="undated">ISO 9999</std-ref></iso-meta></front>
//!   <body><sec id="sec_1"><p>Widgets shall be round.</p></sec></body>
//! </standard>"#;
//!
//! let source = DocumentSource::new("9999.xml", "9999", xml);
//! let mut registry = IdRegistry::new("9999.xml");
//! let mut sink = CsvSink::new(Vec::new());
//!
//! let report = process_kind(
//!     RecordKind::Requirements,
//!     &source,
//!     &ExtractConfig::default(),
//!     &mut registry,
//!     &mut sink,
//! )
//! .unwrap();
//! assert_eq!(report.rows_written, 1);
//! ```
//!
//! # Architecture
//!
//! The extractor is organized into several modules:
//!
//! - [`xml`]: XML navigation over `roxmltree`
//! - [`metadata`]: Document-level metadata (standard designation)
//! - [`ids`]: Per-document identifier registry
//! - [`rules`]: Extraction rules, one per record kind
//! - [`processor`]: Runs one rule over one document into one sink
//! - [`table`]: Row sinks and CSV table files
//! - [`types`]: Record kinds and table rows
//! - [`config`]: Extraction settings
//! - [`error`]: Error types and Result alias
//! - [`driver`]: Batch processing of many documents
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod processor;
pub mod rules;
pub mod table;
pub mod types;
pub mod xml;

// Re-export main functions
pub use driver::{collect_documents, run, RunOptions, RunSummary};
pub use processor::{process_kind, DocumentSource, ProcessReport, Processor, ProcessorState};

// Re-export commonly used items
pub use config::ExtractConfig;
pub use error::{ExtractError, Result, SchemaViolation};
pub use ids::IdRegistry;
pub use table::{CsvSink, RowSink};
pub use types::{
    AdditionalInfoRow, AdditionalInfoType, RecordKind, RequirementRow, SectionRow, StandardRow,
    TableRow,
};
