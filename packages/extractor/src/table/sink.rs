//! Row sinks.
//!
//! A sink accepts one row at a time in the schema's declared column order
//! and preserves the order rows are written in. Table files are comma
//! separated UTF-8 with `\n` line endings and a single header row.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ExtractError, Result};
use crate::types::{RecordKind, TableRow};

/// Destination for the rows of one table.
pub trait RowSink {
    /// Write one row.
    fn write_row<R: TableRow>(&mut self, row: &R) -> std::result::Result<(), csv::Error>;

    /// Flush buffered rows to the underlying destination.
    fn flush(&mut self) -> std::result::Result<(), csv::Error>;
}

/// CSV sink over any writer.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer. No header is written.
    pub fn new(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(inner);
        Self { writer }
    }

    /// Wrap a writer and write the header row of `columns` first.
    pub fn with_header(inner: W, columns: &[&str]) -> std::result::Result<Self, csv::Error> {
        let mut sink = Self::new(inner);
        sink.writer.write_record(columns)?;
        Ok(sink)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> std::result::Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_row<R: TableRow>(&mut self, row: &R) -> std::result::Result<(), csv::Error> {
        self.writer.serialize(row)
    }

    fn flush(&mut self) -> std::result::Result<(), csv::Error> {
        self.writer.flush().map_err(csv::Error::from)
    }
}

/// Create (truncate) the table file for `kind` in `dir` and write its header.
///
/// # Returns
/// The sink and the path of the created file
pub fn create_table(dir: &Path, kind: RecordKind) -> Result<(CsvSink<File>, PathBuf)> {
    let path = dir.join(kind.file_name());
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;

    let sink = CsvSink::with_header(file, kind.columns()).map_err(|source| {
        ExtractError::SinkFailure {
            document: path.display().to_string(),
            source,
        }
    })?;

    Ok((sink, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdditionalInfoRow, RequirementRow};
    use uuid::Uuid;

    fn written(sink: CsvSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_in_declared_order() {
        let sink = CsvSink::with_header(Vec::new(), RequirementRow::COLUMNS).unwrap();
        assert_eq!(written(sink), "Req_UUID,Text,Standard,Section\n");
    }

    #[test]
    fn test_row_is_quoted_when_needed() {
        let id = Uuid::nil();
        let mut sink = CsvSink::new(Vec::new());
        sink.write_row(&RequirementRow {
            req_uuid: id,
            text: "Widgets shall be round, \"always\".".to_string(),
            standard: "ISO 9999".to_string(),
            section: "sec_1".to_string(),
        })
        .unwrap();

        assert_eq!(
            written(sink),
            format!("{id},\"Widgets shall be round, \"\"always\"\".\",ISO 9999,sec_1\n")
        );
    }

    #[test]
    fn test_norm_reference_row_has_empty_fields() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_row(&AdditionalInfoRow::norm_reference(None, "ISO 9999"))
            .unwrap();
        assert_eq!(written(sink), ",norm_reference,,ISO 9999,,,\n");
    }

    #[test]
    fn test_create_table_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let (sink, path) = create_table(dir.path(), RecordKind::AdditionalInfo).unwrap();
        drop(sink.into_inner().unwrap());

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "Req_UUID,AdditionalInfo_Type,AdditionalInfo_UUID,StandardID,SectionID,ID,AdditionalInfo_Body\n"
        );
    }
}
