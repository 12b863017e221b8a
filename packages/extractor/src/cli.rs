//! Command-line interface for the extractor.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use strum::IntoEnumIterator;

use crate::config::ExtractConfig;
use crate::driver::{collect_documents, run as run_extraction, RunOptions};
use crate::error::{ExtractError, Result};
use crate::types::RecordKind;

/// STS Extractor - Convert ISO STS / NISO STS XML into CSV tables.
#[derive(Parser)]
#[command(name = "sts-extractor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract tables from XML documents.
    Convert {
        /// XML files or directories containing XML files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for the table files
        #[arg(short, long)]
        output: PathBuf,

        /// Tables to extract, comma separated (default: all)
        #[arg(short, long, value_delimiter = ',')]
        tables: Vec<String>,

        /// Section id of the foreword (overrides STS_FOREWORD_ID)
        #[arg(long)]
        foreword_id: Option<String>,
    },

    /// List the available tables and their columns.
    Tables,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            tables,
            foreword_id,
        } => convert_command(&inputs, &output, &tables, foreword_id),
        Commands::Tables => {
            tables_command();
            Ok(())
        }
    }
}

/// Parse table names into record kinds. Empty means all kinds.
pub fn parse_kinds(names: &[String]) -> Result<Vec<RecordKind>> {
    if names.is_empty() {
        return Ok(RecordKind::iter().collect());
    }
    names
        .iter()
        .map(|name| {
            RecordKind::from_str(name.trim())
                .map_err(|_| ExtractError::UnknownRecordKind(name.clone()))
        })
        .collect()
}

/// Execute the convert command.
fn convert_command(
    inputs: &[PathBuf],
    output: &Path,
    tables: &[String],
    foreword_id: Option<String>,
) -> Result<()> {
    let kinds = parse_kinds(tables)?;

    let mut config = ExtractConfig::from_env()?;
    if let Some(id) = foreword_id {
        config = config.with_foreword_id(id);
        config.validate()?;
    }

    if output.exists() && !output.is_dir() {
        return Err(ExtractError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Output path is not a directory: {}", output.display()),
        )));
    }

    let documents = collect_documents(inputs)?;
    println!(
        "{} {} document(s) into {}",
        style("Converting").bold(),
        style(documents.len()).cyan(),
        style(output.display()).green()
    );
    println!();

    let pb = ProgressBar::new(documents.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let options = RunOptions::new(documents, output)
        .with_kinds(kinds)
        .with_config(config);

    let result = run_extraction(&options, |path| {
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        pb.inc(1);
    });
    pb.finish_and_clear();
    let summary = result?;

    println!("  Documents: {}", summary.documents_processed);
    println!("  Rows: {}", summary.total_rows());
    for (kind, rows) in &summary.rows_written {
        println!("  {}: {} row(s)", kind, rows);
    }
    if summary.violations > 0 {
        println!(
            "  Dropped records: {}",
            style(summary.violations).yellow().bold()
        );
    }
    for skipped in &summary.skipped {
        println!(
            "  {} {} ({})",
            style("Skipped").yellow().bold(),
            skipped.document,
            skipped.reason
        );
    }

    println!();
    println!("{} {}", style("Saved to:").green().bold(), output.display());

    Ok(())
}

/// Execute the tables command.
fn tables_command() {
    for kind in RecordKind::iter() {
        println!(
            "{} ({})",
            style(kind).bold(),
            style(kind.file_name()).cyan()
        );
        println!("  {}", kind.columns().join(","));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_convert() {
        let cli = Cli::parse_from([
            "sts-extractor",
            "convert",
            "data/xml",
            "extra.xml",
            "--output",
            "out",
        ]);

        let Commands::Convert {
            inputs,
            output,
            tables,
            foreword_id,
        } = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(inputs, [PathBuf::from("data/xml"), PathBuf::from("extra.xml")]);
        assert_eq!(output, PathBuf::from("out"));
        assert!(tables.is_empty());
        assert!(foreword_id.is_none());
    }

    #[test]
    fn test_cli_parse_tables_and_foreword() {
        let cli = Cli::parse_from([
            "sts-extractor",
            "convert",
            "a.xml",
            "-o",
            "out",
            "--tables",
            "requirements,additional-info",
            "--foreword-id",
            "sec_forword",
        ]);

        let Commands::Convert {
            tables,
            foreword_id,
            ..
        } = cli.command
        else {
            panic!("expected convert");
        };
        assert_eq!(tables, ["requirements", "additional-info"]);
        assert_eq!(foreword_id.as_deref(), Some("sec_forword"));
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["sts-extractor", "convert", "-o", "out"]).is_err());
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!(parse_kinds(&[]).unwrap().len(), RecordKind::iter().count());
        assert_eq!(
            parse_kinds(&["Titles".to_string(), " ics".to_string()]).unwrap(),
            [RecordKind::Titles, RecordKind::Ics]
        );
        assert!(matches!(
            parse_kinds(&["mathml".to_string()]),
            Err(ExtractError::UnknownRecordKind(_))
        ));
    }
}
