//! FASTA reader for assembler output.
//!
//! Extracts each record's canonical original id (everything before the first
//! space of the header, then the last `|`-delimited token of that) and its
//! concatenated sequence. Supports gzip/bgzip-compressed input transparently.

use std::ffi::OsStr;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use noodles::fasta;
use thiserror::Error;

use crate::utils::validation::{check_contig_limit, TooManyRecordsError};

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("failed to read FASTA file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse FASTA record: {0}")]
    Parse(String),
    #[error("no sequences found in FASTA file")]
    Empty,
    #[error(transparent)]
    TooManyRecords(#[from] TooManyRecordsError),
}

/// A parsed FASTA record before it becomes a validated [`crate::core::Contig`]:
/// alphabet validation happens at `Contig::new`, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub original_id: String,
    pub sequence: String,
}

#[must_use]
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Parse a FASTA file (gzip/bgzip-compressed or not) into records.
///
/// # Errors
///
/// Returns [`FastaError::Io`] if the file cannot be read, [`FastaError::Parse`]
/// if a record cannot be decoded, [`FastaError::Empty`] if no records are
/// found, or [`FastaError::TooManyRecords`] if the DOS protection limit is hit.
pub fn parse_fasta_file(path: &Path) -> Result<Vec<FastaRecord>, FastaError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        let reader = BufReader::new(GzDecoder::new(file));
        parse_fasta_reader(&mut fasta::io::Reader::new(reader))
    } else {
        let reader = BufReader::new(file);
        parse_fasta_reader(&mut fasta::io::Reader::new(reader))
    }
}

fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<FastaRecord>, FastaError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| FastaError::Parse(e.to_string()))?;
        check_contig_limit(records.len())?;

        let header_name = String::from_utf8_lossy(record.name()).to_string();
        let original_id = extract_original_id(&header_name);
        let sequence: String = record
            .sequence()
            .as_ref()
            .iter()
            .map(|b| b.to_ascii_uppercase() as char)
            .collect();

        records.push(FastaRecord {
            original_id,
            sequence,
        });
    }

    if records.is_empty() {
        return Err(FastaError::Empty);
    }

    Ok(records)
}

/// `header.split(' ', 1)[0].rsplit('|', 1)[-1]`: take the token before the
/// first space, then the last `|`-delimited segment of that token.
#[must_use]
pub fn extract_original_id(header_name: &str) -> String {
    let first_token = header_name.split(' ').next().unwrap_or(header_name);
    first_token
        .rsplit('|')
        .next()
        .unwrap_or(first_token)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn is_fasta_file_recognizes_extensions() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta.gz")));
        assert!(!is_fasta_file(Path::new("test.gfa")));
    }

    #[test]
    fn extracts_id_after_last_pipe_before_first_space() {
        assert_eq!(extract_original_id("contig_1"), "contig_1");
        assert_eq!(extract_original_id("contig_1 extra description"), "contig_1");
        assert_eq!(
            extract_original_id("gnl|assembler|contig_1 description"),
            "contig_1"
        );
    }

    #[test]
    fn parses_records_and_uppercases_sequence() {
        let content = b">contig_1 some desc\nacgt\nACGT\n>contig_2\nGGGG\n";
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(content).unwrap();
        temp.flush().unwrap();

        let records = parse_fasta_file(temp.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original_id, "contig_1");
        assert_eq!(records[0].sequence, "ACGTACGT");
        assert_eq!(records[1].original_id, "contig_2");
    }

    #[test]
    fn empty_file_is_an_error() {
        let temp = NamedTempFile::with_suffix(".fa").unwrap();
        assert!(matches!(
            parse_fasta_file(temp.path()),
            Err(FastaError::Empty)
        ));
    }
}
