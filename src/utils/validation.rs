//! Centralized DOS-protection limits shared by the FASTA and GFA readers.

use thiserror::Error;

/// Maximum number of contigs allowed in a single FASTA file.
pub const MAX_CONTIGS: usize = 100_000;

/// Maximum number of `L`/`P` records allowed in a single GFA file.
pub const MAX_GFA_RECORDS: usize = 200_000;

#[derive(Debug, Error)]
#[error("too many records: adding another would exceed the maximum of {limit}")]
pub struct TooManyRecordsError {
    pub limit: usize,
}

/// Check whether adding another contig would exceed [`MAX_CONTIGS`].
///
/// Call with the current count *before* adding a new contig.
///
/// # Errors
///
/// Returns [`TooManyRecordsError`] once the limit would be exceeded.
pub fn check_contig_limit(count: usize) -> Result<(), TooManyRecordsError> {
    if count >= MAX_CONTIGS {
        Err(TooManyRecordsError { limit: MAX_CONTIGS })
    } else {
        Ok(())
    }
}

/// Check whether the current GFA record count exceeds [`MAX_GFA_RECORDS`].
///
/// # Errors
///
/// Returns [`TooManyRecordsError`] once the limit would be exceeded.
pub fn check_record_limit(count: usize) -> Result<(), TooManyRecordsError> {
    if count >= MAX_GFA_RECORDS {
        Err(TooManyRecordsError {
            limit: MAX_GFA_RECORDS,
        })
    } else {
        Ok(())
    }
}
