//! The `Assembly` entity: one assembler's complete set of contig groups for a sample.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::core::contig_group::ContigGroup;

/// Raised when the importer framework's own bookkeeping is inconsistent: a
/// contig from the original FASTA parse did not end up in exactly one group.
/// This indicates a bug in the importer, not malformed input.
#[derive(Debug, Error)]
#[error("assembly invariant violated: {0}")]
pub struct AssemblyInvariantError(pub String);

/// One assembler's complete set of contig groups for a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub assembler: String,
    pub assembly_dir: PathBuf,
    pub contig_groups: Vec<ContigGroup>,
}

impl Assembly {
    #[must_use]
    pub fn new(assembler: impl Into<String>, assembly_dir: PathBuf) -> Self {
        Assembly {
            assembler: assembler.into(),
            assembly_dir,
            contig_groups: Vec::new(),
        }
    }

    /// Sort contig groups by descending total length. Each group is assumed to
    /// already have its own contigs sorted (done by `ContigGroup::new`).
    pub fn sort(&mut self) {
        self.contig_groups.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contig_groups.iter().map(ContigGroup::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contig_groups.is_empty()
    }

    #[must_use]
    pub fn contig_count(&self) -> usize {
        self.contig_groups.iter().map(|g| g.contigs.len()).sum()
    }

    #[must_use]
    pub fn gc_content(&self) -> f64 {
        let len = self.len();
        if len == 0 {
            return 0.0;
        }
        let gc: u64 = self.contig_groups.iter().map(ContigGroup::gc_abs).sum();
        gc as f64 / len as f64
    }

    /// Check that every original contig id ended up in exactly one group.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyInvariantError`] naming the lost or duplicated contig.
    pub fn verify_no_contigs_lost(&self, expected_ids: &[String]) -> Result<(), AssemblyInvariantError> {
        use std::collections::HashMap;

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for group in &self.contig_groups {
            for contig in &group.contigs {
                *seen.entry(contig.original_id.as_str()).or_insert(0) += 1;
            }
        }

        for expected in expected_ids {
            match seen.get(expected.as_str()) {
                None | Some(0) => {
                    return Err(AssemblyInvariantError(format!(
                        "contig {expected} lost during grouping"
                    )))
                }
                Some(1) => {}
                Some(n) => {
                    return Err(AssemblyInvariantError(format!(
                        "contig {expected} appears in {n} groups"
                    )))
                }
            }
        }

        if seen.len() != expected_ids.len() {
            return Err(AssemblyInvariantError(
                "grouped contig set does not match the original contig set".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn to_json(&self, include_sequence: bool) -> serde_json::Value {
        json!({
            "assembler": self.assembler,
            "assembly_dir": self.assembly_dir,
            "len": self.len(),
            "contig_groups": self
                .contig_groups
                .iter()
                .map(|g| g.to_json(include_sequence))
                .collect::<Vec<_>>(),
        })
    }
}
