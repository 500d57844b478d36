//! The `Contig` entity: a single assembled nucleotide sequence from one assembler.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::core::types::{AtgcCount, Location, Topology};

/// Alphabet violation: a contig sequence contained a character outside {A,T,G,C}.
#[derive(Debug, Error)]
#[error("invalid alphabet character {found:?} at byte {position} of contig {contig_id}")]
pub struct InvalidAlphabetError {
    pub contig_id: String,
    pub found: char,
    pub position: usize,
}

/// A contiguous assembled nucleotide sequence produced by one assembler.
///
/// `atgc_count` is always stored in orientation-invariant form (see
/// [`AtgcCount::invariant`]) so two contigs that are reverse-complements of each
/// other compare equal on base composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contig {
    pub assembler: String,
    pub original_id: String,
    #[serde(skip)]
    pub sequence: String,
    pub atgc_count: AtgcCount,
    pub topology: Option<Topology>,
    pub location: Option<Location>,
    pub coverage: Option<u32>,
}

impl Contig {
    /// Build a new contig, validating the sequence alphabet and computing the
    /// orientation-invariant base counts.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAlphabetError`] if `sequence` contains any character
    /// outside `{A, T, G, C}`.
    pub fn new(
        assembler: impl Into<String>,
        original_id: impl Into<String>,
        sequence: impl Into<String>,
    ) -> Result<Self, InvalidAlphabetError> {
        let assembler = assembler.into();
        let original_id = original_id.into();
        let sequence = sequence.into();

        if let Some((position, found)) = sequence
            .char_indices()
            .find(|(_, c)| !matches!(c, 'A' | 'T' | 'G' | 'C'))
        {
            return Err(InvalidAlphabetError {
                contig_id: format!("{assembler}@{original_id}"),
                found,
                position,
            });
        }

        let atgc_count = AtgcCount::from_sequence(&sequence).invariant();

        Ok(Contig {
            assembler,
            original_id,
            sequence,
            atgc_count,
            topology: None,
            location: None,
            coverage: None,
        })
    }

    /// Canonical globally-unique-within-a-sample id: `<assembler>@<original_id>`.
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}@{}", self.assembler, self.original_id)
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn gc_abs(&self) -> u64 {
        self.atgc_count.gc_abs()
    }

    #[must_use]
    pub fn gc_rel(&self) -> f64 {
        if self.length() == 0 {
            0.0
        } else {
            self.gc_abs() as f64 / self.length() as f64
        }
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = Some(topology);
    }

    pub fn set_coverage(&mut self, coverage: u32) {
        self.coverage = Some(coverage);
    }

    /// Format the curator's "hybrid" FASTA export header for this contig.
    ///
    /// Grammar: `>{name} [length=N] [topology=...] [completeness=complete]?
    /// [location=...] [plasmid-name=...]? [coverage=Nx]? [assembler=...] [old-id=...]`
    #[must_use]
    pub fn hybrid_header(&self, name: &str, plasmid_name: Option<&str>, complete: bool) -> String {
        let mut parts = vec![format!(">{name}"), format!("[length={}]", self.length())];

        if let Some(topology) = self.topology {
            let word = match topology {
                Topology::Circular => "circular",
                Topology::Linear => "linear",
                Topology::Unknown => "unknown",
            };
            parts.push(format!("[topology={word}]"));
        }

        if complete {
            parts.push("[completeness=complete]".to_string());
        }

        if let Some(location) = self.location {
            let word = match location {
                Location::Chromosome => "chromosome",
                Location::Plasmid => "plasmid",
                Location::Unknown => "unknown",
            };
            parts.push(format!("[location={word}]"));
        }

        if let Some(plasmid_name) = plasmid_name {
            parts.push(format!("[plasmid-name={plasmid_name}]"));
        }

        if let Some(coverage) = self.coverage {
            parts.push(format!("[coverage={coverage}x]"));
        }

        parts.push(format!("[assembler={}]", self.assembler));
        parts.push(format!("[old-id={}]", self.original_id));

        parts.join(" ")
    }

    /// Serialize to the artefact JSON shape. Sequence is included only when
    /// `include_sequence` is set, keeping `assemblies.json` compact by default.
    #[must_use]
    pub fn to_json(&self, include_sequence: bool) -> serde_json::Value {
        let mut value = json!({
            "assembler": self.assembler,
            "original_id": self.original_id,
            "id": self.id(),
            "atgc_count": self.atgc_count,
            "topology": self.topology,
            "location": self.location,
            "coverage": self.coverage,
            "length": self.length(),
        });
        if include_sequence {
            value["sequence"] = json!(self.sequence);
        }
        value
    }

    /// Reconstruct a `Contig` from its JSON representation. Requires the
    /// `sequence` field to be present (i.e. the value must have been serialized
    /// with `include_sequence = true`).
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or malformed.
    pub fn from_json(value: &serde_json::Value) -> anyhow::Result<Self> {
        let assembler = value["assembler"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing assembler"))?
            .to_string();
        let original_id = value["original_id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing original_id"))?
            .to_string();
        let sequence = value["sequence"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing sequence (was it serialized without it?)"))?
            .to_string();

        let mut contig = Contig::new(assembler, original_id, sequence)?;
        contig.topology = serde_json::from_value(value["topology"].clone()).unwrap_or(None);
        contig.location = serde_json::from_value(value["location"].clone()).unwrap_or(None);
        contig.coverage = value["coverage"].as_u64().map(|c| c as u32);
        Ok(contig)
    }
}
