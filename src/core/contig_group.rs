//! The `ContigGroup` entity: a set of contigs connected in the assembly graph,
//! a putative replicon (chromosome or plasmid).

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::core::contig::Contig;
use crate::core::types::Topology;

/// A cluster colour as an RGB triple, assigned by the ANI engine.
pub type ClusterColor = (u8, u8, u8);

#[derive(Debug, Error)]
#[error("contig group contains contigs from multiple assemblers: {first} and {other}")]
pub struct MixedAssemblerError {
    pub first: String,
    pub other: String,
}

/// An ordered set of contigs believed to belong to the same replicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContigGroup {
    pub contigs: Vec<Contig>,
    pub cluster_id: Option<u32>,
    pub cluster_color: Option<ClusterColor>,
}

impl ContigGroup {
    /// Build a group from contigs that all share one assembler, sorting them
    /// by descending length.
    ///
    /// # Errors
    ///
    /// Returns [`MixedAssemblerError`] if the contigs do not share an assembler.
    pub fn new(mut contigs: Vec<Contig>) -> Result<Self, MixedAssemblerError> {
        if let Some(first) = contigs.first() {
            let assembler = first.assembler.clone();
            if let Some(other) = contigs.iter().find(|c| c.assembler != assembler) {
                return Err(MixedAssemblerError {
                    first: assembler,
                    other: other.assembler.clone(),
                });
            }
        }
        contigs.sort_by(|a, b| b.length().cmp(&a.length()));
        Ok(ContigGroup {
            contigs,
            cluster_id: None,
            cluster_color: None,
        })
    }

    #[must_use]
    pub fn assembler(&self) -> Option<&str> {
        self.contigs.first().map(|c| c.assembler.as_str())
    }

    /// `<assembler>#<first-contig.original_id>[+<n-1>]` when more than one contig.
    #[must_use]
    pub fn id(&self) -> String {
        let Some(first) = self.contigs.first() else {
            return "empty#group".to_string();
        };
        if self.contigs.len() > 1 {
            format!(
                "{}#{}+{}",
                first.assembler,
                first.original_id,
                self.contigs.len() - 1
            )
        } else {
            format!("{}#{}", first.assembler, first.original_id)
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contigs.iter().map(Contig::length).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    #[must_use]
    pub fn gc_abs(&self) -> u64 {
        self.contigs.iter().map(Contig::gc_abs).sum()
    }

    #[must_use]
    pub fn gc_rel(&self) -> f64 {
        let len = self.len();
        if len == 0 {
            0.0
        } else {
            self.gc_abs() as f64 / len as f64
        }
    }

    pub fn set_cluster(&mut self, cluster_id: u32, color: ClusterColor) {
        self.cluster_id = Some(cluster_id);
        self.cluster_color = Some(color);
    }

    /// Diagonal-cell label for the ANI clustermap: topology code when the group
    /// is a single contig, `n=k` otherwise.
    #[must_use]
    pub fn topology_or_n_contigs(&self) -> String {
        if self.contigs.len() == 1 {
            self.contigs[0]
                .topology
                .map_or_else(|| "u".to_string(), |t| t.short_code().to_string())
        } else {
            format!("n={}", self.contigs.len())
        }
    }

    /// `true` iff this group is a single circular contig (the dotplot engine's
    /// "visual OK marker" condition for diagonal cells).
    #[must_use]
    pub fn is_single_circular_contig(&self) -> bool {
        self.contigs.len() == 1 && self.contigs[0].topology == Some(Topology::Circular)
    }

    /// Raw ASCII byte sequences of every member contig, in the "format used by
    /// the sketcher" convention (one `Vec<u8>` per contig).
    #[must_use]
    pub fn encode_sequences(&self) -> Vec<Vec<u8>> {
        self.contigs
            .iter()
            .map(|c| c.sequence.as_bytes().to_vec())
            .collect()
    }

    #[must_use]
    pub fn to_json(&self, include_sequence: bool) -> serde_json::Value {
        json!({
            "id": self.id(),
            "assembler": self.assembler(),
            "len": self.len(),
            "gc_rel": self.gc_rel(),
            "cluster_id": self.cluster_id,
            "cluster_color": self.cluster_color,
            "contigs": self.contigs.iter().map(|c| c.to_json(include_sequence)).collect::<Vec<_>>(),
        })
    }

    /// Reconstruct from JSON produced by [`ContigGroup::to_json`] with
    /// `include_sequence = true`.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or contigs disagree on
    /// assembler.
    pub fn from_json(value: &serde_json::Value) -> anyhow::Result<Self> {
        let contigs = value["contigs"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("missing contigs array"))?
            .iter()
            .map(Contig::from_json)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut group = ContigGroup::new(contigs)?;
        group.cluster_id = value["cluster_id"].as_u64().map(|v| v as u32);
        if let Some(arr) = value["cluster_color"].as_array() {
            if let [r, g, b] = arr.as_slice() {
                group.cluster_color = Some((
                    r.as_u64().unwrap_or(0) as u8,
                    g.as_u64().unwrap_or(0) as u8,
                    b.as_u64().unwrap_or(0) as u8,
                ));
            }
        }
        Ok(group)
    }
}
