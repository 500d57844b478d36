//! Average nucleotide identity (ANI) engine: sketches every contig group in a
//! sample, builds a symmetric similarity matrix between them, clusters the
//! matrix into flat clusters, and assigns each cluster a stable display colour.
//!
//! Grounded on `ani_dendrogram.py`: sketch/query against a shared sketcher,
//! symmetrize `(S + Sᵀ) / 2`, refuse to cluster fewer than two groups, then
//! hand the distance matrix to a dendrogram cut at a fixed threshold.

pub mod cluster;
pub mod palette;
pub mod persist;
pub mod sketch;

use std::collections::HashMap;

use thiserror::Error;

use crate::core::Assembly;
use cluster::{flat_clusters, DEFAULT_CUT_THRESHOLD};
use palette::{color_for_cluster, Rgb};
use sketch::{MinHashSketcher, Sketcher};

/// Raised when fewer than two contig groups are available to compare. This
/// mirrors the original's `MinorAssemblyException`: the pipeline continues
/// without an ANI clustermap or dotplots for the affected sample rather than
/// aborting it outright.
#[derive(Debug, Error)]
#[error("need at least 2 contig groups to compute ANI, found {found}")]
pub struct MinorAniError {
    pub found: usize,
}

/// Cluster id and display colour assigned to one contig group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterAssignment {
    pub cluster_id: u32,
    pub color: Rgb,
}

/// The full output of the ANI engine for one sample: the similarity matrix
/// plus enough bookkeeping (lengths, diagonal labels) to render it.
#[derive(Debug, Clone)]
pub struct SimilarityResult {
    /// Contig-group ids, sorted lexicographically. This sorted order is the
    /// canonical row/column order for `matrix` and the index space `cluster`
    /// ids are assigned over, so clustering a sample twice always yields the
    /// same cluster numbering regardless of import order.
    pub ids: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    pub lengths: Vec<usize>,
    pub diagonal_labels: Vec<String>,
    pub cg_to_cluster: HashMap<String, ClusterAssignment>,
}

/// Compute the similarity matrix, clusters, and colours for every contig
/// group across `assemblies` (one sample's imported assemblies, typically one
/// per assembler).
///
/// # Errors
///
/// Returns [`MinorAniError`] if fewer than two contig groups are present.
pub fn compute_similarity(assemblies: &[Assembly]) -> Result<SimilarityResult, MinorAniError> {
    let mut entries: Vec<(String, Vec<Vec<u8>>, usize, String)> = assemblies
        .iter()
        .flat_map(|a| &a.contig_groups)
        .map(|g| (g.id(), g.encode_sequences(), g.len(), g.topology_or_n_contigs()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    if entries.len() < 2 {
        return Err(MinorAniError { found: entries.len() });
    }

    let mut sketcher = MinHashSketcher::default();
    for (id, seqs, _, _) in &entries {
        sketcher.sketch(id, seqs);
    }

    let n = entries.len();
    let mut matrix = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
    }

    let index_of: HashMap<&str, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, (id, ..))| (id.as_str(), i))
        .collect();

    for (i, (id, seqs, _, _)) in entries.iter().enumerate() {
        for hit in sketcher.query(id, seqs) {
            if let Some(&j) = index_of.get(hit.reference_name.as_str()) {
                matrix[i][j] = hit.identity;
            }
        }
    }

    // Symmetrize: (S + S^T) / 2. The query-vs-reference identity is not
    // guaranteed symmetric because sketch truncation can drop different
    // k-mers depending on which set is queried against which.
    let mut symmetric = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            symmetric[i][j] = (matrix[i][j] + matrix[j][i]) / 2.0;
        }
    }

    let mut distance = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in 0..n {
            distance[i][j] = (1.0 - symmetric[i][j]).max(0.0);
        }
    }

    let assignment = flat_clusters(&distance, DEFAULT_CUT_THRESHOLD);

    let mut cg_to_cluster = HashMap::new();
    let mut ids = Vec::with_capacity(n);
    let mut lengths = Vec::with_capacity(n);
    let mut diagonal_labels = Vec::with_capacity(n);
    for (i, (id, _, len, label)) in entries.into_iter().enumerate() {
        let cluster_id = assignment[i];
        cg_to_cluster.insert(
            id.clone(),
            ClusterAssignment {
                cluster_id,
                color: color_for_cluster(cluster_id),
            },
        );
        ids.push(id);
        lengths.push(len);
        diagonal_labels.push(label);
    }

    Ok(SimilarityResult {
        ids,
        matrix: symmetric,
        lengths,
        diagonal_labels,
        cg_to_cluster,
    })
}
