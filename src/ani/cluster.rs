//! Average-linkage hierarchical clustering over a distance matrix, cut into
//! flat clusters at a fixed distance threshold.
//!
//! Grounded on the original's reliance on `seaborn.clustermap`'s default
//! linkage (average, i.e. UPGMA) — see `DESIGN.md` for the full rationale.
//! Implemented directly rather than via a clustering crate: the distance
//! matrix is always small (one sample's contig groups, rarely more than a few
//! dozen), so an explicit O(n^3) agglomerative pass is simpler to reason about
//! and to keep deterministic than pulling in a general-purpose dependency.

/// Default distance threshold at which the dendrogram is cut into flat
/// clusters. `0.95` on the `1 - similarity` distance scale, i.e. contig groups
/// within `0.05` similarity distance of each other merge into one cluster.
pub const DEFAULT_CUT_THRESHOLD: f64 = 0.95;

/// Agglomerate `distance` (an `n x n` symmetric matrix with a zeroed diagonal)
/// via average-linkage until the smallest remaining inter-cluster distance
/// exceeds `threshold`, then assign 1-based contiguous cluster ids.
///
/// Cluster ids are assigned deterministically: clusters are sorted by their
/// smallest member's original index before numbering, so re-running on the
/// same input (even with different merge-order tie-breaks) yields the same
/// assignment.
#[must_use]
pub fn flat_clusters(distance: &[Vec<f64>], threshold: f64) -> Vec<u32> {
    let n = distance.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![1];
    }

    let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    loop {
        if clusters.len() == 1 {
            break;
        }

        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..clusters.len() {
            for j in (i + 1)..clusters.len() {
                let d = average_linkage_distance(&clusters[i], &clusters[j], distance);
                let better = match best {
                    Some((_, _, best_d)) => d < best_d,
                    None => true,
                };
                if better {
                    best = Some((i, j, d));
                }
            }
        }

        let Some((i, j, d)) = best else { break };
        if d > threshold {
            break;
        }

        let merged = {
            let mut members = clusters[i].clone();
            members.extend(clusters[j].clone());
            members
        };
        // Remove the higher index first so the lower index remains valid.
        clusters.remove(j);
        clusters.remove(i);
        clusters.push(merged);
    }

    clusters.sort_by_key(|members| *members.iter().min().unwrap_or(&usize::MAX));

    let mut assignment = vec![0u32; n];
    for (cluster_id, members) in clusters.iter().enumerate() {
        for &member in members {
            assignment[member] = (cluster_id + 1) as u32;
        }
    }
    assignment
}

fn average_linkage_distance(a: &[usize], b: &[usize], distance: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for &i in a {
        for &j in b {
            total += distance[i][j];
            count += 1;
        }
    }
    if count == 0 {
        f64::INFINITY
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_group_gets_cluster_one() {
        assert_eq!(flat_clusters(&[vec![0.0]], DEFAULT_CUT_THRESHOLD), vec![1]);
    }

    #[test]
    fn two_nearly_identical_groups_merge() {
        let distance = vec![vec![0.0, 0.01], vec![0.01, 0.0]];
        let assignment = flat_clusters(&distance, DEFAULT_CUT_THRESHOLD);
        assert_eq!(assignment[0], assignment[1]);
    }

    #[test]
    fn two_dissimilar_groups_stay_separate() {
        let distance = vec![vec![0.0, 0.99], vec![0.99, 0.0]];
        let assignment = flat_clusters(&distance, DEFAULT_CUT_THRESHOLD);
        assert_ne!(assignment[0], assignment[1]);
    }

    #[test]
    fn cluster_ids_are_one_based_and_contiguous() {
        let distance = vec![
            vec![0.0, 0.99, 0.01],
            vec![0.99, 0.0, 0.99],
            vec![0.01, 0.99, 0.0],
        ];
        let assignment = flat_clusters(&distance, DEFAULT_CUT_THRESHOLD);
        let mut ids: Vec<u32> = assignment.clone();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (1..=ids.len() as u32).collect::<Vec<_>>());
        assert_eq!(assignment[0], assignment[2]);
        assert_ne!(assignment[0], assignment[1]);
    }

    #[test]
    fn three_mutually_close_groups_form_one_cluster() {
        let distance = vec![
            vec![0.0, 0.02, 0.03],
            vec![0.02, 0.0, 0.01],
            vec![0.03, 0.01, 0.0],
        ];
        let assignment = flat_clusters(&distance, DEFAULT_CUT_THRESHOLD);
        assert_eq!(assignment[0], assignment[1]);
        assert_eq!(assignment[1], assignment[2]);
    }
}
