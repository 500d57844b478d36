//! Deterministic union-find over the GFA adjacency multimap.
//!
//! Segments are iterated in insertion order (the order they were first seen
//! while parsing the GFA file) so that the resulting component order is
//! reproducible across runs, matching the spec's determinism requirement.

use std::collections::{HashMap, HashSet};

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        DisjointSet {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Compute connected components of the segment adjacency graph.
///
/// `insertion_order` provides a deterministic base ordering; any segment
/// reachable only via `edges` but missing from `insertion_order` (should not
/// happen in practice, since the GFA parser records every segment it sees) is
/// appended afterwards in `edges`' own iteration order as a fallback.
///
/// Returns one `Vec<String>` per component, each component's members in
/// insertion order.
#[must_use]
pub fn connected_components(
    edges: &HashMap<String, HashSet<String>>,
    insertion_order: &[String],
) -> Vec<Vec<String>> {
    let mut all_segments: Vec<String> = insertion_order.to_vec();
    let mut seen: HashSet<&str> = all_segments.iter().map(String::as_str).collect();
    for segment in edges.keys() {
        if seen.insert(segment.as_str()) {
            all_segments.push(segment.clone());
        }
    }

    let index_of: HashMap<&str, usize> = all_segments
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let mut dsu = DisjointSet::new(all_segments.len());
    for segment in &all_segments {
        let Some(&i) = index_of.get(segment.as_str()) else {
            continue;
        };
        if let Some(neighbours) = edges.get(segment) {
            for neighbour in neighbours {
                if let Some(&j) = index_of.get(neighbour.as_str()) {
                    dsu.union(i, j);
                }
            }
        }
    }

    let mut components: HashMap<usize, Vec<String>> = HashMap::new();
    for (i, segment) in all_segments.iter().enumerate() {
        let root = dsu.find(i);
        components.entry(root).or_default().push(segment.clone());
    }

    // Deterministic component ordering: by the insertion-order index of each
    // component's first member.
    let mut ordered: Vec<(usize, Vec<String>)> = components
        .into_iter()
        .map(|(root, members)| (root, members))
        .collect();
    ordered.sort_by_key(|(root, _)| *root);
    ordered.into_iter().map(|(_, members)| members).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges_from_pairs(pairs: &[(&str, &str)]) -> HashMap<String, HashSet<String>> {
        let mut edges: HashMap<String, HashSet<String>> = HashMap::new();
        for (a, b) in pairs {
            edges.entry(a.to_string()).or_default().insert(b.to_string());
            edges.entry(b.to_string()).or_default().insert(a.to_string());
        }
        edges
    }

    #[test]
    fn connects_transitively() {
        let edges = edges_from_pairs(&[("s1", "s2"), ("s2", "s3")]);
        let order = vec!["s1".to_string(), "s2".to_string(), "s3".to_string()];
        let components = connected_components(&edges, &order);
        assert_eq!(components.len(), 1);
        let mut members = components[0].clone();
        members.sort();
        assert_eq!(members, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn disjoint_segments_stay_separate() {
        let edges = edges_from_pairs(&[("s1", "s2")]);
        let order = vec!["s1".to_string(), "s2".to_string(), "s3".to_string()];
        let components = connected_components(&edges, &order);
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn isolated_segment_with_no_edges_is_its_own_component() {
        let edges: HashMap<String, HashSet<String>> = HashMap::new();
        let order = vec!["s1".to_string()];
        let components = connected_components(&edges, &order);
        assert_eq!(components, vec![vec!["s1".to_string()]]);
    }
}
