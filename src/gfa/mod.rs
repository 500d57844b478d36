//! Parser for the GFA v1 subset used by assembly graphs: `L` (Link) and `P`
//! (Path) records, plus header/comment lines. Other record types are logged
//! as warnings rather than treated as fatal, matching assembler output in the
//! wild that occasionally emits extension record types.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::utils::validation::{check_record_limit, TooManyRecordsError};

#[derive(Debug, Error)]
pub enum GfaError {
    #[error("failed to read GFA file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed {record_type} record on line {line}: {detail}")]
    Malformed {
        record_type: String,
        line: usize,
        detail: String,
    },
    #[error(transparent)]
    TooManyRecords(#[from] TooManyRecordsError),
}

/// The result of parsing a GFA file: an undirected multimap of segment
/// adjacency plus the set of segments flagged circular by a self-edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GfaGraph {
    /// Undirected adjacency; every edge is recorded in both directions.
    pub edges: HashMap<String, HashSet<String>>,
    pub circular: HashSet<String>,
}

impl GfaGraph {
    fn add_edge(&mut self, from: &str, to: &str) {
        if from == to {
            self.circular.insert(from.to_string());
            // Self-edges are no-ops for union-find beyond the circular flag.
            self.edges.entry(from.to_string()).or_default();
            return;
        }
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        self.edges
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }

    /// All segment names that appear as an edge endpoint, in first-seen order.
    #[must_use]
    pub fn segments_in_order(&self, insertion_order: &[String]) -> Vec<String> {
        insertion_order
            .iter()
            .filter(|s| self.edges.contains_key(s.as_str()))
            .cloned()
            .collect()
    }
}

/// Parse a GFA file from disk.
///
/// # Errors
///
/// Returns [`GfaError::Io`] if the file cannot be read, [`GfaError::Malformed`]
/// if an `L` or `P` record does not have the expected column count, or
/// [`GfaError::TooManyRecords`] if the DOS protection limit is exceeded.
pub fn parse_gfa_file(path: &Path) -> Result<(GfaGraph, Vec<String>), GfaError> {
    let contents = std::fs::read_to_string(path)?;
    parse_gfa_str(&contents)
}

/// Parse GFA text. Returns the graph plus the segment insertion order observed
/// across `L`/`P` records (used by the importer to get deterministic
/// union-find iteration order).
///
/// # Errors
///
/// See [`parse_gfa_file`].
pub fn parse_gfa_str(text: &str) -> Result<(GfaGraph, Vec<String>), GfaError> {
    let mut graph = GfaGraph::default();
    let mut insertion_order: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    let mut record_count = 0usize;

    let mut note_segment = |name: &str, insertion_order: &mut Vec<String>, seen: &mut HashSet<String>| {
        if seen.insert(name.to_string()) {
            insertion_order.push(name.to_string());
        }
    };

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let Some(record_type) = fields.next() else {
            continue;
        };

        match record_type {
            "H" | "S" | "A" => continue,
            "#" => continue,
            _ if line.starts_with('#') => continue,
            "L" => {
                record_count += 1;
                check_record_limit(record_count)?;
                let from = fields.next().ok_or_else(|| GfaError::Malformed {
                    record_type: "L".to_string(),
                    line: line_no + 1,
                    detail: "missing from-segment".to_string(),
                })?;
                let _from_orient = fields.next();
                let to = fields.next().ok_or_else(|| GfaError::Malformed {
                    record_type: "L".to_string(),
                    line: line_no + 1,
                    detail: "missing to-segment".to_string(),
                })?;
                note_segment(from, &mut insertion_order, &mut seen);
                note_segment(to, &mut insertion_order, &mut seen);
                graph.add_edge(from, to);
            }
            "P" => {
                record_count += 1;
                check_record_limit(record_count)?;
                let _path_name = fields.next().ok_or_else(|| GfaError::Malformed {
                    record_type: "P".to_string(),
                    line: line_no + 1,
                    detail: "missing path name".to_string(),
                })?;
                let segment_list = fields.next().ok_or_else(|| GfaError::Malformed {
                    record_type: "P".to_string(),
                    line: line_no + 1,
                    detail: "missing segment list".to_string(),
                })?;
                let segments: Vec<String> = segment_list
                    .split(',')
                    .map(strip_orientation)
                    .filter(|s| !s.is_empty())
                    .collect();
                for segment in &segments {
                    note_segment(segment, &mut insertion_order, &mut seen);
                }
                for pair in segments.windows(2) {
                    graph.add_edge(&pair[0], &pair[1]);
                }
                // A path of a single segment still registers the segment as a node.
                if let [only] = segments.as_slice() {
                    graph.edges.entry(only.clone()).or_default();
                }
            }
            other => {
                tracing::warn!(line = line_no + 1, record_type = other, "unknown GFA record type, ignoring");
            }
        }
    }

    Ok((graph, insertion_order))
}

/// Strip a trailing `+`/`-` orientation marker from a GFA segment reference.
fn strip_orientation(token: &str) -> String {
    let token = token.trim();
    if let Some(stripped) = token.strip_suffix(['+', '-']) {
        stripped.to_string()
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_edge_marks_circular() {
        let text = "H\tVN:Z:1.0\nS\ts1\t*\nL\ts1\t+\ts1\t+\t0M\n";
        let (graph, _) = parse_gfa_str(text).unwrap();
        assert!(graph.circular.contains("s1"));
    }

    #[test]
    fn path_line_creates_chained_edges_ignoring_orientation() {
        let text = "P\tpath1\ts1+,s2-,s3+\t*\n";
        let (graph, order) = parse_gfa_str(text).unwrap();
        assert!(graph.edges["s1"].contains("s2"));
        assert!(graph.edges["s2"].contains("s3"));
        assert!(!graph.edges["s1"].contains("s3"));
        assert_eq!(order, vec!["s1", "s2", "s3"]);
    }

    #[test]
    fn link_line_is_undirected() {
        let text = "L\ts1\t+\ts2\t-\t0M\n";
        let (graph, _) = parse_gfa_str(text).unwrap();
        assert!(graph.edges["s1"].contains("s2"));
        assert!(graph.edges["s2"].contains("s1"));
    }

    #[test]
    fn unknown_record_types_are_ignored_not_fatal() {
        let text = "X\tsome\tfields\nL\ts1\t+\ts2\t+\t0M\n";
        let (graph, _) = parse_gfa_str(text).unwrap();
        assert!(graph.edges.contains_key("s1"));
    }

    #[test]
    fn malformed_link_line_is_an_error() {
        let text = "L\ts1\t+\n";
        assert!(parse_gfa_str(text).is_err());
    }
}
