//! In-process MinHash-style genome sketch, standing in for the external
//! `skani`/`pyskani` dependency the spec treats as a capability
//! (`sketch(id, seqs)` / `query(id, seqs) -> [{reference_name, identity}]`).
//!
//! Each contig group is sketched as the bottom-`sketch_size` set of canonical
//! k-mer hashes (a KMV/MinHash sketch). Similarity between two sketches is
//! estimated via their Jaccard index and converted to an ANI-like identity
//! using the standard Mash distance formula. No randomness is involved — the
//! hash function and the "keep smallest N" rule are both deterministic, so
//! identical inputs always produce identical sketches and identities.

use std::collections::HashMap;

/// Default k-mer size for the sketch. Chosen independently from the dotplot
/// engine's own k-mer default since the two serve different purposes (content
/// similarity vs. visual alignment).
pub const DEFAULT_SKETCH_K: usize = 15;

/// Default sketch size (number of retained minimiser hashes per group).
pub const DEFAULT_SKETCH_SIZE: usize = 1000;

/// One hit returned by [`Sketcher::query`]: the identity of `reference_name`
/// relative to the queried group.
#[derive(Debug, Clone, PartialEq)]
pub struct SketchHit {
    pub reference_name: String,
    pub identity: f64,
}

/// Capability the ANI engine depends on: build a sketch for a named group,
/// then query it (or any group) against every previously-sketched group.
pub trait Sketcher {
    fn sketch(&mut self, id: &str, seqs: &[Vec<u8>]);
    fn query(&self, id: &str, seqs: &[Vec<u8>]) -> Vec<SketchHit>;
}

/// Bottom-N MinHash sketch over canonical (strand-independent) k-mers.
pub struct MinHashSketcher {
    k: usize,
    sketch_size: usize,
    sketches: HashMap<String, Vec<u64>>,
}

impl MinHashSketcher {
    #[must_use]
    pub fn new(k: usize, sketch_size: usize) -> Self {
        MinHashSketcher {
            k,
            sketch_size,
            sketches: HashMap::new(),
        }
    }

    fn build_sketch(&self, seqs: &[Vec<u8>]) -> Vec<u64> {
        let mut hashes: Vec<u64> = Vec::new();
        for seq in seqs {
            if seq.len() < self.k {
                continue;
            }
            for window in seq.windows(self.k) {
                hashes.push(canonical_kmer_hash(window));
            }
        }
        hashes.sort_unstable();
        hashes.dedup();
        hashes.truncate(self.sketch_size);
        hashes
    }
}

impl Default for MinHashSketcher {
    fn default() -> Self {
        MinHashSketcher::new(DEFAULT_SKETCH_K, DEFAULT_SKETCH_SIZE)
    }
}

impl Sketcher for MinHashSketcher {
    fn sketch(&mut self, id: &str, seqs: &[Vec<u8>]) {
        let sketch = self.build_sketch(seqs);
        self.sketches.insert(id.to_string(), sketch);
    }

    fn query(&self, id: &str, seqs: &[Vec<u8>]) -> Vec<SketchHit> {
        let query_sketch = self.build_sketch(seqs);
        self.sketches
            .iter()
            .filter(|(reference_name, _)| reference_name.as_str() != id)
            .map(|(reference_name, reference_sketch)| SketchHit {
                reference_name: reference_name.clone(),
                identity: identity_from_sketches(&query_sketch, reference_sketch, self.k),
            })
            .collect()
    }
}

/// Jaccard index between two sorted, deduplicated hash sets.
fn jaccard(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (mut i, mut j, mut intersection) = (0usize, 0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                intersection += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Mash-distance-derived identity estimate from a Jaccard index:
/// `d = -1/k * ln(2j / (1+j))`, `identity = 1 - d`, clamped to `[0, 1]`.
fn identity_from_sketches(a: &[u64], b: &[u64], k: usize) -> f64 {
    let j = jaccard(a, b);
    if j <= 0.0 {
        return 0.0;
    }
    let distance = -1.0 / k as f64 * ((2.0 * j) / (1.0 + j)).ln();
    (1.0 - distance).clamp(0.0, 1.0)
}

/// Hash of the lexicographically-smaller of a k-mer and its reverse
/// complement, so matching forward/reverse-strand k-mers hash identically.
fn canonical_kmer_hash(kmer: &[u8]) -> u64 {
    let rc = reverse_complement(kmer);
    let canonical: &[u8] = if rc.as_slice() < kmer { &rc } else { kmer };
    fnv1a(canonical)
}

fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'G' => b'C',
            b'C' => b'G',
            other => *other,
        })
        .collect()
}

/// FNV-1a 64-bit hash. Simple, dependency-free, and deterministic — all that
/// is required of the sketch's underlying hash function.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_have_identity_near_one() {
        let mut sketcher = MinHashSketcher::new(8, 500);
        let seq = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".to_vec();
        sketcher.sketch("a", &[seq.clone()]);
        sketcher.sketch("b", &[seq]);

        let hits = sketcher.query("a", &[b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT".to_vec()]);
        let hit = hits.iter().find(|h| h.reference_name == "b").unwrap();
        assert!(hit.identity > 0.99, "identity was {}", hit.identity);
    }

    #[test]
    fn unrelated_sequences_have_low_identity() {
        let mut sketcher = MinHashSketcher::new(10, 500);
        sketcher.sketch("a", &[b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_vec()]);
        sketcher.sketch("b", &[b"GCGCGCGCGCGCGCGCGCGCGCGCGCGCGCGC".to_vec()]);

        let hits = sketcher.query("a", &[b"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_vec()]);
        let hit = hits.iter().find(|h| h.reference_name == "b").unwrap();
        assert!(hit.identity < 0.3, "identity was {}", hit.identity);
    }

    #[test]
    fn query_excludes_self() {
        let mut sketcher = MinHashSketcher::default();
        sketcher.sketch("a", &[b"ACGTACGTACGT".to_vec()]);
        let hits = sketcher.query("a", &[b"ACGTACGTACGT".to_vec()]);
        assert!(hits.iter().all(|h| h.reference_name != "a"));
    }

    #[test]
    fn canonical_hash_is_strand_independent() {
        let forward = b"ACGTGGTT";
        let rc = reverse_complement(forward);
        assert_eq!(canonical_kmer_hash(forward), canonical_kmer_hash(&rc));
    }
}
