//! Small enumerated types shared across the sequence model.

use serde::{Deserialize, Serialize};

/// Molecule topology: whether a contig closes on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    Circular,
    Linear,
    Unknown,
}

impl Topology {
    /// Single-letter code used in dotplot diagonal labels ("c"/"l"/"u").
    #[must_use]
    pub fn short_code(self) -> &'static str {
        match self {
            Topology::Circular => "c",
            Topology::Linear => "l",
            Topology::Unknown => "u",
        }
    }
}

/// Where a replicon lives in the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Chromosome,
    Plasmid,
    Unknown,
}

/// Raw per-base counts over the {A,T,G,C} alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AtgcCount {
    pub a: u64,
    pub t: u64,
    pub g: u64,
    pub c: u64,
}

impl AtgcCount {
    #[must_use]
    pub fn from_sequence(sequence: &str) -> Self {
        let mut counts = AtgcCount::default();
        for byte in sequence.bytes() {
            match byte {
                b'A' => counts.a += 1,
                b'T' => counts.t += 1,
                b'G' => counts.g += 1,
                b'C' => counts.c += 1,
                _ => {}
            }
        }
        counts
    }

    /// The reverse-complement of this count mapping: A<->T, G<->C swap.
    #[must_use]
    pub fn reverse_complement(self) -> Self {
        AtgcCount {
            a: self.t,
            t: self.a,
            g: self.c,
            c: self.g,
        }
    }

    /// Sum of all four bases; should equal the sequence length.
    #[must_use]
    pub fn sum(self) -> u64 {
        self.a + self.t + self.g + self.c
    }

    /// Absolute GC count: `G + C`.
    #[must_use]
    pub fn gc_abs(self) -> u64 {
        self.g + self.c
    }

    /// Orientation-invariant form: of `self` and its reverse-complement, pick the
    /// one that is lexicographically smaller on `(A, G)`.
    #[must_use]
    pub fn invariant(self) -> Self {
        let rc = self.reverse_complement();
        let key = |counts: &AtgcCount| (counts.a, counts.g);
        if key(&rc) < key(&self) {
            rc
        } else {
            self
        }
    }
}
