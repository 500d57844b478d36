//! Parsers for assembler input files.
//!
//! - **FASTA**: assembler contig sequences (see [`fasta`])
//!
//! GFA assembly-graph parsing lives in the top-level [`crate::gfa`] module
//! rather than here, since it is not a sequence format in the FASTA/BAM sense
//! but a graph-connectivity description consumed only by the importer layer.

pub mod fasta;
