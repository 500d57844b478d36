//! # assembly-curator
//!
//! Curate multi-assembler bacterial whole-genome assemblies: import, group,
//! ANI-cluster, and dotplot contigs for one sample at a time.
//!
//! Bacterial genome assemblers (Flye, LJA, ...) each produce their own FASTA
//! + assembly-graph pair for the same sample. Before a curator can pick a
//! final "hybrid" assembly, they need the outputs lined up: which contigs
//! from each assembler plausibly represent the same replicon, how similar
//! those candidate replicons actually are, and a visual alignment to confirm
//! it. `assembly-curator` automates that comparison.
//!
//! ## Pipeline
//!
//! 1. **Import** ([`importer`]) each assembler's FASTA + GFA into an
//!    [`core::Assembly`] of [`core::ContigGroup`]s, one group per connected
//!    component of the assembly graph.
//! 2. **Cluster** ([`ani`]) contig groups across assemblers by average
//!    nucleotide identity into putative-replicon clusters.
//! 3. **Visualise** ([`dotplot`]) each cluster as a pairwise alignment grid.
//! 4. **Orchestrate** ([`orchestrator`]) the above per sample, with an
//!    on-disk [`queue`] and worker pool for running many samples.
//!
//! ## Example
//!
//! ```rust,no_run
//! use assembly_curator::importer;
//! use assembly_curator::orchestrator;
//! use std::path::Path;
//!
//! let importers = importer::registry();
//! let outcome = orchestrator::process_sample(
//!     "sample1",
//!     Path::new("samples/sample1"),
//!     &importers,
//!     false,
//! ).unwrap();
//!
//! for message in &outcome.messages {
//!     println!("{message}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: `Contig`/`ContigGroup`/`Assembly` sequence model
//! - [`gfa`]: assembly-graph (GFA) parsing
//! - [`parsing`]: FASTA parsing
//! - [`importer`]: per-assembler import pipeline and registry
//! - [`ani`]: average-nucleotide-identity clustering engine
//! - [`dotplot`]: pairwise alignment visualisation
//! - [`orchestrator`]: per-sample pipeline entry point
//! - [`queue`]: on-disk task queue and worker pool
//! - [`cli`]: command-line interface implementation

pub mod ani;
pub mod cli;
pub mod core;
pub mod dotplot;
pub mod gfa;
pub mod importer;
pub mod orchestrator;
pub mod parsing;
pub mod queue;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::{Assembly, Contig, ContigGroup};
pub use importer::{Importer, ImporterError};
pub use orchestrator::process_sample;
