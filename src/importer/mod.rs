//! Importer framework: turns one assembler's raw output (FASTA + GFA + optional
//! auxiliary tables) into a validated [`Assembly`].
//!
//! Importers are modelled as values implementing the [`Importer`] trait rather
//! than as a class hierarchy: dispatch is by iterating a compile-time registry
//! (see [`registry`]), not by vtable inheritance. This breaks the back-reference
//! cycle the original keeps (`Contig.importer`) since a contig never needs to
//! look up its importer — the assembler name recorded on the contig is enough
//! to find it again in the registry if needed.

mod flye;
mod lja;
mod union_find;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{Assembly, Contig, ContigGroup};
use crate::gfa::{self, GfaGraph};
use crate::parsing::fasta::{self, FastaError};

pub use flye::FlyeImporter;
pub use lja::LjaImporter;

/// How badly an import failure should be treated.
///
/// `Warning`/`Danger` flow through the same `AssemblyFailed` path: the
/// orchestrator logs a message and continues with the remaining importers.
/// `Fatal` is different in kind, not just degree — it marks a bug in the
/// input that invalidates the whole sample (e.g. an alphabet violation), and
/// the orchestrator aborts the sample and writes a `failed` marker even if
/// every other importer succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Danger,
    Fatal,
}

/// Raised when one importer cannot produce an assembly.
///
/// The orchestrator catches `Warning`/`Danger` per-importer and continues
/// with the remaining importers; `Fatal` is instead propagated to abort the
/// whole sample regardless of other importers' outcome (see [`Severity`]).
#[derive(Debug, Error)]
#[error("{assembler}: {message}")]
pub struct ImporterError {
    pub assembler: String,
    pub message: String,
    pub severity: Severity,
}

impl ImporterError {
    #[must_use]
    pub fn warning(assembler: impl Into<String>, message: impl Into<String>) -> Self {
        ImporterError {
            assembler: assembler.into(),
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    #[must_use]
    pub fn danger(assembler: impl Into<String>, message: impl Into<String>) -> Self {
        ImporterError {
            assembler: assembler.into(),
            message: message.into(),
            severity: Severity::Danger,
        }
    }

    #[must_use]
    pub fn fatal(assembler: impl Into<String>, message: impl Into<String>) -> Self {
        ImporterError {
            assembler: assembler.into(),
            message: message.into(),
            severity: Severity::Fatal,
        }
    }

    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

/// Static metadata + behaviour for one assembler's output layout.
///
/// An importer declares the relative paths of its inputs and, via the default
/// [`Importer::load_assembly`] implementation, shares the FASTA→GFA→union-find
/// pipeline that is common to every assembler. Assembler-specific quirks
/// (id normalisation, auxiliary info files) are expressed by overriding the
/// hook methods rather than the whole pipeline.
pub trait Importer {
    /// Name recorded on every contig produced by this importer.
    fn assembler(&self) -> &str;

    /// Directory holding this assembler's output, relative to `sample_dir`.
    fn assembly_dir(&self) -> &str;

    /// FASTA file name, relative to `assembly_dir()`.
    fn assembly_file(&self) -> &str;

    /// GFA file name, relative to `assembly_dir()`.
    fn gfa_file(&self) -> &str;

    /// Rewrite a GFA segment name into the id space used by the FASTA file,
    /// for assemblers whose graph and sequence outputs disagree (Flye: `edge_*`
    /// in the graph, `contig_*` in the FASTA). Identity by default.
    fn normalize_segment_id(&self, segment: &str) -> String {
        segment.to_string()
    }

    /// Attach auxiliary per-contig metadata (coverage, cross-checks) from an
    /// assembler-specific info file, if one exists. No-op by default.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError`] if the auxiliary file exists but is malformed
    /// in a way that should abort this importer (not merely warn).
    fn attach_auxiliary_metadata(
        &self,
        _assembly_dir_abs: &Path,
        _contigs: &mut HashMap<String, Contig>,
    ) -> Result<(), ImporterError> {
        Ok(())
    }

    /// Run the shared import pipeline: parse FASTA, parse GFA, declare
    /// topology, union-find grouping, attach auxiliary metadata, sort.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError`] for any expected failure mode. Missing
    /// folder, empty FASTA, and parse mismatches are `Warning`/`Danger`: the
    /// orchestrator continues with the sample's other importers. An invalid
    /// alphabet character is `Fatal`: it indicates the input itself is
    /// corrupt, not merely that this importer's output is unusable, so the
    /// orchestrator aborts the whole sample even if other importers succeed.
    /// Invariant violations (lost contigs, mixed assemblers within a group)
    /// are bugs and panic via the underlying `Assembly`/`ContigGroup`
    /// constructors' assertions instead of being reported as `ImporterError`.
    fn load_assembly(&self, sample_dir: &Path) -> Result<Assembly, ImporterError> {
        let assembler = self.assembler();
        let assembly_dir_abs = sample_dir.join(self.assembly_dir());

        if !assembly_dir_abs.is_dir() {
            return Err(ImporterError::warning(
                assembler,
                format!("folder {} does not exist", assembly_dir_abs.display()),
            ));
        }

        let fasta_path = assembly_dir_abs.join(self.assembly_file());
        let records = fasta::parse_fasta_file(&fasta_path).map_err(|e| match e {
            FastaError::Empty => {
                ImporterError::warning(assembler, format!("FASTA file {} is empty", fasta_path.display()))
            }
            other => ImporterError::danger(assembler, format!("failed to parse FASTA: {other}")),
        })?;

        let mut contigs: HashMap<String, Contig> = HashMap::new();
        for record in records {
            let contig = Contig::new(assembler, &record.original_id, &record.sequence)
                .map_err(|e| ImporterError::fatal(assembler, e.to_string()))?;
            contigs.insert(record.original_id, contig);
        }

        let gfa_path = assembly_dir_abs.join(self.gfa_file());
        let (graph, insertion_order) = gfa::parse_gfa_str(
            &std::fs::read_to_string(&gfa_path)
                .map_err(|e| ImporterError::danger(assembler, format!("failed to read GFA: {e}")))?,
        )
        .map_err(|e| ImporterError::danger(assembler, format!("failed to parse GFA: {e}")))?;

        let normalized_graph = self.normalize_graph(&graph);
        let normalized_order: Vec<String> = insertion_order
            .iter()
            .map(|s| self.normalize_segment_id(s))
            .collect();

        self.declare_topology(&mut contigs, &normalized_graph.circular);

        self.attach_auxiliary_metadata(&assembly_dir_abs, &mut contigs)?;

        let components = union_find::connected_components(&normalized_graph.edges, &normalized_order);
        let mut assembly = Assembly::new(assembler, PathBuf::from(self.assembly_dir()));

        let mut remaining = contigs;
        for component in &components {
            let mut members = Vec::new();
            for segment in component {
                if let Some(contig) = remaining.remove(segment) {
                    members.push(contig);
                }
            }
            if !members.is_empty() {
                let group = ContigGroup::new(members)
                    .map_err(|e| ImporterError::danger(assembler, e.to_string()))?;
                assembly.contig_groups.push(group);
            }
        }

        // Contigs present in the FASTA but never mentioned in the GFA edge
        // graph become their own singleton groups rather than a fatal error:
        // assemblers occasionally emit a short unplaced contig with no graph
        // connectivity at all.
        for (original_id, contig) in remaining {
            tracing::warn!(assembler, original_id, "contig not present in assembly graph, using singleton group");
            let group = ContigGroup::new(vec![contig])
                .map_err(|e| ImporterError::danger(assembler, e.to_string()))?;
            assembly.contig_groups.push(group);
        }

        assembly.sort();
        Ok(assembly)
    }

    /// Rewrite every segment name in a graph through [`Importer::normalize_segment_id`].
    fn normalize_graph(&self, graph: &GfaGraph) -> GfaGraph {
        let mut normalized = GfaGraph::default();
        for (segment, neighbours) in &graph.edges {
            let entry = normalized
                .edges
                .entry(self.normalize_segment_id(segment))
                .or_default();
            for neighbour in neighbours {
                entry.insert(self.normalize_segment_id(neighbour));
            }
        }
        for segment in &graph.circular {
            normalized.circular.insert(self.normalize_segment_id(segment));
        }
        normalized
    }

    /// Default topology declaration: circular iff the (normalized) id is in
    /// the circular set, else linear.
    fn declare_topology(
        &self,
        contigs: &mut HashMap<String, Contig>,
        circular: &std::collections::HashSet<String>,
    ) {
        for (original_id, contig) in contigs.iter_mut() {
            let topology = if circular.contains(original_id) {
                crate::core::Topology::Circular
            } else {
                crate::core::Topology::Linear
            };
            contig.set_topology(topology);
        }
    }
}

/// The compile-time list of known importers. No dynamic plugin loading: the
/// set of supported assemblers is fixed at build time, per the spec's Design
/// Notes (a registry scanned at startup is unnecessary when the set is small
/// and known in advance).
#[must_use]
pub fn registry() -> Vec<Box<dyn Importer>> {
    vec![Box::new(FlyeImporter), Box::new(LjaImporter)]
}
