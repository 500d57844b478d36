//! Flye importer: `assembly.fasta` + `assembly_graph.gfa` + `assembly_info.txt`.
//!
//! Flye's GFA uses `edge_*` segment names while its FASTA uses `contig_*`
//! names for the same underlying sequence, so segment ids must be rewritten
//! before they can be matched against FASTA contig ids.

use std::collections::HashMap;
use std::path::Path;

use crate::core::Contig;
use crate::importer::{Importer, ImporterError};

pub struct FlyeImporter;

impl Importer for FlyeImporter {
    fn assembler(&self) -> &str {
        "flye"
    }

    fn assembly_dir(&self) -> &str {
        "flye"
    }

    fn assembly_file(&self) -> &str {
        "assembly.fasta"
    }

    fn gfa_file(&self) -> &str {
        "assembly_graph.gfa"
    }

    fn normalize_segment_id(&self, segment: &str) -> String {
        if let Some(suffix) = segment.strip_prefix("edge_") {
            format!("contig_{suffix}")
        } else {
            segment.to_string()
        }
    }

    fn attach_auxiliary_metadata(
        &self,
        assembly_dir_abs: &Path,
        contigs: &mut HashMap<String, Contig>,
    ) -> Result<(), ImporterError> {
        let info_path = assembly_dir_abs.join("assembly_info.txt");
        if !info_path.is_file() {
            return Ok(());
        }

        let text = std::fs::read_to_string(&info_path)
            .map_err(|e| ImporterError::danger(self.assembler(), format!("failed to read assembly_info.txt: {e}")))?;

        let mut lines = text.lines();
        let Some(header) = lines.next() else {
            return Ok(());
        };
        let columns: Vec<&str> = header.split('\t').collect();
        let idx = |name: &str| columns.iter().position(|c| *c == name);
        let Some(len_idx) = idx("length") else {
            return Ok(());
        };
        let circ_idx = idx("circ.");
        let Some(cov_idx) = idx("cov.") else {
            return Ok(());
        };

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let Some(contig_name) = fields.first() else {
                continue;
            };
            let Some(contig) = contigs.get_mut(*contig_name) else {
                tracing::warn!(
                    assembler = self.assembler(),
                    contig_name,
                    "assembly_info.txt references a contig missing from the FASTA"
                );
                continue;
            };

            if let Some(info_length) = fields.get(len_idx).and_then(|v| v.parse::<usize>().ok()) {
                if info_length != contig.length() {
                    tracing::warn!(
                        assembler = self.assembler(),
                        contig_name,
                        info_length,
                        fasta_length = contig.length(),
                        "assembly_info.txt length disagrees with FASTA"
                    );
                }
            }

            if let (Some(idx), Some(topology)) = (circ_idx, contig.topology) {
                let info_circular = fields.get(idx).map(|v| *v == "Y").unwrap_or(false);
                let declared_circular = topology == crate::core::Topology::Circular;
                if declared_circular != info_circular {
                    tracing::warn!(
                        assembler = self.assembler(),
                        contig_name,
                        "assembly_info.txt circularity disagrees with the GFA-derived topology"
                    );
                }
            }

            if let Some(cov) = fields.get(cov_idx).and_then(|v| v.parse::<u32>().ok()) {
                contig.set_coverage(cov);
            }
        }

        Ok(())
    }
}
