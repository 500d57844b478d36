//! Per-sample orchestrator: runs the whole import → ANI → dotplot → serialise
//! pipeline for one sample directory.
//!
//! Grounded on `original_source/assembly_curator/main_base.py::process_sample`
//! and `create_all_dotplots`. Phases run strictly in order within a sample;
//! no ordering is guaranteed across samples (every artefact path is
//! namespaced under its own `sample_dir`, so cross-sample writes cannot race).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::ani;
use crate::core::Assembly;
use crate::dotplot::{self, kmer::KmerAligner};
use crate::importer::Importer;

/// Directory name holding all of a sample's generated artefacts, relative to
/// `sample_dir`. Matches the original's `assembly-curator` work directory.
pub const WORK_DIR: &str = "assembly-curator";

/// GC-content warning gate, percent thresholds read from `GC_LOW`/`GC_HIGH`.
#[derive(Debug, Clone, Copy)]
pub struct GcThresholds {
    pub low: f64,
    pub high: f64,
}

impl GcThresholds {
    const DEFAULT_LOW: f64 = 25.0;
    const DEFAULT_HIGH: f64 = 65.0;

    #[must_use]
    pub fn from_env() -> Self {
        GcThresholds {
            low: env_f64("GC_LOW", Self::DEFAULT_LOW),
            high: env_f64("GC_HIGH", Self::DEFAULT_HIGH),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn multiprocessing_dotplots_enabled() -> bool {
    std::env::var("MULTIPROCESSING_DOTPLOTS")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Outcome of one [`process_sample`] call, for the CLI to report.
#[derive(Debug, Default)]
pub struct SampleOutcome {
    pub messages: Vec<String>,
    pub failed: bool,
    /// `true` if the sample was already processed and this call was a no-op.
    pub skipped: bool,
}

/// Run the full per-sample pipeline.
///
/// # Errors
///
/// Returns an error only for unexpected I/O failures (writing artefacts);
/// expected per-sample failures (no importer succeeded, alphabet violations)
/// are reported via `Ok(SampleOutcome { failed: true, .. })` plus a `failed`
/// marker file, matching the spec's Fatal-category handling.
pub fn process_sample(
    sample_id: &str,
    sample_dir: &Path,
    importers: &[Box<dyn Importer>],
    force_rerun: bool,
) -> anyhow::Result<SampleOutcome> {
    let work_dir = sample_dir.join(WORK_DIR);
    let failed_marker = work_dir.join("failed");

    if work_dir.is_dir() && !force_rerun && !failed_marker.exists() {
        return Ok(SampleOutcome {
            skipped: true,
            ..Default::default()
        });
    }
    if work_dir.is_dir() {
        std::fs::remove_dir_all(&work_dir)?;
    }
    std::fs::create_dir_all(&work_dir)?;
    std::fs::create_dir_all(work_dir.join("dotplots"))?;

    let (mut assemblies, mut messages, fatal) = load_assemblies(sample_id, sample_dir, importers);

    if assemblies.is_empty() || fatal {
        let reason = if fatal {
            "a fatal error occurred while importing the sample\n"
        } else {
            "no importer produced an assembly\n"
        };
        std::fs::write(&failed_marker, reason)?;
        write_html_stub(&work_dir.join("assemblies.html"), sample_id, &messages)?;
        return Ok(SampleOutcome {
            messages,
            failed: true,
            skipped: false,
        });
    }

    apply_gc_gate(&assemblies, &GcThresholds::from_env(), &mut messages);

    let cg_to_cluster = match ani::compute_similarity(&assemblies) {
        Ok(result) => {
            ani::persist::write_similarity_tsv(&result, &work_dir.join("similarity_matrix.tsv"))?;
            ani::persist::write_clustermap_svg(&result, &work_dir.join("ani_clustermap.svg"))?;
            result.cg_to_cluster
        }
        Err(err) => {
            messages.push(format!("ANI skipped: {err}"));
            tracing::warn!(sample = sample_id, "ANI engine skipped: {err}");
            HashMap::new()
        }
    };

    for assembly in &mut assemblies {
        for group in &mut assembly.contig_groups {
            if let Some(assignment) = cg_to_cluster.get(&group.id()) {
                group.set_cluster(assignment.cluster_id, assignment.color);
            }
        }
    }

    render_all_dotplots(&assemblies, &work_dir.join("dotplots"));

    write_artefacts(&assemblies, &work_dir)?;
    write_html_stub(&work_dir.join("assemblies.html"), sample_id, &messages)?;

    Ok(SampleOutcome {
        messages,
        failed: false,
        skipped: false,
    })
}

/// Try each importer in turn, collecting every `Assembly` that loads
/// successfully and the messages for the ones that don't.
///
/// The returned `bool` is set if any importer reported a `Fatal` error (see
/// [`crate::importer::Severity`]): the caller must abort the whole sample in
/// that case, even if other importers in this same loop succeeded, matching
/// the spec's Fatal-category handling ("abort the sample ... regardless of
/// other importers").
fn load_assemblies(
    sample_id: &str,
    sample_dir: &Path,
    importers: &[Box<dyn Importer>],
) -> (Vec<Assembly>, Vec<String>, bool) {
    let mut assemblies = Vec::new();
    let mut messages = Vec::new();
    let mut fatal = false;

    for importer in importers {
        match importer.load_assembly(sample_dir) {
            Ok(assembly) => assemblies.push(assembly),
            Err(err) => {
                if err.is_fatal() {
                    fatal = true;
                    tracing::error!(sample = sample_id, assembler = %err.assembler, "{}", err.message);
                } else {
                    tracing::warn!(sample = sample_id, assembler = %err.assembler, "{}", err.message);
                }
                messages.push(err.to_string());
            }
        }
    }

    (assemblies, messages, fatal)
}

fn apply_gc_gate(assemblies: &[Assembly], thresholds: &GcThresholds, messages: &mut Vec<String>) {
    for assembly in assemblies {
        for group in &assembly.contig_groups {
            for contig in &group.contigs {
                let gc_pct = contig.gc_rel() * 100.0;
                if gc_pct < thresholds.low {
                    let msg = format!(
                        "GC content below {:.2}% ({:.2}%) for {}",
                        thresholds.low,
                        gc_pct,
                        contig.id()
                    );
                    tracing::warn!("{msg}");
                    messages.push(msg);
                } else if gc_pct > thresholds.high {
                    let msg = format!(
                        "GC content above {:.2}% ({:.2}%) for {}",
                        thresholds.high,
                        gc_pct,
                        contig.id()
                    );
                    tracing::warn!("{msg}");
                    messages.push(msg);
                }
            }
        }
    }
}

fn render_all_dotplots(assemblies: &[Assembly], dotplots_dir: &Path) {
    let mut cluster_to_groups: HashMap<u32, Vec<&crate::core::ContigGroup>> = HashMap::new();
    for assembly in assemblies {
        for group in &assembly.contig_groups {
            if let Some(cluster_id) = group.cluster_id {
                cluster_to_groups.entry(cluster_id).or_default().push(group);
            }
        }
    }

    let render_one = |cluster_id: &u32, groups: &Vec<&crate::core::ContigGroup>| {
        let aligner = KmerAligner::default();
        let svg = dotplot::render_cluster_svg(groups, &aligner);
        let path = dotplots_dir.join(format!("{cluster_id}.svg"));
        if let Err(err) = std::fs::write(&path, svg) {
            tracing::warn!(cluster_id, "failed to write dotplot: {err}");
        }
    };

    if multiprocessing_dotplots_enabled() {
        cluster_to_groups
            .par_iter()
            .for_each(|(cluster_id, groups)| render_one(cluster_id, groups));
    } else {
        for (cluster_id, groups) in &cluster_to_groups {
            render_one(cluster_id, groups);
        }
    }
}

fn write_artefacts(assemblies: &[Assembly], work_dir: &Path) -> anyhow::Result<()> {
    let mut json_map = serde_json::Map::new();
    for assembly in assemblies {
        json_map.insert(assembly.assembler.clone(), assembly.to_json(false));
    }
    std::fs::write(
        work_dir.join("assemblies.json"),
        serde_json::to_string_pretty(&serde_json::Value::Object(json_map))?,
    )?;

    let snapshot = bincode::serialize(assemblies)?;
    std::fs::write(work_dir.join("assemblies.bin"), snapshot)?;

    Ok(())
}

fn write_html_stub(path: &Path, sample_id: &str, messages: &[String]) -> std::io::Result<()> {
    let mut body = format!("<html><head><title>{sample_id}</title></head><body>\n");
    body.push_str(&format!("<h1>{sample_id}</h1>\n<ul>\n"));
    for message in messages {
        body.push_str(&format!("<li>{}</li>\n", xml_escape(message)));
    }
    body.push_str("</ul>\n</body></html>\n");
    std::fs::write(path, body)
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_flye_sample(sample_dir: &Path) {
        let flye_dir = sample_dir.join("flye");
        fs::create_dir_all(&flye_dir).unwrap();
        fs::write(
            flye_dir.join("assembly.fasta"),
            ">contig_1\nACGTACGTACGTACGTACGTACGTACGTACGT\n>contig_2\nGGGGCCCCGGGGCCCCGGGGCCCCGGGGCCCC\n",
        )
        .unwrap();
        fs::write(flye_dir.join("assembly_graph.gfa"), "H\tVN:Z:1.0\n").unwrap();
    }

    #[test]
    fn writes_failure_marker_when_no_importer_succeeds() {
        let tmp = TempDir::new().unwrap();
        let importers: Vec<Box<dyn Importer>> = crate::importer::registry();
        let outcome = process_sample("s1", tmp.path(), &importers, false).unwrap();
        assert!(outcome.failed);
        assert!(tmp.path().join(WORK_DIR).join("failed").exists());
    }

    #[test]
    fn successful_run_writes_assemblies_json() {
        let tmp = TempDir::new().unwrap();
        write_flye_sample(tmp.path());
        let importers: Vec<Box<dyn Importer>> = crate::importer::registry();
        let outcome = process_sample("s1", tmp.path(), &importers, false).unwrap();
        assert!(!outcome.failed);
        assert!(tmp.path().join(WORK_DIR).join("assemblies.json").exists());
        assert!(tmp.path().join(WORK_DIR).join("assemblies.bin").exists());
    }

    #[test]
    fn second_call_without_force_rerun_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_flye_sample(tmp.path());
        let importers: Vec<Box<dyn Importer>> = crate::importer::registry();
        process_sample("s1", tmp.path(), &importers, false).unwrap();
        let second = process_sample("s1", tmp.path(), &importers, false).unwrap();
        assert!(second.skipped);
    }

    #[test]
    fn gc_gate_flags_high_gc_content() {
        let assembly = {
            let mut a = Assembly::new("flye", PathBuf::from("flye"));
            let contig = crate::core::Contig::new("flye", "c1", "G".repeat(100)).unwrap();
            a.contig_groups.push(crate::core::ContigGroup::new(vec![contig]).unwrap());
            a
        };
        let mut messages = Vec::new();
        apply_gc_gate(&[assembly], &GcThresholds::from_env(), &mut messages);
        assert!(messages.iter().any(|m| m.contains("GC content above")));
    }
}
