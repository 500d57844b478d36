//! End-to-end scenarios for [`assembly_curator::orchestrator::process_sample`],
//! mirroring the boundary scenarios used to validate the importer/ANI/dotplot
//! pipeline against a full sample directory on disk rather than in-memory
//! fixtures.

use std::fs;
use std::path::Path;

use assembly_curator::importer;
use assembly_curator::orchestrator::{self, WORK_DIR};
use tempfile::TempDir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Scenario 1: single assembler, one circular contig (a self-edge in the GFA
/// marks it circular), only one contig group across the whole sample. ANI is
/// skipped (fewer than two groups to compare) and no dotplot files are
/// produced.
#[test]
fn single_circular_contig_skips_ani_and_dotplots() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(
        &sample_dir.join("flye/assembly.fasta"),
        ">contig_1 some header\nACGTACGTACGTACGTACGTACGTACGTACGT\n",
    );
    write_file(
        &sample_dir.join("flye/assembly_graph.gfa"),
        "H\tVN:Z:1.0\nL\tedge_1\t+\tedge_1\t+\t0M\n",
    );

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample1", sample_dir, &importers, false).unwrap();

    assert!(!outcome.failed);
    assert!(outcome.messages.iter().any(|m| m.contains("ANI skipped")));

    let work_dir = sample_dir.join(WORK_DIR);
    assert!(work_dir.join("assemblies.json").exists());
    assert!(!work_dir.join("similarity_matrix.tsv").exists());

    let dotplots_dir = work_dir.join("dotplots");
    let entries: Vec<_> = fs::read_dir(&dotplots_dir).unwrap().collect();
    assert!(entries.is_empty(), "no dotplot should be generated with a single contig group");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(work_dir.join("assemblies.json")).unwrap()).unwrap();
    let groups = json["flye"]["contig_groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    let contigs = groups[0]["contigs"].as_array().unwrap();
    assert_eq!(contigs[0]["topology"], serde_json::json!("circular"));
}

/// Scenario 2: two assemblers each contributing near-identical contig groups
/// merge into a single cluster and produce one dotplot SVG.
#[test]
fn near_identical_groups_across_assemblers_form_one_cluster() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    let seq = "ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";

    write_file(
        &sample_dir.join("flye/assembly.fasta"),
        &format!(">contig_1\n{seq}\n"),
    );
    write_file(&sample_dir.join("flye/assembly_graph.gfa"), "H\tVN:Z:1.0\n");

    write_file(
        &sample_dir.join("lja/assembly.fasta"),
        &format!(">contig_1\n{seq}\n"),
    );
    write_file(&sample_dir.join("lja/assembly_graph.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample2", sample_dir, &importers, false).unwrap();

    assert!(!outcome.failed);
    let work_dir = sample_dir.join(WORK_DIR);

    let tsv = fs::read_to_string(work_dir.join("similarity_matrix.tsv")).unwrap();
    let rows: Vec<&str> = tsv.lines().collect();
    // Header row + one data row per contig group (2 groups here: one per assembler).
    assert_eq!(rows.len(), 3);

    let dotplots_dir = work_dir.join("dotplots");
    let svgs: Vec<_> = fs::read_dir(&dotplots_dir)
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert_eq!(svgs.len(), 1, "identical groups should land in a single cluster with one dotplot");
}

/// Scenario 3: a `P` line joining `s1+,s2-,s3+` groups all three segments
/// together; reverse-complement orientation markers are stripped, not
/// interpreted as separate identities.
#[test]
fn path_line_groups_all_listed_segments_regardless_of_orientation() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(
        &sample_dir.join("lja/assembly.fasta"),
        ">s1\nACGTACGTACGTACGTACGT\n>s2\nGGGGCCCCGGGGCCCCGGGG\n>s3\nTTTTAAAATTTTAAAATTTT\n",
    );
    write_file(
        &sample_dir.join("lja/mdbg.gfa"),
        "P\tpath1\ts1+,s2-,s3+\t*\n",
    );

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample3", sample_dir, &importers, false).unwrap();
    assert!(!outcome.failed);

    let work_dir = sample_dir.join(WORK_DIR);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(work_dir.join("assemblies.json")).unwrap()).unwrap();
    let groups = json["lja"]["contig_groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1, "all three path segments should merge into one group");
    assert_eq!(groups[0]["contigs"].as_array().unwrap().len(), 3);
}

/// Scenario 4: a FASTA contig absent from the GFA edge graph still produces a
/// singleton group rather than a fatal error.
#[test]
fn fasta_contig_absent_from_gfa_becomes_singleton_group() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(
        &sample_dir.join("lja/assembly.fasta"),
        ">s1\nACGTACGTACGTACGTACGT\n>unplaced\nGGGGCCCCGGGGCCCCGGGG\n",
    );
    write_file(&sample_dir.join("lja/mdbg.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample4", sample_dir, &importers, false).unwrap();
    assert!(!outcome.failed);

    let work_dir = sample_dir.join(WORK_DIR);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(work_dir.join("assemblies.json")).unwrap()).unwrap();
    let groups = json["lja"]["contig_groups"].as_array().unwrap();
    assert_eq!(groups.len(), 2, "s1 and unplaced should each be their own singleton group");
}

/// Scenario 5: GC content outside the default [25%, 65%] window produces a
/// non-fatal warning message naming both the observed value and the
/// threshold, and the pipeline still completes.
#[test]
fn high_gc_content_emits_warning_but_completes() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    // 70% GC: 7 G/C bases out of 10.
    write_file(
        &sample_dir.join("lja/assembly.fasta"),
        ">s1\nGGGGGGGAAA\n",
    );
    write_file(&sample_dir.join("lja/mdbg.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample5", sample_dir, &importers, false).unwrap();

    assert!(!outcome.failed);
    let warning = outcome
        .messages
        .iter()
        .find(|m| m.contains("GC content above"))
        .expect("expected a high-GC warning message");
    assert!(warning.contains("65"));
    assert!(warning.contains("70"));
}

/// Scenario 6: a FASTA record containing a character outside {A,T,G,C} is a
/// fatal alphabet violation for that importer; when no importer succeeds the
/// orchestrator writes a `failed` marker and an HTML stub listing the message.
#[test]
fn alphabet_violation_is_fatal_and_writes_failure_marker() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(&sample_dir.join("lja/assembly.fasta"), ">s1\nACGTN\n");
    write_file(&sample_dir.join("lja/mdbg.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample6", sample_dir, &importers, false).unwrap();

    assert!(outcome.failed);
    assert!(outcome.messages.iter().any(|m| m.contains("invalid alphabet")));

    let work_dir = sample_dir.join(WORK_DIR);
    assert!(work_dir.join("failed").exists());
    let html = fs::read_to_string(work_dir.join("assemblies.html")).unwrap();
    assert!(html.contains("invalid alphabet"));
}

/// Scenario 6b: an alphabet violation in one importer's FASTA must abort the
/// whole sample even when a second importer succeeds. This is the Fatal
/// category from the error taxonomy, distinct from Warning/Danger: it is not
/// enough for the failing importer to be skipped while the sample proceeds
/// with the survivor's assembly.
#[test]
fn alphabet_violation_fails_sample_even_when_another_importer_succeeds() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(&sample_dir.join("lja/assembly.fasta"), ">s1\nACGTN\n");
    write_file(&sample_dir.join("lja/mdbg.gfa"), "H\tVN:Z:1.0\n");

    write_file(
        &sample_dir.join("flye/assembly.fasta"),
        ">contig_1\nACGTACGTACGTACGTACGT\n",
    );
    write_file(&sample_dir.join("flye/assembly_graph.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    let outcome = orchestrator::process_sample("sample6b", sample_dir, &importers, false).unwrap();

    assert!(outcome.failed, "flye succeeding must not mask lja's fatal alphabet violation");
    assert!(outcome.messages.iter().any(|m| m.contains("invalid alphabet")));

    let work_dir = sample_dir.join(WORK_DIR);
    assert!(work_dir.join("failed").exists());
    assert!(
        !work_dir.join("assemblies.json").exists(),
        "a fatal import error must not produce a normal assemblies.json artefact"
    );
}

/// Orchestrator idempotence: re-running without `force_rerun` does not touch
/// the already-written artefacts.
#[test]
fn rerun_without_force_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(
        &sample_dir.join("lja/assembly.fasta"),
        ">s1\nACGTACGTACGTACGTACGT\n",
    );
    write_file(&sample_dir.join("lja/mdbg.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    orchestrator::process_sample("sample7", sample_dir, &importers, false).unwrap();
    let work_dir = sample_dir.join(WORK_DIR);
    let first = fs::read_to_string(work_dir.join("assemblies.json")).unwrap();

    let second_outcome = orchestrator::process_sample("sample7", sample_dir, &importers, false).unwrap();
    assert!(second_outcome.skipped);
    let second = fs::read_to_string(work_dir.join("assemblies.json")).unwrap();

    assert_eq!(first, second);
}

/// `--force` recreates the work directory and regenerates artefacts from
/// scratch rather than silently skipping.
#[test]
fn force_rerun_regenerates_artefacts() {
    let tmp = TempDir::new().unwrap();
    let sample_dir = tmp.path();

    write_file(
        &sample_dir.join("lja/assembly.fasta"),
        ">s1\nACGTACGTACGTACGTACGT\n",
    );
    write_file(&sample_dir.join("lja/mdbg.gfa"), "H\tVN:Z:1.0\n");

    let importers = importer::registry();
    orchestrator::process_sample("sample8", sample_dir, &importers, false).unwrap();
    let second = orchestrator::process_sample("sample8", sample_dir, &importers, true).unwrap();

    assert!(!second.skipped);
    assert!(!second.failed);
}
