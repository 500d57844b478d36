//! `assembly-curator status <sample_dir>` — print a sample's current state by
//! inspecting its marker files, per SPEC_FULL.md §4.7.

use std::path::PathBuf;

use clap::Args;

use crate::orchestrator::WORK_DIR;

#[derive(Args)]
pub struct StatusArgs {
    /// Sample directory to inspect.
    pub sample_dir: PathBuf,
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let work_dir = args.sample_dir.join(WORK_DIR);

    let state = if work_dir.join("hybrid.fasta").exists() {
        "finished"
    } else if work_dir.join("failed").exists() {
        "failed"
    } else if work_dir.join("assemblies.bin").exists() {
        "preprocessed"
    } else if work_dir.is_dir() {
        "processing"
    } else {
        "not started"
    };

    println!("{state}");
    Ok(())
}
