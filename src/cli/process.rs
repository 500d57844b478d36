//! `assembly-curator process <sample_dir>` — run the per-sample pipeline
//! once, synchronously.

use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct ProcessArgs {
    /// Sample directory containing one or more `<assembler>/` subfolders.
    pub sample_dir: PathBuf,

    /// Rerun even if the sample was already processed.
    #[arg(long)]
    pub force: bool,

    /// Override the `GC_LOW` environment variable for this invocation.
    #[arg(long)]
    pub gc_low: Option<f64>,

    /// Override the `GC_HIGH` environment variable for this invocation.
    #[arg(long)]
    pub gc_high: Option<f64>,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    // SAFETY: `process` runs as a single-threaded, short-lived CLI invocation
    // before any worker pool or other thread is spawned, so no other thread
    // can be reading the environment concurrently with this mutation.
    unsafe {
        if let Some(low) = args.gc_low {
            std::env::set_var("GC_LOW", low.to_string());
        }
        if let Some(high) = args.gc_high {
            std::env::set_var("GC_HIGH", high.to_string());
        }
    }

    let sample_id = sample_id_of(&args.sample_dir);
    let importers = crate::importer::registry();
    let outcome = crate::orchestrator::process_sample(&sample_id, &args.sample_dir, &importers, args.force)?;

    if outcome.skipped {
        println!("{sample_id}: already processed (use --force to rerun)");
    } else if outcome.failed {
        println!("{sample_id}: failed");
    } else {
        println!("{sample_id}: done");
    }
    for message in &outcome.messages {
        println!("  - {message}");
    }

    Ok(())
}

fn sample_id_of(sample_dir: &std::path::Path) -> String {
    sample_dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| sample_dir.display().to_string())
}
