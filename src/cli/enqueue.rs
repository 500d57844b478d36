//! `assembly-curator enqueue <sample_dir>` — push a task onto the on-disk
//! queue and return immediately.

use std::path::PathBuf;

use clap::Args;

use crate::queue::{default_db_path, TaskQueue};

#[derive(Args)]
pub struct EnqueueArgs {
    /// Sample directory containing one or more `<assembler>/` subfolders.
    pub sample_dir: PathBuf,
}

pub fn run(args: EnqueueArgs) -> anyhow::Result<()> {
    let sample_id = args
        .sample_dir
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| args.sample_dir.display().to_string());

    let queue = TaskQueue::open(&default_db_path())?;
    let task_id = queue.enqueue(&sample_id, &args.sample_dir)?;
    println!("enqueued task {task_id} for {sample_id}");
    Ok(())
}
