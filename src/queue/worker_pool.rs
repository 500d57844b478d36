//! Worker pool dispatch.
//!
//! Grounded on SPEC_FULL.md's concurrency model: the pool is realised as OS
//! processes via re-invoking the compiled binary with an internal worker
//! subcommand (`std::process::Command`), not threads, because the plotting
//! backend the spec is modelled on is not thread-safe. `rayon` is reserved for
//! the embarrassingly-parallel, stateless inner loop of per-cluster dotplot
//! rendering within a single worker process (see `orchestrator::render_all_dotplots`).

use std::process::Command;

use crate::importer::Importer;
use crate::queue::{default_db_path, TaskQueue};

/// The argument the coordinator passes to a re-exec'd child so it knows to
/// run as a queue-draining worker instead of parsing the CLI from scratch.
pub const INTERNAL_WORKER_FLAG: &str = "--internal-worker";

/// Default worker count when `--workers` is not given: `cpu_count - 1`,
/// floored at 1.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

/// Spawn `n_workers` worker processes (each a re-exec of the current binary
/// with [`INTERNAL_WORKER_FLAG`]) and block until every one of them has
/// drained the queue and exited.
///
/// # Errors
///
/// Returns an error if the current executable path cannot be determined or a
/// child process cannot be spawned.
pub fn run_worker_pool(n_workers: usize) -> anyhow::Result<()> {
    let exe = std::env::current_exe()?;
    let mut children = Vec::with_capacity(n_workers);
    for _ in 0..n_workers {
        children.push(Command::new(&exe).arg("worker").arg(INTERNAL_WORKER_FLAG).spawn()?);
    }
    for mut child in children {
        child.wait()?;
    }
    Ok(())
}

/// Drain the on-disk queue until empty, running [`crate::orchestrator::process_sample`]
/// for each task and marking it done or failed. This is the body of one
/// worker process.
///
/// # Errors
///
/// Returns an error if the queue database cannot be opened.
pub fn drain_queue(importers: &[Box<dyn Importer>]) -> anyhow::Result<()> {
    let queue = TaskQueue::open(&default_db_path())?;

    while let Some(task) = queue.claim_next()? {
        let result = crate::orchestrator::process_sample(&task.sample_id, &task.sample_dir, importers, false);
        match result {
            Ok(outcome) if !outcome.failed => queue.mark_done(task.id)?,
            Ok(_) => queue.mark_failed(task.id)?,
            Err(err) => {
                tracing::warn!(sample = %task.sample_id, "worker failed: {err}");
                queue.mark_failed(task.id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_worker_count_is_at_least_one() {
        assert!(default_worker_count() >= 1);
    }
}
