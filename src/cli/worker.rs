//! `assembly-curator worker` — start a worker pool draining the task queue.
//!
//! Re-invokes the compiled binary with an internal flag to realise the pool
//! as OS processes rather than threads (see `queue::worker_pool`).

use clap::Args;

use crate::queue::worker_pool;

#[derive(Args)]
pub struct WorkerArgs {
    /// Number of worker processes to run. Defaults to `cpu_count - 1`.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Internal flag: run as a single queue-draining worker process rather
    /// than spawning a pool. Set automatically by the coordinator; not meant
    /// to be passed by hand.
    #[arg(long = "internal-worker", hide = true)]
    pub internal_worker: bool,
}

pub fn run(args: WorkerArgs) -> anyhow::Result<()> {
    if args.internal_worker {
        let importers = crate::importer::registry();
        return worker_pool::drain_queue(&importers);
    }

    let n_workers = args.workers.unwrap_or_else(worker_pool::default_worker_count);
    println!("starting {n_workers} worker process(es)");
    worker_pool::run_worker_pool(n_workers)
}
