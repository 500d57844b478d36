//! Command-line interface for assembly-curator.
//!
//! This module implements the CLI using clap, grounded on the teacher's
//! `cli/mod.rs` shape (a top-level `Cli` with global `--verbose`, dispatching
//! to subcommands). Available commands:
//!
//! - **process**: run the per-sample pipeline once, synchronously
//! - **enqueue**: push a sample onto the on-disk task queue
//! - **worker**: start a worker pool draining the queue
//! - **status**: inspect a sample's marker files
//!
//! ## Usage
//!
//! ```text
//! # Process one sample synchronously
//! assembly-curator process samples/sample1
//!
//! # Enqueue a sample for later processing
//! assembly-curator enqueue samples/sample1
//!
//! # Start a worker pool that drains the queue
//! assembly-curator worker --workers 4
//!
//! # Check a sample's current state
//! assembly-curator status samples/sample1
//! ```

use clap::{Parser, Subcommand};

pub mod enqueue;
pub mod process;
pub mod status;
pub mod worker;

#[derive(Parser)]
#[command(name = "assembly-curator")]
#[command(author = "Assembly Curator Contributors")]
#[command(version)]
#[command(about = "Curate multi-assembler bacterial whole-genome assemblies")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the per-sample pipeline once, synchronously
    Process(process::ProcessArgs),

    /// Push a sample onto the on-disk task queue
    Enqueue(enqueue::EnqueueArgs),

    /// Start (or join) a worker pool draining the task queue
    Worker(worker::WorkerArgs),

    /// Inspect a sample's current state via its marker files
    Status(status::StatusArgs),
}
