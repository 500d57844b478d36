//! Core sequence model: `Contig`, `ContigGroup`, `Assembly`.
//!
//! Every contig belongs to exactly one contig group, and every contig group
//! belongs to exactly one assembly. Contigs are immutable after construction
//! except for the `topology`/`location`/`coverage` annotations attached by the
//! importer framework from auxiliary files, and the `cluster_id`/`cluster_color`
//! annotations attached to their enclosing group by the ANI engine.

pub mod assembly;
pub mod contig;
pub mod contig_group;
pub mod types;

pub use assembly::Assembly;
pub use contig::Contig;
pub use contig_group::ContigGroup;
pub use types::{AtgcCount, Location, Topology};
