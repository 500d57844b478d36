//! External long-read mapper backend, grounded on `dotplots_minimap2.py`:
//! shells out to `minimap2`, parses its PAF-like output, and converts each
//! record into an [`Alignment`] line segment.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::dotplot::{Aligner, Alignment, Strand};

/// Hard timeout for one `minimap2` invocation. After this the worker gives up
/// on the pair and treats it as having produced no alignments.
pub const MAPPER_TIMEOUT: Duration = Duration::from_secs(1000);

/// Shells out to `minimap2`, writing `ref_seq`/`qry_seq` to scratch FASTA
/// files under a fresh temporary directory per invocation (so concurrent
/// calls from different worker threads/processes never collide).
pub struct MapperAligner {
    extra_args: Vec<String>,
}

impl MapperAligner {
    #[must_use]
    pub fn new(extra_args: Vec<String>) -> Self {
        MapperAligner { extra_args }
    }
}

impl Default for MapperAligner {
    fn default() -> Self {
        MapperAligner::new(Vec::new())
    }
}

impl Aligner for MapperAligner {
    fn align(&self, ref_seq: &[u8], qry_seq: &[u8]) -> Vec<Alignment> {
        match run_minimap2(ref_seq, qry_seq, &self.extra_args) {
            Ok(paf) => parse_paf(&paf),
            Err(err) => {
                tracing::warn!(error = %err, "minimap2 invocation failed, treating pair as unaligned");
                Vec::new()
            }
        }
    }
}

fn run_minimap2(ref_seq: &[u8], qry_seq: &[u8], extra_args: &[String]) -> std::io::Result<String> {
    let dir = tempfile::tempdir()?;
    let ref_path = dir.path().join("ref.fasta");
    let qry_path = dir.path().join("qry.fasta");
    write_fasta(&ref_path, b"ref", ref_seq)?;
    write_fasta(&qry_path, b"qry", qry_seq)?;

    let mut child = Command::new("minimap2")
        .args(extra_args)
        .arg(&ref_path)
        .arg(&qry_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let mut stdout = String::new();
            if let Some(mut out) = child.stdout.take() {
                use std::io::Read;
                out.read_to_string(&mut stdout)?;
            }
            if !status.success() {
                return Err(std::io::Error::other("minimap2 exited with a non-zero status"));
            }
            return Ok(stdout);
        }
        if start.elapsed() > MAPPER_TIMEOUT {
            let _ = child.kill();
            return Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "minimap2 exceeded its timeout",
            ));
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

fn write_fasta(path: &PathBuf, name: &[u8], seq: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(b">")?;
    file.write_all(name)?;
    file.write_all(b"\n")?;
    file.write_all(seq)?;
    file.write_all(b"\n")
}

/// Parse PAF-like tab-separated output into alignments. Reverse-strand hits
/// have their query start/end swapped on ingestion so the resulting line
/// slopes the right way in the dotplot.
fn parse_paf(output: &str) -> Vec<Alignment> {
    let mut alignments = Vec::new();
    for line in output.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }
        let (Ok(mut qry_start), Ok(mut qry_end)) = (fields[2].parse::<usize>(), fields[3].parse::<usize>()) else {
            continue;
        };
        let strand_field = fields[4];
        let (Ok(ref_start), Ok(ref_end)) = (fields[7].parse::<usize>(), fields[8].parse::<usize>()) else {
            continue;
        };

        let strand = if strand_field == "-" {
            std::mem::swap(&mut qry_start, &mut qry_end);
            Strand::Reverse
        } else {
            Strand::Forward
        };

        let primary = fields[12..]
            .iter()
            .any(|tag| *tag == "tp:A:P");

        alignments.push(Alignment {
            ref_start,
            ref_end,
            qry_start,
            qry_end,
            strand,
            primary,
        });
    }
    alignments
}
