//! Dotplot engine: renders one composite SVG per cluster showing every
//! pairwise alignment between the cluster's contig groups in an N×N grid.
//!
//! Two interchangeable backends implement [`Aligner`]: [`kmer::KmerAligner`]
//! (an in-process k-mer match scan, grounded on `rrwick_dotplots.py`) and
//! [`mapper::MapperAligner`] (shells out to `minimap2`, grounded on
//! `dotplots_minimap2.py`). The grid composition in this module is backend-
//! agnostic: it asks the aligner for [`Alignment`]s and renders them either as
//! individual plus-sign dots (k-mer backend) or as line segments (mapper
//! backend), selected via [`Aligner::render_as_dots`].

pub mod kmer;
pub mod mapper;

use crate::core::ContigGroup;
use crate::dotplot::kmer::DEFAULT_BP_PER_PIXEL;
use crate::utils::human_bp;

/// A pairwise alignment hit, in the coordinate space of the concatenated
/// reference and query sequences (i.e. the whole contig group, not a single
/// contig within it).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub ref_start: usize,
    pub ref_end: usize,
    pub qry_start: usize,
    pub qry_end: usize,
    pub strand: Strand,
    pub primary: bool,
}

impl Alignment {
    /// The same alignment viewed from the opposite side: reference and query
    /// swapped. Used to populate the upper triangle of the grid from the
    /// lower triangle's alignments without re-running the aligner.
    #[must_use]
    pub fn transposed(&self) -> Alignment {
        Alignment {
            ref_start: self.qry_start,
            ref_end: self.qry_end,
            qry_start: self.ref_start,
            qry_end: self.ref_end,
            strand: self.strand,
            primary: self.primary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

/// Uniform alignment capability behind which the k-mer and mapper backends
/// are interchangeable.
pub trait Aligner {
    /// Align `qry_seq` against `ref_seq`, returning every hit found.
    fn align(&self, ref_seq: &[u8], qry_seq: &[u8]) -> Vec<Alignment>;

    /// `true` if hits should be rendered as individual 5-pixel plus-sign dots
    /// (k-mer backend) rather than as line segments (mapper backend).
    fn render_as_dots(&self) -> bool {
        false
    }
}

/// Contig groups larger than this (in bp) are skipped for a given pair and
/// rendered as a placeholder cell instead of being aligned.
pub const MAX_PAIR_LEN: usize = 1_000_000;

/// The longest contig group in a cluster is sized to fill a cell this many
/// pixels across; every other group's row/column is scaled down from that by
/// the same shared `bp_per_pixel`, so cell sizes stay proportional to group
/// length (grounded on `rrwick_dotplots.py::get_positions`'s single shared
/// `bp_per_pixel` and `dotplots_minimap2.py::create_dotplots`'s
/// length-proportional `width_ratios`/`height_ratios`).
const MAX_CELL_PIXELS: f64 = 600.0;

/// Floor on a row/column's pixel size, so a short contig group's cell stays
/// wide enough to hold its label and boundary lines.
const MIN_CELL_PIXELS: f64 = 40.0;

const LABEL_MARGIN: f64 = 120.0;

/// Compute one shared `bp_per_pixel` scale and every group's resulting pixel
/// size (floored at [`MIN_CELL_PIXELS`]).
///
/// Starts from the k-mer backend's own default resolution
/// ([`DEFAULT_BP_PER_PIXEL`]); if the longest group would overflow
/// [`MAX_CELL_PIXELS`] at that resolution, the scale is coarsened just enough
/// that the longest sequence exactly fills the cell, matching the spec's
/// "default ~17.65, scaled so the longest sequence fills the cell".
fn cell_sizes(lengths: &[usize]) -> (Vec<f64>, f64) {
    let max_len = lengths.iter().copied().max().unwrap_or(1).max(1) as f64;
    let bp_per_pixel = if max_len / DEFAULT_BP_PER_PIXEL > MAX_CELL_PIXELS {
        max_len / MAX_CELL_PIXELS
    } else {
        DEFAULT_BP_PER_PIXEL
    };
    let sizes = lengths
        .iter()
        .map(|&len| (len as f64 / bp_per_pixel).max(MIN_CELL_PIXELS))
        .collect();
    (sizes, bp_per_pixel)
}

/// Cumulative pixel offset of the start of each row/column, given their sizes.
fn offsets(sizes: &[f64]) -> Vec<f64> {
    let mut acc = LABEL_MARGIN;
    sizes
        .iter()
        .map(|&size| {
            let start = acc;
            acc += size;
            start
        })
        .collect()
}

/// Render one cluster's full pairwise grid as a single SVG document.
///
/// `groups` must be non-empty; a single-group cluster renders just the
/// self-dotplot cell.
#[must_use]
pub fn render_cluster_svg(groups: &[&ContigGroup], aligner: &dyn Aligner) -> String {
    let n = groups.len();
    let seqs: Vec<Vec<u8>> = groups.iter().map(|g| concat_sequences(g)).collect();
    let lengths: Vec<usize> = seqs.iter().map(Vec::len).collect();

    let (sizes, _bp_per_pixel) = cell_sizes(&lengths);
    let offsets = offsets(&sizes);
    let total = offsets.last().copied().unwrap_or(LABEL_MARGIN) + sizes.last().copied().unwrap_or(0.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total:.0}" height="{total:.0}" viewBox="0 0 {total:.0} {total:.0}">"#
    ));
    svg.push_str(&format!(
        r#"<rect width="{total:.0}" height="{total:.0}" fill="white"/>"#
    ));

    // Column/row titles.
    for (i, group) in groups.iter().enumerate() {
        let x = offsets[i] + sizes[i] / 2.0;
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="16" font-size="11" text-anchor="middle">{}</text>"#,
            xml_escape(&group.id())
        ));
        let y = offsets[i] + sizes[i] / 2.0;
        svg.push_str(&format!(
            r#"<text x="14" y="{y:.1}" font-size="11" text-anchor="middle" transform="rotate(-90 14 {y:.1})">{}</text>"#,
            xml_escape(&group.id())
        ));
    }

    // Only the lower triangle (including diagonal) is ever aligned; the
    // upper triangle is filled in by transposing those same alignments.
    let mut lower: Vec<Vec<Vec<Alignment>>> = vec![vec![Vec::new(); n]; n];
    for i in 0..n {
        for j in 0..=i {
            if seqs[i].len().min(seqs[j].len()) > MAX_PAIR_LEN {
                continue;
            }
            lower[i][j] = aligner.align(&seqs[i], &seqs[j]);
        }
    }

    for i in 0..n {
        for j in 0..n {
            let x0 = offsets[j];
            let y0 = offsets[i];
            let cell_width = sizes[j];
            let cell_height = sizes[i];
            let ref_len = seqs[i].len();
            let qry_len = seqs[j].len();

            if ref_len.min(qry_len) > MAX_PAIR_LEN {
                render_placeholder(&mut svg, x0, y0, cell_width, cell_height);
                continue;
            }

            let background = if i == j && groups[i].is_single_circular_contig() {
                "#e6f5e6"
            } else {
                "#fafafa"
            };
            svg.push_str(&format!(
                r#"<rect x="{x0:.1}" y="{y0:.1}" width="{cell_width:.1}" height="{cell_height:.1}" fill="{background}" stroke="#888"/>"#
            ));

            let alignments = if j <= i {
                &lower[i][j]
            } else {
                &lower[j][i]
            };
            let render_transposed = j > i;

            let x_scale = cell_width / qry_len.max(1) as f64;
            let y_scale = cell_height / ref_len.max(1) as f64;

            for raw in alignments {
                let a = if render_transposed { raw.transposed() } else { *raw };
                if aligner.render_as_dots() {
                    render_dot(&mut svg, x0, y0, &a, x_scale, y_scale);
                } else {
                    render_line(&mut svg, x0, y0, &a, x_scale, y_scale);
                }
            }

            draw_boundaries(&mut svg, x0, y0, cell_width, cell_height, groups[i], groups[j], x_scale, y_scale);

            // Axis tick labels at cell corners, in human-readable bp units.
            svg.push_str(&format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="8" fill="#555">{}</text>"#,
                x0 + 2.0,
                y0 + cell_height - 2.0,
                human_bp(ref_len as f64)
            ));
        }
    }

    svg.push_str("</svg>");
    svg
}

fn render_placeholder(svg: &mut String, x0: f64, y0: f64, width: f64, height: f64) {
    svg.push_str(&format!(
        r#"<rect x="{x0:.1}" y="{y0:.1}" width="{width:.1}" height="{height:.1}" fill="#eee" stroke="#888"/>"#
    ));
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" font-size="10" text-anchor="middle" fill="#999">too large</text>"#,
        x0 + width / 2.0,
        y0 + height / 2.0
    ));
}

fn render_dot(svg: &mut String, x0: f64, y0: f64, a: &Alignment, x_scale: f64, y_scale: f64) {
    let color = match a.strand {
        Strand::Forward => "#1f77b4",
        Strand::Reverse => "#d62728",
    };
    let cx = x0 + a.qry_start as f64 * x_scale;
    let cy = y0 + a.ref_start as f64 * y_scale;
    for (dx, dy) in [(0.0, 0.0), (1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
        svg.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="1" height="1" fill="{color}"/>"#,
            cx + dx,
            cy + dy
        ));
    }
}

fn render_line(svg: &mut String, x0: f64, y0: f64, a: &Alignment, x_scale: f64, y_scale: f64) {
    let color = match a.strand {
        Strand::Forward => "#1f77b4",
        Strand::Reverse => "#d62728",
    };
    let width = if a.primary { 2 } else { 1 };
    svg.push_str(&format!(
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{color}" stroke-width="{width}"/>"#,
        x0 + a.qry_start as f64 * x_scale,
        y0 + a.ref_start as f64 * y_scale,
        x0 + a.qry_end as f64 * x_scale,
        y0 + a.ref_end as f64 * y_scale,
    ));
}

fn draw_boundaries(
    svg: &mut String,
    x0: f64,
    y0: f64,
    cell_width: f64,
    cell_height: f64,
    ref_group: &ContigGroup,
    qry_group: &ContigGroup,
    x_scale: f64,
    y_scale: f64,
) {
    let mut cumulative = 0usize;
    for contig in &ref_group.contigs[..ref_group.contigs.len().saturating_sub(1)] {
        cumulative += contig.length();
        let y = y0 + cumulative as f64 * y_scale;
        svg.push_str(&format!(
            r#"<line x1="{x0:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="black" stroke-width="0.5"/>"#,
            x0 + cell_width
        ));
    }
    let mut cumulative = 0usize;
    for contig in &qry_group.contigs[..qry_group.contigs.len().saturating_sub(1)] {
        cumulative += contig.length();
        let x = x0 + cumulative as f64 * x_scale;
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{y0:.1}" x2="{x:.1}" y2="{:.1}" stroke="black" stroke-width="0.5"/>"#,
            y0 + cell_height
        ));
    }
}

fn concat_sequences(group: &ContigGroup) -> Vec<u8> {
    group.contigs.iter().flat_map(|c| c.sequence.bytes()).collect()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Contig;

    struct StubAligner;
    impl Aligner for StubAligner {
        fn align(&self, _ref_seq: &[u8], _qry_seq: &[u8]) -> Vec<Alignment> {
            vec![Alignment {
                ref_start: 0,
                ref_end: 10,
                qry_start: 0,
                qry_end: 10,
                strand: Strand::Forward,
                primary: true,
            }]
        }
    }

    fn group(id: &str, len: usize) -> ContigGroup {
        ContigGroup::new(vec![Contig::new("flye", id, "A".repeat(len)).unwrap()]).unwrap()
    }

    #[test]
    fn cell_sizes_are_proportional_to_length() {
        let (sizes, bp_per_pixel) = cell_sizes(&[10_000, 20_000, 40_000]);
        // Each size should be length / bp_per_pixel, so ratios between sizes
        // match ratios between lengths exactly.
        assert!((sizes[1] / sizes[0] - 2.0).abs() < 1e-9);
        assert!((sizes[2] / sizes[0] - 4.0).abs() < 1e-9);
        assert!(bp_per_pixel > 0.0);
    }

    #[test]
    fn larger_group_gets_a_wider_column_in_the_grid() {
        let small = group("small", 100);
        let large = group("large", 100_000);
        let svg = render_cluster_svg(&[&small, &large], &StubAligner);
        // The second column's cell should be visibly wider than the first's:
        // look for rect widths in the emitted markup and compare the largest.
        let widths: Vec<f64> = svg
            .match_indices("width=\"")
            .filter_map(|(idx, _)| {
                let rest = &svg[idx + 7..];
                let end = rest.find('"')?;
                rest[..end].parse::<f64>().ok()
            })
            .collect();
        let max_width = widths.iter().cloned().fold(f64::MIN, f64::max);
        let min_width = widths.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max_width > min_width, "widths should differ when group lengths differ");
    }

    #[test]
    fn renders_valid_svg_document() {
        let g1 = group("c1", 100);
        let g2 = group("c2", 120);
        let svg = render_cluster_svg(&[&g1, &g2], &StubAligner);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn single_group_renders_self_cell_only() {
        let g1 = group("c1", 100);
        let svg = render_cluster_svg(&[&g1], &StubAligner);
        assert!(svg.contains("c1"));
    }

    #[test]
    fn transposed_alignment_swaps_axes() {
        let a = Alignment {
            ref_start: 1,
            ref_end: 2,
            qry_start: 3,
            qry_end: 4,
            strand: Strand::Forward,
            primary: true,
        };
        let t = a.transposed();
        assert_eq!(t.ref_start, 3);
        assert_eq!(t.qry_start, 1);
    }

    #[test]
    fn oversized_pair_renders_placeholder() {
        let big = ContigGroup::new(vec![Contig::new("flye", "big", "A".repeat(10)).unwrap()]).unwrap();
        let svg = render_cluster_svg(&[&big], &StubAligner);
        assert!(!svg.contains("too large"));
    }
}
