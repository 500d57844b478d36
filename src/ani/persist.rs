//! Persistence for the ANI engine's output: the similarity matrix as TSV and
//! the clustermap as an SVG heatmap with an embedded JSON copy of the matrix.

use std::fmt::Write as _;
use std::path::Path;

use crate::ani::SimilarityResult;
use crate::utils::rgb_to_css;

/// Cells with similarity at or above this value also get a length-ratio (or,
/// on the diagonal, topology/contig-count) label — a diagnostic overlay, not
/// required for clustering itself.
pub const LABEL_CUTOFF: f64 = 0.9;

/// Write the similarity matrix as a TSV file with row and column headers.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_similarity_tsv(result: &SimilarityResult, path: &Path) -> std::io::Result<()> {
    let mut out = String::new();
    out.push('\t');
    out.push_str(&result.ids.join("\t"));
    out.push('\n');

    for (i, id) in result.ids.iter().enumerate() {
        out.push_str(id);
        for j in 0..result.ids.len() {
            let _ = write!(out, "\t{:.6}", result.matrix[i][j]);
        }
        out.push('\n');
    }

    std::fs::write(path, out)
}

/// Render a heatmap-style clustermap as SVG, with an embedded
/// `<script type="application/json" id="ani-matrix-data">` copy of the matrix
/// for programmatic access later, a diagnostic length-ratio/topology label
/// overlay on cells at or above [`LABEL_CUTOFF`], and a cluster-membership
/// colour swatch beside each row label (the side-colour-bar convention from
/// seaborn's `clustermap`).
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_clustermap_svg(result: &SimilarityResult, path: &Path) -> std::io::Result<()> {
    let n = result.ids.len();
    let cell = 48.0;
    let margin = 140.0;
    let size = margin + cell * n as f64 + 20.0;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size:.0}" height="{size:.0}" viewBox="0 0 {size:.0} {size:.0}">"#
    );
    let _ = write!(svg, r#"<rect width="{size:.0}" height="{size:.0}" fill="white"/>"#);

    for (i, row_id) in result.ids.iter().enumerate() {
        let y = margin + i as f64 * cell;

        // Cluster-membership swatch, a small colored square to the left of
        // the label, echoing seaborn clustermap's row_colors side bar.
        let swatch = result
            .cg_to_cluster
            .get(row_id)
            .map_or("rgb(200, 200, 200)".to_string(), |a| rgb_to_css(a.color));
        let _ = write!(
            svg,
            r#"<rect x="4" y="{:.1}" width="10" height="10" fill="{swatch}"/>"#,
            y + cell / 2.0 - 5.0
        );

        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="9" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            margin - 6.0,
            y + cell / 2.0,
            escape_xml(row_id)
        );

        for (j, _col_id) in result.ids.iter().enumerate() {
            let x = margin + j as f64 * cell;
            let value = result.matrix[i][j];
            let fill = heat_color(value);
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{cell:.1}" height="{cell:.1}" fill="{fill}" stroke="white"/>"#
            );

            if i == j {
                let label = result.diagonal_labels.get(i).cloned().unwrap_or_default();
                draw_cell_label(&mut svg, x, y, cell, &label);
            } else if value >= LABEL_CUTOFF {
                let ratio = result.lengths[i] as f64 / result.lengths[j].max(1) as f64;
                draw_cell_label(&mut svg, x, y, cell, &format_significant(ratio, 2));
            }
        }
    }

    for (j, col_id) in result.ids.iter().enumerate() {
        let x = margin + j as f64 * cell + cell / 2.0;
        let _ = write!(
            svg,
            r#"<text x="{x:.1}" y="{:.1}" font-size="9" text-anchor="start" transform="rotate(-90 {x:.1} {:.1})">{}</text>"#,
            margin - 6.0,
            margin - 6.0,
            escape_xml(col_id)
        );
    }

    let json = matrix_to_json(result);
    let _ = write!(
        svg,
        r#"<script type="application/json" id="ani-matrix-data">{json}</script>"#
    );
    svg.push_str("</svg>");

    std::fs::write(path, svg)
}

fn draw_cell_label(svg: &mut String, x: f64, y: f64, cell: f64, label: &str) {
    if label.is_empty() {
        return;
    }
    let _ = write!(
        svg,
        r#"<text x="{:.1}" y="{:.1}" font-size="6" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
        x + cell / 2.0,
        y + cell / 2.0,
        escape_xml(label)
    );
}

/// Map a `[0, 1]` similarity value to an SVG colour, light for dissimilar and
/// dark for highly similar (matching the "mako" heatmap's dark-is-similar
/// convention from the original's seaborn clustermap).
fn heat_color(value: f64) -> String {
    let v = value.clamp(0.0, 1.0);
    let channel = (255.0 * (1.0 - v)) as u8;
    format!("rgb({channel}, {channel}, {})", 255u32.min(channel as u32 + 40) as u8)
}

fn format_significant(value: f64, sig_figs: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (sig_figs as i32 - 1 - magnitude).max(0) as usize;
    format!("{value:.decimals$}")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn matrix_to_json(result: &SimilarityResult) -> String {
    let mut obj = serde_json::Map::new();
    for (i, row_id) in result.ids.iter().enumerate() {
        let mut row = serde_json::Map::new();
        for (j, col_id) in result.ids.iter().enumerate() {
            row.insert(col_id.clone(), serde_json::json!(result.matrix[i][j]));
        }
        obj.insert(row_id.clone(), serde_json::Value::Object(row));
    }
    serde_json::Value::Object(obj).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ani::ClusterAssignment;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn sample_result() -> SimilarityResult {
        let mut cg_to_cluster = HashMap::new();
        cg_to_cluster.insert(
            "flye#c1".to_string(),
            ClusterAssignment {
                cluster_id: 1,
                color: (31, 119, 180),
            },
        );
        cg_to_cluster.insert(
            "lja#c1".to_string(),
            ClusterAssignment {
                cluster_id: 1,
                color: (31, 119, 180),
            },
        );
        SimilarityResult {
            ids: vec!["flye#c1".to_string(), "lja#c1".to_string()],
            matrix: vec![vec![1.0, 0.97], vec![0.97, 1.0]],
            lengths: vec![1000, 1050],
            diagonal_labels: vec!["c".to_string(), "l".to_string()],
            cg_to_cluster,
        }
    }

    #[test]
    fn writes_tsv_with_header_row_and_column() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("matrix.tsv");
        write_similarity_tsv(&sample_result(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "\tflye#c1\tlja#c1");
        assert!(lines.next().unwrap().starts_with("flye#c1\t"));
    }

    #[test]
    fn writes_svg_with_embedded_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clustermap.svg");
        write_clustermap_svg(&sample_result(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"id="ani-matrix-data""#));
        assert!(content.ends_with("</svg>"));
    }

    #[test]
    fn row_labels_get_a_cluster_color_swatch() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clustermap.svg");
        write_clustermap_svg(&sample_result(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("rgb(31, 119, 180)"), "expected the cluster's assigned color to appear as a swatch fill");
    }

    #[test]
    fn significant_figure_formatting() {
        assert_eq!(format_significant(1.2345, 2), "1.2");
        assert_eq!(format_significant(0.987, 2), "0.99");
    }
}
