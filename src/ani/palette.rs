//! Stable categorical colour palette for cluster ids.
//!
//! A fixed Tableau-style 20-colour palette is cycled if more clusters are
//! present than colours (practically never, for a single sample's contig
//! groups). Assignment is by `(cluster_id - 1) % palette.len()`, so the same
//! cluster id always maps to the same colour.

pub type Rgb = (u8, u8, u8);

const PALETTE: [Rgb; 20] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
    (174, 199, 232),
    (255, 187, 120),
    (152, 223, 138),
    (255, 152, 150),
    (197, 176, 213),
    (196, 156, 148),
    (247, 182, 210),
    (199, 199, 199),
    (219, 219, 141),
    (158, 218, 229),
];

/// Deterministic colour for a 1-based cluster id.
///
/// # Panics
///
/// Panics if `cluster_id` is `0` (cluster id `0` is reserved for "unassigned"
/// and is never assigned a colour).
#[must_use]
pub fn color_for_cluster(cluster_id: u32) -> Rgb {
    assert!(cluster_id >= 1, "cluster id 0 is reserved for unassigned");
    PALETTE[(cluster_id - 1) as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_cluster_id_always_gets_same_color() {
        assert_eq!(color_for_cluster(3), color_for_cluster(3));
    }

    #[test]
    fn distinct_ids_within_palette_size_get_distinct_colors() {
        let colors: std::collections::HashSet<Rgb> = (1..=20).map(color_for_cluster).collect();
        assert_eq!(colors.len(), 20);
    }

    #[test]
    #[should_panic]
    fn cluster_id_zero_panics() {
        color_for_cluster(0);
    }
}
