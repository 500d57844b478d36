//! Shared utilities: DOS-protection limits and small formatting helpers used
//! by multiple modules (human-readable base-pair units, CSS colour escaping).

pub mod validation;

/// Format a base-pair count in human-readable units (`1.2mbp`, `340kbp`, `52bp`),
/// matching the tick-label convention the dotplot engine uses on its axes.
#[must_use]
pub fn human_bp(bp: f64) -> String {
    let abs = bp.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}mbp", bp / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}kbp", bp / 1_000.0)
    } else {
        format!("{:.0}bp", bp)
    }
}

/// Render an RGB triple as a CSS `rgb(...)` string.
#[must_use]
pub fn rgb_to_css((r, g, b): (u8, u8, u8)) -> String {
    format!("rgb({r}, {g}, {b})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_bp_picks_the_right_unit() {
        assert_eq!(human_bp(1_200_000.0), "1.2mbp");
        assert_eq!(human_bp(340_000.0), "340.0kbp");
        assert_eq!(human_bp(52.0), "52bp");
    }

    #[test]
    fn rgb_to_css_formats_triple() {
        assert_eq!(rgb_to_css((255, 0, 128)), "rgb(255, 0, 128)");
    }
}
