//! SVG rendering of the z-score control chart.
//!
//! Draws every z-score as a point by trial index, overdraws flagged points
//! in red, and adds horizontal reference lines at each whole sigma from -3
//! to +3 (solid black center line, dashed elsewhere, red at |level| >= 2).

use std::collections::BTreeSet;

/// Smallest half-height of the y axis, in sigma.
const MIN_Y_EXTENT: f64 = 3.5;

/// SVG chart formatter.
#[derive(Debug, Clone)]
pub struct SvgChart {
    width: f64,
    height: f64,
    margin_left: f64,
    margin_right: f64,
    margin_top: f64,
    margin_bottom: f64,
}

impl Default for SvgChart {
    fn default() -> Self {
        Self::new(1000.0, 500.0)
    }
}

impl SvgChart {
    /// Create a chart formatter with the given canvas size in pixels.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin_left: 70.0,
            margin_right: 20.0,
            margin_top: 40.0,
            margin_bottom: 50.0,
        }
    }

    /// Title used for a measurement column.
    pub fn title_for(column: &str) -> String {
        format!("Std Deviations from Mean for '{column}'")
    }

    /// Escape XML special characters
    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    fn plot_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    fn plot_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Y axis half-height: covers ±3.5 and every point with some headroom.
    fn y_extent(zscores: &[f64]) -> f64 {
        zscores
            .iter()
            .filter(|z| z.is_finite())
            .fold(MIN_Y_EXTENT, |acc, z| acc.max(z.abs() + 0.5))
    }

    fn x_px(&self, index: usize, n: usize) -> f64 {
        let span = n.saturating_sub(1).max(1) as f64;
        self.margin_left + self.plot_width() * index as f64 / span
    }

    fn y_px(&self, z: f64, extent: f64) -> f64 {
        self.margin_top + self.plot_height() * (extent - z) / (2.0 * extent)
    }

    fn reference_lines(&self, extent: f64) -> String {
        let mut out = String::new();
        let x0 = self.margin_left;
        let x1 = self.margin_left + self.plot_width();
        for level in -3_i32..=3 {
            let y = self.y_px(f64::from(level), extent);
            let color = if level.abs() >= 2 { "red" } else { "black" };
            let (dash, opacity) = if level == 0 {
                ("", 1.0)
            } else {
                (r#" stroke-dasharray="6,4""#, 0.7)
            };
            out.push_str(&format!(
                r#"  <line x1="{x0:.1}" y1="{y:.1}" x2="{x1:.1}" y2="{y:.1}" stroke="{color}" stroke-width="1" stroke-opacity="{opacity}"{dash}/>"#
            ));
            out.push('\n');
            out.push_str(&format!(
                r#"  <text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end">{level}</text>"#,
                x0 - 8.0,
                y + 4.0
            ));
            out.push('\n');
        }
        out
    }

    fn points(&self, zscores: &[f64], flagged: &BTreeSet<usize>, extent: f64) -> String {
        let n = zscores.len();
        let mut out = String::new();
        for (i, &z) in zscores.iter().enumerate() {
            out.push_str(&format!(
                r##"  <circle cx="{:.1}" cy="{:.1}" r="3.5" fill="#1f77b4"/>"##,
                self.x_px(i, n),
                self.y_px(z, extent)
            ));
            out.push('\n');
        }
        // Flagged points on top
        for &i in flagged.iter().filter(|&&i| i < n) {
            out.push_str(&format!(
                r#"  <circle cx="{:.1}" cy="{:.1}" r="5.5" fill="red"/>"#,
                self.x_px(i, n),
                self.y_px(zscores[i], extent)
            ));
            out.push('\n');
        }
        out
    }

    /// Render a complete SVG document.
    pub fn render(&self, title: &str, zscores: &[f64], flagged: &BTreeSet<usize>) -> String {
        let extent = Self::y_extent(zscores);
        let mut svg = String::new();

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{:.1}" y="24" font-size="16" text-anchor="middle">{}</text>"#,
            self.width / 2.0,
            Self::escape_xml(title)
        ));
        svg.push('\n');

        svg.push_str(&self.reference_lines(extent));
        svg.push_str(&self.points(zscores, flagged, extent));

        svg.push_str(&format!(
            r#"  <text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle">Trial Number</text>"#,
            self.margin_left + self.plot_width() / 2.0,
            self.height - 12.0
        ));
        svg.push('\n');
        let mid_y = self.margin_top + self.plot_height() / 2.0;
        svg.push_str(&format!(
            r#"  <text x="18" y="{mid_y:.1}" font-size="13" text-anchor="middle" transform="rotate(-90 18 {mid_y:.1})">Number of Standard Deviations</text>"#
        ));
        svg.push('\n');
        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_title_and_labels() {
        let svg = SvgChart::default().render(
            &SvgChart::title_for("width"),
            &[0.0, 1.0, -1.0],
            &BTreeSet::new(),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Std Deviations from Mean for &#39;width&#39;"));
        assert!(svg.contains("Trial Number"));
        assert!(svg.contains("Number of Standard Deviations"));
    }

    #[test]
    fn test_one_circle_per_point_plus_flagged() {
        let flagged: BTreeSet<usize> = [1, 2].into_iter().collect();
        let svg = SvgChart::default().render("t", &[0.0, 3.2, 0.5, -0.4], &flagged);
        assert_eq!(svg.matches("<circle").count(), 6);
        assert_eq!(svg.matches(r#"fill="red""#).count(), 2);
    }

    #[test]
    fn test_seven_reference_lines() {
        let svg = SvgChart::default().render("t", &[0.0, 1.0], &BTreeSet::new());
        assert_eq!(svg.matches("<line").count(), 7);
        assert_eq!(svg.matches("stroke-dasharray").count(), 6);
        assert_eq!(svg.matches(r#"stroke="red""#).count(), 4);
    }

    #[test]
    fn test_out_of_range_flag_ignored() {
        let flagged: BTreeSet<usize> = [0, 9].into_iter().collect();
        let svg = SvgChart::default().render("t", &[0.0, 1.0], &flagged);
        assert_eq!(svg.matches(r#"r="5.5""#).count(), 1);
    }

    #[test]
    fn test_y_extent_grows_with_outliers() {
        assert!((SvgChart::y_extent(&[0.0, 1.0]) - MIN_Y_EXTENT).abs() < f64::EPSILON);
        assert!((SvgChart::y_extent(&[0.0, -5.0]) - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_title_escaped() {
        let svg = SvgChart::default().render("a<b>&c", &[0.0, 1.0], &BTreeSet::new());
        assert!(svg.contains("a&lt;b&gt;&amp;c"));
    }

    #[test]
    fn test_single_point_does_not_divide_by_zero() {
        let svg = SvgChart::default().render("t", &[0.0], &BTreeSet::new());
        assert!(!svg.contains("NaN"));
    }
}
