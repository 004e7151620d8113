//! Level-of-detail policy.
//!
//! A trinomial tree of depth N has `(N + 1)²` nodes and three times as many
//! edges, so drawing every label quickly becomes unreadable. The policy maps
//! N to a [`DetailProfile`] that shrinks markers and drops text as N grows,
//! and past a hard limit replaces the diagram with a message. It only ever
//! affects presentation.

use serde::{Deserialize, Serialize};

/// Thresholds of the level-of-detail policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailPolicy {
    /// Largest N that is drawn at all.
    pub max_render_steps: u32,
    /// Largest N drawn at full scale.
    pub full_detail_steps: u32,
    /// Lower bound of the shrink factor.
    pub min_scale: f64,
    /// Largest N that still gets edge probability labels.
    pub edge_label_max_steps: u32,
    /// Largest N that still gets the secondary (option value) text.
    pub secondary_text_max_steps: u32,
    /// Above this N the secondary text drops to one decimal.
    pub secondary_coarse_above: u32,
}

impl Default for DetailPolicy {
    fn default() -> Self {
        Self {
            max_render_steps: 50,
            full_detail_steps: 10,
            min_scale: 0.4,
            edge_label_max_steps: 20,
            secondary_text_max_steps: 30,
            secondary_coarse_above: 15,
        }
    }
}

/// Presentation parameters for one tree size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailProfile {
    pub scale: f64,
    pub node_radius: f64,
    pub font_size: f64,
    pub secondary_font_size: f64,
    pub label_font_size: f64,
    pub stroke_width: f64,
    pub show_secondary_text: bool,
    pub show_edge_labels: bool,
    /// False when the tree is too large to be drawn.
    pub render: bool,
    /// Decimals of the node value text, `None` when hidden.
    pub value_precision: Option<usize>,
    /// Decimals of the edge probability labels, `None` when hidden.
    pub edge_label_precision: Option<usize>,
    /// Decimals of the secondary text, `None` when hidden.
    pub secondary_precision: Option<usize>,
}

impl DetailPolicy {
    /// Shrink factor for a tree of depth `n`.
    pub fn scale(&self, n: u32) -> f64 {
        if n <= self.full_detail_steps {
            1.0
        } else {
            self.min_scale.max(f64::from(self.full_detail_steps) / f64::from(n))
        }
    }

    /// Build the profile for a tree of depth `n`.
    pub fn profile(&self, n: u32) -> DetailProfile {
        let scale = self.scale(n);
        let render = n <= self.max_render_steps;
        let coarse = n > self.full_detail_steps;

        let value_precision = render.then_some(if coarse { 0 } else { 1 });

        let show_edge_labels = render && n <= self.edge_label_max_steps;
        let edge_label_precision = show_edge_labels.then_some(if coarse { 2 } else { 3 });

        let show_secondary_text = render && n <= self.secondary_text_max_steps;
        let secondary_precision = show_secondary_text
            .then_some(if n > self.secondary_coarse_above { 1 } else { 3 });

        DetailProfile {
            scale,
            node_radius: (15.0 * scale).max(6.0),
            font_size: (10.0 * scale).max(6.0),
            secondary_font_size: (8.0 * scale).max(5.0),
            label_font_size: (9.0 * scale).max(5.0),
            stroke_width: (2.0 * scale).max(1.0),
            show_secondary_text,
            show_edge_labels,
            render,
            value_precision,
            edge_label_precision,
            secondary_precision,
        }
    }
}

impl DetailProfile {
    /// Text of an edge probability label. Empty when labels are suppressed
    /// or the edge carries no (or a zero) probability.
    pub fn edge_label(&self, probability: Option<f64>) -> String {
        match (self.edge_label_precision, probability) {
            (Some(precision), Some(p)) if p != 0.0 => format!("{p:.precision$}"),
            _ => String::new(),
        }
    }

    /// Primary node text (underlying value).
    pub fn value_label(&self, value: f64) -> String {
        match self.value_precision {
            Some(precision) => format!("{value:.precision$}"),
            None => String::new(),
        }
    }

    /// Secondary node text (option value in parentheses), if shown.
    pub fn secondary_label(&self, option_value: f64) -> Option<String> {
        self.secondary_precision
            .map(|precision| format!("({option_value:.precision$})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(n: u32) -> DetailProfile {
        DetailPolicy::default().profile(n)
    }

    #[test]
    fn test_full_detail_up_to_ten() {
        for n in 0..=10 {
            let p = profile(n);
            assert_eq!(p.scale, 1.0);
            assert_eq!(p.node_radius, 15.0);
            assert_eq!(p.font_size, 10.0);
            assert!(p.render);
        }
    }

    #[test]
    fn test_shrinking_scale() {
        assert_eq!(profile(20).scale, 0.5);
        assert_eq!(profile(25).scale, 0.4);
        assert_eq!(profile(50).scale, 0.4);

        let mut previous = f64::INFINITY;
        for n in 11..=50 {
            let scale = profile(n).scale;
            assert!(scale <= previous);
            assert!(scale >= 0.4);
            previous = scale;
        }
    }

    #[test]
    fn test_size_floors() {
        let p = profile(40);
        assert_eq!(p.node_radius, 6.0);
        assert_eq!(p.font_size, 6.0);
        assert_eq!(p.secondary_font_size, 5.0);
        assert_eq!(p.label_font_size, 5.0);
        assert_eq!(p.stroke_width, 1.0);
    }

    #[test]
    fn test_no_render_above_fifty() {
        for n in [51, 100, 1000, 5000] {
            let p = profile(n);
            assert!(!p.render);
            assert!(!p.show_edge_labels);
            assert!(!p.show_secondary_text);
            assert_eq!(p.value_label(101.0), "");
        }
    }

    #[test]
    fn test_edge_label_precision() {
        assert_eq!(profile(5).edge_label(Some(0.16666)), "0.167");
        assert_eq!(profile(15).edge_label(Some(0.16666)), "0.17");
        assert_eq!(profile(21).edge_label(Some(0.16666)), "");
        assert_eq!(profile(5).edge_label(None), "");
        assert_eq!(profile(5).edge_label(Some(0.0)), "");
    }

    #[test]
    fn test_value_precision() {
        assert_eq!(profile(10).value_label(104.2567), "104.3");
        assert_eq!(profile(11).value_label(104.2567), "104");
        assert_eq!(profile(50).value_label(99.6), "100");
    }

    #[test]
    fn test_secondary_text() {
        assert_eq!(profile(15).secondary_label(4.12345), Some("(4.123)".to_string()));
        assert_eq!(profile(16).secondary_label(4.12345), Some("(4.1)".to_string()));
        assert_eq!(profile(30).secondary_label(4.12345), Some("(4.1)".to_string()));
        assert_eq!(profile(31).secondary_label(4.12345), None);
        assert!(!profile(31).show_secondary_text);
    }
}
