//! Chart configuration from properties
//!
//! Configuration is loaded from chart properties (defined in chart.json).
//! Default values come from chart.json; user values are layered on top by
//! `ChartPropertyReader`. Invalid values fall back to defaults with a warning,
//! except the tie method, which is rejected.

use crate::chart::colors::{parse_hex_color, Highlighting, Rgb};
use crate::chart::properties::ChartPropertyReader;
use crate::chart::{BumpChartError, Result, ShowLabels, TieMethod};
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// When ranking from values: true means lower values rank better
    pub ascending: bool,

    pub tie_method: TieMethod,

    /// Explicit entity colors, cycled; None uses the built-in cycle
    pub palette: Option<Vec<Rgb>>,

    /// Entities to highlight; None means no highlighting
    pub highlight: Option<Vec<String>>,

    /// Color for highlighted entities; None keeps palette colors
    pub highlight_color: Option<Rgb>,

    pub dim_color: Rgb,

    /// Opacity of non-highlighted entities, in [0, 1]
    pub dim_alpha: f64,

    pub show_labels: ShowLabels,

    /// Horizontal distance between endpoint and label
    pub label_padding: f64,

    /// Minimum vertical distance between labels on one side
    pub min_label_distance: f64,

    pub label_font_size: f64,

    /// Monotone cubic curves instead of straight segments
    pub smooth: bool,

    pub line_width: f64,

    pub marker_size: f64,

    pub show_points: bool,

    pub show_grid: bool,

    /// Figure size in inches (width, height)
    pub figure_size: (f64, f64),

    /// Explicit time axis order; None sorts naturally
    pub time_order: Option<Vec<String>>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::read(&ChartPropertyReader::new(None), TieMethod::default())
    }
}

impl ChartConfig {
    /// Create config from user-set property values
    ///
    /// Fails with `InvalidTieMethod` if `tie.method` is not a known token.
    pub fn from_properties(values: Option<&HashMap<String, String>>) -> Result<Self> {
        Self::from_reader(&ChartPropertyReader::new(values))
    }

    /// Create config from a JSON object of property values
    pub fn from_json(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| BumpChartError::Config(format!("Failed to parse chart config: {}", e)))?;
        Self::from_reader(&ChartPropertyReader::from_json_map(&map))
    }

    fn from_reader(props: &ChartPropertyReader) -> Result<Self> {
        // Tie method is strict: an unknown token is an error, not a fallback
        let tie_method = props.get_string("tie.method").parse::<TieMethod>()?;
        Ok(Self::read(props, tie_method))
    }

    fn read(props: &ChartPropertyReader, tie_method: TieMethod) -> Self {
        let palette = props.get_list("palette").map(|hexes| {
            hexes
                .iter()
                .filter_map(|hex| {
                    let color = parse_hex_color(hex);
                    if color.is_none() {
                        warn!("Ignoring invalid palette color '{}'", hex);
                    }
                    color
                })
                .collect::<Vec<_>>()
        });

        let show_labels = ShowLabels::parse(&props.get_enum("labels.show")).unwrap_or_default();

        Self {
            ascending: props.get_bool("rank.ascending"),
            tie_method,
            palette: palette.filter(|p| !p.is_empty()),
            highlight: props.get_list("highlight"),
            highlight_color: props
                .get_optional_string("highlight.color")
                .and_then(|hex| color_or_warn("highlight.color", &hex)),
            dim_color: color_or_warn("dim.color", &props.get_string("dim.color"))
                .unwrap_or([153, 153, 153]),
            dim_alpha: props.get_f64_in_range("dim.alpha", 0.0, 1.0),
            show_labels,
            label_padding: props.get_f64_in_range("labels.padding", 0.0, f64::MAX),
            min_label_distance: props.get_f64_in_range("labels.min.distance", 0.0, f64::MAX),
            label_font_size: props.get_f64_in_range("labels.font.size", 1.0, 200.0),
            smooth: props.get_bool("smooth"),
            line_width: props.get_f64_in_range("line.width", 0.0, 100.0),
            marker_size: props.get_f64_in_range("marker.size", 0.0, 100.0),
            show_points: props.get_bool("points.show"),
            show_grid: props.get_bool("grid.show"),
            figure_size: props.get_size("figure.size").unwrap_or((10.0, 6.0)),
            time_order: props.get_list("time.order"),
        }
    }

    /// Highlight settings for styling
    pub fn highlighting(&self) -> Highlighting {
        Highlighting {
            highlight: self.highlight.clone(),
            highlight_color: self.highlight_color,
            dim_color: self.dim_color,
            dim_alpha: self.dim_alpha,
        }
    }

    pub fn with_tie_method(mut self, tie_method: TieMethod) -> Self {
        self.tie_method = tie_method;
        self
    }

    pub fn with_ascending(mut self, ascending: bool) -> Self {
        self.ascending = ascending;
        self
    }

    pub fn with_smooth(mut self, smooth: bool) -> Self {
        self.smooth = smooth;
        self
    }

    pub fn with_show_labels(mut self, show_labels: ShowLabels) -> Self {
        self.show_labels = show_labels;
        self
    }

    pub fn with_min_label_distance(mut self, distance: f64) -> Self {
        self.min_label_distance = distance;
        self
    }

    pub fn with_highlight<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = Some(entities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_palette(mut self, palette: Vec<Rgb>) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_time_order(mut self, order: Vec<String>) -> Self {
        self.time_order = Some(order);
        self
    }
}

fn color_or_warn(name: &str, hex: &str) -> Option<Rgb> {
    let color = parse_hex_color(hex);
    if color.is_none() {
        warn!("Invalid color '{}' for property '{}'", hex, name);
    }
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_from_chart_json() {
        let config = ChartConfig::default();
        assert!(config.ascending);
        assert_eq!(config.tie_method, TieMethod::Average);
        assert_eq!(config.show_labels, ShowLabels::Both);
        assert_eq!(config.label_padding, 0.3);
        assert_eq!(config.min_label_distance, 0.5);
        assert_eq!(config.label_font_size, 10.0);
        assert!(!config.smooth);
        assert_eq!(config.line_width, 2.5);
        assert_eq!(config.marker_size, 10.0);
        assert!(config.show_points);
        assert!(config.show_grid);
        assert_eq!(config.dim_color, [153, 153, 153]);
        assert_eq!(config.dim_alpha, 0.3);
        assert_eq!(config.figure_size, (10.0, 6.0));
        assert_eq!(config.palette, None);
        assert_eq!(config.highlight, None);
        assert_eq!(config.time_order, None);
    }

    #[test]
    fn test_from_properties_overrides() {
        let values = props(&[
            ("rank.ascending", "false"),
            ("tie.method", "dense"),
            ("labels.show", "right"),
            ("smooth", "true"),
            ("highlight", "A,C"),
            ("palette", "#FF0000, nonsense, 00FF00"),
        ]);
        let config = ChartConfig::from_properties(Some(&values)).unwrap();
        assert!(!config.ascending);
        assert_eq!(config.tie_method, TieMethod::Dense);
        assert_eq!(config.show_labels, ShowLabels::Right);
        assert!(config.smooth);
        assert_eq!(
            config.highlight,
            Some(vec!["A".to_string(), "C".to_string()])
        );
        assert_eq!(config.palette, Some(vec![[255, 0, 0], [0, 255, 0]]));
    }

    #[test]
    fn test_invalid_tie_method_is_rejected() {
        let values = props(&[("tie.method", "median")]);
        assert!(matches!(
            ChartConfig::from_properties(Some(&values)),
            Err(BumpChartError::InvalidTieMethod(_))
        ));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let values = props(&[
            ("labels.show", "top"),
            ("labels.min.distance", "-1"),
            ("dim.color", "grey"),
        ]);
        let config = ChartConfig::from_properties(Some(&values)).unwrap();
        assert_eq!(config.show_labels, ShowLabels::Both);
        assert_eq!(config.min_label_distance, 0.5);
        assert_eq!(config.dim_color, [153, 153, 153]);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"smooth": true, "labels.padding": 0.5, "labels.show": "left"}"#;
        let config = ChartConfig::from_json(json).unwrap();
        assert!(config.smooth);
        assert_eq!(config.label_padding, 0.5);
        assert_eq!(config.show_labels, ShowLabels::Left);

        assert!(matches!(
            ChartConfig::from_json("not json"),
            Err(BumpChartError::Config(_))
        ));
    }

    #[test]
    fn test_builder_methods() {
        let config = ChartConfig::default()
            .with_tie_method(TieMethod::Min)
            .with_highlight(["B"])
            .with_smooth(true);
        assert_eq!(config.tie_method, TieMethod::Min);
        assert_eq!(config.highlight, Some(vec!["B".to_string()]));
        assert!(config.highlighting().highlight.is_some());
    }
}
