//! Entity colors and highlight styling
//!
//! Colors come from an explicit list or a built-in ten-color categorical cycle.
//! Highlighting is purely presentational: highlighted entities keep full
//! opacity and draw on top, everything else is dimmed.

use serde::Serialize;
use std::collections::HashSet;

/// RGB color
pub type Rgb = [u8; 3];

/// Default categorical cycle (same hues as the common "tab10" palette)
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF",
];

/// Line width multiplier for highlighted entities
const HIGHLIGHT_WIDTH_FACTOR: f64 = 1.5;

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` / `RRGGBBAA` (without #)
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim().trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}

/// Format as `#RRGGBB`
pub fn to_hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color[0], color[1], color[2])
}

/// Pick `n` colors, cycling through `palette` (or the default cycle)
pub fn palette_colors(palette: Option<&[Rgb]>, n: usize) -> Vec<Rgb> {
    let default: Vec<Rgb>;
    let colors: &[Rgb] = match palette {
        Some(p) if !p.is_empty() => p,
        _ => {
            default = DEFAULT_PALETTE
                .iter()
                .filter_map(|hex| parse_hex_color(hex))
                .collect();
            &default[..]
        }
    };

    (0..n).map(|i| colors[i % colors.len()]).collect()
}

/// Highlight settings applied on top of palette colors
#[derive(Debug, Clone, PartialEq)]
pub struct Highlighting {
    /// Entities drawn at full opacity; None means every entity is
    pub highlight: Option<Vec<String>>,
    /// Replaces palette colors of highlighted entities
    pub highlight_color: Option<Rgb>,
    pub dim_color: Rgb,
    pub dim_alpha: f64,
}

/// Presentation attributes of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityStyle {
    pub entity: String,
    #[serde(serialize_with = "serialize_hex")]
    pub color: Rgb,
    pub alpha: f64,
    pub line_width: f64,
    pub marker_size: f64,
    /// Higher draws later (on top)
    pub z_order: i32,
    pub highlighted: bool,
}

fn serialize_hex<S: serde::Serializer>(color: &Rgb, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&to_hex(*color))
}

/// Compute one style per entity, in entity order
pub fn entity_styles(
    entities: &[String],
    base_colors: &[Rgb],
    highlighting: &Highlighting,
    line_width: f64,
    marker_size: f64,
) -> Vec<EntityStyle> {
    let highlight_set: Option<HashSet<&str>> = highlighting
        .highlight
        .as_ref()
        .map(|h| h.iter().map(String::as_str).collect());

    entities
        .iter()
        .zip(base_colors)
        .map(|(entity, &base)| match &highlight_set {
            None => EntityStyle {
                entity: entity.clone(),
                color: base,
                alpha: 1.0,
                line_width,
                marker_size,
                z_order: 2,
                highlighted: false,
            },
            Some(set) if set.contains(entity.as_str()) => EntityStyle {
                entity: entity.clone(),
                color: highlighting.highlight_color.unwrap_or(base),
                alpha: 1.0,
                line_width: line_width * HIGHLIGHT_WIDTH_FACTOR,
                marker_size,
                z_order: 3,
                highlighted: true,
            },
            Some(_) => EntityStyle {
                entity: entity.clone(),
                color: highlighting.dim_color,
                alpha: highlighting.dim_alpha,
                line_width,
                marker_size,
                z_order: 1,
                highlighted: false,
            },
        })
        .collect()
}

/// Entity indices in drawing order: by z-order, then entity order
pub fn draw_order(styles: &[EntityStyle]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..styles.len()).collect();
    order.sort_by_key(|&i| styles[i].z_order);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn highlighting(highlight: Option<&[&str]>) -> Highlighting {
        Highlighting {
            highlight: highlight.map(names),
            highlight_color: None,
            dim_color: [153, 153, 153],
            dim_alpha: 0.3,
        }
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Some([255, 0, 0]));
        assert_eq!(parse_hex_color("1F77B4"), Some([31, 119, 180]));
        assert_eq!(parse_hex_color("#440154FF"), Some([68, 1, 84]));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("GGGGGG"), None);
        assert_eq!(parse_hex_color("#ÄÄÄ"), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex([31, 119, 180]), "#1F77B4");
    }

    #[test]
    fn test_palette_cycles() {
        let palette = [[255, 0, 0], [0, 0, 255]];
        assert_eq!(
            palette_colors(Some(&palette[..]), 3),
            vec![[255, 0, 0], [0, 0, 255], [255, 0, 0]]
        );

        let default = palette_colors(None, 11);
        assert_eq!(default[0], [31, 119, 180]);
        assert_eq!(default[10], default[0]);
    }

    #[test]
    fn test_no_highlight_keeps_palette() {
        let entities = names(&["A", "B"]);
        let colors = palette_colors(None, 2);
        let styles = entity_styles(&entities, &colors, &highlighting(None), 2.5, 10.0);
        assert!(styles.iter().all(|s| s.alpha == 1.0 && !s.highlighted));
        assert_eq!(styles[1].color, colors[1]);
    }

    #[test]
    fn test_highlight_dims_others() {
        let entities = names(&["A", "B", "C"]);
        let colors = palette_colors(None, 3);
        let mut hl = highlighting(Some(&["B"][..]));
        hl.highlight_color = Some([0, 0, 0]);
        let styles = entity_styles(&entities, &colors, &hl, 2.0, 10.0);

        assert!(styles[1].highlighted);
        assert_eq!(styles[1].color, [0, 0, 0]);
        assert_eq!(styles[1].line_width, 3.0);
        assert_eq!(styles[0].color, [153, 153, 153]);
        assert_eq!(styles[0].alpha, 0.3);

        // Highlighted entity is drawn last
        assert_eq!(draw_order(&styles), vec![0, 2, 1]);
    }
}
