//! Field-Node-Cockpit tuning diagrams.

use super::{
    bold_style, draw_lines, hex_color, note_style, text_style, SvgArea, EVENT_SLATE, INJURY_RED,
    TYPICAL_GREEN, WHEAT,
};
use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use serde::Serialize;
use std::path::Path;

const FIELD_FILL: RGBColor = RGBColor(0xE3, 0xF2, 0xFD);
const FIELD_EDGE: RGBColor = RGBColor(0x19, 0x76, 0xD2);
const COCKPIT_FILL: RGBColor = RGBColor(0xFF, 0xE6, 0x6D);
const COCKPIT_ENHANCED: RGBColor = RGBColor(0xFF, 0xD9, 0x3D);
const TYPICAL_EDGE: RGBColor = RGBColor(0x2D, 0x6A, 0x4F);
const SAVANT_EDGE: RGBColor = RGBColor(0x9B, 0x23, 0x35);

/// Field channels drawn above the Node, one per domain.
const CHANNELS: [&str; 5] = ["Music", "Art", "Calendar", "Math", "Mech"];

/// How a Node configuration filters the Field channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeTuning {
    /// Only the centre channel reaches the Cockpit.
    Broad,
    /// One channel passes wide open.
    Narrow,
}

impl NodeTuning {
    fn open_channel(&self) -> usize {
        match self {
            NodeTuning::Broad => 2,
            NodeTuning::Narrow => 1,
        }
    }
}

fn draw_panel(area: &SvgArea<'_>, tuning: NodeTuning) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let cx = w / 2;
    // Ten units across the panel
    let unit = w.min(h) / 10;
    let y = |v: f64| h - (v * unit as f64) as i32 - 30;
    let x = |v: f64| cx + ((v - 5.0) * unit as f64) as i32;

    let (title, node_fill, node_edge, node_label, cockpit_fill, cockpit_label, note) = match tuning {
        NodeTuning::Broad => (
            "Typical Node Tuning",
            TYPICAL_GREEN,
            TYPICAL_EDGE,
            "NODE (Broad Filter)",
            COCKPIT_FILL,
            "COCKPIT (Normal Experience)",
            "Broad filtering for survival\nBalanced but limited access",
        ),
        NodeTuning::Narrow => (
            "Savant Node Tuning",
            INJURY_RED,
            SAVANT_EDGE,
            "NODE (Narrow Focus)",
            COCKPIT_ENHANCED,
            "COCKPIT (Enhanced Domain)",
            "Narrow but deep Field access\nExtraordinary in specific domain",
        ),
    };

    area.draw(&Text::new(
        title,
        (cx, 24),
        bold_style(18, &BLACK, HPos::Center, VPos::Center),
    ))?;

    // Field
    let field_center = (x(5.0), y(8.6));
    area.draw(&Circle::new(field_center, unit * 3 / 2, FIELD_FILL.filled()))?;
    area.draw(&Circle::new(field_center, unit * 3 / 2, FIELD_EDGE.stroke_width(2)))?;
    area.draw(&Text::new(
        "FIELD",
        field_center,
        bold_style(16, &BLACK, HPos::Center, VPos::Center),
    ))?;

    let label_style = text_style(11, &FIELD_EDGE, HPos::Center, VPos::Bottom);
    let blocked = RGBColor(0xFF, 0x00, 0x00);
    for (i, label) in CHANNELS.iter().enumerate() {
        let cx = x(3.0 + i as f64);
        area.draw(&Text::new(*label, (cx, y(7.2)), label_style.clone()))?;
        area.draw(&PathElement::new(
            vec![(cx, y(7.0)), (cx, y(5.5))],
            FIELD_EDGE.mix(0.5).stroke_width(1),
        ))?;

        if i == tuning.open_channel() {
            match tuning {
                NodeTuning::Broad => {
                    area.draw(&PathElement::new(
                        vec![(cx, y(4.0)), (cx, y(2.5))],
                        TYPICAL_EDGE.stroke_width(2),
                    ))?;
                }
                NodeTuning::Narrow => {
                    area.draw(&PathElement::new(
                        vec![(cx, y(5.5)), (cx, y(2.5))],
                        SAVANT_EDGE.stroke_width(5),
                    ))?;
                    area.draw(&TriangleMarker::new((cx, y(2.7)), 9, SAVANT_EDGE.filled()))?;
                }
            }
        } else {
            area.draw(&Cross::new((cx, y(5.0)), 5, blocked.mix(0.5).stroke_width(2)))?;
        }
    }

    // Node
    area.draw(&Rectangle::new([(x(3.5), y(5.5)), (x(6.5), y(4.0))], node_fill.filled()))?;
    area.draw(&Rectangle::new([(x(3.5), y(5.5)), (x(6.5), y(4.0))], node_edge.stroke_width(2)))?;
    area.draw(&Text::new(
        node_label,
        (x(5.0), y(4.75)),
        bold_style(13, &BLACK, HPos::Center, VPos::Center),
    ))?;

    // Cockpit
    area.draw(&Rectangle::new([(x(3.5), y(2.5)), (x(6.5), y(1.0))], cockpit_fill.filled()))?;
    area.draw(&Rectangle::new(
        [(x(3.5), y(2.5)), (x(6.5), y(1.0))],
        RGBColor(0xF4, 0xA2, 0x61).stroke_width(2),
    ))?;
    area.draw(&Text::new(
        cockpit_label,
        (x(5.0), y(1.75)),
        bold_style(12, &BLACK, HPos::Center, VPos::Center),
    ))?;

    draw_lines(area, note, (x(5.0), y(0.45)), 16, &note_style(12))
}

/// Typical and savant Node tuning side by side over the same Field.
pub fn create_tuning_comparison(path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1400, 860)).into_drawing_area();
    root.fill(&WHITE)?;

    let (panels, footer) = root.split_vertically(780);
    let (left, right) = panels.split_horizontally(700);
    draw_panel(&left, NodeTuning::Broad)?;
    draw_panel(&right, NodeTuning::Narrow)?;

    footer.draw(&Rectangle::new([(250, 5), (1150, 65)], WHEAT.mix(0.8).filled()))?;
    draw_lines(
        &footer,
        "FNC: Same Field, different Node tuning → Different Cockpit experience\n\
         Savant abilities emerge from alternative tuning, not deficit or compensation",
        (700, 24),
        22,
        &note_style(14),
    )?;

    root.present()?;
    Ok(())
}

/// A population placed on the breadth/depth plane.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TuningProfilePoint {
    pub name: &'static str,
    pub breadth: f64,
    pub depth: f64,
    pub color: &'static str,
}

pub const TUNING_SPECTRUM: [TuningProfilePoint; 5] = [
    TuningProfilePoint {
        name: "Typical",
        breadth: 0.7,
        depth: 0.4,
        color: "#90BE6D",
    },
    TuningProfilePoint {
        name: "Autism (non-savant)",
        breadth: 0.4,
        depth: 0.5,
        color: "#4ECDC4",
    },
    TuningProfilePoint {
        name: "Autistic Savant",
        breadth: 0.25,
        depth: 0.85,
        color: "#E94F37",
    },
    TuningProfilePoint {
        name: "Acquired Savant",
        breadth: 0.2,
        depth: 0.9,
        color: "#9B2335",
    },
    TuningProfilePoint {
        name: "Prodigious Savant",
        breadth: 0.15,
        depth: 0.95,
        color: "#6A0572",
    },
];

/// Quadratic Bézier from typical to prodigious tuning.
fn depth_arrow(samples: usize) -> Vec<(f64, f64)> {
    let (p0, c, p1) = ((0.7, 0.4), (0.55, 0.85), (0.15, 0.95));
    (0..=samples)
        .map(|i| {
            let t = i as f64 / samples as f64;
            let u = 1.0 - t;
            (
                u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0,
                u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1,
            )
        })
        .collect()
}

/// Tuning breadth against Field access depth for each population.
pub fn create_tuning_spectrum(path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "FNC Tuning Spectrum (Trade-off between breadth and depth of Field access)",
            ("sans-serif", 20),
        )
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f64..1.0f64, 0.0f64..1.0f64)?;

    chart
        .configure_mesh()
        .x_desc("Tuning Breadth (Narrow ← → Broad)")
        .y_desc("Field Access Depth")
        .draw()?;

    let grey = RGBColor(0x80, 0x80, 0x80);
    let arrow = depth_arrow(40);
    chart.draw_series(LineSeries::new(arrow.clone(), grey.stroke_width(2)))?;
    if let Some(&tip) = arrow.last() {
        chart.draw_series(std::iter::once(TriangleMarker::new(tip, 7, grey.filled())))?;
    }
    chart.draw_series(std::iter::once(Text::new(
        "Increasing Field Depth",
        (0.47, 0.62),
        text_style(12, &grey, HPos::Center, VPos::Center),
    )))?;

    for profile in &TUNING_SPECTRUM {
        let color = hex_color(profile.color);
        let point = (profile.breadth, profile.depth);
        chart.draw_series(std::iter::once(Circle::new(point, 16, color.mix(0.7).filled())))?;
        chart.draw_series(std::iter::once(Circle::new(point, 16, BLACK.stroke_width(2))))?;
        chart.draw_series(std::iter::once(
            EmptyElement::at(point)
                + Text::new(
                    profile.name,
                    (20, -14),
                    bold_style(13, &EVENT_SLATE, HPos::Left, VPos::Bottom),
                ),
        ))?;
    }

    let (w, h) = root.dim_in_pixel();
    let (bx, by) = (w as i32 - 330, h as i32 - 190);
    root.draw(&Rectangle::new([(bx, by), (bx + 290, by + 95)], WHEAT.mix(0.8).filled()))?;
    draw_lines(
        &root,
        "FNC Prediction:\n\
         • Narrower tuning → Deeper access\n\
         • Broader tuning → Shallower access\n\
         • Savants sacrifice breadth for depth",
        (bx + 145, by + 18),
        19,
        &note_style(12),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_spectrum_depth_rises_as_breadth_narrows() {
        let mut profiles = TUNING_SPECTRUM.to_vec();
        profiles.sort_by(|a, b| b.breadth.total_cmp(&a.breadth));
        assert!(profiles.windows(2).all(|w| w[0].depth <= w[1].depth));
    }

    #[test]
    fn test_depth_arrow_endpoints() {
        let arrow = depth_arrow(10);
        assert_eq!(arrow.len(), 11);
        assert_eq!(arrow[0], (0.7, 0.4));
        let tip = arrow[10];
        assert!((tip.0 - 0.15).abs() < 1e-12 && (tip.1 - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_open_channels_differ() {
        assert_ne!(
            NodeTuning::Broad.open_channel(),
            NodeTuning::Narrow.open_channel()
        );
    }

    #[test]
    fn test_create_tuning_charts() {
        let dir = TempDir::new().unwrap();
        let comparison = dir.path().join("comparison.svg");
        create_tuning_comparison(&comparison).unwrap();
        let svg = std::fs::read_to_string(&comparison).unwrap();
        assert!(svg.contains("Typical Node Tuning"));
        assert!(svg.contains("Savant Node Tuning"));

        let spectrum = dir.path().join("spectrum.svg");
        create_tuning_spectrum(&spectrum).unwrap();
        let svg = std::fs::read_to_string(&spectrum).unwrap();
        assert!(svg.contains("Prodigious Savant"));
    }
}
