//! Radar charts of savant domain profiles.

use super::{draw_lines, note_style, text_style, INJURY_RED, NOTE_GREY, SAVANT_BLUE};
use crate::domains::SavantDomain;
use anyhow::Result;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use std::f64::consts::PI;
use std::path::Path;
use tracing::warn;

type RadarChart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Radius scale of the population radar.
const POPULATION_MAX: f64 = 0.40;
const POPULATION_RINGS: [f64; 3] = [0.1, 0.2, 0.3];
/// Baseline prevalence of savant-level ability in the typical population.
const TYPICAL_BASELINE: f64 = 0.001;

const PROFILE_RINGS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

pub const PADGETT_ABILITIES: [(&str, f64); 6] = [
    ("Mathematics", 0.95),
    ("Art", 0.90),
    ("Music", 0.15),
    ("Calendar", 0.10),
    ("Mechanical", 0.40),
    ("Language", 0.20),
];

/// Unit vector of spoke `i`, clockwise from twelve o'clock.
fn spoke(i: usize, n: usize) -> (f64, f64) {
    let theta = PI / 2.0 - i as f64 * 2.0 * PI / n as f64;
    (theta.cos(), theta.sin())
}

fn polygon(values: &[f64], scale: f64) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let (x, y) = spoke(i, values.len());
            let r = v / scale;
            (x * r, y * r)
        })
        .collect()
}

fn build_chart<'a, 'b>(
    root: &'a DrawingArea<SVGBackend<'b>, plotters::coord::Shift>,
    caption: &str,
) -> Result<RadarChart<'a, 'b>> {
    let chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 22))
        .margin(30)
        .build_cartesian_2d(-1.45f64..1.45f64, -1.45f64..1.45f64)?;
    Ok(chart)
}

fn draw_grid(chart: &mut RadarChart<'_, '_>, rings: &[f64], scale: f64) -> Result<()> {
    let n = SavantDomain::ALL.len();

    for &ring in rings {
        let mut points = polygon(&vec![ring; n], scale);
        points.push(points[0]);
        chart.draw_series(std::iter::once(PathElement::new(points, &BLACK.mix(0.15))))?;
    }

    chart.draw_series((0..n).map(|i| {
        let (x, y) = spoke(i, n);
        PathElement::new(vec![(0.0, 0.0), (x, y)], &BLACK.mix(0.15))
    }))?;

    let label_style = text_style(11, &RGBColor(0x80, 0x80, 0x80), HPos::Left, VPos::Center);
    chart.draw_series(rings.iter().map(|&ring| {
        Text::new(
            format!("{:.0}%", ring * 100.0),
            (0.02, ring / scale),
            label_style.clone(),
        )
    }))?;

    let name_style = text_style(15, &BLACK, HPos::Center, VPos::Center);
    chart.draw_series(SavantDomain::ALL.iter().enumerate().map(|(i, domain)| {
        let (x, y) = spoke(i, n);
        Text::new(domain.name().to_string(), (x * 1.2, y * 1.2), name_style.clone())
    }))?;

    Ok(())
}

fn draw_profile(
    chart: &mut RadarChart<'_, '_>,
    values: &[f64],
    scale: f64,
    color: RGBColor,
    fill_alpha: f64,
    label: Option<&str>,
) -> Result<()> {
    let points = polygon(values, scale);

    chart.draw_series(std::iter::once(Polygon::new(
        points.clone(),
        color.mix(fill_alpha).filled(),
    )))?;

    let mut outline = points.clone();
    outline.push(points[0]);
    let series = chart.draw_series(LineSeries::new(outline, color.stroke_width(2)))?;
    if let Some(label) = label {
        series
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
    Ok(())
}

/// Savant population distribution over the six domains against the
/// near-zero typical baseline, annotated with each domain's Field channel.
pub fn create_domain_radar(path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (900, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = build_chart(
        &root,
        "Savant Domain Distribution (FNC: Differential Field Access)",
    )?;
    draw_grid(&mut chart, &POPULATION_RINGS, POPULATION_MAX)?;

    let n = SavantDomain::ALL.len();
    let baseline = vec![TYPICAL_BASELINE; n];
    draw_profile(
        &mut chart,
        &baseline,
        POPULATION_MAX,
        RGBColor(0x80, 0x80, 0x80),
        0.1,
        Some("Typical Population"),
    )?;

    let values: Vec<f64> = SavantDomain::ALL.iter().map(|d| d.prevalence()).collect();
    draw_profile(
        &mut chart,
        &values,
        POPULATION_MAX,
        SAVANT_BLUE,
        0.25,
        Some("Savant Population"),
    )?;

    let channel_style = text_style(11, &NOTE_GREY, HPos::Center, VPos::Center);
    chart.draw_series(SavantDomain::ALL.iter().enumerate().map(|(i, domain)| {
        let (x, y) = spoke(i, n);
        Text::new(
            format!("Field: {}", domain.field_channel_short()),
            (x * 1.2, y * 1.2 - 0.07),
            channel_style.clone(),
        )
    }))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    draw_lines(
        &root,
        "Each domain represents a distinct Field information channel.\n\
         Savant Nodes show enhanced tuning to specific channels.",
        (450, 860),
        16,
        &note_style(13),
    )?;

    root.present()?;
    Ok(())
}

/// Per-domain strengths for an individual profile. Missing domains are 0,
/// unknown names are skipped and values are clamped to [0, 1].
pub fn profile_values(abilities: &[(&str, f64)]) -> [f64; 6] {
    let mut values = [0.0; 6];
    for (name, strength) in abilities {
        match SavantDomain::from_name(name) {
            Some(domain) => {
                if let Some(i) = SavantDomain::ALL.iter().position(|d| *d == domain) {
                    values[i] = strength.clamp(0.0, 1.0);
                }
            }
            None => warn!("Ignoring unknown domain '{}' in profile", name),
        }
    }
    values
}

/// Radar chart of one savant's domain strengths.
pub fn create_individual_profile(
    case_name: &str,
    abilities: &[(&str, f64)],
    path: &Path,
) -> Result<()> {
    let values = profile_values(abilities);

    let root = SVGBackend::new(path, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = build_chart(&root, &format!("{} | FNC Tuning Profile", case_name))?;
    draw_grid(&mut chart, &PROFILE_RINGS, 1.0)?;
    draw_profile(&mut chart, &values, 1.0, INJURY_RED, 0.3, None)?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_spoke_starts_at_top() {
        let (x, y) = spoke(0, 6);
        assert!(x.abs() < 1e-12);
        assert!((y - 1.0).abs() < 1e-12);
        // Clockwise: second spoke is to the right
        assert!(spoke(1, 6).0 > 0.0);
    }

    #[test]
    fn test_profile_values() {
        let values = profile_values(&[("mathematics", 0.95), ("Art", 1.7), ("Telepathy", 0.5)]);
        assert_eq!(values, [0.0, 1.0, 0.0, 0.95, 0.0, 0.0]);
        assert_eq!(profile_values(&PADGETT_ABILITIES)[0], 0.15);
    }

    #[test]
    fn test_create_domain_radar() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("radar.svg");
        create_domain_radar(&path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Savant Population"));
        assert!(svg.contains("Field: Harmonic ratios"));
    }

    #[test]
    fn test_create_individual_profile() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.svg");
        create_individual_profile("Jason Padgett", &PADGETT_ABILITIES, &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Jason Padgett"));
    }

    #[test]
    fn test_individual_profile_empty_abilities() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.svg");
        create_individual_profile("Nobody", &[], &path).unwrap();
        assert!(path.exists());
    }
}
