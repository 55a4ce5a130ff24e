//! Lesion charts for acquired savant cases.
//!
//! Brodmann area involvement with hemisphere lateralization, and a
//! case-by-case view from lesion to emerged domain.

use super::{
    bold_style, draw_lines, hex_color, note_style, text_style, SvgArea, INJURY_RED, NOTE_GREY,
    SAVANT_BLUE, TYPICAL_GREEN,
};
use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use serde::Serialize;
use std::f64::consts::PI;
use std::path::Path;

/// Involvement of one Brodmann area across acquired savant cases.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BrodmannArea {
    pub area: &'static str,
    pub frequency: f64,
    pub region: &'static str,
    pub fnc_interpretation: &'static str,
}

pub const BRODMANN_DATA: [BrodmannArea; 8] = [
    BrodmannArea {
        area: "BA 9/10",
        frequency: 0.45,
        region: "Executive",
        fnc_interpretation: "Reduced top-down filtering",
    },
    BrodmannArea {
        area: "BA 21/22",
        frequency: 0.72,
        region: "Temporal/Language",
        fnc_interpretation: "Altered auditory processing",
    },
    BrodmannArea {
        area: "BA 37",
        frequency: 0.38,
        region: "Visual/Fusiform",
        fnc_interpretation: "Enhanced pattern extraction",
    },
    BrodmannArea {
        area: "BA 39/40",
        frequency: 0.55,
        region: "Parietal",
        fnc_interpretation: "Modified spatial-mathematical",
    },
    BrodmannArea {
        area: "BA 17/18",
        frequency: 0.25,
        region: "Visual Primary",
        fnc_interpretation: "Raw visual access",
    },
    BrodmannArea {
        area: "BA 44/45",
        frequency: 0.32,
        region: "Broca's",
        fnc_interpretation: "Language-music interface",
    },
    BrodmannArea {
        area: "BA 6",
        frequency: 0.28,
        region: "Premotor",
        fnc_interpretation: "Motor-creative coupling",
    },
    BrodmannArea {
        area: "BA 7",
        frequency: 0.48,
        region: "Superior Parietal",
        fnc_interpretation: "Spatial integration",
    },
];

/// Share of acquired savants by lesion side.
pub const LATERALIZATION: [(&str, f64, RGBColor); 3] = [
    ("Left Hemisphere", 0.78, INJURY_RED),
    ("Right Hemisphere", 0.15, RGBColor(0x42, 0x92, 0xC6)),
    ("Bilateral", 0.07, TYPICAL_GREEN),
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CaseLesion {
    pub case: &'static str,
    pub injury_type: &'static str,
    pub location: &'static str,
    pub brodmann: &'static [&'static str],
    pub domain_emerged: &'static str,
}

pub const CASE_LESIONS: [CaseLesion; 5] = [
    CaseLesion {
        case: "Jason Padgett",
        injury_type: "Traumatic Brain Injury",
        location: "Left posterior parietal",
        brodmann: &["BA 7", "BA 39/40"],
        domain_emerged: "Mathematical/Geometric",
    },
    CaseLesion {
        case: "Derek Amato",
        injury_type: "Traumatic Brain Injury",
        location: "Left temporal",
        brodmann: &["BA 21/22", "BA 44/45"],
        domain_emerged: "Musical",
    },
    CaseLesion {
        case: "Orlando Serrell",
        injury_type: "Traumatic Brain Injury",
        location: "Left temporal",
        brodmann: &["BA 21/22", "BA 37"],
        domain_emerged: "Calendar/Memory",
    },
    CaseLesion {
        case: "Alonzo Clemons",
        injury_type: "Traumatic Brain Injury",
        location: "Left frontotemporal",
        brodmann: &["BA 9/10", "BA 21/22"],
        domain_emerged: "Sculptural/Mechanical",
    },
    CaseLesion {
        case: "FTD Cases (Miller)",
        injury_type: "Frontotemporal Dementia",
        location: "Left anterior temporal",
        brodmann: &["BA 21/22", "BA 38"],
        domain_emerged: "Visual Art",
    },
];

const BLUES: [&str; 8] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#084594",
];

/// Linear blue colormap over [0, 1].
pub fn blues(value: f64) -> RGBColor {
    let t = value.clamp(0.0, 1.0) * (BLUES.len() - 1) as f64;
    let lo = t.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    let frac = t - lo as f64;
    let (a, b) = (hex_color(BLUES[lo]), hex_color(BLUES[hi]));
    let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Brodmann areas by descending involvement frequency.
pub fn sorted_brodmann_areas() -> Vec<BrodmannArea> {
    let mut areas = BRODMANN_DATA.to_vec();
    areas.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
    areas
}

fn draw_pie(area: &SvgArea<'_>) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64 * 0.3).round();

    area.draw(&Text::new(
        "Lesion Lateralization (Left Hemisphere Dominance)",
        (center.0, 40),
        bold_style(16, &BLACK, HPos::Center, VPos::Center),
    ))?;

    let point = |angle: f64, r: f64, offset: (f64, f64)| -> (i32, i32) {
        (
            (center.0 as f64 + offset.0 + r * angle.cos()).round() as i32,
            (center.1 as f64 + offset.1 - r * angle.sin()).round() as i32,
        )
    };

    // Counter-clockwise from twelve o'clock, first wedge pulled out
    let mut start = PI / 2.0;
    for (i, (label, share, color)) in LATERALIZATION.iter().enumerate() {
        let sweep = share * 2.0 * PI;
        let mid = start + sweep / 2.0;
        let explode = if i == 0 { radius * 0.05 } else { 0.0 };
        let offset = (explode * mid.cos(), -explode * mid.sin());

        let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;
        let mut wedge = vec![point(0.0, 0.0, offset)];
        wedge.extend((0..=steps).map(|s| point(start + sweep * s as f64 / steps as f64, radius, offset)));
        area.draw(&Polygon::new(wedge, color.filled()))?;

        area.draw(&Text::new(
            format!("{:.0}%", share * 100.0),
            point(mid, radius * 0.6, offset),
            bold_style(13, &WHITE, HPos::Center, VPos::Center),
        ))?;
        area.draw(&Text::new(
            label.to_string(),
            point(mid, radius * 1.2, offset),
            text_style(13, &BLACK, HPos::Center, VPos::Center),
        ))?;

        start += sweep;
    }

    draw_lines(
        area,
        "FNC: Left hemisphere damage reduces\nanalytical filtering, enabling direct Field access",
        (center.0, h as i32 - 60),
        16,
        &note_style(12),
    )
}

/// Brodmann area involvement as a blue-shaded bar chart beside a
/// lateralization pie.
pub fn create_lesion_heatmap(path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally(860);

    let areas = sorted_brodmann_areas();
    let n = areas.len() as i32;

    let labels: Vec<String> = areas
        .iter()
        .map(|a| format!("{} ({})", a.area, a.region))
        .collect();
    let y_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&left)
        .caption("Brodmann Area Involvement (Node Modification Sites)", ("sans-serif", 18))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(190)
        .build_cartesian_2d(0.0f64..1.0f64, (0..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(areas.len())
        .y_label_formatter(&y_label)
        .x_label_formatter(&|x| format!("{:.0}%", x * 100.0))
        .x_desc("Involvement Frequency in Acquired Savant Cases")
        .draw()?;

    chart.draw_series(areas.iter().enumerate().map(|(i, a)| {
        let i = i as i32;
        Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i)),
                (a.frequency, SegmentValue::Exact(i + 1)),
            ],
            blues(a.frequency).filled(),
        )
    }))?;

    let pct_style = text_style(12, &BLACK, HPos::Left, VPos::Center);
    chart.draw_series(areas.iter().enumerate().map(|(i, a)| {
        Text::new(
            format!("{:.0}%", a.frequency * 100.0),
            (a.frequency + 0.02, SegmentValue::CenterOf(i as i32)),
            pct_style.clone(),
        )
    }))?;

    let fnc_style = text_style(10, &NOTE_GREY, HPos::Left, VPos::Center);
    chart.draw_series(areas.iter().enumerate().map(|(i, a)| {
        Text::new(
            a.fnc_interpretation,
            (0.8, SegmentValue::CenterOf(i as i32)),
            fnc_style.clone(),
        )
    }))?;

    draw_pie(&right)?;

    root.present()?;
    Ok(())
}

fn draw_arrow(area: &SvgArea<'_>, from: (i32, i32), to: (i32, i32)) -> Result<()> {
    let grey = RGBColor(0x80, 0x80, 0x80);
    area.draw(&PathElement::new(vec![from, to], grey.stroke_width(2)))?;
    area.draw(&PathElement::new(
        vec![(to.0 - 8, to.1 - 5), to, (to.0 - 8, to.1 + 5)],
        grey.stroke_width(2),
    ))?;
    Ok(())
}

/// Case → lesion → emerged domain for each documented case.
pub fn create_case_comparison(path: &Path) -> Result<()> {
    let (width, height) = (1200u32, 640u32);
    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let w = width as i32;
    let x = |frac: f64| (frac * w as f64) as i32;

    draw_lines(
        &root,
        "Acquired Savant Cases: From Lesion to Ability\n\
         (FNC: Node modification → Altered Field tuning → Domain emergence)",
        (w / 2, 30),
        22,
        &bold_style(18, &BLACK, HPos::Center, VPos::Center),
    )?;

    let header = bold_style(16, &BLACK, HPos::Center, VPos::Center);
    for (label, frac) in [("Case", 0.10), ("Node Modification", 0.48), ("Field Access", 0.85)] {
        root.draw(&Text::new(label, (x(frac), 110), header.clone()))?;
    }

    let row_height = 95;
    let case_style = bold_style(14, &BLACK, HPos::Left, VPos::Center);
    let lesion_style = text_style(12, &INJURY_RED, HPos::Left, VPos::Center);
    let ba_style = text_style(10, &RGBColor(0x80, 0x80, 0x80), HPos::Left, VPos::Center);
    let domain_style = bold_style(13, &SAVANT_BLUE, HPos::Left, VPos::Center);

    for (i, case) in CASE_LESIONS.iter().enumerate() {
        let y = 165 + i as i32 * row_height;

        root.draw(&Text::new(case.case, (x(0.02), y), case_style.clone()))?;
        draw_arrow(&root, (x(0.20), y), (x(0.34), y))?;

        root.draw(&Text::new(case.injury_type, (x(0.36), y - 10), lesion_style.clone()))?;
        root.draw(&Text::new(case.location, (x(0.36), y + 8), lesion_style.clone()))?;
        root.draw(&Text::new(
            format!("({})", case.brodmann.join(", ")),
            (x(0.36), y + 26),
            ba_style.clone(),
        ))?;

        draw_arrow(&root, (x(0.60), y), (x(0.72), y))?;
        root.draw(&Text::new(case.domain_emerged, (x(0.74), y), domain_style.clone()))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lateralization_sums_to_one() {
        let total: f64 = LATERALIZATION.iter().map(|(_, share, _)| share).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sorted_areas() {
        let areas = sorted_brodmann_areas();
        assert_eq!(areas[0].area, "BA 21/22");
        assert_eq!(areas[7].area, "BA 17/18");
        assert!(areas.windows(2).all(|w| w[0].frequency >= w[1].frequency));
    }

    #[test]
    fn test_blues_colormap() {
        assert_eq!(blues(0.0), hex_color("#f7fbff"));
        assert_eq!(blues(1.0), hex_color("#084594"));
        assert_eq!(blues(2.0), blues(1.0));
        // Darker with higher involvement
        assert!(blues(0.72).0 < blues(0.25).0);
    }

    #[test]
    fn test_create_lesion_heatmap() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lesion.svg");
        create_lesion_heatmap(&path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("72%"));
        assert!(svg.contains("Left Hemisphere"));
    }

    #[test]
    fn test_create_case_comparison() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cases.svg");
        create_case_comparison(&path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        for case in &CASE_LESIONS {
            assert!(svg.contains(case.domain_emerged));
        }
    }
}
