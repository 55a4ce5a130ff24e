//! SVG chart generation.
//!
//! Every chart is drawn with `plotters` onto an [`SVGBackend`] and written
//! to the path it is given. [`generate_all_charts`] renders the full set
//! into one directory.

pub mod lesion;
pub mod radar;
pub mod timeline;
pub mod tuning;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DOMAIN_RADAR_FILE: &str = "domain_radar_population.svg";
pub const PADGETT_PROFILE_FILE: &str = "profile_padgett.svg";
pub const LESION_HEATMAP_FILE: &str = "lesion_heatmap.svg";
pub const CASE_COMPARISON_FILE: &str = "case_lesion_comparison.svg";
pub const CASE_TIMELINES_FILE: &str = "case_timelines_all.svg";
pub const ONSET_COMPARISON_FILE: &str = "onset_comparison.svg";
pub const TUNING_COMPARISON_FILE: &str = "fnc_tuning_comparison.svg";
pub const TUNING_SPECTRUM_FILE: &str = "fnc_tuning_spectrum.svg";

// Shared palette
pub(crate) const SAVANT_BLUE: RGBColor = RGBColor(0x2E, 0x86, 0xAB);
pub(crate) const INJURY_RED: RGBColor = RGBColor(0xE9, 0x4F, 0x37);
pub(crate) const ONSET_ORANGE: RGBColor = RGBColor(0xF4, 0xA2, 0x61);
pub(crate) const SAFFRON: RGBColor = RGBColor(0xE9, 0xC4, 0x6A);
pub(crate) const STABLE_TEAL: RGBColor = RGBColor(0x2A, 0x9D, 0x8F);
pub(crate) const EVENT_SLATE: RGBColor = RGBColor(0x26, 0x46, 0x53);
pub(crate) const TYPICAL_GREEN: RGBColor = RGBColor(0x90, 0xBE, 0x6D);
pub(crate) const NOTE_GREY: RGBColor = RGBColor(0x66, 0x66, 0x66);
pub(crate) const WHEAT: RGBColor = RGBColor(0xF5, 0xDE, 0xB3);

/// Parse `#RRGGBB`.
pub(crate) fn hex_color(hex: &str) -> RGBColor {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    RGBColor(channel(0), channel(2), channel(4))
}

/// Pixel-space drawing area of an SVG chart.
pub(crate) type SvgArea<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Text style with the given size, color and anchor.
pub(crate) fn text_style(size: u32, color: &RGBColor, h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle {
        font: ("sans-serif", size).into_font(),
        color: color.to_backend_color(),
        pos: Pos::new(h, v),
    }
}

/// Bold text style, anchored like [`text_style`].
pub(crate) fn bold_style(size: u32, color: &RGBColor, h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle {
        font: ("sans-serif", size).into_font().style(FontStyle::Bold),
        color: color.to_backend_color(),
        pos: Pos::new(h, v),
    }
}

/// Italic grey note text, centered.
pub(crate) fn note_style(size: u32) -> TextStyle<'static> {
    TextStyle {
        font: ("sans-serif", size).into_font().style(FontStyle::Italic),
        color: NOTE_GREY.to_backend_color(),
        pos: Pos::new(HPos::Center, VPos::Center),
    }
}

/// Draw a multi-line text block, `spacing` pixels between lines.
pub(crate) fn draw_lines(
    area: &SvgArea<'_>,
    lines: &str,
    (x, y): (i32, i32),
    spacing: i32,
    style: &TextStyle<'static>,
) -> Result<()> {
    for (i, line) in lines.lines().enumerate() {
        area.draw(&Text::new(
            line.to_string(),
            (x, y + i as i32 * spacing),
            style.clone(),
        ))?;
    }
    Ok(())
}

fn create_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

type ChartFn = fn(&Path) -> Result<()>;

fn padgett_profile(path: &Path) -> Result<()> {
    radar::create_individual_profile("Jason Padgett", &radar::PADGETT_ABILITIES, path)
}

fn all_timelines(path: &Path) -> Result<()> {
    timeline::create_case_timeline(None, path)
}

/// Render every chart into `output_dir`, returning the written paths.
pub fn generate_all_charts(output_dir: &Path, show_progress: bool) -> Result<Vec<PathBuf>> {
    create_output_dir(output_dir)?;

    let charts: [(&'static str, ChartFn); 8] = [
        (DOMAIN_RADAR_FILE, radar::create_domain_radar),
        (PADGETT_PROFILE_FILE, padgett_profile),
        (LESION_HEATMAP_FILE, lesion::create_lesion_heatmap),
        (CASE_COMPARISON_FILE, lesion::create_case_comparison),
        (CASE_TIMELINES_FILE, all_timelines),
        (ONSET_COMPARISON_FILE, timeline::create_onset_comparison),
        (TUNING_COMPARISON_FILE, tuning::create_tuning_comparison),
        (TUNING_SPECTRUM_FILE, tuning::create_tuning_spectrum),
    ];

    let progress_bar = if show_progress {
        let pb = ProgressBar::new(charts.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut written = Vec::with_capacity(charts.len());
    for (file, draw) in charts {
        let path = output_dir.join(file);
        if let Some(ref pb) = progress_bar {
            pb.set_message(file);
        }
        draw(&path).with_context(|| format!("Failed to render {}", path.display()))?;
        debug!("Saved: {}", path.display());
        written.push(path);
        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Charts complete");
    }

    info!("Rendered {} charts to {}", written.len(), output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color("#E94F37"), INJURY_RED);
        assert_eq!(hex_color("2E86AB"), SAVANT_BLUE);
        assert_eq!(hex_color("#zz"), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_text_style_outlives_color() {
        let style = {
            let grey = RGBColor(0x80, 0x80, 0x80);
            text_style(14, &grey, HPos::Left, VPos::Top)
        };
        assert_eq!(style.color.rgb, (0x80, 0x80, 0x80));

        let bold = bold_style(16, &RGBColor(1, 2, 3), HPos::Center, VPos::Center);
        assert!(matches!(bold.font.get_style(), FontStyle::Bold));
        assert_eq!(note_style(12).color.rgb, (0x66, 0x66, 0x66));
    }

    #[test]
    fn test_generate_all_charts() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("figures");
        let written = generate_all_charts(&out, false).unwrap();
        assert_eq!(written.len(), 8);
        for path in &written {
            let content = std::fs::read_to_string(path).unwrap();
            assert!(content.contains("<svg"), "{} is not SVG", path.display());
        }
        assert!(out.join(TUNING_SPECTRUM_FILE).exists());
    }
}
