//! Acquired savant timelines from injury to ability onset.

use super::{
    bold_style, draw_lines, note_style, text_style, SvgArea, EVENT_SLATE, INJURY_RED,
    ONSET_ORANGE, SAFFRON, STABLE_TEAL, WHEAT,
};
use crate::error::FncError;
use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, VPos};
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CaseTimeline {
    pub case: &'static str,
    pub injury_date: &'static str,
    pub injury_type: &'static str,
    pub ability_onset: &'static str,
    pub ability_stabilized: &'static str,
    pub domain: &'static str,
    pub key_events: [(&'static str, &'static str); 5],
    pub fnc_note: &'static str,
}

pub const CASE_TIMELINES: [CaseTimeline; 4] = [
    CaseTimeline {
        case: "Jason Padgett",
        injury_date: "2002-09-13",
        injury_type: "Assault (TBI)",
        ability_onset: "Immediate",
        ability_stabilized: "Weeks",
        domain: "Mathematical/Geometric",
        key_events: [
            ("2002-09", "Assault outside karaoke bar"),
            ("2002-09", "Immediate geometric visions"),
            ("2002-10", "Begins drawing fractals"),
            ("2003", "Enrolls in mathematics"),
            ("2014", "Published memoir"),
        ],
        fnc_note: "Instant Node reconfiguration",
    },
    CaseTimeline {
        case: "Derek Amato",
        injury_date: "2006-10",
        injury_type: "Diving accident (TBI)",
        ability_onset: "3 days",
        ability_stabilized: "Weeks",
        domain: "Musical",
        key_events: [
            ("2006-10", "Diving accident, concussion"),
            ("2006-10", "First piano attempt (3 days post)"),
            ("2006-11", "Plays for hours continuously"),
            ("2007", "Performs publicly"),
            ("2013", "Featured in documentaries"),
        ],
        fnc_note: "Delayed onset = Node stabilization",
    },
    CaseTimeline {
        case: "Orlando Serrell",
        injury_date: "1979-08-17",
        injury_type: "Baseball impact (TBI)",
        ability_onset: "Gradual",
        ability_stabilized: "Months",
        domain: "Calendar/Autobiographical",
        key_events: [
            ("1979-08", "Hit by baseball, age 10"),
            ("1979-09", "Headaches subside"),
            ("1979-12", "Notices date-recall ability"),
            ("1980s", "Ability becomes consistent"),
            ("2000s", "Media recognition"),
        ],
        fnc_note: "Gradual Field channel opening",
    },
    CaseTimeline {
        case: "Tony Cicoria",
        injury_date: "1994",
        injury_type: "Lightning strike",
        ability_onset: "Weeks",
        ability_stabilized: "Months",
        domain: "Musical composition",
        key_events: [
            ("1994", "Struck by lightning"),
            ("1994", "Near-death experience"),
            ("1994", "Obsession with piano begins"),
            ("1995", "Composes 'Lightning Sonata'"),
            ("2007", "Featured in Sacks' 'Musicophilia'"),
        ],
        fnc_note: "NDE + Node reset",
    },
];

pub fn case_timeline(name: &str) -> Result<&'static CaseTimeline, FncError> {
    CASE_TIMELINES
        .iter()
        .find(|c| c.case.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| FncError::UnknownCase(name.to_string()))
}

/// How quickly an ability appeared after injury.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OnsetBucket {
    Immediate,
    Days,
    Weeks,
    Months,
}

impl OnsetBucket {
    pub const ALL: [OnsetBucket; 4] = [
        OnsetBucket::Immediate,
        OnsetBucket::Days,
        OnsetBucket::Weeks,
        OnsetBucket::Months,
    ];

    /// Anything not immediate, in days or in weeks counts as months.
    pub fn classify(onset: &str) -> Self {
        let onset = onset.to_lowercase();
        if onset.contains("immediate") {
            OnsetBucket::Immediate
        } else if onset.contains("day") {
            OnsetBucket::Days
        } else if onset.contains("week") {
            OnsetBucket::Weeks
        } else {
            OnsetBucket::Months
        }
    }

    fn color(&self) -> RGBColor {
        match self {
            OnsetBucket::Immediate => INJURY_RED,
            OnsetBucket::Days => ONSET_ORANGE,
            OnsetBucket::Weeks => SAFFRON,
            OnsetBucket::Months => STABLE_TEAL,
        }
    }
}

impl fmt::Display for OnsetBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OnsetBucket::Immediate => "Immediate",
            OnsetBucket::Days => "Days",
            OnsetBucket::Weeks => "Weeks",
            OnsetBucket::Months => "Months",
        };
        write!(f, "{}", s)
    }
}

/// Case names per onset bucket, in bucket order.
pub fn onset_buckets() -> Vec<(OnsetBucket, Vec<&'static str>)> {
    OnsetBucket::ALL
        .iter()
        .map(|&bucket| {
            let cases = CASE_TIMELINES
                .iter()
                .filter(|c| OnsetBucket::classify(c.ability_onset) == bucket)
                .map(|c| c.case)
                .collect();
            (bucket, cases)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Injury,
    Onset,
    Event,
}

fn event_kind(index: usize, description: &str) -> EventKind {
    let lower = description.to_lowercase();
    if index == 0 {
        EventKind::Injury
    } else if lower.contains("first") || lower.contains("immediate") {
        EventKind::Onset
    } else {
        EventKind::Event
    }
}

fn draw_case_row(area: &SvgArea<'_>, case: &CaseTimeline) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let axis_y = h / 2 + 10;

    draw_lines(
        area,
        &format!(
            "{} | {}\nOnset: {} | FNC: {}",
            case.case, case.domain, case.ability_onset, case.fnc_note
        ),
        (w / 2, 18),
        18,
        &bold_style(14, &BLACK, HPos::Center, VPos::Center),
    )?;

    area.draw(&PathElement::new(
        vec![(40, axis_y), (w - 40, axis_y)],
        RGBColor(0x80, 0x80, 0x80).mix(0.5).stroke_width(2),
    ))?;

    let n = case.key_events.len() as i32;
    let step = (w - 80) / n;
    let label_style = text_style(11, &BLACK, HPos::Center, VPos::Center);

    for (i, (date, description)) in case.key_events.iter().enumerate() {
        let x = 40 + step / 2 + i as i32 * step;
        let kind = event_kind(i, description);

        match kind {
            EventKind::Injury => {
                area.draw(&Cross::new((x, axis_y), 9, INJURY_RED.stroke_width(4)))?;
            }
            EventKind::Onset => {
                area.draw(&Circle::new((x, axis_y), 8, ONSET_ORANGE.filled()))?;
            }
            EventKind::Event => {
                area.draw(&Circle::new((x, axis_y), 6, EVENT_SLATE.filled()))?;
            }
        }

        // Alternate labels above and below the axis
        let label_y = if i % 2 == 0 { axis_y - 50 } else { axis_y + 32 };
        area.draw(&PathElement::new(
            vec![(x, axis_y), (x, if i % 2 == 0 { label_y + 18 } else { label_y - 6 })],
            RGBColor(0x80, 0x80, 0x80).mix(0.5).stroke_width(1),
        ))?;
        draw_lines(
            area,
            &format!("{}\n{}", date, description),
            (x, label_y),
            14,
            &label_style,
        )?;
    }

    Ok(())
}

fn draw_legend(area: &SvgArea<'_>) -> Result<()> {
    let (w, _) = area.dim_in_pixel();
    let x = w as i32 - 200;
    let style = text_style(12, &BLACK, HPos::Left, VPos::Center);

    area.draw(&Cross::new((x, 20), 6, INJURY_RED.stroke_width(3)))?;
    area.draw(&Text::new("Injury Event", (x + 14, 20), style.clone()))?;
    area.draw(&Circle::new((x, 40), 6, ONSET_ORANGE.filled()))?;
    area.draw(&Text::new("Ability Onset", (x + 14, 40), style.clone()))?;
    area.draw(&Circle::new((x, 60), 5, EVENT_SLATE.filled()))?;
    area.draw(&Text::new("Subsequent Event", (x + 14, 60), style))?;
    Ok(())
}

/// Timeline of one case, or of every case when `case_name` is `None`.
/// An unknown case name is an [`FncError::UnknownCase`].
pub fn create_case_timeline(case_name: Option<&str>, path: &Path) -> Result<()> {
    let cases: Vec<&CaseTimeline> = match case_name {
        Some(name) => vec![case_timeline(name)?],
        None => CASE_TIMELINES.iter().collect(),
    };

    let row_height = 230u32;
    let header = 90u32;
    let root = SVGBackend::new(path, (1400, header + row_height * cases.len() as u32))
        .into_drawing_area();
    root.fill(&WHITE)?;

    draw_lines(
        &root,
        "Acquired Savant Timelines: From Injury to Ability\n\
         (FNC: Node disruption → Field reconfiguration → New tuning)",
        (560, 28),
        22,
        &bold_style(18, &BLACK, HPos::Center, VPos::Center),
    )?;
    draw_legend(&root)?;

    let (_, body) = root.split_vertically(header as i32);
    let rows = body.split_evenly((cases.len(), 1));
    for (row, case) in rows.iter().zip(&cases) {
        draw_case_row(row, case)?;
    }

    root.present()?;
    Ok(())
}

/// Number of cases per onset bucket, with the case names above each bar.
pub fn create_onset_comparison(path: &Path) -> Result<()> {
    let buckets = onset_buckets();
    let max_count = buckets.iter().map(|(_, c)| c.len()).max().unwrap_or(0) as f64;

    let root = SVGBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<String> = buckets.iter().map(|(b, _)| b.to_string()).collect();
    let x_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => names.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Acquired Savant: Onset Time Distribution (FNC: Faster onset = More dramatic Node reconfiguration)",
            ("sans-serif", 17),
        )
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..buckets.len() as i32).into_segmented(), 0.0f64..max_count + 1.0)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(buckets.len())
        .x_label_formatter(&x_label)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc("Time to Ability Onset")
        .y_desc("Number of Cases")
        .draw()?;

    chart.draw_series(buckets.iter().enumerate().map(|(i, (bucket, cases))| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), cases.len() as f64),
            ],
            bucket.color().filled(),
        );
        bar.set_margin(0, 0, 15, 15);
        bar
    }))?;

    let name_style = text_style(11, &BLACK, HPos::Center, VPos::Bottom);
    for (i, (_, cases)) in buckets.iter().enumerate() {
        for (j, case) in cases.iter().rev().enumerate() {
            chart.draw_series(std::iter::once(Text::new(
                *case,
                (
                    SegmentValue::CenterOf(i as i32),
                    cases.len() as f64 + 0.05 + j as f64 * 0.08,
                ),
                name_style.clone(),
            )))?;
        }
    }

    let (w, h) = root.dim_in_pixel();
    let (bx, by) = (w as i32 - 330, h as i32 - 190);
    root.draw(&Rectangle::new([(bx, by), (bx + 300, by + 90)], WHEAT.mix(0.5).filled()))?;
    draw_lines(
        &root,
        "FNC Interpretation:\n\
         • Immediate: Catastrophic filter removal\n\
         • Days/Weeks: Gradual Node stabilization\n\
         • Months: Slow Field channel opening",
        (bx + 150, by + 18),
        18,
        &note_style(11),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_onset_classification() {
        assert_eq!(OnsetBucket::classify("Immediate"), OnsetBucket::Immediate);
        assert_eq!(OnsetBucket::classify("3 days"), OnsetBucket::Days);
        assert_eq!(OnsetBucket::classify("Weeks"), OnsetBucket::Weeks);
        assert_eq!(OnsetBucket::classify("Gradual"), OnsetBucket::Months);
    }

    #[test]
    fn test_onset_buckets() {
        let buckets = onset_buckets();
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0].1, vec!["Jason Padgett"]);
        assert_eq!(buckets[1].1, vec!["Derek Amato"]);
        assert_eq!(buckets[2].1, vec!["Tony Cicoria"]);
        assert_eq!(buckets[3].1, vec!["Orlando Serrell"]);
    }

    #[test]
    fn test_event_kinds() {
        let padgett = case_timeline("Jason Padgett").unwrap();
        let kinds: Vec<EventKind> = padgett
            .key_events
            .iter()
            .enumerate()
            .map(|(i, (_, d))| event_kind(i, d))
            .collect();
        assert_eq!(kinds[0], EventKind::Injury);
        assert_eq!(kinds[1], EventKind::Onset);
        assert_eq!(kinds[2], EventKind::Event);
    }

    #[test]
    fn test_unknown_case() {
        let dir = TempDir::new().unwrap();
        let err = create_case_timeline(Some("Kim Peek"), &dir.path().join("x.svg")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FncError>(),
            Some(FncError::UnknownCase(name)) if name == "Kim Peek"
        ));
    }

    #[test]
    fn test_create_single_timeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("amato.svg");
        create_case_timeline(Some("derek amato"), &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Performs publicly"));
    }

    #[test]
    fn test_create_all_timelines_and_onset() {
        let dir = TempDir::new().unwrap();
        let timelines = dir.path().join("all.svg");
        create_case_timeline(None, &timelines).unwrap();
        assert!(std::fs::read_to_string(&timelines)
            .unwrap()
            .contains("Struck by lightning"));

        let onset = dir.path().join("onset.svg");
        create_onset_comparison(&onset).unwrap();
        assert!(std::fs::read_to_string(&onset).unwrap().contains("Orlando Serrell"));
    }
}
