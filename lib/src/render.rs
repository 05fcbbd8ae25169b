//! Text layout for the HUD display.
//!
//! Everything here is a pure function of its inputs so that an unchanged
//! ship produces byte-identical text, which lets hosts skip redundant
//! display writes.

use crate::{
    aggregate::{DirectionTotals, GroupEntry},
    sampler::VehicleSample,
    settings::Settings,
    toggles::{RuntimeToggles, StatusLog},
};

pub const BOX_WIDTH: usize = 34;
pub const NAME_WIDTH: usize = 13;
pub const VALUE_WIDTH: usize = 9;
pub const TITLE: &str = "ΔV HUD";
pub const UNAVAILABLE: &str = "ΔV unavailable: bad mass/fuel";
const NO_GROUPS: &str = "No groups defined in settings";
const BAR_LEN: usize = 24;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    Top,
    Mid,
    Separator,
    Bottom,
}

pub fn rule(kind: Rule, width: usize) -> String {
    let inner = width.saturating_sub(2);
    match kind {
        Rule::Top => format!("╔{}╗", "═".repeat(inner)),
        Rule::Mid => format!("╠{}╣", "═".repeat(inner)),
        Rule::Separator => {
            let inner = width.saturating_sub(3);
            let split = inner / 2;
            format!(
                "╟{}┬{}╢",
                "─".repeat(split),
                "─".repeat(split + inner % 2)
            )
        }
        Rule::Bottom => format!("╚{}╝", "═".repeat(inner)),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// `side`, the text centered in `width - 2` columns, and `side` again
/// unless it is a space.
pub fn pad_center(text: &str, width: usize, side: char) -> String {
    let inner = width.saturating_sub(2);
    let text = truncate(text, inner);
    let total = inner - text.chars().count();
    let left = total / 2;
    let mut out = String::with_capacity(width * 3);
    out.push(side);
    out.push_str(&" ".repeat(left));
    out.push_str(text);
    out.push_str(&" ".repeat(total - left));
    if side != ' ' {
        out.push(side);
    }
    out
}

/// Like [`pad_center`], but left aligned.
pub fn pad_sides(text: &str, width: usize, side: char) -> String {
    let inner = width.saturating_sub(2);
    let text = truncate(text, inner);
    let mut out = format!("{side}{text}{}", " ".repeat(inner - text.chars().count()));
    if side != ' ' {
        out.push(side);
    }
    out
}

/// Greedy word wrap. Words longer than `max` are split hard.
pub fn wrap_lines(input: &str, max: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut remaining = input.to_string();
    while remaining.chars().count() > max {
        let head: String = remaining.chars().take(max + 1).collect();
        let split = match head.rfind(' ') {
            Some(i) if i > 0 => i,
            _ => head.char_indices().nth(max).map_or(head.len(), |(i, _)| i),
        };
        lines.push(remaining[..split].trim_end().to_string());
        remaining = remaining[split..].trim_start().to_string();
    }
    if !remaining.is_empty() {
        lines.push(remaining);
    }
    lines
}

fn row(name: &str, value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!(" {name:<NAME_WIDTH$} │ {v:>VALUE_WIDTH$.0} {unit} "),
        None => format!(
            " {name:<NAME_WIDTH$} │ {:>VALUE_WIDTH$} {} ",
            "N/a",
            " ".repeat(unit.chars().count())
        ),
    }
}

struct Frame {
    out: String,
    borders: bool,
}

impl Frame {
    fn new(settings: &Settings) -> Self {
        Self {
            out: String::new(),
            borders: settings.show_borders,
        }
    }

    fn side(&self) -> char {
        if self.borders {
            '║'
        } else {
            ' '
        }
    }

    fn rule(&mut self, kind: Rule) {
        if self.borders {
            self.out.push_str(&rule(kind, BOX_WIDTH));
            self.out.push('\n');
        }
    }

    fn center(&mut self, text: &str) {
        let line = pad_center(text, BOX_WIDTH, self.side());
        self.out.push_str(&line);
        self.out.push('\n');
    }

    fn left(&mut self, text: &str) {
        let line = pad_sides(text, BOX_WIDTH, self.side());
        self.out.push_str(&line);
        self.out.push('\n');
    }
}

/// Everything one report is built from.
#[derive(Copy, Clone, Debug)]
pub struct ReportInput<'a> {
    pub settings: &'a Settings,
    pub toggles: RuntimeToggles,
    pub groups: &'a [GroupEntry],
    /// `None` when burn times are hidden.
    pub directions: Option<&'a DirectionTotals>,
    pub sample: VehicleSample,
    pub status: &'a StatusLog,
}

/// The boxed body shown when the mass sample cannot be used.
pub fn render_unavailable(settings: &Settings) -> String {
    let mut frame = Frame::new(settings);
    frame.rule(Rule::Top);
    frame.center(TITLE);
    frame.rule(Rule::Mid);
    frame.center(UNAVAILABLE);
    frame.rule(Rule::Bottom);
    frame.out
}

pub fn render_report(input: &ReportInput) -> String {
    if !input.sample.is_valid() {
        return render_unavailable(input.settings);
    }

    let mut frame = Frame::new(input.settings);
    frame.rule(Rule::Top);
    frame.center(TITLE);
    frame.rule(Rule::Mid);
    if input.settings.show_header_and_settings {
        frame.center(&input.toggles.header());
    }
    frame.rule(Rule::Mid);

    frame.rule(Rule::Separator);
    if input.groups.is_empty() {
        frame.center(NO_GROUPS);
    } else {
        frame.center("ΔV by Group:");
        for entry in input.groups {
            let dv = entry.partition.and_then(|p| p.delta_v(&input.sample));
            frame.left(&row(&entry.name, dv, "m/s"));
        }
        frame.rule(Rule::Mid);
    }

    if let Some(directions) = input.directions {
        frame.rule(Rule::Separator);
        frame.center("Burn Times (sec):");
        frame.rule(Rule::Separator);
        for (dir, partition) in directions {
            if partition.fuel_lps <= 0.0 {
                continue;
            }
            let seconds = partition.burn_time(&input.sample);
            frame.left(&row(&dir.to_string(), seconds, "sec"));
        }
    }
    frame.rule(Rule::Bottom);

    let mut out = frame.out;
    if !input.status.is_empty() {
        out.push_str("\n[Status]\n");
        for entry in input.status.entries() {
            out.push_str(entry);
            out.push('\n');
        }
    }
    out
}

/// One frame of the boot animation.
pub fn render_boot_frame(message: &str, frame: usize, progress_steps: usize) -> String {
    let spin = SPINNER[frame % SPINNER.len()];
    let filled = (frame * BAR_LEN / progress_steps.max(1)).min(BAR_LEN);
    let bar = format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_LEN - filled));

    let mut out = String::from("\n");
    out.push_str(&pad_center(TITLE, BOX_WIDTH, ' '));
    out.push_str("\n\n");
    out.push_str(&pad_center(spin, BOX_WIDTH, ' '));
    out.push('\n');
    for line in wrap_lines(message, BOX_WIDTH - 2) {
        out.push_str(&pad_center(&line, BOX_WIDTH, ' '));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&pad_center(&bar, BOX_WIDTH, ' '));
    out.push_str("\n\n");
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{aggregate::Partition, direction::Direction};

    fn sample() -> VehicleSample {
        VehicleSample {
            total_mass_kg: 10_000.0,
            fuel_mass_kg: 2_000.0,
        }
    }

    fn boost() -> GroupEntry {
        GroupEntry {
            name: "Boost".into(),
            partition: Some(Partition {
                thrust_n: 500_000.0,
                fuel_lps: 200.0,
                contributors: 2,
            }),
        }
    }

    fn width(line: &str) -> usize {
        line.chars().count()
    }

    #[test]
    fn rules_span_the_box() {
        for kind in [Rule::Top, Rule::Mid, Rule::Separator, Rule::Bottom] {
            assert_eq!(width(&rule(kind, BOX_WIDTH)), BOX_WIDTH);
        }
        assert_eq!(
            rule(Rule::Separator, BOX_WIDTH),
            format!("╟{}┬{}╢", "─".repeat(15), "─".repeat(16))
        );
    }

    #[test]
    fn padding() {
        assert_eq!(pad_center("ab", 8, '|'), "|  ab  |");
        assert_eq!(pad_center("abc", 8, '|'), "| abc  |");
        assert_eq!(pad_center("abc", 8, ' '), "  abc  ");
        assert_eq!(pad_center("abcdefghij", 8, '|'), "|abcdef|");
        assert_eq!(pad_sides("ΔV", 6, '|'), "|ΔV  |");
        assert_eq!(pad_sides("ΔVΔVΔV", 6, ' '), " ΔVΔV");
    }

    #[test]
    fn wrapping() {
        assert_eq!(
            wrap_lines("Checking for valid EnCorp software license", 32),
            ["Checking for valid EnCorp", "software license"]
        );
        assert_eq!(wrap_lines("short", 32), ["short"]);
        assert_eq!(wrap_lines("abcdefgh", 3), ["abc", "def", "gh"]);
    }

    #[test]
    fn reference_report() {
        let settings = Settings::default();
        let status = StatusLog::default();
        let groups = [boost()];
        let text = render_report(&ReportInput {
            settings: &settings,
            toggles: RuntimeToggles::default(),
            groups: &groups,
            directions: None,
            sample: sample(),
            status: &status,
        });
        let expected = [
            rule(Rule::Top, BOX_WIDTH),
            "║             ΔV HUD             ║".to_string(),
            rule(Rule::Mid, BOX_WIDTH),
            "║ RCS: ON   Burn: ON   Dir: ALL  ║".to_string(),
            rule(Rule::Mid, BOX_WIDTH),
            rule(Rule::Separator, BOX_WIDTH),
            "║          ΔV by Group:          ║".to_string(),
            "║ Boost         │     55786 m/s  ║".to_string(),
            rule(Rule::Mid, BOX_WIDTH),
            rule(Rule::Bottom, BOX_WIDTH),
        ];
        assert_eq!(text, expected.map(|l| l + "\n").concat());
        assert!(text.lines().all(|l| width(l) == BOX_WIDTH));
    }

    #[test]
    fn empty_group_is_na_not_zero() {
        let settings = Settings::default();
        let status = StatusLog::default();
        let groups = [
            GroupEntry {
                name: "Efficient".into(),
                partition: Some(Partition::default()),
            },
            GroupEntry {
                name: "Ghost".into(),
                partition: None,
            },
        ];
        let text = render_report(&ReportInput {
            settings: &settings,
            toggles: RuntimeToggles::default(),
            groups: &groups,
            directions: None,
            sample: sample(),
            status: &status,
        });
        assert!(text.contains("║ Efficient     │       N/a      ║"));
        assert!(text.contains("║ Ghost         │       N/a      ║"));
        assert!(!text.contains("0 m/s"));
    }

    #[test]
    fn burn_times_skip_idle_directions() {
        let settings = Settings {
            show_borders: false,
            show_header_and_settings: false,
            ..Settings::default()
        };
        let status = StatusLog::default();
        let mut directions: DirectionTotals = Direction::ALL
            .iter()
            .map(|&d| (d, Partition::default()))
            .collect::<BTreeMap<_, _>>();
        directions.insert(
            Direction::Up,
            Partition {
                thrust_n: 1.0,
                fuel_lps: 100.0,
                contributors: 1,
            },
        );
        directions.insert(
            Direction::Forward,
            Partition {
                thrust_n: 1.0,
                fuel_lps: 200.0,
                contributors: 1,
            },
        );
        let text = render_report(&ReportInput {
            settings: &settings,
            toggles: RuntimeToggles::default(),
            groups: &[],
            directions: Some(&directions),
            sample: sample(),
            status: &status,
        });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "              ΔV HUD             ",
                "  No groups defined in settings  ",
                "        Burn Times (sec):        ",
                "  Forward       │      1000 sec  ",
                "  Up            │      2000 sec  ",
            ]
        );
    }

    #[test]
    fn invalid_sample_renders_only_the_message() {
        let settings = Settings::default();
        let mut status = StatusLog::default();
        status.push("[Toggle] RCS: OFF".into());
        let groups = [boost()];
        let text = render_report(&ReportInput {
            settings: &settings,
            toggles: RuntimeToggles::default(),
            groups: &groups,
            directions: None,
            sample: VehicleSample {
                total_mass_kg: 1000.0,
                fuel_mass_kg: 1000.0,
            },
            status: &status,
        });
        assert_eq!(text, render_unavailable(&settings));
        assert!(text.contains(UNAVAILABLE));
        assert!(!text.contains("Boost"));
        assert!(!text.contains("[Status]"));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn status_block_follows_the_box() {
        let settings = Settings::default();
        let mut status = StatusLog::default();
        status.push("[Toggle] RCS: OFF".into());
        status.push("[Toggle] RCS: ON".into());
        let groups = [boost()];
        let input = ReportInput {
            settings: &settings,
            toggles: RuntimeToggles::default(),
            groups: &groups,
            directions: None,
            sample: sample(),
            status: &status,
        };
        let text = render_report(&input);
        assert!(text.ends_with(&format!(
            "{}\n\n[Status]\n[Toggle] RCS: OFF\n[Toggle] RCS: ON\n",
            rule(Rule::Bottom, BOX_WIDTH)
        )));
        // pure: same input, same bytes
        assert_eq!(text, render_report(&input));
    }

    #[test]
    fn boot_frame() {
        let text = render_boot_frame("Loading HUD modules", 1, 15);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1].trim(), TITLE);
        assert_eq!(lines[3].trim(), "/");
        assert_eq!(lines[4].trim(), "Loading HUD modules");
        assert_eq!(lines[6].trim(), format!("[#{}]", "-".repeat(23)));
        let done = render_boot_frame("Launching ΔV HUD", 15, 15);
        assert!(done.contains(&format!("[{}]", "#".repeat(24))));
    }
}
