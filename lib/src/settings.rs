//! Player-editable settings, stored in the host's settings blob.
//!
//! The blob is a small INI dialect: `[Section]` headers, `Key=Value`
//! entries and `;` comment lines that document the entry below them. Every
//! time a key is missing, the whole blob is regenerated from the values that
//! were read plus defaults for the rest, comments included. Nothing is ever
//! patched in place.

use std::{collections::HashMap, fmt};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::host::{DisplayStyle, Host};

pub const SECTION: &str = "DeltaV";

const GROUPS: &str = "Groups";
const HUD_POSITION_X: &str = "HudPositionX";
const HUD_POSITION_Y: &str = "HudPositionY";
const SHOW_HEADER: &str = "ShowHeaderAndSettings";
const LCD_COLOR: &str = "LcdColor";
const LCD_FONT: &str = "LcdFont";
const SHOW_BORDERS: &str = "ShowBorders";
const LCD_HUD_SIZE: &str = "LcdHudSize";

/// Recognized keys in the order they are written, with the comment that
/// precedes each of them.
const KEYS: [(&str, &str); 8] = [
    (GROUPS, "------- Group Names are seperated by comma --------"),
    (
        HUD_POSITION_X,
        "------- Value from -1 to 1, -1 is left, 1 is right -------",
    ),
    (
        HUD_POSITION_Y,
        "------- Value from -1 to 1, -1 is bottom, 1 is top -------",
    ),
    (SHOW_HEADER, "------- True, or False -------"),
    (LCD_COLOR, "------- R,G,B -------"),
    (LCD_FONT, "------- Monospace, Debug -------"),
    (SHOW_BORDERS, "------- True, or False -------"),
    (LCD_HUD_SIZE, "------- LCD Size (0.5 - 2.0) -------"),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Terminal group names, in display order
    pub group_names: Vec<String>,
    /// Horizontal HUD anchor, -1 is left and 1 is right
    pub hud_anchor_x: f64,
    /// Vertical HUD anchor, -1 is bottom and 1 is top
    pub hud_anchor_y: f64,
    pub show_header_and_settings: bool,
    pub show_borders: bool,
    pub display_color: Color,
    pub font_name: String,
    /// Passed through to the HUD placement line untouched.
    pub hud_scale: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            group_names: default_groups(),
            hud_anchor_x: 0.6,
            hud_anchor_y: 0.98,
            show_header_and_settings: true,
            show_borders: true,
            display_color: Color::gray(225),
            font_name: "Monospace".into(),
            hud_scale: "0.8".into(),
        }
    }
}

fn default_groups() -> Vec<String> {
    ["All Drives", "Boost", "Efficient", "Braking"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Settings {
    pub fn display_style(&self) -> DisplayStyle {
        DisplayStyle {
            font: self.font_name.clone(),
            color: self.display_color,
        }
    }
}

/// Result of reading a settings blob.
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed {
    pub settings: Settings,
    /// The blob was empty, malformed or incomplete and should be replaced
    /// with [`serialize`] of `settings`.
    pub needs_rewrite: bool,
}

pub fn parse(blob: &str) -> Parsed {
    let Some(sections) = parse::document(blob) else {
        debug!("settings::parse: blob is empty or malformed");
        return Parsed {
            settings: Settings::default(),
            needs_rewrite: true,
        };
    };
    let Some(entries) = sections
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(SECTION))
        .map(|(_, entries)| entries)
    else {
        debug!("settings::parse: no [{SECTION}] section");
        return Parsed {
            settings: Settings::default(),
            needs_rewrite: true,
        };
    };

    let mut settings = Settings::default();
    let mut missing = vec![];
    let mut get = |key: &'static str| {
        let value = entries.get(&key.to_lowercase()).copied();
        if value.is_none() {
            missing.push(key);
        }
        value
    };

    if let Some(v) = get(GROUPS) {
        settings.group_names = v
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(v) = get(HUD_POSITION_X) {
        settings.hud_anchor_x = v.parse().unwrap_or(settings.hud_anchor_x);
    }
    if let Some(v) = get(HUD_POSITION_Y) {
        settings.hud_anchor_y = v.parse().unwrap_or(settings.hud_anchor_y);
    }
    if let Some(v) = get(SHOW_HEADER) {
        settings.show_header_and_settings =
            parse::boolean(v).unwrap_or(settings.show_header_and_settings);
    }
    let mut bad_color = false;
    if let Some(v) = get(LCD_COLOR) {
        match parse::color(v) {
            Some(color) => settings.display_color = color,
            None => bad_color = true,
        }
    }
    if let Some(v) = get(LCD_FONT) {
        settings.font_name = v.to_string();
    }
    if let Some(v) = get(SHOW_BORDERS) {
        settings.show_borders = parse::boolean(v).unwrap_or(settings.show_borders);
    }
    if let Some(v) = get(LCD_HUD_SIZE) {
        settings.hud_scale = v.to_string();
    }

    if !missing.is_empty() {
        debug!("settings::parse: missing keys {missing:?}");
    }
    Parsed {
        settings,
        needs_rewrite: bad_color || !missing.is_empty(),
    }
}

pub fn serialize(settings: &Settings) -> String {
    let bool_str = |b: bool| if b { "true" } else { "false" };
    let values: HashMap<&str, String> = HashMap::from([
        (GROUPS, settings.group_names.iter().join(",")),
        (HUD_POSITION_X, settings.hud_anchor_x.to_string()),
        (HUD_POSITION_Y, settings.hud_anchor_y.to_string()),
        (SHOW_HEADER, bool_str(settings.show_header_and_settings).into()),
        (LCD_COLOR, settings.display_color.to_string()),
        (LCD_FONT, settings.font_name.clone()),
        (SHOW_BORDERS, bool_str(settings.show_borders).into()),
        (LCD_HUD_SIZE, settings.hud_scale.clone()),
    ]);

    let mut out = format!("[{SECTION}]\n");
    for (key, comment) in KEYS {
        out.push_str(&format!("; {comment}\n{key}={}\n", values[key]));
    }
    out
}

/// Read settings from the host, regenerating the blob if it needed it.
pub fn load<H: Host + ?Sized>(host: &mut H) -> Settings {
    let Parsed {
        settings,
        needs_rewrite,
    } = parse(&host.settings_blob());
    if needs_rewrite {
        warn!("Settings were incomplete or malformed, rewriting them with defaults filled in");
        host.set_settings_blob(serialize(&settings));
    }
    settings
}

mod parse {
    use std::collections::HashMap;

    use nom::{
        branch::alt,
        bytes::complete::{take_till, take_till1},
        character::complete::{char, space0, u8},
        combinator::{all_consuming, map, rest},
        sequence::{delimited, preceded, separated_pair, tuple},
        IResult,
    };

    use super::Color;

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum Line<'a> {
        Blank,
        Comment,
        Section(&'a str),
        Entry(&'a str, &'a str),
    }

    fn section(input: &str) -> IResult<&str, Line> {
        map(
            delimited(char('['), take_till(|c| c == ']'), char(']')),
            |name: &str| Line::Section(name.trim()),
        )(input)
    }

    fn comment(input: &str) -> IResult<&str, Line> {
        map(preceded(alt((char(';'), char('#'))), rest), |_| Line::Comment)(input)
    }

    fn entry(input: &str) -> IResult<&str, Line> {
        map(
            separated_pair(take_till1(|c| c == '='), char('='), rest),
            |(key, value): (&str, &str)| Line::Entry(key.trim(), value.trim()),
        )(input)
    }

    fn line(input: &str) -> IResult<&str, Line> {
        let input = input.trim();
        if input.is_empty() {
            return Ok((input, Line::Blank));
        }
        all_consuming(alt((section, comment, entry)))(input)
    }

    /// Sections in file order, each with its entries keyed by lowercased
    /// key. `None` if the blob is blank or any line is unrecognizable.
    /// Entries before the first section are dropped.
    #[allow(clippy::type_complexity)]
    pub(super) fn document(blob: &str) -> Option<Vec<(&str, HashMap<String, &str>)>> {
        if blob.trim().is_empty() {
            return None;
        }
        let mut sections: Vec<(&str, HashMap<String, &str>)> = vec![];
        for raw in blob.lines() {
            let (_, parsed) = line(raw).ok()?;
            match parsed {
                Line::Blank | Line::Comment => {}
                Line::Section(name) => sections.push((name, HashMap::new())),
                Line::Entry(key, value) => {
                    if let Some((_, entries)) = sections.last_mut() {
                        entries.insert(key.to_lowercase(), value);
                    }
                }
            }
        }
        Some(sections)
    }

    pub(super) fn boolean(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    fn rgb(input: &str) -> IResult<&str, (u8, u8, u8)> {
        let comma = || tuple((space0, char(','), space0));
        tuple((u8, preceded(comma(), u8), preceded(comma(), u8)))(input)
    }

    pub(super) fn color(value: &str) -> Option<Color> {
        let (_, (r, g, b)) = all_consuming(rgb)(value.trim()).ok()?;
        Some(Color { r, g, b })
    }
}
