use serde::{Deserialize, Serialize};
use tracing::info;

/// Switches the player flips from a toolbar. Persisted across reloads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeToggles {
    /// Count RCS-class thrusters
    pub include_maneuvering: bool,
    /// Show the burn time table
    pub show_burn_times: bool,
    /// Burn times for all six directions instead of only the cockpit's
    /// forward
    pub show_all_directions: bool,
}

impl Default for RuntimeToggles {
    fn default() -> Self {
        Self {
            include_maneuvering: true,
            show_burn_times: true,
            show_all_directions: true,
        }
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn on_off(b: bool) -> &'static str {
    if b {
        "ON"
    } else {
        "OFF"
    }
}

fn all_fwd(b: bool) -> &'static str {
    if b {
        "ALL"
    } else {
        "FWD"
    }
}

impl RuntimeToggles {
    /// `"<bool>;<bool>;<bool>"`
    pub fn to_storage(&self) -> String {
        format!(
            "{};{};{}",
            bool_str(self.include_maneuvering),
            bool_str(self.show_burn_times),
            bool_str(self.show_all_directions)
        )
    }

    /// Inverse of [`Self::to_storage`]. Anything that is not exactly three
    /// fields gives the defaults; a field that is not a boolean keeps its
    /// default.
    pub fn restore(stored: &str) -> Self {
        let mut toggles = Self::default();
        let parts = stored.trim().split(';').collect::<Vec<_>>();
        if let [a, b, c] = parts[..] {
            let read = |s: &str, default: bool| match s.trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => default,
            };
            toggles.include_maneuvering = read(a, toggles.include_maneuvering);
            toggles.show_burn_times = read(b, toggles.show_burn_times);
            toggles.show_all_directions = read(c, toggles.show_all_directions);
        }
        toggles
    }

    /// The three-state summary shown under the title.
    pub fn header(&self) -> String {
        format!(
            "RCS: {:<3}  Burn: {:<3}  Dir: {:<3}",
            on_off(self.include_maneuvering),
            on_off(self.show_burn_times),
            all_fwd(self.show_all_directions)
        )
    }

    pub fn echo_lines(&self) -> [String; 3] {
        [
            format!("RCS: {}", on_off(self.include_maneuvering)),
            format!("Burn Times: {}", on_off(self.show_burn_times)),
            format!("All Directions: {}", on_off(self.show_all_directions)),
        ]
    }

    /// Flip the toggle named by `command`. Returns `true` if a toggle
    /// changed, in which case the event was logged to `status` and the
    /// caller should persist [`Self::to_storage`].
    pub fn apply(&mut self, command: Command, status: &mut StatusLog) -> bool {
        let event = match command {
            Command::ToggleManeuvering => {
                self.include_maneuvering = !self.include_maneuvering;
                format!("RCS: {}", on_off(self.include_maneuvering))
            }
            Command::ToggleBurnTimes => {
                self.show_burn_times = !self.show_burn_times;
                format!("Burn Times: {}", on_off(self.show_burn_times))
            }
            Command::ToggleAllDirections => {
                self.show_all_directions = !self.show_all_directions;
                format!("All Directions: {}", all_fwd(self.show_all_directions))
            }
            Command::Reload | Command::Noop => return false,
        };
        info!("Toggled {event}");
        status.push(format!("[Toggle] {event}"));
        true
    }
}

/// A run argument, after normalization.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleManeuvering,
    ToggleBurnTimes,
    ToggleAllDirections,
    /// Re-read settings and re-snapshot terminal groups.
    Reload,
    /// Empty or unrecognized argument.
    Noop,
}

impl From<&str> for Command {
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "rcs" | "rcstoggle" | "togglercs" => Command::ToggleManeuvering,
            "burn" | "time" | "burntime" | "burntimetoggle" | "toggleburntime" => {
                Command::ToggleBurnTimes
            }
            "all" | "directions" | "alldirections" | "alldirectionstoggle"
            | "togglealldirections" => Command::ToggleAllDirections,
            "setup" | "parseconfig" | "readconfig" => Command::Reload,
            _ => Command::Noop,
        }
    }
}

/// Events waiting to be shown under the next report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLog {
    entries: Vec<String>,
}

impl StatusLog {
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[test]
fn command_vocabulary() {
    let cases = [
        ("rcs", Command::ToggleManeuvering),
        ("  RcsToggle ", Command::ToggleManeuvering),
        ("togglercs", Command::ToggleManeuvering),
        ("burn", Command::ToggleBurnTimes),
        ("TIME", Command::ToggleBurnTimes),
        ("burntime", Command::ToggleBurnTimes),
        ("burntimetoggle", Command::ToggleBurnTimes),
        ("toggleburntime", Command::ToggleBurnTimes),
        ("all", Command::ToggleAllDirections),
        ("directions", Command::ToggleAllDirections),
        ("AllDirections", Command::ToggleAllDirections),
        ("alldirectionstoggle", Command::ToggleAllDirections),
        ("togglealldirections", Command::ToggleAllDirections),
        ("setup", Command::Reload),
        ("parseconfig", Command::Reload),
        ("readconfig\n", Command::Reload),
        ("", Command::Noop),
        ("rcs please", Command::Noop),
        ("burn time", Command::Noop),
    ];
    for (arg, expected) in cases {
        assert_eq!(Command::from(arg), expected, "{arg:?}");
    }
}

#[test]
fn toggling_twice_restores_and_logs_both() {
    let mut toggles = RuntimeToggles::default();
    let mut status = StatusLog::default();
    assert!(toggles.apply(Command::ToggleManeuvering, &mut status));
    assert!(toggles.apply(Command::ToggleManeuvering, &mut status));
    assert_eq!(toggles, RuntimeToggles::default());
    assert_eq!(status.entries(), ["[Toggle] RCS: OFF", "[Toggle] RCS: ON"]);

    assert!(!toggles.apply(Command::Reload, &mut status));
    assert!(!toggles.apply(Command::Noop, &mut status));
    assert_eq!(status.entries().len(), 2);

    toggles.apply(Command::ToggleAllDirections, &mut status);
    assert_eq!(status.entries()[2], "[Toggle] All Directions: FWD");
}

#[test]
fn storage_format() {
    let toggles = RuntimeToggles {
        include_maneuvering: true,
        show_burn_times: false,
        show_all_directions: true,
    };
    assert_eq!(toggles.to_storage(), "True;False;True");
    assert_eq!(RuntimeToggles::restore("True;False;True"), toggles);
    assert_eq!(RuntimeToggles::restore("true;false;TRUE"), toggles);
    assert_eq!(RuntimeToggles::restore(""), RuntimeToggles::default());
    assert_eq!(RuntimeToggles::restore("False;False"), RuntimeToggles::default());
    assert_eq!(
        RuntimeToggles::restore("False;banana;False"),
        RuntimeToggles {
            include_maneuvering: false,
            show_burn_times: true,
            show_all_directions: false,
        }
    );
}

#[test]
fn header_is_fixed_width() {
    let on = RuntimeToggles::default().header();
    let off = RuntimeToggles {
        include_maneuvering: false,
        show_burn_times: false,
        show_all_directions: false,
    }
    .header();
    assert_eq!(on, "RCS: ON   Burn: ON   Dir: ALL");
    assert_eq!(off, "RCS: OFF  Burn: OFF  Dir: FWD");
}
