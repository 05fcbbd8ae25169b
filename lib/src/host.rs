//! The boundary between the HUD and whatever is hosting it. Everything the
//! HUD knows about the ship comes through [`TelemetrySource`] as plain
//! snapshots, and everything it does to the world goes through [`Host`].

use serde::{Deserialize, Serialize};

use crate::{direction::Direction, settings::Color};

fn yes() -> bool {
    true
}

#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct BlockId(pub u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    pub id: BlockId,
    pub name: String,
    #[serde(default = "yes")]
    pub functional: bool,
    /// Is this block on the same grid as the HUD itself?
    #[serde(default = "yes")]
    pub on_grid: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerInfo {
    pub id: BlockId,
    pub name: String,
    #[serde(default = "yes")]
    pub on_grid: bool,
    #[serde(default = "yes")]
    pub can_control_ship: bool,
    /// Is a player currently sitting in this controller?
    #[serde(default)]
    pub under_control: bool,
    #[serde(default)]
    pub is_main: bool,
    /// The direction this controller faces, relative to the grid.
    #[serde(default = "forward")]
    pub forward: Direction,
}

fn forward() -> Direction {
    Direction::Forward
}

/// A live thruster sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActuatorReading {
    pub id: BlockId,
    pub model_id: String,
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "yes")]
    pub functional: bool,
    #[serde(default = "yes")]
    pub on_grid: bool,
    /// The direction the nozzle points. Thrust is produced towards
    /// [`Direction::flipped`] of this.
    pub facing: Direction,
    /// Maximum effective thrust in the current conditions (N).
    pub max_thrust_n: f64,
}

/// A live gas tank sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TankReading {
    pub id: BlockId,
    pub definition_name: String,
    #[serde(default = "yes")]
    pub functional: bool,
    #[serde(default = "yes")]
    pub on_grid: bool,
    pub capacity_l: f64,
    pub filled_ratio: f64,
}

/// A named collection of blocks defined by the player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminalGroup {
    pub name: String,
    pub members: Vec<BlockId>,
}

/// How often the host should invoke the HUD.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateFrequency {
    /// Every 10 simulation ticks, used while booting.
    Fast,
    /// Every 100 simulation ticks.
    Slow,
}

impl UpdateFrequency {
    pub fn simulation_ticks(self) -> u32 {
        match self {
            Self::Fast => 10,
            Self::Slow => 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayStyle {
    pub font: String,
    pub color: Color,
}

/// Read-only snapshots of the live ship. Every call returns fresh data.
pub trait TelemetrySource {
    fn displays(&self) -> Vec<DisplayInfo>;
    fn controllers(&self) -> Vec<ControllerInfo>;
    fn actuators(&self) -> Vec<ActuatorReading>;
    fn tanks(&self) -> Vec<TankReading>;
    fn groups(&self) -> Vec<TerminalGroup>;
    /// Total ship mass as reported through `controller` (kg).
    fn total_mass(&self, controller: BlockId) -> f64;
}

pub trait Host: TelemetrySource {
    fn settings_blob(&self) -> String;
    fn set_settings_blob(&mut self, blob: String);

    /// Small string persisted across script reloads.
    fn stored_state(&self) -> String;
    fn set_stored_state(&mut self, state: String);

    /// Replace the whole text of a display.
    fn write_display(&mut self, display: BlockId, text: &str);
    /// The display's secondary text field, where HUD mods read their
    /// placement line from.
    fn display_custom_data(&self, display: BlockId) -> String;
    fn set_display_custom_data(&mut self, display: BlockId, data: String);
    /// Switch the display to text mode and apply font and color.
    fn style_display(&mut self, display: BlockId, style: &DisplayStyle);

    /// Diagnostic output shown next to the script, not on the display.
    fn echo(&mut self, line: &str);
    fn set_update_frequency(&mut self, frequency: UpdateFrequency);
}
