//! A [`Host`] that keeps the whole ship in memory. Used by the scenario
//! runner and by tests.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    direction::Direction,
    host::{
        ActuatorReading, BlockId, ControllerInfo, DisplayInfo, DisplayStyle, Host, TankReading,
        TelemetrySource, TerminalGroup, UpdateFrequency,
    },
};

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDisplay {
    pub id: BlockId,
    pub name: String,
    #[serde(default = "yes")]
    pub functional: bool,
    #[serde(default = "yes")]
    pub on_grid: bool,
    /// What is currently shown.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub custom_data: String,
    #[serde(skip)]
    pub style: Option<DisplayStyle>,
}

impl MemoryDisplay {
    pub fn info(&self) -> DisplayInfo {
        DisplayInfo {
            id: self.id,
            name: self.name.clone(),
            functional: self.functional,
            on_grid: self.on_grid,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryHost {
    #[serde(default)]
    pub displays: Vec<MemoryDisplay>,
    #[serde(default)]
    pub controllers: Vec<ControllerInfo>,
    #[serde(default)]
    pub actuators: Vec<ActuatorReading>,
    #[serde(default)]
    pub tanks: Vec<TankReading>,
    #[serde(default)]
    pub groups: Vec<TerminalGroup>,
    pub total_mass_kg: f64,
    #[serde(default)]
    pub settings_blob: String,
    #[serde(default)]
    pub stored_state: String,

    #[serde(skip)]
    pub echoes: Vec<String>,
    #[serde(skip)]
    pub update_frequency: Option<UpdateFrequency>,
    /// Number of [`Host::write_display`] calls so far.
    #[serde(skip)]
    pub display_writes: usize,
}

impl MemoryHost {
    fn next_id(&self) -> BlockId {
        let ids = self
            .displays
            .iter()
            .map(|d| d.id)
            .chain(self.controllers.iter().map(|c| c.id))
            .chain(self.actuators.iter().map(|a| a.id))
            .chain(self.tanks.iter().map(|t| t.id));
        BlockId(ids.max().map_or(1, |BlockId(id)| id + 1))
    }

    pub fn add_display(&mut self, name: &str) -> BlockId {
        let id = self.next_id();
        self.displays.push(MemoryDisplay {
            id,
            name: name.into(),
            functional: true,
            on_grid: true,
            ..MemoryDisplay::default()
        });
        id
    }

    pub fn add_controller(&mut self, name: &str, forward: Direction) -> BlockId {
        let id = self.next_id();
        self.controllers.push(ControllerInfo {
            id,
            name: name.into(),
            on_grid: true,
            can_control_ship: true,
            under_control: false,
            is_main: false,
            forward,
        });
        id
    }

    pub fn add_actuator(&mut self, model_id: &str, facing: Direction, max_thrust_n: f64) -> BlockId {
        let id = self.next_id();
        self.actuators.push(ActuatorReading {
            id,
            model_id: model_id.into(),
            enabled: true,
            functional: true,
            on_grid: true,
            facing,
            max_thrust_n,
        });
        id
    }

    pub fn add_tank(&mut self, definition_name: &str, capacity_l: f64, filled_ratio: f64) -> BlockId {
        let id = self.next_id();
        self.tanks.push(TankReading {
            id,
            definition_name: definition_name.into(),
            functional: true,
            on_grid: true,
            capacity_l,
            filled_ratio,
        });
        id
    }

    pub fn add_group(&mut self, name: &str, members: &[BlockId]) {
        self.groups.push(TerminalGroup {
            name: name.into(),
            members: members.to_vec(),
        });
    }

    fn display_mut(&mut self, id: BlockId) -> Option<&mut MemoryDisplay> {
        self.displays.iter_mut().find(|d| d.id == id)
    }

    /// Text currently shown on the display, empty if there is no such
    /// display.
    pub fn display_text(&self, id: BlockId) -> &str {
        self.displays
            .iter()
            .find(|d| d.id == id)
            .map_or("", |d| d.text.as_str())
    }

    /// A small hydrogen-drive ship: one HUD display, two controllers, two
    /// main drives pushing forward, one RCS block pushing backward, a drive
    /// the catalog doesn't know, and a full hydrogen tank.
    ///
    /// At 10 t total with 2 t of fuel, every configured group that resolves
    /// comes out at about 55786 m/s.
    pub fn sample_ship() -> Self {
        let mut host = Self {
            total_mass_kg: 10_000.0,
            ..Self::default()
        };
        host.add_display("LCD DeltaV");
        host.add_display("LCD Status");
        let cockpit = host.add_controller("Cockpit", Direction::Forward);
        let helm = host.add_controller("Helm", Direction::Forward);
        for c in &mut host.controllers {
            c.is_main = c.id == cockpit;
            c.under_control = c.id == helm;
        }

        let main_a = host.add_actuator("LargeBlockLargeHydrogenThrust", Direction::Backward, 5e6);
        let main_b = host.add_actuator("LargeBlockLargeHydrogenThrust", Direction::Backward, 5e6);
        let rcs = host.add_actuator("LynxRcsThruster1", Direction::Forward, 390_625.0);
        let unknown = host.add_actuator("SmallBlockSmallThrust", Direction::Backward, 12_000.0);
        host.add_tank("LargeHydrogenTank", 200_000.0, 1.0);
        host.add_tank("LargeOxygenTank", 100_000.0, 1.0);

        host.add_group("All Drives", &[main_a, main_b, rcs, unknown]);
        host.add_group("boost", &[main_a, main_b]);
        host
    }
}

impl TelemetrySource for MemoryHost {
    fn displays(&self) -> Vec<DisplayInfo> {
        self.displays.iter().map(MemoryDisplay::info).collect()
    }

    fn controllers(&self) -> Vec<ControllerInfo> {
        self.controllers.clone()
    }

    fn actuators(&self) -> Vec<ActuatorReading> {
        self.actuators.clone()
    }

    fn tanks(&self) -> Vec<TankReading> {
        self.tanks.clone()
    }

    fn groups(&self) -> Vec<TerminalGroup> {
        self.groups.clone()
    }

    fn total_mass(&self, controller: BlockId) -> f64 {
        if self.controllers.iter().any(|c| c.id == controller) {
            self.total_mass_kg
        } else {
            0.0
        }
    }
}

impl Host for MemoryHost {
    fn settings_blob(&self) -> String {
        self.settings_blob.clone()
    }

    fn set_settings_blob(&mut self, blob: String) {
        self.settings_blob = blob;
    }

    fn stored_state(&self) -> String {
        self.stored_state.clone()
    }

    fn set_stored_state(&mut self, state: String) {
        self.stored_state = state;
    }

    fn write_display(&mut self, display: BlockId, text: &str) {
        self.display_writes += 1;
        if let Some(d) = self.display_mut(display) {
            text.clone_into(&mut d.text);
        }
    }

    fn display_custom_data(&self, display: BlockId) -> String {
        self.displays
            .iter()
            .find(|d| d.id == display)
            .map(|d| d.custom_data.clone())
            .unwrap_or_default()
    }

    fn set_display_custom_data(&mut self, display: BlockId, data: String) {
        if let Some(d) = self.display_mut(display) {
            d.custom_data = data;
        }
    }

    fn style_display(&mut self, display: BlockId, style: &DisplayStyle) {
        if let Some(d) = self.display_mut(display) {
            d.style = Some(style.clone());
        }
    }

    fn echo(&mut self, line: &str) {
        trace!("echo: {line}");
        self.echoes.push(line.to_string());
    }

    fn set_update_frequency(&mut self, frequency: UpdateFrequency) {
        self.update_frequency = Some(frequency);
    }
}

#[test]
fn ids_are_allocated_past_the_largest() {
    let mut host = MemoryHost::default();
    let a = host.add_display("a");
    let b = host.add_tank("LargeHydrogenTank", 1.0, 1.0);
    host.actuators.push(ActuatorReading {
        id: BlockId(40),
        model_id: "x".into(),
        enabled: true,
        functional: true,
        on_grid: true,
        facing: Direction::Up,
        max_thrust_n: 1.0,
    });
    let c = host.add_controller("c", Direction::Forward);
    assert_eq!((a, b, c), (BlockId(1), BlockId(2), BlockId(41)));
}

#[test]
fn scenario_defaults() {
    let host: MemoryHost = ron::from_str(
        r#"(
            displays: [(id: 1, name: "LCD DeltaV")],
            controllers: [(id: 2, name: "Cockpit")],
            actuators: [(id: 3, model_id: "LynxRcsThruster1", facing: Up, max_thrust_n: 100.0)],
            total_mass_kg: 1000.0,
        )"#,
    )
    .unwrap();
    assert!(host.displays[0].functional);
    assert!(host.displays[0].text.is_empty());
    assert!(host.controllers[0].can_control_ship);
    assert!(!host.controllers[0].under_control);
    assert_eq!(host.controllers[0].forward, Direction::Forward);
    assert!(host.actuators[0].enabled);
    assert!(host.tanks.is_empty());
    assert!(host.settings_blob.is_empty());
}

#[test]
fn writes_go_to_the_named_display() {
    let mut host = MemoryHost::sample_ship();
    let hud = host.displays[0].id;
    host.write_display(hud, "hello");
    host.write_display(BlockId(999), "nobody");
    assert_eq!(host.display_text(hud), "hello");
    assert_eq!(host.display_text(host.displays[1].id), "");
    assert_eq!(host.display_writes, 2);
    assert_eq!(host.total_mass(BlockId(999)), 0.0);
}
