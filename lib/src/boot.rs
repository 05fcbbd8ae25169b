//! Cooperative startup.
//!
//! Discovery happens one step per animation frame, and the animation itself
//! only advances every [`TICKS_PER_FRAME`] host invocations. Some messages
//! stay up for several frames, so the sequence keeps animating for a while
//! after the last discovery step has run.

use std::collections::HashSet;

use color_eyre::eyre::{self, eyre, OptionExt};
use tracing::{debug, info};

use crate::{
    context::Hud,
    host::{BlockId, ControllerInfo, DisplayInfo, Host, TerminalGroup},
    render,
    sampler,
    settings::{self, Settings},
    toggles::{RuntimeToggles, StatusLog},
};

/// Host invocations per animation frame.
pub const TICKS_PER_FRAME: u32 = 5;
/// Extra frames shown after the last message before handing over.
pub const PAD_FRAMES: usize = 3;

/// Displays whose name contains this are candidates for the HUD.
pub const DISPLAY_TAG: &str = "DeltaV";
/// A controller whose name contains this (any case) is always preferred.
pub const COCKPIT_TAG: &str = "deltavcockpit";

pub const MESSAGES: [&str; 13] = [
    "Boot sequence initialized",
    "Loading HUD modules",
    "Validating LCD interface",
    "Linking cockpit controller",
    "Calculating fuel reserves",
    "Analyzing thruster config",
    "Generating burn tables",
    "Arming on-board explosives",
    "Checking for valid EnCorp software license",
    "License confirmed.",
    "Disarming on-board explosives",
    "Gathering the courage to hate the poor",
    "Launching ΔV HUD",
];

/// Frames each message stays on screen.
pub const FRAME_DURATIONS: [u32; 13] = [1, 1, 1, 1, 1, 1, 1, 3, 2, 1, 3, 2, 1];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiscoveryStep {
    LocateDisplay,
    ParseSettings,
    RestoreToggles,
    EnumerateControllers,
    SelectController,
    EnumerateActuators,
    EnumerateTanks,
    EnumerateGroups,
    Announce,
}

impl DiscoveryStep {
    pub const ORDER: [Self; 9] = [
        Self::LocateDisplay,
        Self::ParseSettings,
        Self::RestoreToggles,
        Self::EnumerateControllers,
        Self::SelectController,
        Self::EnumerateActuators,
        Self::EnumerateTanks,
        Self::EnumerateGroups,
        Self::Announce,
    ];
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BootStatus {
    Booting,
    Done,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BootState {
    /// Index into [`MESSAGES`], continuing past the end for the pad frames.
    pub step_index: usize,
    /// Frames the current message has been shown for.
    pub frame_within_step: u32,
    /// Invocations since the last frame.
    pub tick_accumulator: u32,
}

/// What boot has found so far.
#[derive(Debug, Default)]
struct Discovery {
    display: Option<DisplayInfo>,
    settings: Settings,
    toggles: RuntimeToggles,
    candidates: Vec<ControllerInfo>,
    controller: Option<ControllerInfo>,
    actuators: HashSet<BlockId>,
    tanks: HashSet<BlockId>,
    groups: Vec<TerminalGroup>,
}

/// Controller priority: tagged by name, then occupied, then main, then
/// whatever comes first.
pub fn select_controller(candidates: &[ControllerInfo]) -> Option<&ControllerInfo> {
    candidates
        .iter()
        .find(|c| c.name.to_lowercase().contains(COCKPIT_TAG))
        .or_else(|| candidates.iter().find(|c| c.under_control))
        .or_else(|| candidates.iter().find(|c| c.is_main))
        .or_else(|| candidates.first())
}

#[derive(Debug, Default)]
pub struct BootSequencer {
    state: BootState,
    completed: usize,
    discovery: Discovery,
}

impl BootSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    /// Discovery steps that have run, in order.
    pub fn completed_steps(&self) -> &[DiscoveryStep] {
        &DiscoveryStep::ORDER[..self.completed]
    }

    /// Advance by one host invocation.
    ///
    /// Errors are fatal: the display or a controller could not be found.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> eyre::Result<BootStatus> {
        self.state.tick_accumulator += 1;
        if self.state.tick_accumulator < TICKS_PER_FRAME {
            return Ok(BootStatus::Booting);
        }
        self.state.tick_accumulator = 0;

        if let Some(&step) = DiscoveryStep::ORDER.get(self.completed) {
            self.run_step(step, host)?;
            self.completed += 1;
        }

        let animation_done = self.advance_animation(host);
        if animation_done && self.completed == DiscoveryStep::ORDER.len() {
            info!("Boot sequence complete");
            Ok(BootStatus::Done)
        } else {
            Ok(BootStatus::Booting)
        }
    }

    fn run_step<H: Host + ?Sized>(&mut self, step: DiscoveryStep, host: &mut H) -> eyre::Result<()> {
        debug!("boot::run_step: {step:?}");
        let found = &mut self.discovery;
        match step {
            DiscoveryStep::LocateDisplay => {
                let tag = DISPLAY_TAG.to_lowercase();
                let display = host
                    .displays()
                    .into_iter()
                    .find(|d| d.functional && d.on_grid && d.name.to_lowercase().contains(&tag))
                    .ok_or_else(|| {
                        eyre!("No LCD with '{DISPLAY_TAG}' in its name found or not functional.")
                    })?;
                let display_name = &display.name;
                info!("Using display {:?}", display_name);
                found.display = Some(display);
            }
            DiscoveryStep::ParseSettings => {
                found.settings = settings::load(host);
                let display = found
                    .display
                    .as_ref()
                    .ok_or_eyre("settings parsed before the display was found")?;
                host.style_display(display.id, &found.settings.display_style());
            }
            DiscoveryStep::RestoreToggles => {
                found.toggles = RuntimeToggles::restore(&host.stored_state());
                debug!("boot::run_step: restored {:?}", found.toggles);
            }
            DiscoveryStep::EnumerateControllers => {
                found.candidates = host
                    .controllers()
                    .into_iter()
                    .filter(|c| c.on_grid && c.can_control_ship)
                    .collect();
            }
            DiscoveryStep::SelectController => {
                let controller = select_controller(&found.candidates).cloned().ok_or_eyre(
                    "No valid cockpit found.\n\n\
                     To fix: Place a Cockpit on the grid oriented in your preferred direction.",
                )?;
                info!("Using controller {:?}", controller.name);
                found.controller = Some(controller);
                found.candidates.clear();
            }
            DiscoveryStep::EnumerateActuators => {
                found.actuators = host
                    .actuators()
                    .into_iter()
                    .filter(|a| a.functional && a.on_grid)
                    .map(|a| a.id)
                    .collect();
                info!("Found {} thrusters", found.actuators.len());
            }
            DiscoveryStep::EnumerateTanks => {
                found.tanks = host
                    .tanks()
                    .into_iter()
                    .filter(|t| t.functional && t.on_grid && sampler::is_propellant_tank(t))
                    .map(|t| t.id)
                    .collect();
                info!("Found {} hydrogen tanks", found.tanks.len());
            }
            DiscoveryStep::EnumerateGroups => {
                found.groups = host.groups();
            }
            DiscoveryStep::Announce => {
                host.echo("ΔV HUD Loaded");
                for line in found.toggles.echo_lines() {
                    host.echo(&line);
                }
                let name = |n: Option<&str>| n.unwrap_or("NOT FOUND").to_string();
                host.echo(&format!(
                    "LCD Found: {}",
                    name(found.display.as_ref().map(|d| d.name.as_str()))
                ));
                host.echo(&format!(
                    "Controller: {}",
                    name(found.controller.as_ref().map(|c| c.name.as_str()))
                ));
            }
        }
        Ok(())
    }

    /// Draw the current frame, then move the animation on. Returns `true`
    /// once the animation has run past the last message and the pad frames.
    fn advance_animation<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        let message = self.state.step_index.min(MESSAGES.len() - 1);
        if let Some(display) = &self.discovery.display {
            let frame = render::render_boot_frame(
                MESSAGES[message],
                self.state.step_index,
                MESSAGES.len() + 2,
            );
            host.write_display(display.id, &frame);
        }

        self.state.frame_within_step += 1;
        if self.state.frame_within_step >= FRAME_DURATIONS[message] {
            self.state.frame_within_step = 0;
            self.state.step_index += 1;
        }
        self.state.step_index >= MESSAGES.len() + PAD_FRAMES
    }

    /// Hand everything discovered over to the running HUD.
    pub fn finish(self) -> eyre::Result<Hud> {
        let Discovery {
            display,
            settings,
            toggles,
            controller,
            actuators,
            tanks,
            groups,
            ..
        } = self.discovery;
        Ok(Hud {
            display: display.ok_or_eyre("boot finished without a display")?,
            controller: controller.ok_or_eyre("boot finished without a controller")?,
            settings,
            toggles,
            actuators,
            tanks,
            groups,
            status: StatusLog::default(),
        })
    }
}
