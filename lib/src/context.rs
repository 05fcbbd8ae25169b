//! The program the host invokes: boot first, then one report per call.

use std::collections::{HashMap, HashSet};

use color_eyre::eyre;
use tracing::{debug, error, info};

use crate::{
    aggregate,
    boot::{BootSequencer, BootStatus},
    host::{
        ActuatorReading, BlockId, ControllerInfo, DisplayInfo, Host, TelemetrySource, TerminalGroup,
        UpdateFrequency,
    },
    hudline,
    render::{self, ReportInput},
    sampler::{self, VehicleSample},
    settings::{self, Settings},
    toggles::{Command, RuntimeToggles, StatusLog},
};

/// The running HUD, built once boot has found everything it needs.
#[derive(Debug)]
pub struct Hud {
    pub(crate) display: DisplayInfo,
    pub(crate) controller: ControllerInfo,
    pub(crate) settings: Settings,
    pub(crate) toggles: RuntimeToggles,
    /// Thrusters found at boot.
    pub(crate) actuators: HashSet<BlockId>,
    /// Hydrogen tanks found at boot.
    pub(crate) tanks: HashSet<BlockId>,
    /// Terminal groups as they were at boot or the last reload.
    pub(crate) groups: Vec<TerminalGroup>,
    pub(crate) status: StatusLog,
}

impl Hud {
    pub fn display(&self) -> &DisplayInfo {
        &self.display
    }

    pub fn controller(&self) -> &ControllerInfo {
        &self.controller
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn toggles(&self) -> RuntimeToggles {
        self.toggles
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn sample<H: TelemetrySource + ?Sized>(&self, host: &H) -> VehicleSample {
        let tanks = host.tanks();
        sampler::sample(
            host.total_mass(self.controller.id),
            tanks.iter().filter(|t| self.tanks.contains(&t.id)),
        )
    }

    /// Handle one invocation: apply `command` and redraw the report.
    /// Settings and terminal groups are only re-read on `setup`.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, command: Command) {
        let functional = host
            .displays()
            .iter()
            .any(|d| d.id == self.display.id && d.functional);
        if !functional {
            debug!("Hud::tick: display {:?} is gone, skipping", self.display.name);
            return;
        }

        if self.toggles.apply(command, &mut self.status) {
            host.set_stored_state(self.toggles.to_storage());
        }

        if command == Command::Reload {
            self.settings = settings::load(host);
            host.style_display(self.display.id, &self.settings.display_style());
            self.groups = host.groups();
            info!("Reloaded settings and {} terminal groups", self.groups.len());
        }

        hudline::refresh(host, self.display.id, &self.settings);

        let sample = self.sample(&*host);
        let text = if sample.is_valid() {
            self.report(&*host, sample)
        } else {
            debug!("Hud::tick: unusable sample {sample:?}");
            render::render_unavailable(&self.settings)
        };
        host.write_display(self.display.id, &text);

        if sample.is_valid() {
            self.status.clear();
        }
    }

    fn report<H: TelemetrySource + ?Sized>(&self, host: &H, sample: VehicleSample) -> String {
        let readings = host.actuators();
        let by_id: HashMap<BlockId, &ActuatorReading> =
            readings.iter().map(|r| (r.id, r)).collect();
        let groups = aggregate::by_group(
            &self.settings.group_names,
            &self.groups,
            &by_id,
            self.toggles.include_maneuvering,
        );
        let directions = self.toggles.show_burn_times.then(|| {
            aggregate::by_direction(
                readings.iter().filter(|r| self.actuators.contains(&r.id)),
                self.toggles.include_maneuvering,
                self.toggles.show_all_directions,
                self.controller.forward,
            )
        });

        render::render_report(&ReportInput {
            settings: &self.settings,
            toggles: self.toggles,
            groups: &groups,
            directions: directions.as_ref(),
            sample,
            status: &self.status,
        })
    }
}

#[derive(Debug)]
enum Phase {
    Booting(BootSequencer),
    Running(Hud),
    /// Boot failed. Nothing happens until the program is recreated.
    Halted,
}

#[derive(Debug)]
pub struct HudProgram {
    phase: Phase,
}

impl HudProgram {
    /// Start booting. The host is asked to invoke us at the fast rate until
    /// boot is over.
    pub fn new<H: Host + ?Sized>(host: &mut H) -> Self {
        host.set_update_frequency(UpdateFrequency::Fast);
        Self {
            phase: Phase::Booting(BootSequencer::new()),
        }
    }

    pub fn is_booting(&self) -> bool {
        matches!(self.phase, Phase::Booting(_))
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.phase, Phase::Halted)
    }

    pub fn hud(&self) -> Option<&Hud> {
        match &self.phase {
            Phase::Running(hud) => Some(hud),
            _ => None,
        }
    }

    /// One host invocation with its run argument.
    ///
    /// A boot failure is returned once, echoed to the host, and halts the
    /// program.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, argument: &str) -> eyre::Result<()> {
        let command = Command::from(argument);
        match std::mem::replace(&mut self.phase, Phase::Halted) {
            Phase::Booting(mut boot) => {
                if command != Command::Noop {
                    debug!("HudProgram::tick: ignoring {command:?} while booting");
                }
                let status = match boot.tick(host) {
                    Ok(status) => status,
                    Err(e) => {
                        error!("Boot failed: {e}");
                        host.echo(&e.to_string());
                        return Err(e);
                    }
                };
                match status {
                    BootStatus::Booting => self.phase = Phase::Booting(boot),
                    BootStatus::Done => {
                        let mut hud = boot.finish()?;
                        host.set_update_frequency(UpdateFrequency::Slow);
                        hud.tick(host, Command::Noop);
                        self.phase = Phase::Running(hud);
                    }
                }
            }
            Phase::Running(mut hud) => {
                hud.tick(host, command);
                self.phase = Phase::Running(hud);
            }
            Phase::Halted => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        boot::TICKS_PER_FRAME,
        direction::Direction,
        memory::MemoryHost,
        settings::{serialize, Color},
    };

    fn booted() -> (MemoryHost, HudProgram) {
        let mut host = MemoryHost::sample_ship();
        let mut program = HudProgram::new(&mut host);
        assert_eq!(host.update_frequency, Some(UpdateFrequency::Fast));
        while program.is_booting() {
            program.tick(&mut host, "").unwrap();
        }
        (host, program)
    }

    fn text(host: &MemoryHost) -> &str {
        &host.displays[0].text
    }

    fn dv_row(name: &str, value: u32) -> String {
        format!("║ {name:<13} │ {value:>9} m/s  ║")
    }

    fn burn_row(name: &str, value: u32) -> String {
        format!("║ {name:<13} │ {value:>9} sec  ║")
    }

    #[test]
    fn boot_hands_over_and_reports_in_the_same_tick() {
        let (host, program) = booted();
        assert_eq!(host.update_frequency, Some(UpdateFrequency::Slow));
        assert!(program.hud().is_some());

        let shown = text(&host);
        assert!(shown.contains(&dv_row("All Drives", 55786)), "{shown}");
        assert!(shown.contains(&dv_row("Boost", 55786)), "{shown}");
        assert!(shown.contains("║ Efficient     │       N/a      ║"), "{shown}");
        assert!(shown.contains(&burn_row("Forward", 50)), "{shown}");
        assert!(shown.contains(&burn_row("Backward", 1280)), "{shown}");
        assert!(!shown.contains("Left"));
        assert!(!shown.contains("[Status]"));

        assert_eq!(host.displays[0].custom_data, "hudlcd:0.6:0.98:0.8\n");
        assert_eq!(host.settings_blob, serialize(&Settings::default()));
        assert_eq!(
            host.displays[0].style.as_ref().map(|s| s.color),
            Some(Color::gray(225))
        );
        assert_eq!(host.echoes[0], "ΔV HUD Loaded");
        assert_eq!(host.echoes[1], "RCS: ON");
        assert!(host.echoes.contains(&"LCD Found: LCD DeltaV".to_string()));
    }

    #[test]
    fn commands_during_boot_are_ignored() {
        let mut host = MemoryHost::sample_ship();
        let mut program = HudProgram::new(&mut host);
        let mut ticks = 0;
        while program.is_booting() {
            program.tick(&mut host, "rcs").unwrap();
            ticks += 1;
        }
        assert_eq!(ticks, TICKS_PER_FRAME * 22);
        assert!(host.stored_state.is_empty());
        assert!(program.hud().unwrap().toggles().include_maneuvering);
    }

    #[test]
    fn toggle_twice_then_flush() {
        let (mut host, mut program) = booted();

        program.tick(&mut host, "rcs").unwrap();
        assert_eq!(host.stored_state, "False;True;True");
        let shown = text(&host).to_string();
        assert!(shown.contains("RCS: OFF"));
        assert!(shown.ends_with("\n[Status]\n[Toggle] RCS: OFF\n"), "{shown}");
        // the RCS block was the only thing pushing backward
        assert!(!shown.contains("Backward"));

        program.tick(&mut host, "RCS").unwrap();
        assert_eq!(host.stored_state, "True;True;True");
        assert!(text(&host).ends_with("\n[Status]\n[Toggle] RCS: ON\n"));

        program.tick(&mut host, "").unwrap();
        assert!(!text(&host).contains("[Status]"));
        assert!(program.hud().unwrap().status().is_empty());
    }

    #[test]
    fn toggles_survive_a_restart() {
        let (mut host, mut program) = booted();
        program.tick(&mut host, "burn").unwrap();
        program.tick(&mut host, "all").unwrap();
        assert!(!text(&host).contains("Burn Times"));

        let mut program = HudProgram::new(&mut host);
        while program.is_booting() {
            program.tick(&mut host, "").unwrap();
        }
        let toggles = program.hud().unwrap().toggles();
        assert!(toggles.include_maneuvering);
        assert!(!toggles.show_burn_times);
        assert!(!toggles.show_all_directions);
        assert!(host.echoes.contains(&"Burn Times: OFF".to_string()));
    }

    #[test]
    fn bad_sample_keeps_the_status_log() {
        let (mut host, mut program) = booted();
        host.total_mass_kg = 0.0;
        program.tick(&mut host, "burn").unwrap();
        assert!(text(&host).contains(render::UNAVAILABLE));
        assert!(!text(&host).contains("[Status]"));
        assert_eq!(program.hud().unwrap().status().entries().len(), 1);

        host.total_mass_kg = 10_000.0;
        program.tick(&mut host, "").unwrap();
        assert!(text(&host).ends_with("[Toggle] Burn Times: OFF\n"));
        assert!(!text(&host).contains("Burn Times (sec)"));
        assert!(program.hud().unwrap().status().is_empty());

        // fuel heavier than the whole ship
        host.tanks[0].capacity_l = 2_000_000.0;
        program.tick(&mut host, "").unwrap();
        assert!(text(&host).contains(render::UNAVAILABLE));
    }

    #[test]
    fn disabled_thrusters_count_for_groups_but_not_burn_times() {
        let (mut host, mut program) = booted();
        host.actuators[0].enabled = false;
        program.tick(&mut host, "").unwrap();
        let shown = text(&host);
        assert!(shown.contains(&dv_row("Boost", 55786)), "{shown}");
        assert!(shown.contains(&burn_row("Forward", 100)), "{shown}");
    }

    #[test]
    fn forward_only_follows_the_controller() {
        let (mut host, mut program) = booted();
        program.tick(&mut host, "directions").unwrap();
        let shown = text(&host).to_string();
        assert!(shown.contains(&burn_row("Forward", 50)));
        assert!(!shown.contains("Backward"));

        // a restart picks up the controller's new orientation
        for c in &mut host.controllers {
            c.forward = Direction::Backward;
        }
        let mut program = HudProgram::new(&mut host);
        while program.is_booting() {
            program.tick(&mut host, "").unwrap();
        }
        let shown = text(&host);
        assert!(shown.contains(&burn_row("Backward", 1280)), "{shown}");
        assert!(!shown.contains("Forward"));
    }

    #[test]
    fn settings_edits_wait_for_setup() {
        let (mut host, mut program) = booted();
        let edited = serialize(&Settings {
            group_names: vec!["Boost".into()],
            display_color: Color { r: 255, g: 0, b: 0 },
            show_header_and_settings: false,
            hud_scale: "1".into(),
            ..Settings::default()
        });

        // a half-typed edit is neither applied nor rewritten
        host.settings_blob = "[DeltaV]\nGroups=Boost\n".into();
        program.tick(&mut host, "").unwrap();
        assert_eq!(host.settings_blob, "[DeltaV]\nGroups=Boost\n");
        assert!(text(&host).contains("All Drives"));

        host.settings_blob.clone_from(&edited);
        program.tick(&mut host, "").unwrap();
        assert!(text(&host).contains("All Drives"));
        assert!(text(&host).contains("RCS: ON"));
        assert_eq!(
            host.displays[0].style.as_ref().map(|s| s.color),
            Some(Color::gray(225))
        );
        assert_eq!(host.displays[0].custom_data, "hudlcd:0.6:0.98:0.8\n");

        program.tick(&mut host, "setup").unwrap();
        assert_eq!(host.settings_blob, edited);
        let shown = text(&host);
        assert!(!shown.contains("All Drives"));
        assert!(!shown.contains("RCS: ON"));
        assert_eq!(
            host.displays[0].style.as_ref().map(|s| s.color),
            Some(Color { r: 255, g: 0, b: 0 })
        );
        assert_eq!(host.displays[0].custom_data, "hudlcd:0.6:0.98:1\n");
    }

    #[test]
    fn boot_skips_broken_and_foreign_blocks() {
        let mut host = MemoryHost::sample_ship();
        let docked_tank = host.add_tank("LargeHydrogenTank", 200_000.0, 1.0);
        let broken = host.add_actuator("LargeBlockLargeHydrogenThrust", Direction::Up, 5e6);
        let docked = host.add_actuator("LargeBlockLargeHydrogenThrust", Direction::Right, 5e6);
        for t in &mut host.tanks {
            t.on_grid = t.id != docked_tank;
        }
        for a in &mut host.actuators {
            a.functional = a.id != broken;
            a.on_grid = a.id != docked;
        }

        let mut program = HudProgram::new(&mut host);
        while program.is_booting() {
            program.tick(&mut host, "").unwrap();
        }
        let hud = program.hud().unwrap();
        assert!((hud.sample(&host).fuel_mass_kg - 2_000.0).abs() < 1e-6);

        let shown = text(&host);
        assert!(shown.contains(&burn_row("Forward", 50)), "{shown}");
        assert!(shown.contains(&burn_row("Backward", 1280)), "{shown}");
        assert!(!shown.contains("Down"), "{shown}");
        assert!(!shown.contains("Left"), "{shown}");
    }

    #[test]
    fn reload_picks_up_new_groups() {
        let (mut host, mut program) = booted();
        let main_b = host.actuators[1].id;
        host.add_group("Efficient", &[main_b]);

        program.tick(&mut host, "").unwrap();
        assert!(text(&host).contains("║ Efficient     │       N/a      ║"));

        program.tick(&mut host, "setup").unwrap();
        let shown = text(&host);
        assert!(shown.contains(&dv_row("Efficient", 55786)), "{shown}");
    }

    #[test]
    fn dead_display_is_left_alone() {
        let (mut host, mut program) = booted();
        let writes = host.display_writes;
        host.displays[0].functional = false;
        program.tick(&mut host, "rcs").unwrap();
        assert_eq!(host.display_writes, writes);
        assert!(host.stored_state.is_empty());
    }

    #[test]
    fn boot_failure_halts() {
        let mut host = MemoryHost::sample_ship();
        host.displays.remove(0);
        let mut program = HudProgram::new(&mut host);
        let mut failure = None;
        for _ in 0..TICKS_PER_FRAME {
            if let Err(e) = program.tick(&mut host, "") {
                failure = Some(e);
            }
        }
        assert!(failure.is_some());
        assert!(program.is_halted());
        assert!(host.echoes[0].starts_with("No LCD with 'DeltaV'"));
        program.tick(&mut host, "").unwrap();
        assert_eq!(host.display_writes, 0);
    }
}
