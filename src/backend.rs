use std::{
    collections::{BTreeMap, HashMap},
    sync::mpsc::{Receiver, RecvTimeoutError, Sender},
    time::Duration,
};

use color_eyre::eyre;
use dvhud::{host::UpdateFrequency, memory::MemoryHost, HudProgram};
use tracing::{debug, info};

use crate::scenario::Scenario;

pub enum HReq {
    /// Invoke right away with this run argument.
    Run(String),
    Shutdown,
}

pub enum HRes {
    DisplayChanged { name: String, text: String },
    Echoed(String),
    Finished(usize),
}

/// Owns the simulated ship and invokes the program on the schedule it asks
/// for. Anything that arrives on `rx` is run immediately.
#[allow(clippy::needless_pass_by_value)]
pub fn handler_thread(rx: Receiver<HReq>, tx: Sender<eyre::Result<HRes>>, scenario: Scenario) {
    let Scenario {
        mut host,
        tick_ms,
        invocations,
        commands,
    } = scenario;
    let mut scripted: BTreeMap<usize, String> = commands.into_iter().collect();
    let mut program = HudProgram::new(&mut host);
    let mut shown = HashMap::new();
    let mut echoed = 0;
    let mut count = 0;

    loop {
        if invocations.is_some_and(|n| count >= n) {
            let _ = tx.send(Ok(HRes::Finished(count)));
            break;
        }

        let ticks = host
            .update_frequency
            .unwrap_or(UpdateFrequency::Fast)
            .simulation_ticks();
        let argument = match rx.recv_timeout(Duration::from_millis(tick_ms * u64::from(ticks))) {
            Ok(HReq::Run(arg)) => arg,
            Ok(HReq::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => take_due(&mut scripted, count).unwrap_or_default(),
        };
        if !argument.is_empty() {
            info!("Invocation {count}: {argument:?}");
        }

        let res = program.tick(&mut host, &argument);
        count += 1;

        for line in &host.echoes[echoed..] {
            let _ = tx.send(Ok(HRes::Echoed(line.clone())));
        }
        echoed = host.echoes.len();
        send_changes(&host, &mut shown, &tx);

        if let Err(e) = res {
            let _ = tx.send(Err(e));
            break;
        }
    }
    debug!("handler_thread: stopping after {count} invocations");
}

/// The earliest scripted argument due at or before `count`. One that was
/// displaced by a stdin command stays queued for the next invocation.
fn take_due(scripted: &mut BTreeMap<usize, String>, count: usize) -> Option<String> {
    let (&at, _) = scripted.first_key_value()?;
    if at > count {
        return None;
    }
    scripted.pop_first().map(|(_, arg)| arg)
}

fn send_changes(
    host: &MemoryHost,
    shown: &mut HashMap<dvhud::host::BlockId, String>,
    tx: &Sender<eyre::Result<HRes>>,
) {
    for display in &host.displays {
        if shown.get(&display.id) == Some(&display.text) {
            continue;
        }
        shown.insert(display.id, display.text.clone());
        let _ = tx.send(Ok(HRes::DisplayChanged {
            name: display.name.clone(),
            text: display.text.clone(),
        }));
    }
}

#[test]
fn displaced_scripted_commands_run_late() {
    let mut scripted = BTreeMap::from([(3, "rcs".to_string()), (4, "burn".to_string())]);
    assert_eq!(take_due(&mut scripted, 2), None);
    // invocation 3 was taken by a stdin command
    assert_eq!(take_due(&mut scripted, 4).as_deref(), Some("rcs"));
    assert_eq!(take_due(&mut scripted, 5).as_deref(), Some("burn"));
    assert_eq!(take_due(&mut scripted, 6), None);
    assert!(scripted.is_empty());
}

#[test]
fn headless_run_boots_and_applies_scripted_commands() {
    use std::sync::mpsc;

    let mut scenario: Scenario = ron::from_str(include_str!("../demos/frigate.ron")).unwrap();
    scenario.tick_ms = 0;
    let (_main_tx, handler_rx) = mpsc::channel();
    let (handler_tx, main_rx) = mpsc::channel();
    handler_thread(handler_rx, handler_tx, scenario);

    let responses: Vec<_> = main_rx.try_iter().map(Result::unwrap).collect();
    let echoes: Vec<_> = responses
        .iter()
        .filter_map(|r| match r {
            HRes::Echoed(line) => Some(line.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(echoes[0], "ΔV HUD Loaded");

    let hud_frames: Vec<_> = responses
        .iter()
        .filter_map(|r| match r {
            HRes::DisplayChanged { name, text } if name.contains("DeltaV") => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(hud_frames.iter().any(|t| t.contains("Checking for valid EnCorp")));
    assert!(hud_frames.iter().any(|t| t.contains("[Toggle] RCS: OFF")));
    let last = hud_frames.last().unwrap();
    assert!(last.contains("ΔV by Group:"), "{last}");
    assert!(last.contains("RCS: OFF"), "{last}");
    assert!(matches!(responses.last(), Some(HRes::Finished(_))));
}
