#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::doc_markdown
)]
use std::{
    io::BufRead,
    sync::mpsc::{self, Sender},
    thread,
};

use backend::{handler_thread, HReq, HRes};
use color_eyre::eyre::{self, OptionExt};
use scenario::Scenario;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod backend;
mod scenario;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or_eyre("usage: dvhud-bin <scenario.ron>")?;
    let scenario = Scenario::load(&path)?;
    info!("Loaded scenario {path}");

    let (main_tx, handler_rx) = mpsc::channel();
    let (handler_tx, main_rx) = mpsc::channel();
    let interactive = scenario.invocations.is_none();
    let _ = thread::spawn(|| handler_thread(handler_rx, handler_tx, scenario));
    if interactive {
        let _ = thread::spawn(move || read_commands(&main_tx));
    }

    while let Ok(res) = main_rx.recv() {
        match res {
            Ok(HRes::DisplayChanged { name, text }) => println!("== {name} ==\n{text}"),
            Ok(HRes::Echoed(line)) => println!("> {line}"),
            Ok(HRes::Finished(count)) => {
                info!("Finished after {count} invocations");
                break;
            }
            Err(e) => {
                error!("{e:#}");
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Each line on stdin becomes one run argument. End of input stops the
/// handler.
fn read_commands(tx: &Sender<HReq>) {
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if tx.send(HReq::Run(line.trim().to_string())).is_err() {
            return;
        }
    }
    let _ = tx.send(HReq::Shutdown);
}
