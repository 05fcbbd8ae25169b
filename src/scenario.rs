use std::path::Path;

use color_eyre::eyre::{self, WrapErr};
use dvhud::memory::MemoryHost;
use serde::{Deserialize, Serialize};

fn default_tick_ms() -> u64 {
    16
}

/// A simulated ship plus how to drive it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub host: MemoryHost,
    /// Wall-clock length of one simulation tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Stop after this many invocations. Runs until stdin closes if unset.
    #[serde(default)]
    pub invocations: Option<usize>,
    /// Run arguments to pass at a given invocation count.
    #[serde(default)]
    pub commands: Vec<(usize, String)>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading scenario {}", path.display()))?;
        Ok(ron::from_str(&text)?)
    }
}

#[test]
fn frigate_parses() {
    let scenario: Scenario = ron::from_str(include_str!("../demos/frigate.ron")).unwrap();
    assert_eq!(scenario.host.displays.len(), 2);
    assert!(scenario.host.settings_blob.contains("[DeltaV]"));
    assert!(scenario.invocations.is_some());
    assert!(scenario.commands.iter().any(|(_, arg)| arg == "rcs"));
}

#[test]
fn defaults() {
    let scenario: Scenario = ron::from_str("(host: (total_mass_kg: 1.0))").unwrap();
    assert_eq!(scenario.tick_ms, 16);
    assert_eq!(scenario.invocations, None);
    assert!(scenario.commands.is_empty());
}
