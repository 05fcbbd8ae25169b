//! Sums thrust and fuel draw over the ship's thrusters, once per configured
//! group and once per direction of travel.
//!
//! The two passes filter differently on purpose. The group pass describes
//! configured capability and ignores whether a thruster is switched on; the
//! direction pass describes what can burn right now and skips disabled
//! thrusters.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    catalog,
    direction::Direction,
    estimate,
    host::{ActuatorReading, BlockId, TerminalGroup},
    sampler::VehicleSample,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Maximum effective thrust over all contributing thrusters (N)
    pub thrust_n: f64,
    /// Full-throttle hydrogen consumption (L/s)
    pub fuel_lps: f64,
    /// Number of thrusters that were counted
    pub contributors: usize,
}

impl Partition {
    fn add(&mut self, reading: &ActuatorReading, lps: f64) {
        self.thrust_n += reading.max_thrust_n;
        self.fuel_lps += lps;
        self.contributors += 1;
    }

    /// Delta-V of this partition for the sampled ship (m/s).
    pub fn delta_v(&self, sample: &VehicleSample) -> Option<f64> {
        if self.contributors == 0 {
            return None;
        }
        estimate::delta_v(
            self.thrust_n,
            self.fuel_lps,
            sample.total_mass_kg,
            sample.dry_mass_kg(),
        )
    }

    /// Seconds until the ship's hydrogen runs out at full throttle (s).
    pub fn burn_time(&self, sample: &VehicleSample) -> Option<f64> {
        if self.contributors == 0 {
            return None;
        }
        estimate::burn_time(sample.fuel_mass_kg, self.fuel_lps)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// The name as configured, not as the host spells it.
    pub name: String,
    /// `None` when no terminal group has this name.
    pub partition: Option<Partition>,
}

pub type DirectionTotals = BTreeMap<Direction, Partition>;

pub fn resolve_group<'a>(groups: &'a [TerminalGroup], name: &str) -> Option<&'a TerminalGroup> {
    let name = name.to_lowercase();
    groups.iter().find(|g| g.name.to_lowercase() == name)
}

/// One entry per configured name, in configuration order.
///
/// Members that are not thrusters, or whose model is not in the catalog,
/// are skipped.
pub fn by_group(
    names: &[String],
    groups: &[TerminalGroup],
    readings: &HashMap<BlockId, &ActuatorReading>,
    include_maneuvering: bool,
) -> Vec<GroupEntry> {
    names
        .iter()
        .map(|name| {
            let partition = resolve_group(groups, name).map(|group| {
                let mut partition = Partition::default();
                for reading in group.members.iter().filter_map(|id| readings.get(id)) {
                    if let Some(lps) =
                        catalog::propulsive_consumption(&reading.model_id, include_maneuvering)
                    {
                        partition.add(reading, lps);
                    }
                }
                partition
            });
            trace!("aggregate::by_group: {name}: {partition:?}");
            GroupEntry {
                name: name.clone(),
                partition,
            }
        })
        .collect()
}

/// Totals keyed by the direction each thruster pushes the ship. All six
/// directions are always present.
pub fn by_direction<'a>(
    readings: impl IntoIterator<Item = &'a ActuatorReading>,
    include_maneuvering: bool,
    all_directions: bool,
    controller_forward: Direction,
) -> DirectionTotals {
    let mut totals: DirectionTotals = Direction::ALL
        .iter()
        .map(|&dir| (dir, Partition::default()))
        .collect();

    for reading in readings {
        if !reading.enabled {
            continue;
        }
        let Some(lps) = catalog::propulsive_consumption(&reading.model_id, include_maneuvering)
        else {
            continue;
        };
        let dir = reading.facing.flipped();
        if !all_directions && dir != controller_forward {
            continue;
        }
        if let Some(partition) = totals.get_mut(&dir) {
            partition.add(reading, lps);
        }
    }

    trace!("aggregate::by_direction: {totals:?}");
    totals
}
