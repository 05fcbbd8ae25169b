use serde::{Deserialize, Serialize};

use crate::{catalog::HYDROGEN_DENSITY_KG_PER_L, host::TankReading};

/// Mass of the ship at one instant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleSample {
    /// Mass including propellant (kg)
    pub total_mass_kg: f64,
    /// Mass of hydrogen on board (kg)
    pub fuel_mass_kg: f64,
}

impl VehicleSample {
    pub fn dry_mass_kg(&self) -> f64 {
        self.total_mass_kg - self.fuel_mass_kg
    }

    /// A sample is usable only when `0 < dry mass < total mass`. NaN in
    /// either field makes the sample invalid.
    pub fn is_valid(&self) -> bool {
        let dry = self.dry_mass_kg();
        self.total_mass_kg > 0.0 && dry > 0.0 && dry < self.total_mass_kg
    }
}

/// Tanks are classified by their definition name only.
pub fn is_propellant_tank(tank: &TankReading) -> bool {
    tank.definition_name.to_lowercase().contains("hydrogen")
}

pub fn fuel_mass<'a>(tanks: impl IntoIterator<Item = &'a TankReading>) -> f64 {
    tanks
        .into_iter()
        .map(|t| t.capacity_l * t.filled_ratio * HYDROGEN_DENSITY_KG_PER_L)
        .sum()
}

pub fn sample<'a>(
    total_mass_kg: f64,
    tanks: impl IntoIterator<Item = &'a TankReading>,
) -> VehicleSample {
    VehicleSample {
        total_mass_kg,
        fuel_mass_kg: fuel_mass(tanks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BlockId;

    fn tank(name: &str, capacity_l: f64, filled_ratio: f64) -> TankReading {
        TankReading {
            id: BlockId(1),
            definition_name: name.into(),
            functional: true,
            on_grid: true,
            capacity_l,
            filled_ratio,
        }
    }

    #[test]
    fn fuel_mass_uses_density() {
        let tanks = [
            tank("Large Hydrogen Tank", 15_000_000.0, 0.5),
            tank("Small Hydrogen Tank", 1_000_000.0, 1.0),
        ];
        let s = sample(200_000.0, &tanks);
        assert!((s.fuel_mass_kg - 85_000.0).abs() < 1e-6);
        assert!((s.dry_mass_kg() - 115_000.0).abs() < 1e-6);
        assert!(s.is_valid());
    }

    #[test]
    fn tank_classification_is_substring_match() {
        assert!(is_propellant_tank(&tank("Large HYDROGEN Tank", 1.0, 1.0)));
        assert!(is_propellant_tank(&tank("Hydrogen Tank (Industrial)", 1.0, 1.0)));
        assert!(!is_propellant_tank(&tank("Oxygen Tank", 1.0, 1.0)));
    }

    #[test]
    fn invalid_samples() {
        let cases = [
            (0.0, 0.0),
            (-5.0, 1.0),
            (1000.0, 1000.0),
            (1000.0, 1500.0),
            (1000.0, -1.0),
            (f64::NAN, 1.0),
        ];
        for (total_mass_kg, fuel_mass_kg) in cases {
            let s = VehicleSample {
                total_mass_kg,
                fuel_mass_kg,
            };
            assert!(!s.is_valid(), "{s:?}");
        }
    }

    #[test]
    fn empty_tanks_are_invalid() {
        // no propellant means dry == total, which cannot produce any delta-V
        let s = sample(5000.0, &[tank("Hydrogen Tank", 1000.0, 0.0)]);
        assert!(!s.is_valid());
    }
}
