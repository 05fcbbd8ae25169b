//! Tsiolkovsky estimates for hydrogen thrusters.
//!
//! All functions return `None` rather than zero when the inputs cannot
//! produce a meaningful value, so that an empty partition is never shown as
//! "0 m/s".

use crate::catalog::HYDROGEN_DENSITY_KG_PER_L;

/// Mass flow of hydrogen for a volumetric consumption rate (kg/s).
pub fn mass_flow(fuel_lps: f64) -> f64 {
    fuel_lps * HYDROGEN_DENSITY_KG_PER_L
}

/// Effective exhaust velocity (m/s): thrust over propellant mass flow.
pub fn exhaust_velocity(thrust_n: f64, fuel_lps: f64) -> Option<f64> {
    if thrust_n <= 0.0 || fuel_lps <= 0.0 || thrust_n.is_nan() || fuel_lps.is_nan() {
        return None;
    }
    Some(thrust_n / mass_flow(fuel_lps))
}

/// Delta-V (m/s) from `ve * ln(wet / dry)`.
pub fn delta_v(thrust_n: f64, fuel_lps: f64, wet_mass_kg: f64, dry_mass_kg: f64) -> Option<f64> {
    let ve = exhaust_velocity(thrust_n, fuel_lps)?;
    if !(wet_mass_kg > 0.0 && dry_mass_kg > 0.0 && dry_mass_kg < wet_mass_kg) {
        return None;
    }
    Some(ve * libm::log(wet_mass_kg / dry_mass_kg))
}

/// Seconds until `fuel_mass_kg` is exhausted at `fuel_lps`.
pub fn burn_time(fuel_mass_kg: f64, fuel_lps: f64) -> Option<f64> {
    if fuel_lps <= 0.0 || fuel_lps.is_nan() {
        return None;
    }
    Some(fuel_mass_kg / mass_flow(fuel_lps))
}

#[test]
fn reference_burn() {
    let ve = exhaust_velocity(500_000.0, 200.0).unwrap();
    assert!((ve - 250_000.0).abs() < 1e-9);

    let dv = delta_v(500_000.0, 200.0, 10_000.0, 8_000.0).unwrap();
    assert!((dv - 250_000.0 * (1.25f64).ln()).abs() < 1e-6);
    assert_eq!(dv.round(), 55786.0);
}

#[test]
fn delta_v_matches_rocket_equation() {
    for &(thrust, lps, wet, dry) in &[
        (1.0, 1.0, 2.0, 1.0),
        (7_200_000.0, 2000.0, 1_500_000.0, 900_000.0),
        (98_000.0, 156.25, 40_000.0, 39_999.0),
    ] {
        let dv = delta_v(thrust, lps, wet, dry).unwrap();
        let expected = (thrust / (lps * 0.01)) * (wet / dry).ln();
        assert!(dv.is_finite() && dv > 0.0);
        assert!((dv - expected).abs() <= expected * 1e-12);
    }
}

#[test]
fn degenerate_inputs() {
    assert_eq!(delta_v(0.0, 200.0, 10.0, 8.0), None);
    assert_eq!(delta_v(-1.0, 200.0, 10.0, 8.0), None);
    assert_eq!(delta_v(100.0, 0.0, 10.0, 8.0), None);
    assert_eq!(delta_v(100.0, 10.0, 10.0, 10.0), None);
    assert_eq!(delta_v(100.0, 10.0, 10.0, 0.0), None);
    assert_eq!(delta_v(100.0, 10.0, 0.0, -1.0), None);
    assert_eq!(burn_time(100.0, 0.0), None);
    assert!((burn_time(2000.0, 200.0).unwrap() - 1000.0).abs() < 1e-9);
}
