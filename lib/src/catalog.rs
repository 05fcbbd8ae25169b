//! Static propulsion data: how much hydrogen each thruster model burns at
//! full throttle, and which models count as maneuvering (RCS) thrusters.
//!
//! A model that is missing from the table is not an error, it simply does
//! not take part in any delta-V or burn time estimate.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

/// Hydrogen density, in kilograms per liter.
pub const HYDROGEN_DENSITY_KG_PER_L: f64 = 0.01;

static CONSUMPTION_LPS: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    HashMap::from([
        ("ARYLYNX_SILVERSMITH_DRIVE", 1560.0),
        ("ARYLNX_QUADRA_Epstein_Drive", 521.74),
        ("LargeBlockLargeHydrogenThrust", 2000.0),
        ("LargeBlockSmallHydrogenThrust", 388.89),
        ("ARYLNX_RAIDER_Epstein_Drive", 1120.0),
        ("ARYLNX_DRUMMER_Epstein_Drive", 1750.0),
        ("ARYLNX_PNDR_Epstein_Drive", 645.16),
        ("ARYLNX_Mega_Epstein_Drive", 4000.0),
        ("ARYLNX_Epstein_Drive", 1030.0),
        ("ARYLNX_ROCI_Epstein_Drive", 2110.0),
        ("ARYLNX_SCIRCOCCO_Epstein_Drive", 3110.0),
        ("ARYLNX_MUNR_Epstein_Drive", 833.33),
        ("2x2ThrusterZAC", 933.33),
        ("Large5x5RocketThruster", 3000.0),
        ("LargeTripleThrusterHeat", 1500.0),
        ("LargeTripleThrusterHeatNoShroud", 1500.0),
        ("LynxRcsThruster1", 156.25),
        ("AryxRCSRamp", 156.25),
        ("AryxRCSHalfRamp", 156.25),
        ("AryxRCSSlant", 156.25),
        ("AryxRCS", 156.25),
        ("RCS2Bare", 227.27),
        ("RCS2Cube", 227.27),
        ("RCS2Half", 227.27),
        ("RCS2Slope", 227.27),
        ("RCS2SlopeTip1", 227.27),
        ("RCS2SlopeTip2", 227.27),
        ("RCS21x2Slope1", 227.27),
        ("RCS21x2Slope2", 227.27),
    ])
});

static MANEUVERING_MODELS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "LynxRcsThruster1",
        "AryxRCSRamp",
        "AryxRCSHalfRamp",
        "AryxRCSSlant",
        "AryxRCS",
        "RCS2Bare",
        "RCS2Cube",
        "RCS2Half",
        "RCS2Slope",
        "RCS2SlopeTip1",
        "RCS2SlopeTip2",
        "RCS21x2Slope1",
        "RCS21x2Slope2",
    ])
});

/// Full-throttle hydrogen consumption of a thruster model, in liters per
/// second.
pub fn lookup_consumption(model_id: &str) -> Option<f64> {
    CONSUMPTION_LPS.get(model_id).copied()
}

pub fn is_maneuvering(model_id: &str) -> bool {
    MANEUVERING_MODELS.contains(model_id)
}

/// Consumption of a thruster that passes the maneuvering filter, or `None`
/// if the thruster should not be counted at all.
pub fn propulsive_consumption(model_id: &str, include_maneuvering: bool) -> Option<f64> {
    let lps = lookup_consumption(model_id)?;
    if !include_maneuvering && is_maneuvering(model_id) {
        return None;
    }
    Some(lps)
}

#[test]
fn every_maneuvering_model_has_a_rate() {
    for model in MANEUVERING_MODELS.iter() {
        assert!(lookup_consumption(model).is_some(), "{model}");
    }
}

#[test]
fn lookups() {
    assert_eq!(lookup_consumption("LargeBlockLargeHydrogenThrust"), Some(2000.0));
    assert_eq!(lookup_consumption("ARYLNX_Mega_Epstein_Drive"), Some(4000.0));
    assert_eq!(lookup_consumption("LargeBlockLargeAtmosphericThrust"), None);
    assert!(is_maneuvering("RCS2Cube"));
    assert!(!is_maneuvering("ARYLNX_Epstein_Drive"));
    // case sensitive, like the host's subtype ids
    assert!(!is_maneuvering("rcs2cube"));
}

#[test]
fn maneuvering_filter() {
    assert_eq!(propulsive_consumption("AryxRCS", true), Some(156.25));
    assert_eq!(propulsive_consumption("AryxRCS", false), None);
    assert_eq!(propulsive_consumption("2x2ThrusterZAC", false), Some(933.33));
    assert_eq!(propulsive_consumption("DecorativeNozzle", true), None);
}
