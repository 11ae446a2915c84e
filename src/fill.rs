//! Fills and beam modes.
//!
//! A fill is one operational cycle of the machine: a numbered span of time
//! subdivided into beam-mode intervals (injection, ramp, stable beams, ...).
//! The recognized beam modes form a fixed set; filters given as free text
//! are validated against it before any service call is issued.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of recognized beam modes, in machine-cycle order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeamMode {
    /// No declared mode.
    NoMode,
    /// Machine setup.
    Setup,
    /// Injection of pilot bunches.
    InjectionPilot,
    /// Injection of intermediate-intensity beam.
    InjectionIntermediate,
    /// Injection of nominal beam.
    InjectionNominal,
    /// Preparation for the energy ramp.
    PrepareRamp,
    /// Energy ramp.
    Ramp,
    /// Flat top at target energy.
    FlatTop,
    /// Optics squeeze.
    Squeeze,
    /// Beam adjustment before collisions.
    Adjust,
    /// Stable beams (physics data taking).
    StableBeams,
    /// Beams declared unstable.
    UnstableBeams,
    /// Programmed beam dump.
    BeamDump,
    /// Energy ramp down.
    RampDown,
    /// Recovery after a failure.
    Recovery,
    /// Dump during injection.
    InjectionDump,
    /// Dump of a circulating beam.
    CirculatingDump,
    /// Aborted cycle.
    Abort,
    /// Magnet cycling without beam.
    Cycling,
    /// No beam in the machine.
    NoBeam,
}

impl BeamMode {
    /// Every recognized beam mode, in machine-cycle order.
    pub const ALL: [BeamMode; 20] = [
        BeamMode::NoMode,
        BeamMode::Setup,
        BeamMode::InjectionPilot,
        BeamMode::InjectionIntermediate,
        BeamMode::InjectionNominal,
        BeamMode::PrepareRamp,
        BeamMode::Ramp,
        BeamMode::FlatTop,
        BeamMode::Squeeze,
        BeamMode::Adjust,
        BeamMode::StableBeams,
        BeamMode::UnstableBeams,
        BeamMode::BeamDump,
        BeamMode::RampDown,
        BeamMode::Recovery,
        BeamMode::InjectionDump,
        BeamMode::CirculatingDump,
        BeamMode::Abort,
        BeamMode::Cycling,
        BeamMode::NoBeam,
    ];

    /// The service-side tag for this mode.
    pub fn as_tag(&self) -> &'static str {
        match self {
            BeamMode::NoMode => "NOMODE",
            BeamMode::Setup => "SETUP",
            BeamMode::InjectionPilot => "INJPILOT",
            BeamMode::InjectionIntermediate => "INJINTR",
            BeamMode::InjectionNominal => "INJNOMN",
            BeamMode::PrepareRamp => "PRERAMP",
            BeamMode::Ramp => "RAMP",
            BeamMode::FlatTop => "FLATTOP",
            BeamMode::Squeeze => "SQUEEZE",
            BeamMode::Adjust => "ADJUST",
            BeamMode::StableBeams => "STABLE",
            BeamMode::UnstableBeams => "UNSTABLE",
            BeamMode::BeamDump => "BEAMDUMP",
            BeamMode::RampDown => "RAMPDOWN",
            BeamMode::Recovery => "RECOVERY",
            BeamMode::InjectionDump => "INJDUMP",
            BeamMode::CirculatingDump => "CIRCDUMP",
            BeamMode::Abort => "ABORT",
            BeamMode::Cycling => "CYCLING",
            BeamMode::NoBeam => "NOBEAM",
        }
    }

    /// Parse a service-side tag; `None` for anything outside the fixed set.
    pub fn from_tag(tag: &str) -> Option<BeamMode> {
        BeamMode::ALL.iter().copied().find(|mode| mode.as_tag() == tag)
    }
}

impl fmt::Display for BeamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A beam-mode filter in either of its two equivalent input forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BeamModeSelector {
    /// Comma-joined mode tags, for example `"STABLE,ADJUST"`.
    Csv(String),
    /// Explicit list of mode tags.
    Names(Vec<String>),
}

impl BeamModeSelector {
    /// The recognized subset of the requested modes, in request order.
    /// Unrecognized names are dropped; validating an entirely invalid
    /// filter to the empty set is the caller's error to raise.
    pub fn valid_modes(&self) -> Vec<BeamMode> {
        let names: Vec<&str> = match self {
            BeamModeSelector::Csv(csv) => csv.split(',').map(str::trim).collect(),
            BeamModeSelector::Names(names) => names.iter().map(String::as_str).collect(),
        };
        names.into_iter().filter_map(BeamMode::from_tag).collect()
    }
}

impl From<&str> for BeamModeSelector {
    fn from(csv: &str) -> Self {
        BeamModeSelector::Csv(csv.to_string())
    }
}

impl From<Vec<String>> for BeamModeSelector {
    fn from(names: Vec<String>) -> Self {
        BeamModeSelector::Names(names)
    }
}

impl From<Vec<&str>> for BeamModeSelector {
    fn from(names: Vec<&str>) -> Self {
        BeamModeSelector::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for BeamModeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeamModeSelector::Csv(csv) => f.write_str(csv),
            BeamModeSelector::Names(names) => f.write_str(&names.join(",")),
        }
    }
}

/// The time window of one beam mode inside a fill.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeamModeInterval {
    /// Interval start.
    pub start_time: DateTime<Utc>,
    /// Interval end.
    pub end_time: DateTime<Utc>,
}

/// One decoded fill. Immutable once constructed from a single service
/// response.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fill {
    /// The fill number.
    pub fill_number: u32,
    /// Fill start.
    pub start_time: DateTime<Utc>,
    /// Fill end.
    pub end_time: DateTime<Utc>,
    /// Beam-mode intervals keyed by mode tag, ordered by time as returned.
    pub beam_modes: Vec<(String, BeamModeInterval)>,
}

impl Fill {
    /// The interval of the first occurrence of `mode`, if the fill
    /// contains it.
    pub fn beam_mode(&self, mode: &str) -> Option<&BeamModeInterval> {
        self.beam_modes.iter().find(|(tag, _)| tag == mode).map(|(_, interval)| interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_for_every_mode() {
        for mode in BeamMode::ALL {
            assert_eq!(BeamMode::from_tag(mode.as_tag()), Some(mode));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(BeamMode::from_tag("NOT_A_MODE"), None);
    }

    #[test]
    fn csv_and_list_selectors_resolve_identically() {
        let csv = BeamModeSelector::from("STABLE,RAMP");
        let list = BeamModeSelector::from(vec!["STABLE", "RAMP"]);
        assert_eq!(csv.valid_modes(), list.valid_modes());
        assert_eq!(csv.valid_modes(), vec![BeamMode::StableBeams, BeamMode::Ramp]);
    }

    #[test]
    fn selector_keeps_valid_subset_of_mixed_input() {
        let selector = BeamModeSelector::from("STABLE,NOT_A_MODE, ADJUST");
        assert_eq!(selector.valid_modes(), vec![BeamMode::StableBeams, BeamMode::Adjust]);
    }

    #[test]
    fn fully_invalid_selector_resolves_to_empty() {
        let selector = BeamModeSelector::from("NOT_A_MODE");
        assert!(selector.valid_modes().is_empty());
    }
}
