use serde::Deserialize;

use crate::event::EventRecord;

/// The kinematic regime a process facet places an event in.
///
/// Used by configured responses to declare which events they act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Resonant,
    QuasiElastic,
    Mec,
    Other,
}

impl Regime {
    pub fn of(event: &EventRecord) -> Vec<Regime> {
        //! Every regime whose facet is set on `event`, or [`Regime::Other`] if none is.
        let process = &event.process;
        let mut regimes = Vec::with_capacity(1);
        if process.resonant {
            regimes.push(Regime::Resonant);
        }
        if process.quasi_elastic {
            regimes.push(Regime::QuasiElastic);
        }
        if process.mec {
            regimes.push(Regime::Mec);
        }
        if regimes.is_empty() {
            regimes.push(Regime::Other);
        }
        regimes
    }
}

/// Which validation tables a charged-current event is eligible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Regimes {
    pub resonant: bool,
    pub qe_mec: bool,
}

pub fn classify(event: &EventRecord) -> Option<Regimes> {
    //! Apply the charged-current gate, then test both regimes.
    //!
    //! Returns `None` for anything that is not a weak charged-current interaction; such events
    //! contribute to no table. The resonant and QE/MEC tests are evaluated independently, so an
    //! event tagged with both facets is eligible for both tables.
    let process = &event.process;
    if !process.weak_cc {
        return None;
    }
    Some(Regimes {
        resonant: process.resonant,
        qe_mec: process.quasi_elastic || process.mec,
    })
}
