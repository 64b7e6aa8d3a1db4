use std::fmt;

use crate::four_momentum::FourMomentum;

/// PDG code GENIE assigns to a struck nn di-nucleon cluster.
pub const PDG_CLUSTER_NN: i32 = 2000000200;
/// PDG code GENIE assigns to a struck np di-nucleon cluster.
pub const PDG_CLUSTER_NP: i32 = 2000000201;
/// PDG code GENIE assigns to a struck pp di-nucleon cluster.
pub const PDG_CLUSTER_PP: i32 = 2000000202;

/// Process-type facets of one interaction.
///
/// These are independent flags rather than a single enum: an upstream generator is expected to
/// set at most one of `resonant`, `quasi_elastic` and `mec`, but nothing here enforces it, and
/// none of the regime flags mean anything unless `weak_cc` is also set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessInfo {
    pub weak_cc: bool,
    pub resonant: bool,
    pub quasi_elastic: bool,
    pub mec: bool,
    pub charm: bool,
}

impl ProcessInfo {
    pub fn label(&self) -> &'static str {
        //! Short process label used in diagnostics. Reports the first regime flag that is set.
        if self.resonant {
            "RES"
        } else if self.quasi_elastic {
            "QES"
        } else if self.mec {
            "MEC"
        } else {
            "other"
        }
    }
}

/// Coarse classification of the struck target used by the MINERvA 2p2h tune.
///
/// The discriminants are the integers written to the `QELikeTarget` output branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum QeLikeTarget {
    /// A like-nucleon pair cluster (nn, or pp for antineutrinos).
    NN = 0,
    /// An np pair cluster.
    NP = 1,
    /// A single nucleon in a non-charm quasi-elastic interaction.
    QE = 2,
    InvalidTopology = 3,
}

impl QeLikeTarget {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for QeLikeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NN => "nn",
            Self::NP => "np",
            Self::QE => "QE",
            Self::InvalidTopology => "invalid",
        };
        f.write_str(name)
    }
}

/// One simulated neutrino interaction, read-only for the duration of an iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub process: ProcessInfo,
    /// Hadronic invariant mass $`W`$ (selected kinematics), GeV.
    pub w: f64,
    pub probe_pdg: i32,
    /// Incoming neutrino four-momentum in the lab frame.
    pub probe_p4: FourMomentum,
    /// Final-state primary lepton four-momentum in the lab frame.
    pub fs_lepton_p4: FourMomentum,
    pub target_pdg: i32,
    /// PDG code of the struck nucleon or nucleon cluster, `0` if unset.
    pub hit_nucleon_pdg: i32,
    /// NEUT-convention reaction code supplied with the record.
    pub neut_code: i32,
}

impl EventRecord {
    pub fn energy_transfer(&self) -> FourMomentum {
        //! The four-momentum transferred by the lepton, $`q = p_\nu - p_\ell`$.
        self.probe_p4 - self.fs_lepton_p4
    }

    pub fn q0(&self) -> f64 {
        //! Energy transfer $`q_0`$.
        self.energy_transfer().e
    }

    pub fn q3(&self) -> f64 {
        //! Three-momentum transfer $`|\overrightarrow{q}|`$.
        self.energy_transfer().p()
    }

    pub fn enu(&self) -> f64 {
        self.probe_p4.e
    }

    pub fn qe_like_target(&self) -> QeLikeTarget {
        //! Classify the struck target.
        //!
        //! Non-charm quasi-elastic events are [`QeLikeTarget::QE`] regardless of the hit nucleon;
        //! otherwise the di-nucleon cluster code decides between [`QeLikeTarget::NN`] and
        //! [`QeLikeTarget::NP`], and everything else is [`QeLikeTarget::InvalidTopology`].
        if self.process.quasi_elastic && !self.process.charm {
            return QeLikeTarget::QE;
        }
        match self.hit_nucleon_pdg {
            PDG_CLUSTER_NN | PDG_CLUSTER_PP => QeLikeTarget::NN,
            PDG_CLUSTER_NP => QeLikeTarget::NP,
            _ => QeLikeTarget::InvalidTopology,
        }
    }

    pub fn summary(&self) -> String {
        //! One-line interaction summary for the per-event diagnostics.
        format!(
            "{} {} [probe: {}, tgt: {}, hit nuc: {}] W = {:.4} GeV, Enu = {:.4} GeV",
            if self.process.weak_cc { "CC" } else { "NC/other" },
            self.process.label(),
            self.probe_pdg,
            self.target_pdg,
            self.hit_nucleon_pdg,
            self.w,
            self.enu(),
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    pub fn cc_event(process: ProcessInfo) -> EventRecord {
        EventRecord {
            process: ProcessInfo {
                weak_cc: true,
                ..process
            },
            w: 1.232,
            probe_pdg: 14,
            probe_p4: FourMomentum::new(3.0, 0.0, 0.0, 3.0),
            fs_lepton_p4: FourMomentum::new(2.0, 0.6, 0.0, 1.8),
            target_pdg: 1000060120,
            hit_nucleon_pdg: 2112,
            neut_code: 11,
        }
    }

    #[test]
    fn energy_transfer() {
        let ev = cc_event(ProcessInfo::default());
        assert_relative_eq!(ev.q0(), 1.0);
        assert_relative_eq!(ev.q3(), (0.36f64 + 1.44).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(
            ev.energy_transfer(),
            FourMomentum::new(1.0, -0.6, 0.0, 1.2),
            epsilon = 1e-12
        );
    }

    #[test]
    fn qe_like_target_prefers_qe() {
        let mut ev = cc_event(ProcessInfo {
            quasi_elastic: true,
            ..Default::default()
        });
        ev.hit_nucleon_pdg = PDG_CLUSTER_NP;
        assert_eq!(ev.qe_like_target(), QeLikeTarget::QE);
        ev.process.charm = true;
        assert_eq!(ev.qe_like_target(), QeLikeTarget::NP);
    }

    #[test]
    fn qe_like_target_from_clusters() {
        let mut ev = cc_event(ProcessInfo {
            mec: true,
            ..Default::default()
        });
        for (pdg, expected) in [
            (PDG_CLUSTER_NN, QeLikeTarget::NN),
            (PDG_CLUSTER_PP, QeLikeTarget::NN),
            (PDG_CLUSTER_NP, QeLikeTarget::NP),
            (2212, QeLikeTarget::InvalidTopology),
            (0, QeLikeTarget::InvalidTopology),
        ] {
            ev.hit_nucleon_pdg = pdg;
            assert_eq!(ev.qe_like_target(), expected);
        }
        assert_eq!(QeLikeTarget::NP.code(), 1);
        assert_eq!(QeLikeTarget::InvalidTopology.code(), 3);
    }

    #[test]
    fn summary_mentions_process() {
        let ev = cc_event(ProcessInfo {
            resonant: true,
            ..Default::default()
        });
        let s = ev.summary();
        assert!(s.starts_with("CC RES"));
        assert!(s.contains("1000060120"));
    }
}
