//! Event source: GENIE-style event records stored as a flat ROOT tree.
//!
//! The record field `gmcrec` of the `gtree` tree is stored split into one branch per facet,
//! named `gmcrec_<facet>`. Binding checks every branch exists with the expected item type
//! before any event is read.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use itertools::izip;
use oxyroot::{Branch, ReaderTree, RootFile};
use thiserror::Error;
use tracing::debug;

use crate::event::{EventRecord, ProcessInfo};
use crate::four_momentum::FourMomentum;

pub const EVENT_TREE: &str = "gtree";
pub const RECORD_FIELD: &str = "gmcrec";
pub const ROOT_MAGIC: [u8; 4] = *b"root";

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open {path:?} for reading: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("Failed to read TTree {tree:?} from {path:?}: {reason}")]
    MissingTree {
        path: PathBuf,
        tree: String,
        reason: String,
    },
    #[error("Failed to bind {field:?} on {tree:?}: branch {branch:?} {reason}")]
    Bind {
        tree: String,
        field: String,
        branch: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Bool,
    Int,
    Double,
}

impl LeafKind {
    fn matches(&self, type_name: &str) -> bool {
        let lower = type_name.to_ascii_lowercase();
        match self {
            Self::Bool => matches!(lower.as_str(), "bool" | "bool_t"),
            Self::Int => matches!(lower.as_str(), "int" | "int_t" | "int32_t"),
            Self::Double => matches!(lower.as_str(), "double" | "double_t"),
        }
    }
}

/// Facet names of the split record and their leaf types, in binding order.
pub const RECORD_LEAVES: [(&str, LeafKind); 18] = [
    ("weak_cc", LeafKind::Bool),
    ("resonant", LeafKind::Bool),
    ("quasi_elastic", LeafKind::Bool),
    ("mec", LeafKind::Bool),
    ("charm", LeafKind::Bool),
    ("w", LeafKind::Double),
    ("probe_pdg", LeafKind::Int),
    ("probe_e", LeafKind::Double),
    ("probe_px", LeafKind::Double),
    ("probe_py", LeafKind::Double),
    ("probe_pz", LeafKind::Double),
    ("fsl_e", LeafKind::Double),
    ("fsl_px", LeafKind::Double),
    ("fsl_py", LeafKind::Double),
    ("fsl_pz", LeafKind::Double),
    ("target_pdg", LeafKind::Int),
    ("hit_nuc_pdg", LeafKind::Int),
    ("neut_code", LeafKind::Int),
];

pub fn branch_name(facet: &str) -> String {
    format!("{RECORD_FIELD}_{facet}")
}

/// An opened input file and its event tree.
pub struct GHepFile {
    path: PathBuf,
    tree: ReaderTree,
    _file: RootFile,
}

impl GHepFile {
    pub fn open(path: &Path) -> Result<Self, InputError> {
        //! Open `path` and locate the event tree.
        //!
        //! # Errors
        //! [`InputError::Open`] if the file can't be opened as ROOT, [`InputError::MissingTree`]
        //! if it holds no [`EVENT_TREE`].
        let open_error = |reason: String| InputError::Open {
            path: path.to_path_buf(),
            reason,
        };
        // oxyroot panics on a bad header, so reject non-ROOT files up front.
        let magic = read_magic(path).map_err(|err| open_error(err.to_string()))?;
        if magic != ROOT_MAGIC {
            return Err(open_error(format!(
                "not a ROOT file (magic bytes {magic:?})"
            )));
        }
        let mut file = RootFile::open(path).map_err(|err| InputError::Open {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let tree = file
            .get_tree(EVENT_TREE)
            .map_err(|err| InputError::MissingTree {
                path: path.to_path_buf(),
                tree: EVENT_TREE.to_string(),
                reason: err.to_string(),
            })?;
        debug!("opened {EVENT_TREE} from {path:?} with {} entries", tree.entries());
        Ok(Self {
            path: path.to_path_buf(),
            tree,
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> usize {
        usize::try_from(self.tree.entries()).unwrap_or(0)
    }

    pub fn bind(&self) -> Result<RecordBranches<'_>, InputError> {
        //! Bind every branch of the record field.
        //!
        //! # Errors
        //! [`InputError::Bind`] naming the first branch that is missing or has the wrong type.
        let mut branches = IndexMap::with_capacity(RECORD_LEAVES.len());
        for (facet, kind) in RECORD_LEAVES {
            let name = branch_name(facet);
            let bind_error = |reason: String| InputError::Bind {
                tree: EVENT_TREE.to_string(),
                field: RECORD_FIELD.to_string(),
                branch: name.clone(),
                reason,
            };
            let branch = self
                .tree
                .branch(&name)
                .ok_or_else(|| bind_error("is missing".to_string()))?;
            let type_name = branch.item_type_name();
            if !kind.matches(&type_name) {
                return Err(bind_error(format!(
                    "has item type {type_name:?}, expected {kind:?}"
                )));
            }
            branches.insert(facet, branch);
        }
        Ok(RecordBranches { branches })
    }
}

/// The bound branches of one record field, keyed by facet.
pub struct RecordBranches<'t> {
    branches: IndexMap<&'static str, &'t Branch>,
}

impl<'t> RecordBranches<'t> {
    fn branch(&self, facet: &str) -> Result<&'t Branch, InputError> {
        self.branches
            .get(facet)
            .copied()
            .ok_or_else(|| read_error(facet, "is not bound".to_string()))
    }

    fn read_f64(&self, facet: &str) -> Result<impl Iterator<Item = f64> + 't, InputError> {
        self.branch(facet)?
            .as_iter::<f64>()
            .map_err(|err| read_error(facet, format!("can't be read: {err}")))
    }

    fn read_i32(&self, facet: &str) -> Result<impl Iterator<Item = i32> + 't, InputError> {
        self.branch(facet)?
            .as_iter::<i32>()
            .map_err(|err| read_error(facet, format!("can't be read: {err}")))
    }

    fn read_bool(&self, facet: &str) -> Result<impl Iterator<Item = bool> + 't, InputError> {
        self.branch(facet)?
            .as_iter::<bool>()
            .map_err(|err| read_error(facet, format!("can't be read: {err}")))
    }

    fn momenta(&self, prefix: &str) -> Result<impl Iterator<Item = FourMomentum> + 't, InputError> {
        Ok(izip!(
            self.read_f64(&format!("{prefix}_e"))?,
            self.read_f64(&format!("{prefix}_px"))?,
            self.read_f64(&format!("{prefix}_py"))?,
            self.read_f64(&format!("{prefix}_pz"))?
        )
        .map(|(e, px, py, pz)| FourMomentum::new(e, px, py, pz)))
    }

    pub fn events(&self) -> Result<impl Iterator<Item = EventRecord> + 't, InputError> {
        //! Lazily read every event, in entry order.
        let process = izip!(
            self.read_bool("weak_cc")?,
            self.read_bool("resonant")?,
            self.read_bool("quasi_elastic")?,
            self.read_bool("mec")?,
            self.read_bool("charm")?
        )
        .map(|(weak_cc, resonant, quasi_elastic, mec, charm)| ProcessInfo {
            weak_cc,
            resonant,
            quasi_elastic,
            mec,
            charm,
        });
        Ok(izip!(
            process,
            self.read_f64("w")?,
            self.read_i32("probe_pdg")?,
            self.momenta("probe")?,
            self.momenta("fsl")?,
            self.read_i32("target_pdg")?,
            self.read_i32("hit_nuc_pdg")?,
            self.read_i32("neut_code")?
        )
        .map(
            |(process, w, probe_pdg, probe_p4, fs_lepton_p4, target_pdg, hit_nucleon_pdg, neut_code)| {
                EventRecord {
                    process,
                    w,
                    probe_pdg,
                    probe_p4,
                    fs_lepton_p4,
                    target_pdg,
                    hit_nucleon_pdg,
                    neut_code,
                }
            },
        ))
    }
}

/// The first four bytes of the file at `path`.
pub(crate) fn read_magic(path: &Path) -> io::Result<[u8; 4]> {
    let mut magic = [0u8; 4];
    File::open(path)?.read_exact(&mut magic)?;
    Ok(magic)
}

fn read_error(facet: &str, reason: String) -> InputError {
    InputError::Bind {
        tree: EVENT_TREE.to_string(),
        field: RECORD_FIELD.to_string(),
        branch: branch_name(facet),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_root_input_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("events.txt");
        std::fs::write(&text, "weak_cc,resonant,w\n".repeat(200)).unwrap();
        assert!(matches!(
            GHepFile::open(&text),
            Err(InputError::Open { .. })
        ));

        let short = dir.path().join("short.root");
        std::fs::write(&short, b"ro").unwrap();
        assert!(matches!(
            GHepFile::open(&short),
            Err(InputError::Open { .. })
        ));
    }

    #[test]
    fn branch_names() {
        assert_eq!(branch_name("w"), "gmcrec_w");
        assert!(RECORD_LEAVES
            .iter()
            .all(|(facet, _)| !branch_name(facet).contains(' ')));
    }

    #[test]
    fn leaf_kinds() {
        assert!(LeafKind::Bool.matches("Bool_t"));
        assert!(LeafKind::Int.matches("int32_t"));
        assert!(LeafKind::Double.matches("double"));
        assert!(!LeafKind::Double.matches("float"));
    }
}
