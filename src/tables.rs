//! Validation tables.
//!
//! Which tables exist, and which optional columns they carry, is fixed once per run by the
//! parameters that resolved at startup: each table holds the [`ParamId`]s it reads weights for,
//! and those handles are its schema.

use std::path::{Path, PathBuf};

use oxyroot::{RootFile, WriterTree};
use thiserror::Error;
use tracing::{debug, info};

use crate::ghep::{read_magic, ROOT_MAGIC};
use crate::parameter::{ParamId, ValidationParameters};

pub const OUTPUT_FILE: &str = "wout.root";
pub const RESONANT_TREE: &str = "MKValidTree";
pub const QE_MEC_TREE: &str = "MINERvATUNEValidTree";
pub const N_2P2H_UNIVERSES: usize = 4;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output file {path:?}: {reason}")]
    Create { path: PathBuf, reason: String },
    #[error("Failed to write tree {tree:?} to {path:?}: {reason}")]
    Write {
        path: PathBuf,
        tree: String,
        reason: String,
    },
    #[error("Failed to close output file {path:?}: {reason}")]
    Close { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResonantRow {
    pub w: f64,
    pub weight: f64,
    pub neut_code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QeMecRow {
    pub q0: f64,
    pub q3: f64,
    pub weight_rpa: f64,
    pub weight_2p2h: [f64; N_2P2H_UNIVERSES],
    pub qe_like_target: i32,
}

/// Rows of the resonant-production validation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResonantTable {
    pub param: ParamId,
    rows: Vec<ResonantRow>,
}

impl ResonantTable {
    pub fn new(param: ParamId) -> Self {
        Self {
            param,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ResonantRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ResonantRow] {
        &self.rows
    }

    pub fn columns(&self) -> Vec<&'static str> {
        vec!["W", "Wght", "NEUTCh"]
    }

    fn write(&self, file: &mut RootFile, path: &Path) -> Result<(), OutputError> {
        let mut tree = WriterTree::new(RESONANT_TREE);
        tree.new_branch("W", self.rows.iter().map(|r| r.w).collect::<Vec<_>>().into_iter());
        tree.new_branch(
            "Wght",
            self.rows.iter().map(|r| r.weight).collect::<Vec<_>>().into_iter(),
        );
        tree.new_branch(
            "NEUTCh",
            self.rows.iter().map(|r| r.neut_code).collect::<Vec<_>>().into_iter(),
        );
        tree.write(file).map_err(|err| OutputError::Write {
            path: path.to_path_buf(),
            tree: RESONANT_TREE.to_string(),
            reason: err.to_string(),
        })
    }
}

/// Rows of the QE/MEC validation tree. `rpa` and `two_p_two_h` decide which weight columns
/// exist; at least one of them is set.
#[derive(Debug, Clone, PartialEq)]
pub struct QeMecTable {
    pub rpa: Option<ParamId>,
    pub two_p_two_h: Option<ParamId>,
    rows: Vec<QeMecRow>,
}

impl QeMecTable {
    pub fn new(rpa: Option<ParamId>, two_p_two_h: Option<ParamId>) -> Option<Self> {
        //! `None` unless at least one weight column is enabled.
        if rpa.is_none() && two_p_two_h.is_none() {
            return None;
        }
        Some(Self {
            rpa,
            two_p_two_h,
            rows: Vec::new(),
        })
    }

    pub fn push(&mut self, row: QeMecRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[QeMecRow] {
        &self.rows
    }

    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["q0", "q3"];
        if self.rpa.is_some() {
            columns.push("Wght_RPA");
        }
        if self.two_p_two_h.is_some() {
            columns.push("Wght_2p2h");
            columns.push("QELikeTarget");
        }
        columns
    }

    fn write(&self, file: &mut RootFile, path: &Path) -> Result<(), OutputError> {
        let mut tree = WriterTree::new(QE_MEC_TREE);
        tree.new_branch("q0", self.rows.iter().map(|r| r.q0).collect::<Vec<_>>().into_iter());
        tree.new_branch("q3", self.rows.iter().map(|r| r.q3).collect::<Vec<_>>().into_iter());
        if self.rpa.is_some() {
            tree.new_branch(
                "Wght_RPA",
                self.rows.iter().map(|r| r.weight_rpa).collect::<Vec<_>>().into_iter(),
            );
        }
        if self.two_p_two_h.is_some() {
            tree.new_branch(
                "Wght_2p2h",
                self.rows.iter().map(|r| r.weight_2p2h).collect::<Vec<_>>().into_iter(),
            );
            tree.new_branch(
                "QELikeTarget",
                self.rows.iter().map(|r| r.qe_like_target).collect::<Vec<_>>().into_iter(),
            );
        }
        tree.write(file).map_err(|err| OutputError::Write {
            path: path.to_path_buf(),
            tree: QE_MEC_TREE.to_string(),
            reason: err.to_string(),
        })
    }
}

/// The live validation tables of one run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputTables {
    pub resonant: Option<ResonantTable>,
    pub qe_mec: Option<QeMecTable>,
}

impl OutputTables {
    pub fn for_parameters(params: &ValidationParameters) -> Self {
        //! Allocate exactly the tables whose governing parameters resolved.
        let tables = Self {
            resonant: params.mk_spp.map(ResonantTable::new),
            qe_mec: QeMecTable::new(params.mnv_rpa, params.mnv_2p2h),
        };
        if let Some(table) = &tables.resonant {
            debug!("allocated {RESONANT_TREE} with columns {:?}", table.columns());
        }
        if let Some(table) = &tables.qe_mec {
            debug!("allocated {QE_MEC_TREE} with columns {:?}", table.columns());
        }
        tables
    }

    pub fn tree_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(2);
        if self.resonant.is_some() {
            names.push(RESONANT_TREE);
        }
        if self.qe_mec.is_some() {
            names.push(QE_MEC_TREE);
        }
        names
    }

    pub fn write_root(&self, path: &Path) -> Result<(), OutputError> {
        //! Write every live table to a freshly created ROOT file at `path`, replacing any existing
        //! file, and close it.
        //!
        //! # Errors
        //! Returns [`OutputError`] if the file can't be created, a tree can't be written, or the
        //! file can't be finalised.
        {
            let mut file = RootFile::create(path).map_err(|err| OutputError::Create {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
            if let Some(table) = &self.resonant {
                table.write(&mut file, path)?;
                info!("{RESONANT_TREE}: {} rows", table.rows().len());
            }
            if let Some(table) = &self.qe_mec {
                table.write(&mut file, path)?;
                info!("{QE_MEC_TREE}: {} rows", table.rows().len());
            }
            file.close().map_err(|err| OutputError::Close {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        }
        // oxyroot only flushes the header when the `RootFile` is dropped, and swallows errors
        // doing so. Read it back to make sure it landed.
        match read_magic(path) {
            Ok(magic) if magic == ROOT_MAGIC => Ok(()),
            Ok(magic) => Err(OutputError::Close {
                path: path.to_path_buf(),
                reason: format!("file header is {magic:?} after closing"),
            }),
            Err(err) => Err(OutputError::Close {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_parameters_no_tables() {
        let tables = OutputTables::for_parameters(&ValidationParameters::default());
        assert!(tables.resonant.is_none() && tables.qe_mec.is_none());
        assert!(tables.tree_names().is_empty());
    }

    #[test]
    fn resonant_only() {
        let tables = OutputTables::for_parameters(&ValidationParameters {
            mk_spp: Some(ParamId(0)),
            ..Default::default()
        });
        assert_eq!(tables.tree_names(), vec![RESONANT_TREE]);
        assert_eq!(tables.resonant.unwrap().param, ParamId(0));
    }

    #[test]
    fn qe_mec_columns_follow_parameters() {
        let rpa_only = OutputTables::for_parameters(&ValidationParameters {
            mnv_rpa: Some(ParamId(1)),
            ..Default::default()
        });
        assert_eq!(rpa_only.tree_names(), vec![QE_MEC_TREE]);
        assert_eq!(
            rpa_only.qe_mec.unwrap().columns(),
            vec!["q0", "q3", "Wght_RPA"]
        );

        let mec_only = QeMecTable::new(None, Some(ParamId(2))).unwrap();
        assert_eq!(
            mec_only.columns(),
            vec!["q0", "q3", "Wght_2p2h", "QELikeTarget"]
        );

        let both = QeMecTable::new(Some(ParamId(1)), Some(ParamId(2))).unwrap();
        assert_eq!(both.columns().len(), 5);

        assert!(QeMecTable::new(None, None).is_none());
    }

    #[test]
    fn rows_keep_insertion_order() {
        let mut table = ResonantTable::new(ParamId(0));
        for i in 0..3 {
            table.push(ResonantRow {
                w: i as f64,
                weight: 1.0,
                neut_code: i,
            });
        }
        let codes: Vec<i32> = table.rows().iter().map(|r| r.neut_code).collect();
        assert_eq!(codes, vec![0, 1, 2]);
    }

    #[test]
    fn written_file_is_readable_on_return() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OUTPUT_FILE);
        let mut tables = OutputTables::for_parameters(&ValidationParameters {
            mk_spp: Some(ParamId(0)),
            ..Default::default()
        });
        if let Some(table) = tables.resonant.as_mut() {
            table.push(ResonantRow {
                w: 1.2,
                weight: 0.9,
                neut_code: 11,
            });
        }
        tables.write_root(&path).unwrap();

        assert_eq!(read_magic(&path).unwrap(), ROOT_MAGIC);
        let mut file = RootFile::open(&path).unwrap();
        let tree = file.get_tree(RESONANT_TREE).unwrap();
        let codes: Vec<i32> = tree
            .branch("NEUTCh")
            .unwrap()
            .as_iter::<i32>()
            .unwrap()
            .collect();
        assert_eq!(codes, vec![11]);
    }
}
