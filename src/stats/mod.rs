//! Karlin-Altschul parameter records and the table indexing them by scoring scheme

pub mod evalue;

use std::fmt::{Display, Formatter};
use std::io::Write;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::errors::EvalueError;

pub use evalue::{calc_evalue, evalue_or_sentinel, EVALUE_NOT_FOUND};

/// Number of raw numeric fields in a parameter record
pub const NUM_FIELDS: usize = 10;

/// Substitution and gap costs identifying one parameter record.
///
/// Lookups require exact equality of all four components.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScoringScheme {
    /// Match reward
    pub reward: i32,

    /// Mismatch penalty
    pub penalty: i32,

    pub gap_open: i32,
    pub gap_extend: i32,
}

impl ScoringScheme {
    pub fn new(reward: i32, penalty: i32, gap_open: i32, gap_extend: i32) -> Self {
        Self { reward, penalty, gap_open, gap_extend }
    }
}

impl Display for ScoringScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "match = {}, mismatch = {}, gap_open = {}, gap_extend = {}",
            self.reward, self.penalty, self.gap_open, self.gap_extend
        )
    }
}

/// One row of a `blastn_values_<match>_<mismatch>` table.
///
/// Stores the values exactly as parsed. The first four fields are kept as
/// floats; [`EvalueParams::scheme`] gives their integer identity.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct EvalueParams {
    #[serde(rename = "match")]
    reward: f64,
    #[serde(rename = "mismatch")]
    penalty: f64,
    gap_open: f64,
    gap_extend: f64,
    lambda: f64,
    k: f64,
    h: f64,
    alpha: f64,
    beta: f64,
    theta: f64,
}

impl EvalueParams {
    /// Table key, built by truncating the first four fields toward zero
    pub fn scheme(&self) -> ScoringScheme {
        ScoringScheme::new(
            self.reward as i32,
            self.penalty as i32,
            self.gap_open as i32,
            self.gap_extend as i32,
        )
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    pub fn h(&self) -> f64 {
        self.h
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// All ten fields in table order
    pub fn values(&self) -> [f64; NUM_FIELDS] {
        [
            self.reward, self.penalty, self.gap_open, self.gap_extend,
            self.lambda, self.k, self.h, self.alpha, self.beta, self.theta,
        ]
    }
}

impl TryFrom<&[f64]> for EvalueParams {
    type Error = EvalueError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let [reward, penalty, gap_open, gap_extend, lambda, k, h, alpha, beta, theta]: [f64; NUM_FIELDS] =
            values.try_into().map_err(|_| EvalueError::FieldCount(values.len()))?;

        Ok(Self { reward, penalty, gap_open, gap_extend, lambda, k, h, alpha, beta, theta })
    }
}

/// Read-only mapping from scoring scheme to parameter record.
///
/// Only the loader in [`crate::io::blast_stat`] can fill a table; everything
/// else gets a shared reference.
#[derive(Clone, Debug, Default)]
pub struct ParameterTable {
    records: FxHashMap<ScoringScheme, EvalueParams>,
}

impl ParameterTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own key, returning the record it replaced
    pub(crate) fn insert(&mut self, params: EvalueParams) -> Option<EvalueParams> {
        self.records.insert(params.scheme(), params)
    }

    pub fn get(&self, scheme: &ScoringScheme) -> Option<&EvalueParams> {
        self.records.get(scheme)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All keys in ascending order
    pub fn schemes(&self) -> impl Iterator<Item=&ScoringScheme> + '_ {
        self.records.keys().sorted()
    }

    /// Write all records as a JSON array, ordered by scoring scheme
    pub fn write_json(&self, writer: impl Write) -> Result<(), EvalueError> {
        let rows: Vec<&EvalueParams> = self.schemes()
            .map(|scheme| &self.records[scheme])
            .collect();

        serde_json::to_writer_pretty(writer, &rows)?;

        Ok(())
    }
}
