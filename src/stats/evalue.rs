//! E-value and bit score from Karlin-Altschul parameters
//!
//! E = K * m * n * exp(-Lambda * S), with m and n the query and target lengths.

use tracing::error;

use crate::errors::EvalueError;
use crate::stats::{EvalueParams, ParameterTable, ScoringScheme};

/// Stand-in E-value for a scoring scheme missing from the table
pub const EVALUE_NOT_FOUND: f64 = 1e9;

impl EvalueParams {
    pub fn evalue(&self, query_length: u64, target_length: u64, alignment_score: f64) -> f64 {
        self.k * query_length as f64 * target_length as f64 * (-self.lambda * alignment_score).exp()
    }

    /// S' = (Lambda * S - ln K) / ln 2
    pub fn bit_score(&self, alignment_score: f64) -> f64 {
        (self.lambda * alignment_score - self.k.ln()) / std::f64::consts::LN_2
    }
}

/// Compute the E-value of an alignment score under the given scoring scheme.
///
/// A scheme missing from the table is reported on the error log and returned
/// as [`EvalueError::UnknownScoringScheme`].
#[allow(clippy::too_many_arguments)]
pub fn calc_evalue(
    table: &ParameterTable,
    reward: i32,
    penalty: i32,
    gap_open: i32,
    gap_extend: i32,
    query_length: u64,
    target_length: u64,
    alignment_score: f64,
) -> Result<f64, EvalueError> {
    let scheme = ScoringScheme::new(reward, penalty, gap_open, gap_extend);

    let Some(params) = table.get(&scheme) else {
        error!("Could not find parameters for combination: {scheme}!");
        return Err(EvalueError::UnknownScoringScheme(scheme));
    };

    Ok(params.evalue(query_length, target_length, alignment_score))
}

/// Replace a missing scoring scheme with [`EVALUE_NOT_FOUND`]. Other errors are passed through.
pub fn evalue_or_sentinel(result: Result<f64, EvalueError>) -> Result<f64, EvalueError> {
    match result {
        Err(EvalueError::UnknownScoringScheme(_)) => Ok(EVALUE_NOT_FOUND),
        other => other,
    }
}


#[cfg(test)]
mod tests {
    use super::{calc_evalue, evalue_or_sentinel, EVALUE_NOT_FOUND};
    use crate::errors::EvalueError;
    use crate::stats::{EvalueParams, ParameterTable, ScoringScheme};

    fn table() -> ParameterTable {
        let mut table = ParameterTable::new();
        table.insert(EvalueParams::try_from(&[2.0, 3.0, 0.0, 0.0, 1.25, 0.5, 0.9, 1.1, -2.0, 0.1][..]).unwrap());
        table
    }

    #[test]
    fn test_exact_match() {
        let evalue = calc_evalue(&table(), 2, 3, 0, 0, 100, 1000, 10.0).unwrap();
        let expected = 0.5 * 100.0 * 1000.0 * (-12.5f64).exp();

        assert!((evalue - expected).abs() < 1e-12);
        assert!((evalue - 0.18633).abs() < 1e-4);
    }

    #[test]
    fn test_zero_score() {
        let evalue = calc_evalue(&table(), 2, 3, 0, 0, 10, 10, 0.0).unwrap();

        assert!((evalue - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_miss() {
        let result = calc_evalue(&table(), 2, 3, 5, 2, 100, 1000, 10.0);

        match result {
            Err(EvalueError::UnknownScoringScheme(scheme)) =>
                assert_eq!(scheme, ScoringScheme::new(2, 3, 5, 2)),
            _ => panic!("expected a lookup miss")
        }

        let result = calc_evalue(&table(), 2, 3, 5, 2, 100, 1000, 10.0);
        assert_eq!(evalue_or_sentinel(result).unwrap(), EVALUE_NOT_FOUND);
    }

    #[test]
    fn test_sentinel_keeps_hits() {
        let result = calc_evalue(&table(), 2, 3, 0, 0, 10, 10, 0.0);

        assert!((evalue_or_sentinel(result).unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_bit_score() {
        let params = *table().get(&ScoringScheme::new(2, 3, 0, 0)).unwrap();
        let expected = (1.25 * 10.0 - 0.5f64.ln()) / 2.0f64.ln();

        assert!((params.bit_score(10.0) - expected).abs() < 1e-12);
    }
}
