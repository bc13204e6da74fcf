//! Extract the nucleotide Karlin-Altschul tables from BLAST's `blast_stat.c`
//!
//! Only the statically declared `blastn_values_<match>_<mismatch>` arrays are
//! recognized:
//!
//! ```text
//! static const array_of_8 blastn_values_1_2[] = {
//!     { 0, 0, 1.28, 0.46, 0.85, 1.5, -2, 0.1 },
//!     { 2, 2, 1.33, 0.62, 1.1, 1.2, 0, 0.1 },
//! };
//! ```
//!
//! Each row holds gap open, gap extend, Lambda, K, H, Alpha, Beta and Theta.
//! Everything outside these blocks is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::{debug, error, trace};

use crate::errors::EvalueError;
use crate::stats::{EvalueParams, ParameterTable};

const BLOCK_MARKER: &str = "static const array_of_8 blastn_values_";
const BLOCK_END: &str = "};";
const VALUES_PER_ROW: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq)]
enum ParserState {
    SeekingBlock,
    InBlock { reward: f64, penalty: f64 },
}

/// Load the parameter table from a `blast_stat.c` file, optionally gzipped.
pub fn load_blast_params(path: impl AsRef<Path>) -> Result<ParameterTable, EvalueError> {
    let p = path.as_ref();
    let is_gzipped = p
        .file_name()
        .map(|v| v.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false);

    let file = File::open(p).map_err(|source| {
        error!("Could not open file \"{}\" for reading!", p.display());
        EvalueError::FileReadError { path: p.to_path_buf(), source }
    })?;

    let reader: Box<dyn BufRead> = if is_gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let table = parse_blast_params(reader)?;
    debug!("Loaded {} parameter records from {}", table.len(), p.display());

    Ok(table)
}

/// Build the parameter table from `blast_stat.c` source text.
///
/// Bytes that aren't valid UTF-8 are replaced, so they only matter inside a row.
/// Fails on the first malformed line inside a block, or if the input ends
/// before a block is closed.
pub fn parse_blast_params(reader: impl BufRead) -> Result<ParameterTable, EvalueError> {
    let mut table = ParameterTable::new();
    let mut state = ParserState::SeekingBlock;
    let mut block_start = 0;

    for (i, raw) in reader.split(b'\n').enumerate() {
        let bytes = raw?;
        let bytes = bytes.strip_suffix(b"\r").unwrap_or(&bytes[..]);
        let line = String::from_utf8_lossy(bytes);
        let line_no = i + 1;

        state = match state {
            ParserState::SeekingBlock => match parse_block_header(&line, line_no)? {
                Some((reward, penalty)) => {
                    trace!(reward, penalty, line = line_no, "blastn_values block");
                    block_start = line_no;
                    ParserState::InBlock { reward, penalty }
                },
                None => ParserState::SeekingBlock,
            },
            ParserState::InBlock { reward, penalty } => {
                if line.contains(BLOCK_END) {
                    ParserState::SeekingBlock
                } else {
                    if let Some(row) = parse_row(&line, line_no)? {
                        let mut values = Vec::with_capacity(VALUES_PER_ROW + 2);
                        values.push(reward);
                        values.push(penalty);
                        values.extend(row);

                        let params = EvalueParams::try_from(values.as_slice())?;
                        if table.insert(params).is_some() {
                            debug!("Line {line_no} replaces earlier parameters for {}", params.scheme());
                        }
                    }

                    state
                }
            }
        };
    }

    if let ParserState::InBlock { .. } = state {
        return Err(EvalueError::ParseError {
            line: block_start,
            reason: "block is never closed".to_string(),
        });
    }

    Ok(table)
}

/// Match and mismatch from a block declaration, or `None` if the line doesn't start a block
fn parse_block_header(line: &str, line_no: usize) -> Result<Option<(f64, f64)>, EvalueError> {
    let Some((_, rest)) = line.split_once(BLOCK_MARKER) else {
        return Ok(None);
    };

    let name = rest.split('[').next().unwrap_or_default();
    let mut tokens = name.split('_').map(str::trim);

    match (tokens.next(), tokens.next()) {
        (Some(reward), Some(penalty)) => Ok(Some((
            parse_number(reward, line_no)?,
            parse_number(penalty, line_no)?,
        ))),
        _ => Err(EvalueError::ParseError {
            line: line_no,
            reason: format!("expected blastn_values_<match>_<mismatch>, found \"{}\"", line.trim()),
        }),
    }
}

/// The eight values of a `{ ... }` row. Blank and comment-only lines give `None`.
fn parse_row(line: &str, line_no: usize) -> Result<Option<Vec<f64>>, EvalueError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
        return Ok(None);
    }

    let inner = trimmed
        .split_once('{')
        .and_then(|(_, after)| after.split_once('}'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| EvalueError::ParseError {
            line: line_no,
            reason: format!("expected a {{ ... }} row, found \"{trimmed}\""),
        })?;

    let values = inner
        .split(',')
        .map(|token| parse_number(token.trim(), line_no))
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != VALUES_PER_ROW {
        return Err(EvalueError::ParseError {
            line: line_no,
            reason: format!("expected {VALUES_PER_ROW} values, found {}", values.len()),
        });
    }

    Ok(Some(values))
}

fn parse_number(token: &str, line_no: usize) -> Result<f64, EvalueError> {
    token.parse::<f64>()
        .map_err(|_| EvalueError::ParseError {
            line: line_no,
            reason: format!("\"{token}\" is not a number"),
        })
}
