use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

use crate::stats::ScoringScheme;

#[derive(Debug)]
pub enum EvalueError {
    /// The parameter table file could not be opened or read
    FileReadError { path: PathBuf, source: io::Error },

    /// A line inside a `blastn_values_*` block could not be parsed
    ParseError { line: usize, reason: String },

    /// A parameter record was constructed from the wrong number of fields
    FieldCount(usize),

    /// The table has no record for the requested scoring scheme
    UnknownScoringScheme(ScoringScheme),

    /// Could not serialize the parameter table
    SerializationError { source: serde_json::Error },

    /// Other IO errors
    IOError(io::Error),
}

impl Error for EvalueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            Self::FileReadError { ref source, .. } => Some(source),
            Self::SerializationError { ref source } => Some(source),
            Self::IOError(ref source) => Some(source),
            _ => None
        }
    }
}

impl From<io::Error> for EvalueError {
    fn from(value: io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<serde_json::Error> for EvalueError {
    fn from(value: serde_json::Error) -> Self {
        Self::SerializationError {
            source: value
        }
    }
}

impl Display for EvalueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::FileReadError { ref path, source: _ } =>
                write!(f, "Could not open file \"{}\" for reading!", path.display()),
            Self::ParseError { line, ref reason } =>
                write!(f, "Malformed parameter table at line {line}: {reason}"),
            Self::FieldCount(n) =>
                write!(f, "Expected 10 parameter fields, got {n}!"),
            Self::UnknownScoringScheme(ref scheme) =>
                write!(f, "Could not find parameters for combination: {scheme}!"),
            Self::SerializationError { source: _ } =>
                write!(f, "Could not serialize the parameter table!"),
            Self::IOError(ref err) =>
                err.fmt(f),
        }
    }
}
