pub mod errors;
pub mod io;
pub mod stats;
