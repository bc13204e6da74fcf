pub mod blast_stat;

pub use blast_stat::{load_blast_params, parse_blast_params};
