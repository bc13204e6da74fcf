use std::io::{self, stdout, IsTerminal, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use evaluen::errors::EvalueError;
use evaluen::io::load_blast_params;
use evaluen::stats::{calc_evalue, evalue_or_sentinel, ParameterTable, ScoringScheme};

#[path = "evaluen/cli.rs"]
mod cli;

/// Stderr logging, filtered by `RUST_LOG` or else by the number of `-v` flags.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(filter_layer);

    Registry::default().with(stderr_log).init();
}

/// Float formatting following the usual shortest repr convention: plain
/// decimals for moderate magnitudes, otherwise exponent notation with at
/// least two exponent digits.
fn format_evalue(value: f64) -> String {
    let magnitude = value.abs();
    if !value.is_finite() {
        return value.to_string();
    }

    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        let s = value.to_string();
        return if s.contains('.') { s } else { format!("{s}.0") };
    }

    let s = format!("{value:e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };

            format!("{mantissa}e{sign}{digits:0>2}")
        },
        None => s,
    }
}

fn list_schemes(table: &ParameterTable, mut writer: impl Write) -> Result<()> {
    writeln!(writer, "match\tmismatch\tgap_open\tgap_extend\tLambda\tK\tH")?;

    for scheme in table.schemes() {
        if let Some(params) = table.get(scheme) {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                scheme.reward, scheme.penalty, scheme.gap_open, scheme.gap_extend,
                params.lambda(), params.k(), params.h()
            )?;
        }
    }

    Ok(())
}

fn evalue_report(table: &ParameterTable, args: &cli::CliArgs, mut writer: impl Write) -> Result<()> {
    let scheme = ScoringScheme::new(args.reward, args.penalty, args.gap_open, args.gap_extend);

    writeln!(writer, "Running example for E-value calculation of nucleotide alignments.")?;
    writeln!(writer, "Using parameters:")?;
    writeln!(writer, "alignment_score = {}", args.alignment_score)?;
    writeln!(writer, "query_length = {}", args.query_length)?;
    writeln!(writer, "target_length = {}", args.target_length)?;
    writeln!(writer, "{scheme}")?;
    writeln!(writer)?;

    let result = calc_evalue(
        table,
        args.reward,
        args.penalty,
        args.gap_open,
        args.gap_extend,
        args.query_length,
        args.target_length,
        args.alignment_score,
    );

    if result.is_err() {
        warn!("Falling back to a placeholder E-value");
    }
    let evalue = evalue_or_sentinel(result)?;

    writeln!(writer, "evalue = {}", format_evalue(evalue))?;

    if args.verbose > 0 {
        if let Some(params) = table.get(&scheme) {
            writeln!(writer, "bit_score = {}", format_evalue(params.bit_score(args.alignment_score)))?;
        }
    }

    Ok(())
}

/// `None` when the file can't be opened; the loader has already logged that.
fn load_table(path: &Path) -> Result<Option<ParameterTable>> {
    match load_blast_params(path) {
        Ok(table) => Ok(Some(table)),
        Err(EvalueError::FileReadError { .. }) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Could not load E-value parameters from {}", path.display())),
    }
}

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();
    init_logging(args.verbose);

    debug!("{args:?}");

    let Some(table) = load_table(&args.blast_stat)? else {
        process::exit(1);
    };

    info!("Parsed {} scoring schemes", table.len());

    let mut writer = stdout().lock();
    if args.list {
        list_schemes(&table, &mut writer)?;
    } else if args.dump_json {
        table.write_json(&mut writer)?;
        writeln!(writer)?;
    } else {
        evalue_report(&table, &args, &mut writer)?;
    }

    Ok(())
}


#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use clap::Parser;

    use evaluen::io::parse_blast_params;
    use evaluen::stats::ParameterTable;

    use super::{cli, evalue_report, format_evalue, list_schemes, load_table};

    fn table(text: &str) -> ParameterTable {
        parse_blast_params(Cursor::new(text)).unwrap()
    }

    fn default_args() -> cli::CliArgs {
        cli::CliArgs::parse_from(["evaluen"])
    }

    const REPORT_HEADER: &str = "\
Running example for E-value calculation of nucleotide alignments.
Using parameters:
alignment_score = 1400
query_length = 20000
target_length = 500000000
match = 5, mismatch = 4, gap_open = 8, gap_extend = 6

";

    #[test]
    fn test_report_default_scheme() {
        let table = table("\
static const array_of_8 blastn_values_5_4[] = {
    { 8, 6, 0.0, 0.5, 0.9, 1.1, -2.0, 0.1 },
};
");
        let mut out = Vec::new();
        evalue_report(&table, &default_args(), &mut out).unwrap();

        let expected = format!("{REPORT_HEADER}evalue = 5000000000000.0\n");
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_report_unknown_scheme() {
        let table = table("\
static const array_of_8 blastn_values_2_3[] = {
    { 0, 0, 1.25, 0.5, 0.9, 1.1, -2.0, 0.1 },
};
");
        let mut out = Vec::new();
        evalue_report(&table, &default_args(), &mut out).unwrap();

        let expected = format!("{REPORT_HEADER}evalue = 1000000000.0\n");
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_report_custom_arguments() {
        let table = table("\
static const array_of_8 blastn_values_2_3[] = {
    { 0, 0, 1.25, 0.5, 0.9, 1.1, -2.0, 0.1 },
};
");
        let args = cli::CliArgs::parse_from([
            "evaluen", "--match", "2", "--mismatch", "3", "-o", "0", "-e", "0",
            "-Q", "100", "-T", "1000", "-s", "0",
        ]);

        let mut out = Vec::new();
        evalue_report(&table, &args, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("match = 2, mismatch = 3, gap_open = 0, gap_extend = 0\n"));
        assert!(output.ends_with("\nevalue = 50000.0\n"));
    }

    #[test]
    fn test_list_schemes() {
        let table = table("\
static const array_of_8 blastn_values_2_3[] = {
    { 4, 4, 0.63, 0.42, 0.84, 0.75, -2, 0.1 },
    { 0, 0, 0.55, 0.21, 0.46, 1.2, -5, 0.1 },
};
");
        let mut out = Vec::new();
        list_schemes(&table, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "\
match\tmismatch\tgap_open\tgap_extend\tLambda\tK\tH
2\t3\t0\t0\t0.55\t0.21\t0.46
2\t3\t4\t4\t0.63\t0.42\t0.84
");
    }

    #[test]
    fn test_load_table_missing_file() {
        let result = load_table(Path::new("this/path/does/not/exist/blast_stat.c"));

        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_format_evalue() {
        assert_eq!(format_evalue(0.0), "0.0");
        assert_eq!(format_evalue(1e9), "1000000000.0");
        assert_eq!(format_evalue(0.25), "0.25");
        assert_eq!(format_evalue(1e-300), "1e-300");
        assert_eq!(format_evalue(2.5e-5), "2.5e-05");
        assert_eq!(format_evalue(3e20), "3e+20");
    }
}
