use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use ark_bn254::Fr;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use provable::{
    array, constraint_system, field::from_decimal, run_and_check, witness, BoolType, Boolean,
    EngineConfig, Endianness, FieldType, Provable, ReferenceEngine, UnitType,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Engine configuration as JSON, e.g. {"endianness": "big"}
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prints the constraint system of witnessing an array
    Analyze {
        /// Element type of the array
        #[arg(value_enum)]
        kind: ElementKind,
        /// Number of elements
        length: usize,
        /// Encode gate coefficients big endian
        #[arg(long)]
        big_endian: bool,
        /// Print the summary as JSON instead of one line per gate
        #[arg(long)]
        json: bool,
    },
    /// Witnesses comma separated values as booleans and checks them
    Check {
        /// e.g. 1,0,1
        values: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ElementKind {
    Field,
    Bool,
    Unit,
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn analyze<T>(element: T, length: usize, config: EngineConfig, as_json: bool) -> Result<()>
where
    T: Provable<Fr>,
{
    let ty = array::<Fr, _>(element, length);
    let name = ty.name();
    let summary = constraint_system(ReferenceEngine::<Fr>::with_config(config), || {
        witness(&ty, || unreachable!("witness computations are skipped during analysis"))
            .map(|_| ())
    })?;
    info!(ty = %name, rows = summary.rows, "analyzed");
    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{name}: {} rows, digest {}", summary.rows, summary.digest);
        print!("{}", summary.print_gates());
    }
    Ok(())
}

fn check(values: &str, config: EngineConfig) -> Result<()> {
    let values = values
        .split(',')
        .map(|s| {
            from_decimal::<Fr>(s.trim()).with_context(|| format!("not a field element: {s:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let ty = array::<Fr, _>(BoolType, values.len());
    let bits = run_and_check(ReferenceEngine::<Fr>::with_config(config), || {
        witness(&ty, || {
            Ok(values
                .iter()
                .map(|&v| Boolean(provable::FieldVar::Constant(v)))
                .collect())
        })
    })?;
    println!("{}", ty.to_json(&bits)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Analyze {
            kind,
            length,
            big_endian,
            json,
        } => {
            if big_endian {
                config.endianness = Endianness::Big;
            }
            match kind {
                ElementKind::Field => analyze(FieldType, length, config, json),
                ElementKind::Bool => analyze(BoolType, length, config, json),
                ElementKind::Unit => analyze(UnitType, length, config, json),
            }
        }
        Command::Check { values } => {
            if values.trim().is_empty() {
                bail!("no values given");
            }
            check(&values, config)
        }
    }
}
