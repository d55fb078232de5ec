//! Tessel driver binary.
//!
//! Reads a textual IR program from a file (or stdin), optimizes it and writes the
//! requested output to stdout.

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tessel::ecmascript::{generate_ecmascript, EncodingStrategyCache};
use tessel::optimize::{optimize_with, OptimizationOptions};
use tessel::text_ir::parse_program;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The optimized program in textual IR form
    Ir,
    /// The program compiled to ECMAScript
    Ecmascript,
    /// The encoding strategy chosen for every enum
    Encoding,
}

#[derive(Debug, Parser)]
#[command(name = "tessel", version, about = "Optimize textual IR and compile it to ECMAScript")]
struct Cli {
    /// Input file; stdin when omitted
    input: Option<PathBuf>,

    /// What to write to stdout
    #[arg(long, value_enum, default_value_t = Emit::Ecmascript)]
    emit: Emit,

    /// Skip dead code elimination
    #[arg(long)]
    no_dce: bool,

    /// Keep functions the entry point cannot reach
    #[arg(long)]
    keep_unused_functions: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let text = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let mut program = parse_program(&text)?;
    info!(
        "parsed {} functions, {} enums",
        program.functions.len(),
        program.enums.len()
    );

    let options = OptimizationOptions {
        remove_dead_code: !cli.no_dce,
        remove_unused_functions: !cli.keep_unused_functions,
    };
    optimize_with(&mut program, &options);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.emit {
        Emit::Ir => write!(out, "{program}")?,
        Emit::Ecmascript => {
            let mut cache = EncodingStrategyCache::new(&program.enums);
            generate_ecmascript(&program, &mut cache, &mut out)?;
        }
        Emit::Encoding => {
            let mut cache = EncodingStrategyCache::new(&program.enums);
            for (id, enumeration) in program.enums.iter().enumerate() {
                writeln!(out, "enum {}", enumeration.name)?;
                let strategy = cache.require(id as u32);
                for (element, encoding) in enumeration.elements.iter().zip(strategy.elements()) {
                    writeln!(out, "    {}: {encoding}", element.name)?;
                }
            }
        }
    }
    out.flush()?;
    Ok(())
}
