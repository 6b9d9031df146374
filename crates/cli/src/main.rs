//! Pipeline simulator CLI.
//!
//! This binary wires the engine to the outside world. It performs:
//! 1. **Configuration:** Built-in defaults, an optional JSON config file, and
//!    per-parameter flag overrides (flags win over the file).
//! 2. **Trace loading:** Whole-trace parsing from a file or standard input,
//!    fatal on malformed input.
//! 3. **Reporting:** The per-instruction cycle table followed by the
//!    aggregate statistics report.

use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use std::process;

use procsim_core::config::SimConfig;
use procsim_core::pipeline::Simulator;
use procsim_core::trace::{parse_trace, DecodedInst, TraceSource};

#[derive(Parser, Debug)]
#[command(
    name = "procsim",
    author,
    version,
    about = "Superscalar out-of-order pipeline simulator",
    long_about = "Simulate a Tomasulo-style out-of-order pipeline over a decoded-instruction trace.\n\nTrace format is one instruction per line: <address-hex> <op_class> <dest> <src1> <src2>,\nwith -1 for a missing register.\n\nExamples:\n  procsim traces/gcc.trace\n  procsim -r 2 --k0 1 --k1 1 --k2 1 -f 2 < traces/gcc.trace\n  procsim --config machine.json --trace-stages traces/gcc.trace"
)]
struct Cli {
    /// Instruction trace file; reads standard input when omitted.
    trace: Option<String>,

    /// Number of result buses (broadcasts per cycle).
    #[arg(short = 'r', long)]
    result_buses: Option<usize>,

    /// Number of type-0 functional units.
    #[arg(short = 'j', long)]
    k0: Option<usize>,

    /// Number of type-1 functional units.
    #[arg(short = 'k', long)]
    k1: Option<usize>,

    /// Number of type-2 functional units.
    #[arg(short = 'l', long)]
    k2: Option<usize>,

    /// Instructions fetched per cycle.
    #[arg(short = 'f', long)]
    fetch_rate: Option<usize>,

    /// JSON configuration file; explicit flags take precedence.
    #[arg(long)]
    config: Option<String>,

    /// Print one line per stage transition per instruction to stderr.
    #[arg(long)]
    trace_stages: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {}", path, e);
            process::exit(1);
        }),
        None => SimConfig::default(),
    };
    if let Some(r) = cli.result_buses {
        config.result_buses = r;
    }
    if let Some(k0) = cli.k0 {
        config.fu_counts[0] = k0;
    }
    if let Some(k1) = cli.k1 {
        config.fu_counts[1] = k1;
    }
    if let Some(k2) = cli.k2 {
        config.fu_counts[2] = k2;
    }
    if let Some(f) = cli.fetch_rate {
        config.fetch_rate = f;
    }
    if cli.trace_stages {
        config.trace_stages = true;
    }

    let insts = read_trace(cli.trace.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error reading trace: {}", e);
        process::exit(1);
    });

    let mut source = TraceSource::new(insts);
    let mut sim = Simulator::new(&config);
    sim.run(&mut source);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = sim.write_instruction_cycles(&mut out) {
        eprintln!("Error writing cycle table: {}", e);
        process::exit(1);
    }
    sim.stats().print();
}

/// Loads a `SimConfig` from a JSON file; omitted fields take defaults.
fn load_config(path: &str) -> Result<SimConfig, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let config = serde_json::from_reader(BufReader::new(file))?;
    Ok(config)
}

/// Reads and validates the whole trace from a file or standard input.
fn read_trace(path: Option<&str>) -> Result<Vec<DecodedInst>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            Ok(parse_trace(BufReader::new(file))?)
        }
        None => {
            let stdin = io::stdin();
            Ok(parse_trace(stdin.lock())?)
        }
    }
}
