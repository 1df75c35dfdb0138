//! CLI for inspecting traces, bitmaps and transitions.
//!
//! # Usage
//!
//! ```bash
//! # Show the bitmap slot a transition maps to
//! tracedrill slot 0x400a10 0x400a3c
//!
//! # List the transitions a trace seeds the ledger with
//! tracedrill ledger --trace run.trace
//!
//! # Classify transitions against a trace and a fuzzer bitmap
//! tracedrill check --trace run.trace --bitmap out/fuzz_bitmap 0x400a10:0x400b00
//!
//! # Same, with paths taken from a session file
//! tracedrill check --session session.json 0x400a10:0x400b00
//! ```
//!
//! `check` exits with status 1 if a file cannot be loaded or a transition
//! cannot be parsed, and prints one verdict per transition otherwise.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracedrill_explore::coverage::MAP_SIZE;
use tracedrill_explore::trace::parse_address;
use tracedrill_explore::{
    Edge, EdgeIndexer, FilterConfig, FuzzBitmap, NoveltyFilter, SessionConfig, Trace,
    TransitionLedger, Verdict,
};

#[derive(Parser)]
#[command(name = "tracedrill")]
#[command(about = "Coverage-guided novelty filter tooling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bitmap indices of a transition.
    Slot {
        /// Block the transition leaves (hex with 0x, or decimal).
        prev: String,

        /// Block the transition enters.
        cur: String,

        /// Bitmap size in bytes (power of two).
        #[arg(short, long, default_value_t = MAP_SIZE)]
        size: usize,
    },

    /// Print the transitions a trace seeds the ledger with.
    Ledger {
        /// Path to the reference trace.
        #[arg(short, long)]
        trace: PathBuf,
    },

    /// Classify transitions as covered, known or candidate.
    Check {
        /// Path to the reference trace.
        #[arg(short, long, required_unless_present = "session")]
        trace: Option<PathBuf>,

        /// Path to the fuzzer bitmap (defaults to the inert all-0xFF map).
        #[arg(short, long)]
        bitmap: Option<PathBuf>,

        /// Session file naming the trace and bitmap.
        #[arg(long, conflicts_with_all = ["trace", "bitmap"])]
        session: Option<PathBuf>,

        /// Transitions as PREV:CUR.
        #[arg(required = true)]
        transitions: Vec<String>,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Slot { prev, cur, size } => cmd_slot(&prev, &cur, size),
        Commands::Ledger { trace } => cmd_ledger(&trace),
        Commands::Check {
            trace,
            bitmap,
            session,
            transitions,
        } => cmd_check(trace, bitmap, session, &transitions),
    }
}

fn cmd_slot(prev: &str, cur: &str, size: usize) {
    if !size.is_power_of_two() {
        eprintln!("Error: bitmap size {} is not a power of two", size);
        std::process::exit(1);
    }

    let edge = Edge::new(parse_or_exit(prev), parse_or_exit(cur));
    let indexer = EdgeIndexer::new(size);

    println!("Transition:  {}", edge);
    println!("Prev index:  {:#06x}", indexer.prev_index(edge.prev));
    println!("Cur index:   {:#06x}", indexer.cur_index(edge.cur));
    println!("Slot:        {:#06x}", indexer.slot(edge));
}

fn cmd_ledger(trace_path: &Path) {
    let trace = load_trace_or_exit(trace_path);
    let ledger = TransitionLedger::from_trace(&trace);

    eprintln!(
        "{} blocks, {} distinct transitions",
        trace.len(),
        ledger.len()
    );
    for edge in ledger.iter() {
        println!("{}", edge);
    }
}

fn cmd_check(
    trace_path: Option<PathBuf>,
    bitmap_path: Option<PathBuf>,
    session_path: Option<PathBuf>,
    transitions: &[String],
) {
    let edges: Vec<Edge> = transitions
        .iter()
        .map(String::as_str)
        .map(parse_transition)
        .collect();

    let filter = match session_path {
        Some(path) => {
            let session = match SessionConfig::load(&path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: failed to load session {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            match session.resolve(base) {
                Ok((trace, bitmap)) => NoveltyFilter::new(trace, bitmap, session.filter),
                Err(e) => {
                    eprintln!("Error: failed to load session inputs: {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            // clap guarantees --trace when --session is absent
            let Some(trace_path) = trace_path else {
                eprintln!("Error: --trace is required without --session");
                std::process::exit(1);
            };
            let trace = load_trace_or_exit(&trace_path);
            let bitmap = bitmap_path.map(|path| match FuzzBitmap::load(&path) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Error: failed to load bitmap {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            });
            NoveltyFilter::new(trace, bitmap, FilterConfig::default())
        }
    };

    let indexer = filter.bitmap().indexer();
    for edge in edges {
        let verdict = match filter.classify(edge) {
            Verdict::Covered => "covered",
            Verdict::Known => "known",
            Verdict::Candidate => "candidate",
        };
        println!("{}  slot {:#06x}  {}", edge, indexer.slot(edge), verdict);
    }
}

fn parse_transition(text: &str) -> Edge {
    let Some((prev, cur)) = text.split_once(':') else {
        eprintln!("Error: transition '{}' is not PREV:CUR", text);
        std::process::exit(1);
    };
    Edge::new(parse_or_exit(prev), parse_or_exit(cur))
}

fn parse_or_exit(text: &str) -> u64 {
    match parse_address(text.trim()) {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Error: invalid address '{}': {}", text, e);
            std::process::exit(1);
        }
    }
}

fn load_trace_or_exit(path: &Path) -> Trace {
    match Trace::load(path) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("Error: failed to load trace {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
