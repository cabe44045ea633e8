//! CLI entry point for the transport puzzle solver.
//!
//! Usage:
//!   transport-puzzle goat [--mode eager|lazy] [--all]
//!   transport-puzzle night
//!   transport-puzzle solve <puzzle.json> [options]
//!   transport-puzzle solve --stdin [options]
//!
//! Options:
//!   --algorithm <bfs|dfs|dijkstra>  Search to run (default: bfs)
//!   --mode <eager|lazy>             Override the definition's mode
//!   --cycle                         Let DFS paths return to the origin
//!   --json                          Print JSON instead of a numbered list
//!   --log-level <level>             Log verbosity on stderr (default: warn)

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use transport_puzzle::{
    bfs_solve, dfs_solve, dijkstra, goat_wolf_cabbage_definition, night_crossing_definition,
    path_weight, Edge, GameGraph, Mode, Path, PuzzleDefinition, StateKey,
};

#[derive(Parser)]
#[command(name = "transport-puzzle")]
#[command(about = "Solve river-crossing transport puzzles as state graphs")]
#[command(version)]
struct Cli {
    /// Print JSON instead of a numbered list
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity written to stderr
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Goat, wolf and cabbage: shortest crossing by BFS
    Goat {
        /// Graph construction mode
        #[arg(long, default_value = "lazy")]
        mode: String,

        /// Also list every solution found by exhaustive DFS
        #[arg(long)]
        all: bool,
    },

    /// Crossing at night: fastest crossing by Dijkstra
    Night,

    /// Solve a puzzle definition from the empty shore to the full shore
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Search algorithm
        #[arg(long, value_enum, default_value = "bfs")]
        algorithm: Algorithm,

        /// Override the definition's construction mode
        #[arg(long)]
        mode: Option<String>,

        /// Let DFS paths pass back through the origin
        #[arg(long)]
        cycle: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    Bfs,
    Dfs,
    Dijkstra,
}

/// Output format for one solved path
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolutionOutput {
    puzzle: String,
    found: bool,
    steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_weight: Option<u64>,
    path: Vec<Edge>,
}

impl SolutionOutput {
    fn new(puzzle: &str, path: Path, weighted: bool) -> Self {
        Self {
            puzzle: puzzle.to_string(),
            found: !path.is_empty(),
            steps: path.len(),
            total_weight: weighted.then(|| path_weight(&path)),
            path,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Goat { mode, all } => {
            let definition = goat_wolf_cabbage_definition().with_mode(mode.parse::<Mode>()?);
            run(&definition, Algorithm::Bfs, false, cli.json)?;
            if all {
                run(&definition, Algorithm::Dfs, false, cli.json)?;
            }
        }
        Commands::Night => {
            run(&night_crossing_definition(), Algorithm::Dijkstra, false, cli.json)?;
        }
        Commands::Solve {
            file,
            stdin,
            algorithm,
            mode,
            cycle,
        } => {
            let json_content = if stdin {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read from stdin")?;
                buffer
            } else if let Some(path) = file {
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read file {:?}", path))?
            } else {
                bail!("Must provide either a file path or --stdin");
            };

            let mut definition: PuzzleDefinition =
                serde_json::from_str(&json_content).context("Error parsing puzzle JSON")?;
            if let Some(mode) = mode {
                definition = definition.with_mode(mode.parse::<Mode>()?);
            }
            run(&definition, algorithm, cycle, cli.json)?;
        }
    }

    Ok(())
}

/// Build the definition's graph, search it and print the result
fn run(definition: &PuzzleDefinition, algorithm: Algorithm, cycle: bool, json: bool) -> Result<()> {
    let mut graph = definition.build()?;
    let universe = graph.config().universe();
    let (src, dst) = (StateKey::empty(universe), StateKey::full(universe));
    info!(
        puzzle = %definition.name,
        mode = %graph.mode(),
        vertices = graph.vertex_count(),
        "graph ready"
    );

    let weighted = definition.transit_costs.is_some();
    match algorithm {
        Algorithm::Bfs => {
            let path = bfs_solve(&mut graph, &src, &dst)?;
            emit("shortest path:", SolutionOutput::new(&definition.name, path, weighted), json)
        }
        Algorithm::Dijkstra => {
            let path = dijkstra(&mut graph, &src, &dst)?;
            emit(
                &format!("shortest path ({}):", definition.name),
                SolutionOutput::new(&definition.name, path, weighted),
                json,
            )
        }
        Algorithm::Dfs => emit_all(definition, &mut graph, &src, &dst, cycle, json),
    }
}

fn emit(title: &str, output: SolutionOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", title);
    if !output.found {
        println!("no solution");
    }
    print_path(&output.path);
    if let Some(weight) = output.total_weight {
        println!("total weight: {}", weight);
    }
    Ok(())
}

fn emit_all(
    definition: &PuzzleDefinition,
    graph: &mut GameGraph,
    src: &StateKey,
    dst: &StateKey,
    cycle: bool,
    json: bool,
) -> Result<()> {
    let weighted = definition.transit_costs.is_some();
    let mut outputs = Vec::new();

    if !json {
        println!("all solutions:");
    }
    for solution in dfs_solve(graph, src, dst, cycle)? {
        let output = SolutionOutput::new(&definition.name, solution?, weighted);
        if json {
            outputs.push(output);
        } else {
            print_path(&output.path);
            println!("\n");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    }
    Ok(())
}

fn print_path(path: &[Edge]) {
    for (edge_num, edge) in path.iter().enumerate() {
        println!("{}. {}", edge_num + 1, edge);
    }
}
