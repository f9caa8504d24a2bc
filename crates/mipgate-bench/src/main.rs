use clap::{Parser, Subcommand, ValueEnum};
use mipgate_core::diagnostics::{capture_rss_bytes, rss_delta};
use mipgate_core::fixtures;
use mipgate_core::logging::init_logging;
use mipgate_core::{MipSolution, MipSolver, SolverConfig, SolverError};
use mipgate_gurobi::GurobiSolver;
use mipgate_highs::HighsSolver;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

const SCHEMA_VERSION: u32 = 1;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Solve mipgate reference problems on a chosen engine"
)]
struct Cli {
    /// Log filter directive, overrides MIPGATE_TRACE
    #[arg(long, global = true)]
    trace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one reference problem, solve it and print a record
    Solve(SolveArgs),
    /// List engines compiled into this binary
    Backends,
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Reference problems to solve
    #[arg(long = "problem", value_enum, value_delimiter = ',', default_value = "simple-mip")]
    problems: Vec<Problem>,

    /// Engine to solve with
    #[arg(long, value_enum, default_value = "highs")]
    backend: Backend,

    /// Wall-clock limit per solve, in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Show engine progress output
    #[arg(long)]
    show_log: bool,

    /// Write engine progress output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Relative MIP gap tolerance
    #[arg(long)]
    mip_gap: Option<f64>,

    /// Engine thread count
    #[arg(long)]
    threads: Option<u32>,

    /// Side length of the assignment problem
    #[arg(long, default_value_t = 6)]
    size: usize,

    /// Market-split rows and columns
    #[arg(long, default_value_t = 4)]
    split_rows: usize,
    #[arg(long, default_value_t = 50)]
    split_cols: usize,

    /// Seed for generated coefficients
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Append records to this JSONL file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Ndjson,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Problem {
    SimpleMip,
    Assignment,
    Infeasible,
    Unbounded,
    MarketSplit,
}

impl Problem {
    fn as_str(self) -> &'static str {
        match self {
            Problem::SimpleMip => "simple-mip",
            Problem::Assignment => "assignment",
            Problem::Infeasible => "infeasible",
            Problem::Unbounded => "unbounded",
            Problem::MarketSplit => "market-split",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
enum Backend {
    Highs,
    Gurobi,
}

impl Backend {
    fn as_str(self) -> &'static str {
        match self {
            Backend::Highs => "highs",
            Backend::Gurobi => "gurobi",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SolveRecord {
    schema_version: u32,
    problem: String,
    backend: String,
    variables: usize,
    constraints: usize,
    status: String,
    objective_value: Option<f64>,
    mip_gap: Option<f64>,
    build_ms: f64,
    solve_ms: f64,
    rss_before_bytes: Option<u64>,
    rss_after_bytes: Option<u64>,
    rss_delta_bytes: Option<i64>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.trace.as_deref())?;
    match cli.command {
        Command::Solve(args) => solve_command(args),
        Command::Backends => {
            println!("highs");
            if mipgate_gurobi::is_available() {
                println!("gurobi");
            }
            Ok(())
        }
    }
}

fn solver_config(args: &SolveArgs) -> SolverConfig {
    let mut config = SolverConfig::new().with_show_log(args.show_log);
    if let Some(limit) = args.time_limit {
        config = config.with_time_limit(limit);
    }
    if let Some(path) = &args.log_file {
        config = config.with_log_file(path);
    }
    if let Some(gap) = args.mip_gap {
        config = config.with_mip_gap(gap);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    config
}

fn build_solver(
    backend: Backend,
    config: SolverConfig,
) -> Result<Box<dyn MipSolver>, SolverError> {
    let solver: Box<dyn MipSolver> = match backend {
        Backend::Highs => Box::new(HighsSolver::with_config(config)?),
        Backend::Gurobi => Box::new(GurobiSolver::with_config(config)?),
    };
    Ok(solver)
}

fn build_problem(
    problem: Problem,
    solver: &mut dyn MipSolver,
    args: &SolveArgs,
) -> Result<(), SolverError> {
    match problem {
        Problem::SimpleMip => fixtures::simple_mip(solver).map(|_| ()),
        Problem::Assignment => fixtures::assignment(solver, args.size).map(|_| ()),
        Problem::Infeasible => fixtures::contradictory_bounds(solver).map(|_| ()),
        Problem::Unbounded => fixtures::unbounded(solver).map(|_| ()),
        Problem::MarketSplit => {
            fixtures::market_split(solver, args.split_rows, args.split_cols, args.seed)
                .map(|_| ())
        }
    }
}

fn solve_command(args: SolveArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.problems.is_empty() {
        return Err(boxed_input_error("at least one --problem is required"));
    }
    if args.size == 0 {
        return Err(boxed_input_error("size must be greater than zero"));
    }
    let config = solver_config(&args);
    config.validate()?;

    let mut records = Vec::with_capacity(args.problems.len());
    for problem in &args.problems {
        records.push(solve_problem(*problem, &args, config.clone())?);
    }

    if let Some(path) = &args.output {
        append_records_jsonl(path, &records)?;
    }
    render_output(args.format, &records)?;
    Ok(())
}

fn solve_problem(
    problem: Problem,
    args: &SolveArgs,
    config: SolverConfig,
) -> Result<SolveRecord, Box<dyn std::error::Error>> {
    let build_started = Instant::now();
    let mut solver = build_solver(args.backend, config)?;
    build_problem(problem, solver.as_mut(), args)?;
    let build_ms = build_started.elapsed().as_secs_f64() * 1000.0;

    debug!(
        component = "bench",
        operation = "build",
        status = "success",
        problem = problem.as_str(),
        backend = args.backend.as_str(),
        variables = solver.registry().num_vars(),
        constraints = solver.registry().num_constraints(),
        duration_ms = build_ms,
        "Built reference problem"
    );

    let rss_before = capture_rss_bytes("bench_solve_start");
    let solution = solver.optimize()?;
    let rss_after = capture_rss_bytes("bench_solve_end");

    info!(
        component = "bench",
        operation = "solve",
        status = "success",
        problem = problem.as_str(),
        backend = args.backend.as_str(),
        solver_status = %solution.status,
        "Solved reference problem"
    );

    Ok(solve_record(
        problem,
        args.backend,
        solver.as_ref(),
        &solution,
        build_ms,
        (rss_before, rss_after),
    ))
}

fn solve_record(
    problem: Problem,
    backend: Backend,
    solver: &dyn MipSolver,
    solution: &MipSolution,
    build_ms: f64,
    (rss_before, rss_after): (Option<u64>, Option<u64>),
) -> SolveRecord {
    SolveRecord {
        schema_version: SCHEMA_VERSION,
        problem: problem.as_str().to_string(),
        backend: backend.as_str().to_string(),
        variables: solver.registry().num_vars(),
        constraints: solver.registry().num_constraints(),
        status: solution.status.as_str().to_string(),
        objective_value: solution.objective_value,
        mip_gap: solution.mip_gap,
        build_ms,
        solve_ms: solution.solve_time_seconds * 1000.0,
        rss_before_bytes: rss_before,
        rss_after_bytes: rss_after,
        rss_delta_bytes: rss_delta(rss_before, rss_after),
    }
}

fn append_records_jsonl(
    path: &Path,
    records: &[SolveRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let file: File = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

fn render_output(
    format: OutputFormat,
    records: &[SolveRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            print_record_table(records);
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
            Ok(())
        }
        OutputFormat::Ndjson => {
            for record in records {
                println!("{}", serde_json::to_string(record)?);
            }
            Ok(())
        }
    }
}

fn print_record_table(records: &[SolveRecord]) {
    println!(
        "{:<14} {:<8} {:>6} {:>6} {:<24} {:>14} {:>10} {:>12} {:>12}",
        "problem", "backend", "vars", "rows", "status", "objective", "gap", "solve_ms", "rss_mb"
    );
    for record in records {
        println!(
            "{:<14} {:<8} {:>6} {:>6} {:<24} {:>14} {:>10} {:>12.3} {:>12}",
            record.problem,
            record.backend,
            record.variables,
            record.constraints,
            record.status,
            format_option_f64(record.objective_value),
            format_option_f64(record.mip_gap),
            record.solve_ms,
            format_option_mb_i64(record.rss_delta_bytes),
        );
    }
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.4}"))
}

fn format_option_mb_i64(value: Option<i64>) -> String {
    value.map_or_else(
        || "-".to_string(),
        |bytes| format!("{:.3}", bytes as f64 / (1024.0 * 1024.0)),
    )
}

fn boxed_input_error(message: &str) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}
