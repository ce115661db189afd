use std::path::PathBuf;

use clap::Parser;

use covgraph_rs::cfg::Cfg;
use covgraph_rs::criteria::{
    decision_coverage, loop_coverage, path_coverage, statement_coverage,
};
use covgraph_rs::datatest::DatatestSet;
use covgraph_rs::parser::parse_program;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Program source file.
    #[arg(value_name = "FILE")]
    program: PathBuf,

    /// Datatest suite file, e.g. `{(X=1,Y=2);(X=-3)}`.
    #[arg(value_name = "FILE")]
    suite: PathBuf,

    /// Maximum consecutive loop iterations for loop coverage.
    #[clap(long, value_name = "INT", default_value = "10")]
    bound: u32,

    /// Path-length budget (edges) for path coverage.
    #[clap(long, value_name = "INT", default_value = "10")]
    k: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let source = std::fs::read_to_string(&args.program)?;
    let (program, _) = parse_program(&source)?;
    let cfg = Cfg::build(&program);
    println!(
        "cfg: {} nodes, {} edges, source = {}, target = {}",
        cfg.labels().count(),
        cfg.edges().count(),
        cfg.source(),
        cfg.target()
    );

    let suite = DatatestSet::parse(&std::fs::read_to_string(&args.suite)?)?;
    println!("suite: {} datatests", suite.len());

    let ta = statement_coverage(&cfg, &suite);
    println!("statement coverage: satisfied = {}", ta.satisfied);
    if !ta.missing.is_empty() {
        println!("  missing assignments: {:?}", ta.missing);
    }

    let td = decision_coverage(&cfg, &suite);
    println!("decision coverage: satisfied = {}", td.satisfied);
    if !td.missing.is_empty() {
        println!("  missing decisions: {:?}", td.missing);
    }

    let tb = loop_coverage(&cfg, &suite, args.bound);
    println!(
        "loop coverage (bound = {}): satisfied = {}",
        tb.bound, tb.satisfied
    );
    for (label, max) in &tb.maxima {
        println!("  while {}: at most {} consecutive iterations", label, max);
    }

    let tc = path_coverage(&cfg, &suite, args.k);
    println!(
        "path coverage (k = {}): satisfied = {}, rate = {}% of {} paths",
        args.k, tc.satisfied, tc.rate, tc.total
    );
    for path in &tc.missing {
        println!("  unexecuted path: {:?}", path);
    }

    for report in [&ta.failures, &td.failures, &tb.failures, &tc.failures] {
        for failure in report.iter() {
            println!("datatest {} failed: {}", failure.index, failure.message);
        }
    }

    Ok(())
}
