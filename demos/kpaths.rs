use clap::Parser;

use covgraph_rs::cfg::Cfg;
use covgraph_rs::parser::parse_program;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Path-length budget in edges.
    #[arg(value_name = "INT", default_value = "6")]
    k: usize,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let args = Cli::parse();
    println!("args = {:?}", args);

    let source = "\
        1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 } \
        4: WHILE (Y < 3) { 5: Y = Y + 1 }";
    println!("program:\n{}", source);

    let (program, _) = parse_program(source)?;
    let cfg = Cfg::build(&program);

    println!("paths of at most {} edges:", args.k);
    for (i, path) in cfg.paths(args.k).enumerate() {
        println!("  [{}] {:?}", i, path);
    }

    let dot = cfg.to_dot()?;
    println!("{}", dot);

    Ok(())
}
