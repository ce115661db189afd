use covgraph_rs::cfg::Cfg;
use covgraph_rs::parser::parse_program;
use covgraph_rs::walk::CfgWalk;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let source = "\
        1: WHILE (X < 4) { \
            2: WHILE (Y < X) { 3: Y = Y + 1 } \
            4: X = X + 1 ; Y = 0 }";
    println!("program:\n{}", source);

    let (program, _) = parse_program(source)?;
    let cfg = Cfg::build(&program);

    for init in ["X=0", "X=2", "X=4"] {
        let mut walk = CfgWalk::with_inputs(&cfg, init)?;
        let bounds = walk.run_while_bounds()?;
        println!("{}:", init);
        for (label, max) in &bounds {
            println!("  while {}: {} consecutive iterations at most", label, max);
        }
        println!("  visited = {:?}", walk.visited());
    }

    Ok(())
}
