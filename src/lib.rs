//! # covgraph-rs: structural test coverage over control-flow graphs
//!
//! **`covgraph-rs`** analyzes programs written in a small imperative language
//! (assignments, integer arithmetic, `if`/`else`, `while`, integer-labeled
//! blocks) to support structural test-coverage criteria: statement coverage,
//! decision coverage, bounded loop-iteration coverage and bounded-length
//! path coverage.
//!
//! ## Pipeline
//!
//! Source text is parsed into an AST, compiled once into an immutable
//! control-flow graph (CFG) whose edges carry the rendered source text of
//! the node they leave, and then walked once per test input ("datatest")
//! with a fresh variable store. A criterion compares the union of the runs
//! against the graph's label or path universe.
//!
//! ## Quick start
//!
//! ```
//! use covgraph_rs::cfg::Cfg;
//! use covgraph_rs::criteria::statement_coverage;
//! use covgraph_rs::datatest::DatatestSet;
//! use covgraph_rs::parser::parse_program;
//! use covgraph_rs::walk::CfgWalk;
//!
//! let source = "1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }";
//! let (program, _labels) = parse_program(source).unwrap();
//! let cfg = Cfg::build(&program);
//!
//! // One run under concrete inputs.
//! let mut walk = CfgWalk::with_inputs(&cfg, "X = 5").unwrap();
//! walk.run().unwrap();
//! assert_eq!(walk.visited().iter().map(|l| l.value()).collect::<Vec<_>>(), vec![1, 2]);
//! assert_eq!(walk.store().get("Y"), 1);
//!
//! // A whole suite against a criterion.
//! let suite = DatatestSet::parse("{(X=5);(X=-5)}").unwrap();
//! let report = statement_coverage(&cfg, &suite);
//! assert!(report.satisfied);
//! ```
//!
//! ## Core components
//!
//! - **[`parser`]**: source text to AST plus label classification table.
//! - **[`cfg`]**: the CFG builder — label-tree composition and edge wiring.
//! - **[`walk`]** / **[`paths`]**: the coverage engine — deterministic runs,
//!   loop-iteration maxima and bounded path enumeration.
//! - **[`criteria`]**: pass/fail coverage verdicts over a datatest suite.
//! - **[`dot`]**: Graphviz export of the built graph.

pub mod ast;
pub mod cfg;
pub mod criteria;
pub mod datatest;
pub mod dot;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod paths;
pub mod render;
pub mod walk;
