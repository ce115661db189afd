//! End-to-end scenarios: build a CFG from source, run datatests, check the
//! structural properties and the criterion verdicts.

use std::collections::BTreeMap;

use test_log::test;

use covgraph_rs::ast::Label;
use covgraph_rs::cfg::{Cfg, EdgeTag, NodeKind};
use covgraph_rs::criteria::{decision_coverage, loop_coverage, path_coverage, statement_coverage};
use covgraph_rs::datatest::DatatestSet;
use covgraph_rs::parser::parse_program;
use covgraph_rs::walk::CfgWalk;

fn build(source: &str) -> Cfg {
    let (program, _) = parse_program(source).unwrap();
    Cfg::build(&program)
}

fn values(labels: &[Label]) -> Vec<u32> {
    labels.iter().map(|l| l.value()).collect()
}

const TRIANGLE: &str = "\
    1: T = 0 \
    2: IF (X > Y) { 3: T = X ; X = Y ; Y = T } \
    4: WHILE (X < Y) { 5: X = X + 1 ; T = T + 1 } \
    6: IF (T == 0) { 7: R = 1 } ELSE { 8: R = 0 }";

#[test]
fn scenario_a_if_else_single_run() {
    let cfg = build("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }");
    let mut walk = CfgWalk::with_inputs(&cfg, "X = 5").unwrap();
    walk.run().unwrap();
    assert_eq!(values(walk.visited()), vec![1, 2]);
    assert_eq!(walk.store().get("X"), 5);
    assert_eq!(walk.store().get("Y"), 1);
}

#[test]
fn scenario_b_loop_iteration_maximum() {
    let cfg = build("1: WHILE (X < 3) { 2: X = X + 1 }");
    let mut walk = CfgWalk::with_inputs(&cfg, "X = 0").unwrap();
    let bounds = walk.run_while_bounds().unwrap();
    assert_eq!(bounds, BTreeMap::from([(Label::new(1), 3)]));
    assert_eq!(walk.store().get("X"), 3);
}

#[test]
fn scenario_c_two_edge_paths_of_a_loop() {
    let cfg = build("1: WHILE (X < 3) { 2: X = X + 1 }");
    let paths: Vec<_> = cfg.paths(2).collect();
    assert_eq!(paths, vec![vec![Label::new(1)]]);
}

#[test]
fn scenario_d_implicit_false_edge_of_bare_if() {
    let cfg = build("1: IF (X == 0) { 2: Y = 1 } 3: Z = 2");
    let out_of_1: Vec<_> = cfg.successors(Label::new(1)).collect();
    assert_eq!(out_of_1.len(), 2);
    assert_eq!(out_of_1[0].to, Label::new(2));
    assert_eq!(out_of_1[0].text, "X == 0");
    assert_eq!(out_of_1[1].to, Label::new(3));
    assert_eq!(out_of_1[1].tag, EdgeTag::False);
    assert_eq!(out_of_1[1].text, "! X == 0");
    assert_eq!(cfg.successors(Label::new(2)).next().unwrap().to, Label::new(3));
}

#[test]
fn structural_properties_hold_for_nested_programs() {
    let sources = [
        TRIANGLE,
        "1: WHILE (X < 4) { 2: WHILE (Y < X) { 3: Y = Y + 1 } 4: X = X + 1 }",
        "1: IF (A > 0) { 2: IF (B > 0) { 3: C = 1 } 4: D = 1 } 5: E = 1",
    ];
    for source in sources {
        let cfg = build(source);

        // Single entry, single exit.
        let mut in_degree: BTreeMap<Label, usize> = cfg.labels().map(|l| (l, 0)).collect();
        for edge in cfg.edges() {
            *in_degree.get_mut(&edge.to).unwrap() += 1;
        }
        for (label, degree) in &in_degree {
            assert!(*degree > 0 || *label == cfg.source());
        }
        assert_eq!(
            cfg.labels().filter(|l| cfg.successors(*l).count() == 0).count(),
            1
        );
        assert_eq!(cfg.node_kind(cfg.target()), Some(NodeKind::Terminal));

        // Branching completeness and assignment determinism.
        for label in cfg.labels() {
            let edges: Vec<_> = cfg.successors(label).collect();
            match cfg.node_kind(label).unwrap() {
                NodeKind::Decision => {
                    assert_eq!(edges.len(), 2);
                    let true_edge = edges.iter().find(|e| e.tag == EdgeTag::True).unwrap();
                    let false_edge = edges.iter().find(|e| e.tag == EdgeTag::False).unwrap();
                    assert_eq!(false_edge.text, format!("! {}", true_edge.text));
                }
                NodeKind::Assignment => assert_eq!(edges.len(), 1),
                NodeKind::Terminal => assert!(edges.is_empty()),
            }
        }

    }
}

#[test]
fn each_while_has_exactly_one_back_edge() {
    // Triangle: the loop body's last leaf (5) loops back to the head (4).
    let cfg = build(TRIANGLE);
    let back: Vec<_> = cfg
        .edges()
        .filter(|e| e.to == Label::new(4) && e.from == Label::new(5))
        .collect();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].tag, EdgeTag::Seq);
    assert_eq!(back[0].text, "X = X + 1 ; T = T + 1");

    // Nested loops: the inner body loops back to 2, the outer body's last
    // compound (block 4) loops back to 1.
    let cfg = build("1: WHILE (X < 4) { 2: WHILE (Y < X) { 3: Y = Y + 1 } 4: X = X + 1 }");
    assert!(cfg.edges().any(|e| e.from == Label::new(3) && e.to == Label::new(2)));
    assert!(cfg.edges().any(|e| e.from == Label::new(4) && e.to == Label::new(1)));
    // The outer head is the entry, so its only incoming edge is the back
    // edge; the inner head has one entering edge plus the back edge.
    assert_eq!(cfg.edges().filter(|e| e.to == Label::new(1)).count(), 1);
    assert_eq!(cfg.edges().filter(|e| e.to == Label::new(2)).count(), 2);
}

#[test]
fn bounded_enumeration_terminates_within_budget() {
    let cfg = build(TRIANGLE);
    for k in [0, 1, 5, 9, 15] {
        for path in cfg.paths(k) {
            assert!(path.len() <= k);
            assert_eq!(path[0], cfg.source());
        }
    }
}

#[test]
fn triangle_program_criteria() {
    let cfg = build(TRIANGLE);

    // X = 1, Y = 3 skips the swap (block 3) and, ending with T = 2, the
    // T == 0 branch (block 7).
    let partial = DatatestSet::parse("{(X=1,Y=3)}").unwrap();
    let report = statement_coverage(&cfg, &partial);
    assert!(!report.satisfied);
    assert_eq!(report.missing, vec![Label::new(3), Label::new(7)]);

    let full = DatatestSet::parse("{(X=1,Y=3);(X=3,Y=1);(X=2,Y=2)}").unwrap();
    assert!(statement_coverage(&cfg, &full).satisfied);
    assert!(decision_coverage(&cfg, &full).satisfied);

    // The widest gap is |X - Y| = 2 iterations.
    let loops = loop_coverage(&cfg, &full, 2);
    assert!(loops.satisfied);
    assert_eq!(loops.maxima.get(&Label::new(4)), Some(&2));
    assert!(!loop_coverage(&cfg, &full, 1).satisfied);
}

#[test]
fn loop_walks_match_enumerated_paths() {
    let source = "1: WHILE (X < 2) { 2: X = X + 1 }";
    let cfg = build(source);

    // Executed traces for X = 2, 1, 0 are the 0-, 1- and 2-unrolling paths.
    let suite = DatatestSet::parse("{(X=2);(X=1);(X=0)}").unwrap();
    let report = path_coverage(&cfg, &suite, 5);
    assert!(report.satisfied, "missing paths: {:?}", report.missing);
    assert_eq!(report.total, 3);
    assert_eq!(report.rate, 100.0);
}

#[test]
fn failed_datatest_does_not_stop_the_suite() {
    let cfg = build("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }");
    let suite = DatatestSet::parse("{(X=oops=);(X=5);(X=-5)}").unwrap();
    let report = statement_coverage(&cfg, &suite);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 0);
    assert!(report.satisfied);
}
