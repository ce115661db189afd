//! Interpreting a CFG against a concrete variable store.
//!
//! A [`CfgWalk`] owns one run's mutable state (a fresh [`Store`] and the
//! visited-label trace) over a shared read-only [`Cfg`]. Dispatch per node:
//!
//! - **Decision**: evaluate each outgoing edge's condition text and move
//!   along the edge that holds (exactly one does for a well-formed program).
//! - **Assignment**: execute the single outgoing edge's statement text, then
//!   move to its target.
//! - **Terminal**: the walk ends.
//!
//! Two walk modes share this dispatch: [`CfgWalk::run`] records the plain
//! visited trace, and [`CfgWalk::run_while_bounds`] additionally tracks, per
//! `while` node, the maximum number of consecutive iterations observed.

use std::collections::BTreeMap;

use log::debug;
use thiserror::Error;

use crate::ast::Label;
use crate::cfg::{Cfg, EdgeTag, NodeKind};
use crate::eval::{eval_cond, exec_stmts, EvalError, Store};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum WalkError {
    /// A node shape outside the designed Decision/Assignment/Terminal forms:
    /// the target can never be reached from here.
    #[error("target node could not be reached from label {0}")]
    UnreachableTarget(Label),
    /// Neither outgoing condition of a decision node evaluated true.
    #[error("no branch of decision {0} is enabled")]
    StuckDecision(Label),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// One coverage run over a shared CFG.
pub struct CfgWalk<'a> {
    cfg: &'a Cfg,
    store: Store,
    visited: Vec<Label>,
}

impl<'a> CfgWalk<'a> {
    /// Starts a run with an empty store (every variable reads as 0).
    pub fn new(cfg: &'a Cfg) -> Self {
        CfgWalk {
            cfg,
            store: Store::new(),
            visited: Vec::new(),
        }
    }

    /// Starts a run with the store seeded by executing `init` (rendered
    /// assignment text, typically a datatest's initial assignments).
    pub fn with_inputs(cfg: &'a Cfg, init: &str) -> Result<Self, EvalError> {
        let mut walk = CfgWalk::new(cfg);
        exec_stmts(init, &mut walk.store)?;
        Ok(walk)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// The ordered visited-label trace of the run (duplicates allowed, the
    /// terminal node excluded).
    pub fn visited(&self) -> &[Label] {
        &self.visited
    }

    /// Takes one dispatch step from `current`; returns the taken edge's
    /// target and tag, or `None` when `current` is the terminal.
    fn step(&mut self, current: Label) -> Result<Option<(Label, EdgeTag)>, WalkError> {
        let cfg = self.cfg;
        match cfg.node_kind(current) {
            Some(NodeKind::Decision) => {
                for edge in cfg.successors(current) {
                    if eval_cond(&edge.text, &self.store)? {
                        debug!("decision {}: `{}` holds -> {}", current, edge.text, edge.to);
                        return Ok(Some((edge.to, edge.tag)));
                    }
                }
                Err(WalkError::StuckDecision(current))
            }
            Some(NodeKind::Assignment) => {
                let mut edges = cfg.successors(current);
                let edge = match (edges.next(), edges.next()) {
                    (Some(edge), None) => edge,
                    _ => return Err(WalkError::UnreachableTarget(current)),
                };
                debug!("assignment {}: execute `{}` -> {}", current, edge.text, edge.to);
                exec_stmts(&edge.text, &mut self.store)?;
                Ok(Some((edge.to, edge.tag)))
            }
            Some(NodeKind::Terminal) => Ok(None),
            None => Err(WalkError::UnreachableTarget(current)),
        }
    }

    /// Performs one deterministic execution from source to target.
    ///
    /// The visited trace is available from [`CfgWalk::visited`] afterwards;
    /// the final variable bindings from [`CfgWalk::store`].
    pub fn run(&mut self) -> Result<(), WalkError> {
        let target = self.cfg.target();
        let mut current = self.cfg.source();
        self.visited.push(current);
        while current != target {
            match self.step(current)? {
                Some((next, _)) => current = next,
                None => break,
            }
            if current != target {
                self.visited.push(current);
            }
        }
        Ok(())
    }

    /// Performs one execution while counting, for every `while` node, the
    /// maximum number of consecutive iterations taken before the exit edge.
    ///
    /// Returns `{while label -> max consecutive iteration count}` covering
    /// every `while` label of the graph (0 for loops never entered).
    pub fn run_while_bounds(&mut self) -> Result<BTreeMap<Label, u32>, WalkError> {
        // (current consecutive count, running maximum) per while label,
        // inserted lazily on first entry.
        let mut counters: BTreeMap<Label, (u32, u32)> = BTreeMap::new();
        let target = self.cfg.target();
        let mut current = self.cfg.source();
        self.visited.push(current);
        while current != target {
            let is_while = self.cfg.while_labels.contains(&current);
            if is_while {
                counters
                    .entry(current)
                    .and_modify(|(count, max)| {
                        *count += 1;
                        *max = (*max).max(*count);
                    })
                    .or_insert((0, 0));
            }
            match self.step(current)? {
                Some((next, tag)) => {
                    if is_while && tag == EdgeTag::False {
                        // The exit edge resets the consecutive counter.
                        counters.get_mut(&current).expect("counter for visited while").0 = 0;
                    }
                    current = next;
                }
                None => break,
            }
            if current != target {
                self.visited.push(current);
            }
        }
        Ok(self
            .cfg
            .while_labels
            .iter()
            .map(|label| (*label, counters.get(label).map_or(0, |(_, max)| *max)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::parser::parse_program;

    fn build(source: &str) -> Cfg {
        let (program, _) = parse_program(source).unwrap();
        Cfg::build(&program)
    }

    fn labels(trace: &[Label]) -> Vec<u32> {
        trace.iter().map(|l| l.value()).collect()
    }

    #[test]
    fn test_single_run_if_else() {
        // Scenario A.
        let cfg = build("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }");
        let mut walk = CfgWalk::with_inputs(&cfg, "X = 5").unwrap();
        walk.run().unwrap();
        assert_eq!(labels(walk.visited()), vec![1, 2]);
        assert_eq!(walk.store().get("X"), 5);
        assert_eq!(walk.store().get("Y"), 1);
    }

    #[test]
    fn test_single_run_takes_false_branch() {
        let cfg = build("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }");
        let mut walk = CfgWalk::new(&cfg);
        walk.run().unwrap();
        assert_eq!(labels(walk.visited()), vec![1, 3]);
        assert_eq!(walk.store().get("Y"), -1);
    }

    #[test]
    fn test_while_bounds() {
        // Scenario B.
        let cfg = build("1: WHILE (X < 3) { 2: X = X + 1 }");
        let mut walk = CfgWalk::with_inputs(&cfg, "X = 0").unwrap();
        let bounds = walk.run_while_bounds().unwrap();
        assert_eq!(bounds.get(&Label::new(1)), Some(&3));
        assert_eq!(walk.store().get("X"), 3);
        assert_eq!(labels(walk.visited()), vec![1, 2, 1, 2, 1, 2, 1]);
    }

    #[test]
    fn test_while_never_entered_reports_zero() {
        let cfg = build("1: WHILE (X < 3) { 2: X = X + 1 }");
        let mut walk = CfgWalk::with_inputs(&cfg, "X = 7").unwrap();
        let bounds = walk.run_while_bounds().unwrap();
        assert_eq!(bounds.get(&Label::new(1)), Some(&0));
        assert_eq!(walk.store().get("X"), 7);
    }

    #[test]
    fn test_sequenced_loops_count_independently() {
        let source = "1: WHILE (X < 2) { 2: X = X + 1 } 3: WHILE (Y < 4) { 4: Y = Y + 1 }";
        let cfg = build(source);
        let mut walk = CfgWalk::new(&cfg);
        let bounds = walk.run_while_bounds().unwrap();
        assert_eq!(bounds.get(&Label::new(1)), Some(&2));
        assert_eq!(bounds.get(&Label::new(3)), Some(&4));
    }

    #[test]
    fn test_if_without_else_sequencing() {
        // Scenario D shape, executed both ways.
        let source = "1: IF (X == 0) { 2: Y = 1 } 3: Z = Y + 1";
        let cfg = build(source);

        let mut taken = CfgWalk::new(&cfg);
        taken.run().unwrap();
        assert_eq!(labels(taken.visited()), vec![1, 2, 3]);
        assert_eq!(taken.store().get("Z"), 2);

        let mut skipped = CfgWalk::with_inputs(&cfg, "X = 9").unwrap();
        skipped.run().unwrap();
        assert_eq!(labels(skipped.visited()), vec![1, 3]);
        assert_eq!(skipped.store().get("Z"), 1);
    }

    #[test]
    fn test_fresh_walks_share_one_cfg() {
        let cfg = build("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }");
        for (x, expected) in [(1, 1), (-1, -1), (5, 1)] {
            let mut walk = CfgWalk::new(&cfg);
            walk.store_mut().set("X", x);
            walk.run().unwrap();
            assert_eq!(walk.store().get("Y"), expected);
        }
    }
}
