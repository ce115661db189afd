//! Structural coverage criteria over a datatest suite.
//!
//! Each criterion runs every datatest of a suite against one shared
//! read-only [`Cfg`] (fresh store per run) and folds the traces into a
//! pass/fail report:
//!
//! - [`statement_coverage`] — every assignment label visited ("TA").
//! - [`decision_coverage`] — every decision label visited ("TD").
//! - [`loop_coverage`] — no `while` exceeds `i` consecutive iterations
//!   ("TB").
//! - [`path_coverage`] — every path of at most `k` edges executed ("TC").
//!
//! A failed walk (stuck decision, unparseable datatest) is reported against
//! its datatest and does not stop evaluation of the remaining datatests.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::ast::Label;
use crate::cfg::Cfg;
use crate::datatest::DatatestSet;
use crate::walk::CfgWalk;

/// A walk that could not complete, reported against its datatest.
#[derive(Debug, Clone)]
pub struct DatatestFailure {
    /// Index of the datatest within the suite.
    pub index: usize,
    pub message: String,
}

/// Outcome of a label-set criterion (statement or decision coverage).
#[derive(Debug, Clone)]
pub struct LabelCoverage {
    pub satisfied: bool,
    /// Labels of the universe never visited by any run, in ascending order.
    pub missing: Vec<Label>,
    /// Labels visited at least once, in ascending order.
    pub visited: Vec<Label>,
    pub failures: Vec<DatatestFailure>,
}

/// Outcome of bounded loop-iteration coverage.
#[derive(Debug, Clone)]
pub struct LoopCoverage {
    pub satisfied: bool,
    pub bound: u32,
    /// Per `while` label, the maximum consecutive iteration count over all
    /// datatests (0 for loops never entered).
    pub maxima: BTreeMap<Label, u32>,
    pub failures: Vec<DatatestFailure>,
}

/// Outcome of bounded-length path coverage.
#[derive(Debug, Clone)]
pub struct PathCoverage {
    pub satisfied: bool,
    /// k-paths never executed by any datatest.
    pub missing: Vec<Vec<Label>>,
    /// Total number of k-paths in the graph.
    pub total: usize,
    /// Covered fraction as a percentage (100 when no k-path exists).
    pub rate: f64,
    pub failures: Vec<DatatestFailure>,
}

/// Runs every datatest once; returns the completed traces and the failures.
fn run_suite(cfg: &Cfg, suite: &DatatestSet) -> (Vec<Vec<Label>>, Vec<DatatestFailure>) {
    let mut traces = Vec::new();
    let mut failures = Vec::new();
    for (index, datatest) in suite.iter().enumerate() {
        let outcome = CfgWalk::with_inputs(cfg, &datatest.init_stmts())
            .map_err(|e| e.to_string())
            .and_then(|mut walk| {
                walk.run().map_err(|e| e.to_string())?;
                Ok(walk.visited().to_vec())
            });
        match outcome {
            Ok(trace) => {
                debug!("datatest {}: visited {:?}", index, trace);
                traces.push(trace);
            }
            Err(message) => {
                debug!("datatest {}: failed: {}", index, message);
                failures.push(DatatestFailure { index, message });
            }
        }
    }
    (traces, failures)
}

fn label_coverage(cfg: &Cfg, suite: &DatatestSet, universe: &BTreeSet<Label>) -> LabelCoverage {
    let (traces, failures) = run_suite(cfg, suite);
    let seen: BTreeSet<Label> = traces.iter().flatten().copied().collect();
    let visited: Vec<Label> = universe.intersection(&seen).copied().collect();
    let missing: Vec<Label> = universe.difference(&seen).copied().collect();
    LabelCoverage {
        satisfied: missing.is_empty(),
        missing,
        visited,
        failures,
    }
}

/// Statement coverage: every assignment label visited by at least one run.
pub fn statement_coverage(cfg: &Cfg, suite: &DatatestSet) -> LabelCoverage {
    label_coverage(cfg, suite, &cfg.assign_labels)
}

/// Decision coverage: every `if`/`while` label visited by at least one run.
pub fn decision_coverage(cfg: &Cfg, suite: &DatatestSet) -> LabelCoverage {
    let universe: BTreeSet<Label> = cfg
        .if_labels
        .union(&cfg.while_labels)
        .copied()
        .collect();
    label_coverage(cfg, suite, &universe)
}

/// Bounded loop-iteration coverage: satisfied when no `while` runs more than
/// `bound` consecutive iterations in any datatest.
pub fn loop_coverage(cfg: &Cfg, suite: &DatatestSet, bound: u32) -> LoopCoverage {
    let mut maxima: BTreeMap<Label, u32> =
        cfg.while_labels.iter().map(|label| (*label, 0)).collect();
    let mut failures = Vec::new();
    for (index, datatest) in suite.iter().enumerate() {
        let outcome = CfgWalk::with_inputs(cfg, &datatest.init_stmts())
            .map_err(|e| e.to_string())
            .and_then(|mut walk| walk.run_while_bounds().map_err(|e| e.to_string()));
        match outcome {
            Ok(bounds) => {
                for (label, max) in bounds {
                    let entry = maxima.entry(label).or_insert(0);
                    *entry = (*entry).max(max);
                }
            }
            Err(message) => failures.push(DatatestFailure { index, message }),
        }
    }
    let satisfied = maxima.values().all(|max| *max <= bound);
    LoopCoverage {
        satisfied,
        bound,
        maxima,
        failures,
    }
}

/// Bounded-length path coverage: every k-path of the graph must match the
/// visited trace of at least one datatest.
pub fn path_coverage(cfg: &Cfg, suite: &DatatestSet, k: usize) -> PathCoverage {
    let (traces, failures) = run_suite(cfg, suite);
    let k_paths: Vec<Vec<Label>> = cfg.paths(k).collect();
    let total = k_paths.len();
    let missing: Vec<Vec<Label>> = k_paths
        .into_iter()
        .filter(|path| !traces.contains(path))
        .collect();
    let rate = if total == 0 {
        100.0
    } else {
        ((1.0 - missing.len() as f64 / total as f64) * 100.0).round()
    };
    PathCoverage {
        satisfied: missing.is_empty(),
        missing,
        total,
        rate,
        failures,
    }
}
