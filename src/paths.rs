//! Bounded enumeration of execution paths.
//!
//! [`Cfg::paths`] yields every source-to-target walk using at most `k`
//! edges, ignoring condition truth: both successors of every decision node
//! are explored. The iterator is lazy (paths are produced on demand), finite
//! (the depth bound is the sole termination guarantee) and restartable (each
//! call re-walks from the source).
//!
//! The number of explored paths can grow exponentially with graph branching,
//! so callers should choose `k` conservatively.
//!
//! # Example
//!
//! ```
//! use covgraph_rs::cfg::Cfg;
//! use covgraph_rs::parser::parse_program;
//!
//! let (program, _) = parse_program("1: WHILE (X < 3) { 2: X = X + 1 }").unwrap();
//! let cfg = Cfg::build(&program);
//!
//! // Within 2 edges only the zero-iteration path reaches the target.
//! let paths: Vec<_> = cfg.paths(2).collect();
//! assert_eq!(paths.len(), 1);
//! assert_eq!(paths[0].iter().map(|l| l.value()).collect::<Vec<_>>(), vec![1]);
//! ```

use crate::ast::Label;
use crate::cfg::Cfg;

impl Cfg {
    /// Returns an iterator over all paths from source to target using at
    /// most `k` edges. Each path is the ordered sequence of visited source
    /// labels (the terminal node is not included).
    pub fn paths(&self, k: usize) -> KPaths<'_> {
        KPaths::new(self, k)
    }
}

/// An iterator over bounded-length source-to-target paths.
///
/// Created by [`Cfg::paths`]. Uses a depth-first stack of `(label, depth)`
/// pairs; the current path prefix is kept in one vector truncated to the
/// popped depth, so backtracking needs no per-branch clones.
pub struct KPaths<'a> {
    cfg: &'a Cfg,
    max_edges: usize,
    stack: Vec<(Label, usize)>,
    current: Vec<Label>,
}

impl<'a> KPaths<'a> {
    fn new(cfg: &'a Cfg, max_edges: usize) -> Self {
        KPaths {
            cfg,
            max_edges,
            stack: vec![(cfg.source(), 0)],
            current: Vec::new(),
        }
    }
}

impl Iterator for KPaths<'_> {
    type Item = Vec<Label>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, depth)) = self.stack.pop() {
            self.current.truncate(depth);
            self.current.push(node);
            if node == self.cfg.target() {
                let mut path = self.current.clone();
                path.pop(); // drop the terminal
                return Some(path);
            }
            if depth + 1 <= self.max_edges {
                let mut successors: Vec<Label> =
                    self.cfg.successors(node).map(|e| e.to).collect();
                // `if` decisions are expanded in reverse declaration order so
                // the stack pops the declared-first branch first; `while`
                // decisions keep declaration order.
                if self.cfg.if_labels.contains(&node) {
                    successors.reverse();
                }
                for successor in successors {
                    self.stack.push((successor, depth + 1));
                }
            }
        }
        None
    }
}
