//! Control-flow graph construction.
//!
//! The builder compiles the nested AST into a flat directed graph whose nodes
//! are the source labels and whose edges carry the rendered text of the node
//! they leave. Nested `if`/`while` constructs do not have a single scalar
//! exit point: compiling a construct yields an *entry label* plus a
//! [`LabelTree`] describing every branch the construct can exit through.
//! Sequencing two constructs then wires an edge from every exit leaf of the
//! first to the entry of the second.
//!
//! ## Graph shape
//!
//! - **Decision** nodes (from `if`/`while` conditions) end up with exactly
//!   two outgoing edges: one tagged [`EdgeTag::True`] with the condition
//!   text, one tagged [`EdgeTag::False`] with the `!`-negated text.
//! - **Assignment** nodes end up with exactly one outgoing edge carrying
//!   their own statement text. A `while` body's last leaf loops back to the
//!   condition label with such an edge.
//! - One synthetic **Terminal** node (label = max source label + 1) collects
//!   every exit of the final compound, so the graph has exactly one node
//!   with zero out-degree (the target) whatever shape the program ends
//!   with. The terminal is found structurally by its out-degree, never by
//!   its label value. The entry is the first compound's label; it is the
//!   only node allowed to have zero in-degree.
//!
//! # Example
//!
//! ```
//! use covgraph_rs::cfg::Cfg;
//! use covgraph_rs::parser::parse_program;
//!
//! let (program, _) = parse_program("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }").unwrap();
//! let cfg = Cfg::build(&program);
//!
//! assert_eq!(cfg.source().value(), 1);
//! assert_eq!(cfg.successors(cfg.source()).count(), 2);
//! assert_eq!(cfg.successors(cfg.target()).count(), 0);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::ast::{Compound, Label, Program};
use crate::render::{render_cond, render_stmts};

/// CFG node classification.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum NodeKind {
    /// Two outgoing edges guarded by a condition and its negation.
    Decision,
    /// One outgoing edge carrying a statement sequence.
    Assignment,
    /// No outgoing edges; the unique end-of-program sentinel.
    Terminal,
}

/// Edge polarity.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EdgeTag {
    /// Decision edge taken when the condition holds.
    True,
    /// Decision edge taken when the condition fails (text is `!`-prefixed).
    False,
    /// Sequential edge out of an assignment node.
    Seq,
}

/// A directed edge. `text` is always derived from the *source* node's own
/// code, never the destination's.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: Label,
    pub to: Label,
    pub tag: EdgeTag,
    pub text: String,
}

/// The set of exit points of a compiled AST subtree.
///
/// Either a single label (a construct with one way out) or an ordered list of
/// alternative exit trees (the branches of an `if`). The first leaf is the
/// entry-adjacent label of the left-most control path; the last leaf is the
/// label whose outgoing edge connects the subtree to whatever follows it.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelTree {
    Leaf(Label),
    Branch(Vec<LabelTree>),
}

impl LabelTree {
    /// The left-most leaf, recursively.
    pub fn first_leaf(&self) -> Label {
        match self {
            LabelTree::Leaf(label) => *label,
            LabelTree::Branch(children) => {
                children.first().expect("empty label tree branch").first_leaf()
            }
        }
    }

    /// The right-most leaf, recursively.
    pub fn last_leaf(&self) -> Label {
        match self {
            LabelTree::Leaf(label) => *label,
            LabelTree::Branch(children) => {
                children.last().expect("empty label tree branch").last_leaf()
            }
        }
    }

    /// All leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<Label> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<Label>) {
        match self {
            LabelTree::Leaf(label) => out.push(*label),
            LabelTree::Branch(children) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// An immutable control-flow graph.
///
/// Built once per analysis run; all coverage walks share it read-only.
#[derive(Debug)]
pub struct Cfg {
    nodes: BTreeMap<Label, NodeKind>,
    /// Outgoing edges per node, in insertion (declaration) order.
    succ: BTreeMap<Label, Vec<Edge>>,
    /// Rendered own code per node (condition or statement-list text).
    code: BTreeMap<Label, String>,
    /// Decision labels originating from `if` constructs.
    pub if_labels: BTreeSet<Label>,
    /// Decision labels originating from `while` constructs.
    pub while_labels: BTreeSet<Label>,
    /// Assignment labels.
    pub assign_labels: BTreeSet<Label>,
    source: Label,
    target: Label,
}

impl Cfg {
    /// Compiles a program into its CFG.
    ///
    /// # Panics
    ///
    /// A partial CFG is never usable, so construction failures panic: an
    /// empty program, or a program shape that does not reduce to a
    /// single-entry/single-exit graph, such as a `while` body ending in an
    /// `if`/`else` (which would need two back-edges where the design allows
    /// one).
    pub fn build(program: &Program) -> Cfg {
        let mut builder = Builder::default();
        let (entry, exit) = builder.compile_program(program);
        debug!("compiled program: entry={}, exit={:?}", entry, exit);

        // The synthetic terminal collecting every exit of the final compound.
        let end = Label::new(builder.max_label + 1);
        builder.nodes.insert(end, NodeKind::Terminal);
        builder.succ.entry(end).or_default();
        builder.connect_sequence(&exit, end);

        builder.finish(entry)
    }

    /// The program entry node. It is the only node that may have zero
    /// in-degree; a program starting with a `while` gives it the loop-back
    /// edge as its sole incoming edge.
    pub fn source(&self) -> Label {
        self.source
    }

    /// The unique node with zero out-degree.
    pub fn target(&self) -> Label {
        self.target
    }

    pub fn node_kind(&self, label: Label) -> Option<NodeKind> {
        self.nodes.get(&label).copied()
    }

    /// All node labels in ascending order (the terminal included).
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.nodes.keys().copied()
    }

    /// Outgoing edges of `label` in declaration order.
    pub fn successors(&self, label: Label) -> impl Iterator<Item = &Edge> {
        self.succ.get(&label).into_iter().flatten()
    }

    /// Every edge of the graph.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.succ.values().flatten()
    }

    /// The rendered own code of a source node (condition or statement text).
    pub fn code(&self, label: Label) -> Option<&str> {
        self.code.get(&label).map(String::as_str)
    }
}

#[derive(Debug, Default)]
struct Builder {
    nodes: BTreeMap<Label, NodeKind>,
    succ: BTreeMap<Label, Vec<Edge>>,
    code: BTreeMap<Label, String>,
    if_labels: BTreeSet<Label>,
    while_labels: BTreeSet<Label>,
    assign_labels: BTreeSet<Label>,
    max_label: u32,
}

impl Builder {
    fn add_node(&mut self, label: Label, kind: NodeKind, code: String) {
        debug!("node {} ({:?}): `{}`", label, kind, code);
        self.nodes.insert(label, kind);
        self.succ.entry(label).or_default();
        self.code.insert(label, code);
        self.max_label = self.max_label.max(label.value());
    }

    fn add_edge(&mut self, from: Label, to: Label, tag: EdgeTag, text: String) {
        debug!("edge {} -> {} ({:?}): `{}`", from, to, tag, text);
        self.succ.entry(from).or_default().push(Edge { from, to, tag, text });
    }

    /// Wires the sequential edge out of an exit leaf: assignment leaves carry
    /// their own statement text; a decision leaf here has no explicit false
    /// branch yet, so its edge is the implicit `!`-negated false edge.
    fn add_flow_edge(&mut self, from: Label, to: Label) {
        let code = self.code[&from].clone();
        match self.nodes[&from] {
            NodeKind::Decision => self.add_edge(from, to, EdgeTag::False, format!("! {}", code)),
            NodeKind::Assignment => self.add_edge(from, to, EdgeTag::Seq, code),
            NodeKind::Terminal => unreachable!("terminal node cannot have outgoing edges"),
        }
    }

    /// Connects every exit leaf of `prev` to `next_entry`.
    fn connect_sequence(&mut self, prev: &LabelTree, next_entry: Label) {
        for leaf in prev.leaves() {
            self.add_flow_edge(leaf, next_entry);
        }
    }

    fn compile_program(&mut self, program: &Program) -> (Label, LabelTree) {
        assert!(!program.compounds.is_empty(), "cannot compile an empty program");
        let mut entry = None;
        let mut prev_exit: Option<LabelTree> = None;
        for compound in &program.compounds {
            let (c_entry, c_exit) = self.compile_compound(compound);
            if let Some(prev) = &prev_exit {
                self.connect_sequence(prev, c_entry);
            }
            entry.get_or_insert(c_entry);
            prev_exit = Some(c_exit);
        }
        (entry.unwrap(), prev_exit.unwrap())
    }

    fn compile_compound(&mut self, compound: &Compound) -> (Label, LabelTree) {
        match compound {
            Compound::Block(block) => {
                self.add_node(block.label, NodeKind::Assignment, render_stmts(&block.statements));
                self.assign_labels.insert(block.label);
                (block.label, LabelTree::Leaf(block.label))
            }
            Compound::If(if_block) => {
                let label = if_block.cond.label;
                let cond_text = render_cond(&if_block.cond.condition);
                self.add_node(label, NodeKind::Decision, cond_text.clone());
                self.if_labels.insert(label);

                let (then_entry, then_exit) = self.compile_program(&if_block.then_branch);
                self.add_edge(label, then_entry, EdgeTag::True, cond_text.clone());

                match &if_block.else_branch {
                    Some(branch) => {
                        let (else_entry, else_exit) = self.compile_program(branch);
                        self.add_edge(
                            label,
                            else_entry,
                            EdgeTag::False,
                            format!("! {}", cond_text),
                        );
                        (label, LabelTree::Branch(vec![then_exit, else_exit]))
                    }
                    None => {
                        // No false branch: the decision label itself is an
                        // exit; sequencing adds the implicit false edge.
                        (label, LabelTree::Branch(vec![then_exit, LabelTree::Leaf(label)]))
                    }
                }
            }
            Compound::While(while_block) => {
                let label = while_block.cond.label;
                let cond_text = render_cond(&while_block.cond.condition);
                self.add_node(label, NodeKind::Decision, cond_text.clone());
                self.while_labels.insert(label);

                let (body_entry, body_exit) = self.compile_program(&while_block.body);
                self.add_edge(label, body_entry, EdgeTag::True, cond_text);
                // Loop back from the body's last leaf to the condition.
                self.add_flow_edge(body_exit.last_leaf(), label);

                // A while only exits through its own (implicit) false edge.
                (label, LabelTree::Branch(vec![LabelTree::Leaf(label)]))
            }
        }
    }

    fn finish(self, entry: Label) -> Cfg {
        let mut in_degree: BTreeMap<Label, usize> = self.nodes.keys().map(|l| (*l, 0)).collect();
        for edge in self.succ.values().flatten() {
            *in_degree.get_mut(&edge.to).expect("edge to unknown node") += 1;
        }
        // Only the entry may lack incoming edges (it has one when the
        // program starts with a loop, namely the back edge).
        for (label, degree) in &in_degree {
            assert!(
                *degree > 0 || *label == entry,
                "node {} is unreachable from the entry",
                label
            );
        }
        let targets: Vec<Label> = self
            .succ
            .iter()
            .filter(|(_, edges)| edges.is_empty())
            .map(|(l, _)| *l)
            .collect();
        assert_eq!(
            targets.len(),
            1,
            "CFG must have exactly one exit node, found {:?}",
            targets
        );
        debug!("cfg: source={}, target={}", entry, targets[0]);

        Cfg {
            nodes: self.nodes,
            succ: self.succ,
            code: self.code,
            if_labels: self.if_labels,
            while_labels: self.while_labels,
            assign_labels: self.assign_labels,
            source: entry,
            target: targets[0],
        }
    }
}
