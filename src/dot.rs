//! CFG to DOT (Graphviz) conversion.
//!
//! Conventions:
//! - Decision nodes are diamonds, assignment nodes are boxes, and the
//!   terminal node is a double circle.
//! - Every edge is labeled with its rendered condition/assignment text;
//!   false edges are dashed.
//!
//! Render with e.g. `dot -Tpng cfg.dot -o cfg.png`.

use std::fmt::Write;

use crate::cfg::{Cfg, EdgeTag, NodeKind};

impl Cfg {
    /// Converts the graph to DOT format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out, "digraph CFG {{")?;
        writeln!(out, "  rankdir=TB;")?;
        for label in self.labels() {
            let shape = match self.node_kind(label) {
                Some(NodeKind::Decision) => "diamond",
                Some(NodeKind::Assignment) => "box",
                Some(NodeKind::Terminal) | None => "doublecircle",
            };
            writeln!(out, "  n{} [label=\"{}\", shape={}];", label, label, shape)?;
        }
        for edge in self.edges() {
            let style = match edge.tag {
                EdgeTag::False => ", style=dashed",
                EdgeTag::True | EdgeTag::Seq => "",
            };
            writeln!(
                out,
                "  n{} -> n{} [label=\"{}\"{}];",
                edge.from,
                edge.to,
                edge.text.replace('"', "\\\""),
                style
            )?;
        }
        writeln!(out, "}}")?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::parser::parse_program;

    #[test]
    fn test_to_dot() {
        let (program, _) = parse_program("1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }").unwrap();
        let cfg = Cfg::build(&program);
        let dot = cfg.to_dot().unwrap();
        assert!(dot.starts_with("digraph CFG {"));
        assert!(dot.contains("n1 [label=\"1\", shape=diamond];"));
        assert!(dot.contains("n2 [label=\"2\", shape=box];"));
        assert!(dot.contains("n4 [label=\"4\", shape=doublecircle];"));
        assert!(dot.contains("n1 -> n2 [label=\"X > 0\"];"));
        assert!(dot.contains("n1 -> n3 [label=\"! X > 0\", style=dashed];"));
        assert!(dot.ends_with("}\n"));
    }
}
