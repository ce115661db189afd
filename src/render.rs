//! Rendering AST subtrees back into canonical source text.
//!
//! CFG edges are labeled with the source text of the node they leave, so the
//! coverage engine can re-evaluate an edge independently of where in the tree
//! it originated. The renderer and [`crate::eval`] form a two-way contract:
//! rendering a subtree and evaluating the text must agree with evaluating the
//! subtree directly. Parentheses are re-inserted where precedence requires
//! them, so the round trip is lossless.

use crate::ast::{ArithOp, Assign, Cond, Expr};

fn precedence(op: ArithOp) -> u8 {
    match op {
        ArithOp::Add | ArithOp::Sub => 1,
        ArithOp::Mul | ArithOp::Div => 2,
    }
}

fn render_operand(expr: &Expr, parent: u8, is_rhs: bool) -> String {
    let needs_parens = match expr {
        Expr::Bin { op, .. } => {
            let child = precedence(*op);
            // `-` and `/` are left-associative, so an equal-precedence
            // right operand must keep its parentheses.
            child < parent || (child == parent && is_rhs)
        }
        _ => false,
    };
    let text = render_expr(expr);
    if needs_parens {
        format!("( {} )", text)
    } else {
        text
    }
}

/// Renders an arithmetic expression, e.g. `X + 1`.
pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Num(n) => n.to_string(),
        Expr::Var(name) => name.clone(),
        Expr::Unary { op, expr } => format!("{}{}", op, render_operand(expr, 3, false)),
        Expr::Bin { lhs, op, rhs } => {
            let p = precedence(*op);
            format!(
                "{} {} {}",
                render_operand(lhs, p, false),
                op,
                render_operand(rhs, p, true)
            )
        }
    }
}

/// Renders a condition, e.g. `X < 48`.
pub fn render_cond(cond: &Cond) -> String {
    format!(
        "{} {} {}",
        render_expr(&cond.lhs),
        cond.op,
        render_expr(&cond.rhs)
    )
}

/// Renders a statement list, semicolon-joined, e.g. `X = 42 ; Y = X + 3`.
pub fn render_stmts(statements: &[Assign]) -> String {
    statements
        .iter()
        .map(|a| format!("{} = {}", a.var, render_expr(&a.expr)))
        .collect::<Vec<_>>()
        .join(" ; ")
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::parser::{parse_condition, parse_statements};

    fn roundtrip_stmt(text: &str) -> String {
        let statements = parse_statements(text).unwrap();
        render_stmts(&statements)
    }

    #[test]
    fn test_render_statements() {
        assert_eq!(roundtrip_stmt("X=42;Y=X+3"), "X = 42 ; Y = X + 3");
    }

    #[test]
    fn test_render_condition() {
        let cond = parse_condition("X<Y*2").unwrap();
        assert_eq!(render_cond(&cond), "X < Y * 2");
    }

    #[test]
    fn test_parentheses_preserved_when_needed() {
        assert_eq!(roundtrip_stmt("X = (Y + 1) * 2"), "X = ( Y + 1 ) * 2");
        assert_eq!(roundtrip_stmt("X = Y - (1 - Z)"), "X = Y - ( 1 - Z )");
        // Redundant parentheses are dropped.
        assert_eq!(roundtrip_stmt("X = (Y * 2) + 1"), "X = Y * 2 + 1");
    }

    #[test]
    fn test_rendered_text_reparses_identically() {
        for text in ["X = 1 - 2 - 3", "X = -Y + 2", "X = 2 * ( 1 + Y ) / 4"] {
            let first = parse_statements(text).unwrap();
            let rendered = render_stmts(&first);
            let second = parse_statements(&rendered).unwrap();
            assert_eq!(first, second, "round trip changed `{}`", text);
        }
    }
}
