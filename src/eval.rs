//! Evaluation of rendered edge text against a variable store.
//!
//! The coverage engine never evaluates AST subtrees directly: every decision
//! and assignment is carried as rendered text on a CFG edge, re-tokenized and
//! re-parsed here on each evaluation. A leading `!` on condition text means
//! logical negation of the comparison.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ast::{ArithOp, Assign, CmpOp, Cond, Expr, UnaryOp};
use crate::parser::{parse_condition, parse_statements, ParseError};

/// A variable environment: name to integer, unbound reads default to 0.
///
/// Created fresh per coverage run and mutated only by executing assignment
/// edge text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    vars: BTreeMap<String, i64>,
}

impl Store {
    pub fn new() -> Self {
        Store::default()
    }

    /// Reads a variable; unbound variables read as 0.
    pub fn get(&self, name: &str) -> i64 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    pub fn set(&mut self, name: impl Into<String>, value: i64) {
        self.vars.insert(name.into(), value);
    }

    /// Bound variables in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("division by zero")]
    DivisionByZero,
}

// Matches the source semantics: `/` is floor division.
fn floor_div(lhs: i64, rhs: i64) -> Result<i64, EvalError> {
    if rhs == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let quotient = lhs / rhs;
    if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Evaluates an arithmetic expression against `store`.
pub fn eval_expr(expr: &Expr, store: &Store) -> Result<i64, EvalError> {
    match expr {
        Expr::Num(n) => Ok(*n),
        Expr::Var(name) => Ok(store.get(name)),
        Expr::Unary { op, expr } => {
            let value = eval_expr(expr, store)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Minus => -value,
            })
        }
        Expr::Bin { lhs, op, rhs } => {
            let lhs = eval_expr(lhs, store)?;
            let rhs = eval_expr(rhs, store)?;
            match op {
                ArithOp::Add => Ok(lhs + rhs),
                ArithOp::Sub => Ok(lhs - rhs),
                ArithOp::Mul => Ok(lhs * rhs),
                ArithOp::Div => floor_div(lhs, rhs),
            }
        }
    }
}

/// Evaluates a parsed condition against `store`.
pub fn eval_cond_ast(cond: &Cond, store: &Store) -> Result<bool, EvalError> {
    let lhs = eval_expr(&cond.lhs, store)?;
    let rhs = eval_expr(&cond.rhs, store)?;
    Ok(match cond.op {
        CmpOp::Lt => lhs < rhs,
        CmpOp::Gt => lhs > rhs,
        CmpOp::Eq => lhs == rhs,
    })
}

/// Evaluates rendered condition text, honoring a leading `!` negation.
pub fn eval_cond(text: &str, store: &Store) -> Result<bool, EvalError> {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix('!') {
        let cond = parse_condition(rest)?;
        Ok(!eval_cond_ast(&cond, store)?)
    } else {
        let cond = parse_condition(trimmed)?;
        eval_cond_ast(&cond, store)
    }
}

fn exec_parsed(statements: &[Assign], store: &mut Store) -> Result<(), EvalError> {
    for statement in statements {
        let value = eval_expr(&statement.expr, store)?;
        store.set(statement.var.clone(), value);
    }
    Ok(())
}

/// Executes rendered assignment-list text left to right, mutating `store`.
pub fn exec_stmts(text: &str, store: &mut Store) -> Result<(), EvalError> {
    let statements = parse_statements(text)?;
    exec_parsed(&statements, store)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_unbound_reads_as_zero() {
        let store = Store::new();
        assert_eq!(store.get("X"), 0);
        assert!(eval_cond("X == 0", &store).unwrap());
    }

    #[test]
    fn test_exec_statements_left_to_right() {
        let mut store = Store::new();
        exec_stmts("X = 42 ; Y = X + 3", &mut store).unwrap();
        assert_eq!(store.get("X"), 42);
        assert_eq!(store.get("Y"), 45);
    }

    #[test]
    fn test_negated_condition() {
        let mut store = Store::new();
        store.set("X", 5);
        assert!(eval_cond("X > 0", &store).unwrap());
        assert!(!eval_cond("! X > 0", &store).unwrap());
    }

    #[test]
    fn test_floor_division() {
        let mut store = Store::new();
        exec_stmts("A = 7 / 2 ; B = -7 / 2 ; C = -8 / 2", &mut store).unwrap();
        assert_eq!(store.get("A"), 3);
        assert_eq!(store.get("B"), -4);
        assert_eq!(store.get("C"), -4);
    }

    #[test]
    fn test_division_by_zero() {
        let mut store = Store::new();
        let err = exec_stmts("X = 1 / Y", &mut store).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn test_unparseable_text_is_an_error() {
        let store = Store::new();
        assert!(eval_cond("X <", &store).is_err());
    }
}
