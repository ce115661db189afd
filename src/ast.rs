//! Abstract syntax tree for the analyzed language.
//!
//! Every construct is a closed sum type, so the compiler checks exhaustively
//! that each consumer (renderer, evaluator, CFG builder) handles every node
//! kind. Labels are carried verbatim from the source text and are globally
//! unique within one program (enforced by the parser).

use std::fmt;

/// A statement/condition block label.
///
/// Labels name one statement block or one condition block in the source and
/// are unique per program. They double as CFG node identifiers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label(u32);

impl Label {
    pub fn new(value: u32) -> Self {
        Label(value)
    }

    /// Returns the raw label value as a `u32`.
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Label {
    fn from(value: u32) -> Self {
        Label(value)
    }
}

/// Arithmetic operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
        }
    }
}

/// Comparison operators usable in conditions.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmpOp::Lt => write!(f, "<"),
            CmpOp::Gt => write!(f, ">"),
            CmpOp::Eq => write!(f, "=="),
        }
    }
}

/// Unary sign operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Minus => write!(f, "-"),
        }
    }
}

/// An integer arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(i64),
    Var(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Bin {
        lhs: Box<Expr>,
        op: ArithOp,
        rhs: Box<Expr>,
    },
}

/// A boolean condition: a comparison between two arithmetic expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub lhs: Expr,
    pub op: CmpOp,
    pub rhs: Expr,
}

/// A single assignment statement: `var = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub var: String,
    pub expr: Expr,
}

/// A labeled statement block: `L: var = expr ; ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: Label,
    pub statements: Vec<Assign>,
}

/// A labeled condition block: the `L: (cond)` head of an `if` or `while`.
#[derive(Debug, Clone, PartialEq)]
pub struct CondBlock {
    pub label: Label,
    pub condition: Cond,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBlock {
    pub cond: CondBlock,
    pub then_branch: Program,
    pub else_branch: Option<Program>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileBlock {
    pub cond: CondBlock,
    pub body: Program,
}

/// One top-level construct of a (sub-)program.
#[derive(Debug, Clone, PartialEq)]
pub enum Compound {
    Block(Block),
    If(IfBlock),
    While(WhileBlock),
}

/// An ordered sequence of compounds. Branch and loop bodies are programs too.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub compounds: Vec<Compound>,
}

/// Source classification of a label.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LabelClass {
    /// A plain statement block.
    Assign,
    /// An `if` condition block.
    If,
    /// A `while` condition block.
    While,
}

/// All labels of a program with their source classification, in source order.
///
/// Returned by the parser alongside the AST, replacing the ambient label
/// registry the parsing stage would otherwise need.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    entries: Vec<(Label, LabelClass)>,
}

impl LabelTable {
    /// Records a label. Returns `false` if the label was already present.
    pub(crate) fn insert(&mut self, label: Label, class: LabelClass) -> bool {
        if self.entries.iter().any(|(l, _)| *l == label) {
            return false;
        }
        self.entries.push((label, class));
        true
    }

    pub fn class(&self, label: Label) -> Option<LabelClass> {
        self.entries.iter().find(|(l, _)| *l == label).map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All labels in source order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.entries.iter().map(|(l, _)| *l)
    }

    /// Labels of plain statement blocks, in source order.
    pub fn assign_labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.by_class(LabelClass::Assign)
    }

    /// Labels of `if` and `while` condition blocks, in source order.
    pub fn decision_labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.entries
            .iter()
            .filter(|(_, c)| matches!(c, LabelClass::If | LabelClass::While))
            .map(|(l, _)| *l)
    }

    fn by_class(&self, class: LabelClass) -> impl Iterator<Item = Label> + '_ {
        self.entries
            .iter()
            .filter(move |(_, c)| *c == class)
            .map(|(l, _)| *l)
    }
}
