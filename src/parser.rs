//! Recursive-descent parser for the analyzed language.
//!
//! Grammar:
//!
//! ```text
//! program    : compound+
//! compound   : INT ':' (ifblock | whileblock | statements)
//! ifblock    : IF '(' condition ')' '{' program '}' [ ELSE '{' program '}' ]
//! whileblock : WHILE '(' condition ')' '{' program '}'
//! statements : ID '=' expr ( ';' ID '=' expr )* [';']
//! condition  : expr ('<' | '>' | '==') expr
//! expr       : term (('+' | '-') term)*
//! term       : factor (('*' | '/') factor)*
//! factor     : ('+' | '-') factor | INT | '(' expr ')' | ID
//! ```
//!
//! [`parse_program`] returns the AST together with a [`LabelTable`] recording
//! every label and its source classification; there is no ambient parser
//! state. The condition and statement-list entry points are also exposed
//! standalone ([`parse_condition`], [`parse_statements`]) because rendered
//! CFG edge text is re-parsed through them during graph walks.

use thiserror::Error;

use crate::ast::{
    ArithOp, Assign, Block, CmpOp, CondBlock, Compound, Cond, Expr, IfBlock, Label, LabelClass,
    LabelTable, Program, UnaryOp, WhileBlock,
};
use crate::lexer::{tokenize, LexError, Token};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("unexpected token `{found}`, expected {expected}")]
    Unexpected { found: String, expected: String },
    #[error("duplicate label {0}")]
    DuplicateLabel(Label),
    #[error("label {0} does not fit in a 32-bit label")]
    LabelOutOfRange(i64),
    #[error("empty program")]
    EmptyProgram,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Result<Self, ParseError> {
        Ok(Parser {
            tokens: tokenize(text)?,
            pos: 0,
        })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::Unexpected {
            found: self.current().to_string(),
            expected: expected.to_string(),
        }
    }

    fn program(&mut self, table: &mut LabelTable) -> Result<Program, ParseError> {
        let mut compounds = Vec::new();
        while matches!(self.current(), Token::Int(_)) {
            compounds.push(self.compound(table)?);
        }
        if compounds.is_empty() {
            return Err(ParseError::EmptyProgram);
        }
        Ok(Program { compounds })
    }

    fn compound(&mut self, table: &mut LabelTable) -> Result<Compound, ParseError> {
        let label = self.label()?;
        match self.current() {
            Token::If => {
                self.record(table, label, LabelClass::If)?;
                Ok(Compound::If(self.if_block(label, table)?))
            }
            Token::While => {
                self.record(table, label, LabelClass::While)?;
                Ok(Compound::While(self.while_block(label, table)?))
            }
            _ => {
                self.record(table, label, LabelClass::Assign)?;
                let statements = self.statements()?;
                Ok(Compound::Block(Block { label, statements }))
            }
        }
    }

    fn record(
        &self,
        table: &mut LabelTable,
        label: Label,
        class: LabelClass,
    ) -> Result<(), ParseError> {
        if !table.insert(label, class) {
            return Err(ParseError::DuplicateLabel(label));
        }
        Ok(())
    }

    fn label(&mut self) -> Result<Label, ParseError> {
        let value = match self.current() {
            Token::Int(n) => *n,
            _ => return Err(self.unexpected("a block label")),
        };
        self.advance();
        self.eat(&Token::Colon)?;
        let value = u32::try_from(value).map_err(|_| ParseError::LabelOutOfRange(value))?;
        Ok(Label::new(value))
    }

    fn if_block(&mut self, label: Label, table: &mut LabelTable) -> Result<IfBlock, ParseError> {
        self.eat(&Token::If)?;
        self.eat(&Token::LParen)?;
        let condition = self.condition()?;
        self.eat(&Token::RParen)?;
        self.eat(&Token::LBrace)?;
        let then_branch = self.program(table)?;
        self.eat(&Token::RBrace)?;
        let else_branch = if self.current() == &Token::Else {
            self.advance();
            self.eat(&Token::LBrace)?;
            let branch = self.program(table)?;
            self.eat(&Token::RBrace)?;
            Some(branch)
        } else {
            None
        };
        Ok(IfBlock {
            cond: CondBlock { label, condition },
            then_branch,
            else_branch,
        })
    }

    fn while_block(
        &mut self,
        label: Label,
        table: &mut LabelTable,
    ) -> Result<WhileBlock, ParseError> {
        self.eat(&Token::While)?;
        self.eat(&Token::LParen)?;
        let condition = self.condition()?;
        self.eat(&Token::RParen)?;
        self.eat(&Token::LBrace)?;
        let body = self.program(table)?;
        self.eat(&Token::RBrace)?;
        Ok(WhileBlock {
            cond: CondBlock { label, condition },
            body,
        })
    }

    fn statements(&mut self) -> Result<Vec<Assign>, ParseError> {
        let mut statements = vec![self.assignment()?];
        while self.current() == &Token::Semi {
            while self.current() == &Token::Semi {
                self.advance();
            }
            if matches!(self.current(), Token::Ident(_)) {
                statements.push(self.assignment()?);
            } else {
                break;
            }
        }
        Ok(statements)
    }

    fn assignment(&mut self) -> Result<Assign, ParseError> {
        let var = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => return Err(self.unexpected("a variable name")),
        };
        self.advance();
        self.eat(&Token::Assign)?;
        let expr = self.expr()?;
        Ok(Assign { var, expr })
    }

    fn condition(&mut self) -> Result<Cond, ParseError> {
        let lhs = self.expr()?;
        let op = match self.current() {
            Token::Less => CmpOp::Lt,
            Token::Greater => CmpOp::Gt,
            Token::EqEq => CmpOp::Eq,
            _ => return Err(self.unexpected("a comparison operator (`<`, `>`, `==`)")),
        };
        self.advance();
        let rhs = self.expr()?;
        Ok(Cond { lhs, op, rhs })
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.term()?;
        loop {
            let op = match self.current() {
                Token::Plus => ArithOp::Add,
                Token::Minus => ArithOp::Sub,
                _ => return Ok(node),
            };
            self.advance();
            node = Expr::Bin {
                lhs: Box::new(node),
                op,
                rhs: Box::new(self.term()?),
            };
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut node = self.factor()?;
        loop {
            let op = match self.current() {
                Token::Star => ArithOp::Mul,
                Token::Slash => ArithOp::Div,
                _ => return Ok(node),
            };
            self.advance();
            node = Expr::Bin {
                lhs: Box::new(node),
                op,
                rhs: Box::new(self.factor()?),
            };
        }
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        match self.current().clone() {
            Token::Plus => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Plus,
                    expr: Box::new(self.factor()?),
                })
            }
            Token::Minus => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Minus,
                    expr: Box::new(self.factor()?),
                })
            }
            Token::Int(n) => {
                self.advance();
                Ok(Expr::Num(n))
            }
            Token::LParen => {
                self.advance();
                let node = self.expr()?;
                self.eat(&Token::RParen)?;
                Ok(node)
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr::Var(name))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.current() == &Token::Eof {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }
}

/// Parses a whole source program.
///
/// Returns the AST and the table of all labels with their classification.
pub fn parse_program(text: &str) -> Result<(Program, LabelTable), ParseError> {
    let mut parser = Parser::new(text)?;
    let mut table = LabelTable::default();
    let program = parser.program(&mut table)?;
    parser.expect_eof()?;
    Ok((program, table))
}

/// Parses rendered condition text, e.g. `X < 48`.
pub fn parse_condition(text: &str) -> Result<Cond, ParseError> {
    let mut parser = Parser::new(text)?;
    let cond = parser.condition()?;
    parser.expect_eof()?;
    Ok(cond)
}

/// Parses rendered assignment-list text, e.g. `X = 42 ; Y = X + 3`.
pub fn parse_statements(text: &str) -> Result<Vec<Assign>, ParseError> {
    let mut parser = Parser::new(text)?;
    let statements = parser.statements()?;
    parser.expect_eof()?;
    Ok(statements)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_parse_block() {
        let (program, table) = parse_program("1: X = 1 ; Y = X + 2").unwrap();
        assert_eq!(program.compounds.len(), 1);
        match &program.compounds[0] {
            Compound::Block(block) => {
                assert_eq!(block.label, Label::new(1));
                assert_eq!(block.statements.len(), 2);
                assert_eq!(block.statements[1].var, "Y");
            }
            other => panic!("expected a block, got {:?}", other),
        }
        assert_eq!(table.class(Label::new(1)), Some(LabelClass::Assign));
    }

    #[test]
    fn test_parse_if_else() {
        let source = "1: IF (X > 0) { 2: Y = 1 } ELSE { 3: Y = -1 }";
        let (program, table) = parse_program(source).unwrap();
        match &program.compounds[0] {
            Compound::If(if_block) => {
                assert_eq!(if_block.cond.label, Label::new(1));
                assert_eq!(if_block.cond.condition.op, CmpOp::Gt);
                assert!(if_block.else_branch.is_some());
            }
            other => panic!("expected an if, got {:?}", other),
        }
        assert_eq!(table.class(Label::new(1)), Some(LabelClass::If));
        assert_eq!(table.class(Label::new(2)), Some(LabelClass::Assign));
        assert_eq!(table.class(Label::new(3)), Some(LabelClass::Assign));
    }

    #[test]
    fn test_parse_while() {
        let source = "1: WHILE (X < 3) { 2: X = X + 1 }";
        let (program, table) = parse_program(source).unwrap();
        match &program.compounds[0] {
            Compound::While(while_block) => {
                assert_eq!(while_block.cond.label, Label::new(1));
                assert_eq!(while_block.body.compounds.len(), 1);
            }
            other => panic!("expected a while, got {:?}", other),
        }
        assert_eq!(table.class(Label::new(1)), Some(LabelClass::While));
        assert_eq!(table.decision_labels().count(), 1);
        assert_eq!(table.assign_labels().count(), 1);
    }

    #[test]
    fn test_if_without_else_followed_by_block() {
        let source = "1: IF (X == 0) { 2: Y = 1 } 3: Z = 2";
        let (program, _) = parse_program(source).unwrap();
        assert_eq!(program.compounds.len(), 2);
        match &program.compounds[0] {
            Compound::If(if_block) => assert!(if_block.else_branch.is_none()),
            other => panic!("expected an if, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = parse_program("1: X = 1 1: Y = 2").unwrap_err();
        assert_eq!(err, ParseError::DuplicateLabel(Label::new(1)));
    }

    #[test]
    fn test_empty_program_rejected() {
        assert_eq!(parse_program("  ").unwrap_err(), ParseError::EmptyProgram);
    }

    #[test]
    fn test_parse_condition_text() {
        let cond = parse_condition("X < 48").unwrap();
        assert_eq!(cond.op, CmpOp::Lt);
        assert_eq!(cond.lhs, Expr::Var("X".to_string()));
        assert_eq!(cond.rhs, Expr::Num(48));
    }

    #[test]
    fn test_parse_statements_text() {
        let statements = parse_statements("X = 42 ; Y = X + 3").unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].var, "X");
    }

    #[test]
    fn test_operator_precedence() {
        let statements = parse_statements("X = 1 + 2 * 3").unwrap();
        match &statements[0].expr {
            Expr::Bin { op, rhs, .. } => {
                assert_eq!(*op, ArithOp::Add);
                assert!(matches!(**rhs, Expr::Bin { op: ArithOp::Mul, .. }));
            }
            other => panic!("expected a binary expression, got {:?}", other),
        }
    }
}
